use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewServiceRequest, ServiceRequestReceipt};

#[derive(Clone)]
pub struct ServiceRequestRepository {
    pool: PgPool,
}

impl ServiceRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        request: &NewServiceRequest,
    ) -> Result<ServiceRequestReceipt, AppError> {
        sqlx::query_as::<_, ServiceRequestReceipt>(
            "INSERT INTO service_requests
                 (id, user_id, request_type, product_name, model, issue_description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, status, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&request.user_id)
        .bind(&request.request_type)
        .bind(&request.product_name)
        .bind(&request.model)
        .bind(&request.issue_description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create service request for {}: {e}", request.user_id);
            AppError::db_query("Failed to create service request", e)
        })
    }
}
