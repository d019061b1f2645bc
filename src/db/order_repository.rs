use sqlx::PgPool;
use tracing::error;

use crate::errors::AppError;
use crate::models::PurchaseOrder;

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All purchase orders for one user, most recent purchase first.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<PurchaseOrder>, AppError> {
        sqlx::query_as::<_, PurchaseOrder>(
            "SELECT id, product_name, model, purchase_date, warranty_expires_at
             FROM purchase_orders
             WHERE user_id = $1
             ORDER BY purchase_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to query purchase orders for {user_id}: {e}");
            AppError::db_query("Failed to query purchase orders", e)
        })
    }
}
