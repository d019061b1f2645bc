use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::agent::AgentService;
use crate::auth;
use crate::config::AgentConfig;
use crate::db;
use crate::db::order_repository::OrderRepository;
use crate::db::service_request_repository::ServiceRequestRepository;
use crate::errors::AppError;
use crate::models::{
    is_allowed_request_type, ChatRequestBody, ChatResponseBody, NewServiceRequest,
    OrdersResponse, PlaceServiceRequestBody, ServiceRequestCreated,
};

// ── Chat ─────────────────────────────────────────────────────────────────────

/// POST `/api/agent/chat` — proxies one user message to the agent API and
/// returns the consolidated reply with its conversation id.
pub async fn agent_chat_handler(
    State(agent): State<AgentService>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Result<Json<ChatResponseBody>, AppError> {
    // Configuration is checked before the body: a misconfigured deployment
    // answers 503 even for a malformed request.
    AgentConfig::from_env()?;

    let Json(body) = payload.map_err(|_| AppError::invalid_input("Invalid JSON body"))?;

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::invalid_input("Missing required field: message"))?;

    let user_id = body
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or("demo-user-a");

    let outcome = agent
        .chat(message, body.conversation_id.as_deref(), user_id)
        .await?;

    Ok(Json(ChatResponseBody {
        reply: outcome.reply,
        conversation_id: outcome.conversation_id,
    }))
}

// ── Order lookup ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// GET `/api/demo/orders?userId=` — purchase orders for one user, newest
/// purchase first.
pub async fn list_orders_handler(
    headers: HeaderMap,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>, AppError> {
    if !auth::is_agent_api_authorized(&headers)? {
        return Err(AppError::Unauthorized);
    }

    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::invalid_input("Missing required query parameter: userId"))?;

    let pool = db::pool().await?;
    let orders = OrderRepository::new(pool.clone())
        .find_by_user_id(user_id)
        .await?;

    Ok(Json(OrdersResponse {
        user_id: user_id.to_string(),
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}

// ── Service requests ─────────────────────────────────────────────────────────

/// POST `/api/demo/place-service-request` — files a repair/cleaning request
/// and answers 201 with the stored receipt.
pub async fn place_service_request_handler(
    headers: HeaderMap,
    payload: Result<Json<PlaceServiceRequestBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    if !auth::is_agent_api_authorized(&headers)? {
        return Err(AppError::Unauthorized);
    }

    let Json(body) = payload.map_err(|_| AppError::invalid_input("Invalid JSON body"))?;
    let request = validate_service_request(&body)?;

    let pool = db::pool().await?;
    let receipt = ServiceRequestRepository::new(pool.clone())
        .insert(&request)
        .await?;

    Ok((StatusCode::CREATED, Json(ServiceRequestCreated::from(receipt))))
}

fn validate_service_request(
    body: &PlaceServiceRequestBody,
) -> Result<NewServiceRequest, AppError> {
    let trimmed = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_string();

    let request = NewServiceRequest {
        user_id: trimmed(&body.user_id),
        request_type: trimmed(&body.request_type),
        product_name: trimmed(&body.product_name),
        model: trimmed(&body.model),
        issue_description: trimmed(&body.issue_description),
    };

    if request.user_id.is_empty()
        || request.request_type.is_empty()
        || request.product_name.is_empty()
        || request.model.is_empty()
        || request.issue_description.is_empty()
    {
        return Err(AppError::invalid_input(
            "Missing required fields: userId, requestType, productName, model, issueDescription",
        ));
    }

    if !is_allowed_request_type(&request.request_type) {
        return Err(AppError::invalid_input(
            "requestType must be one of: repair, cleaning",
        ));
    }

    Ok(request)
}
