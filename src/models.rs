use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Chat endpoint ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequestBody {
    pub message: Option<String>,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseBody {
    pub reply: String,
    pub conversation_id: String,
}

// ── Order lookup ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseOrder {
    pub id: String,
    pub product_name: String,
    pub model: String,
    pub purchase_date: NaiveDate,
    pub warranty_expires_at: NaiveDate,
}

/// Wire shape of one order in the lookup response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub product: String,
    pub model: String,
    pub purchase_date: NaiveDate,
    pub warranty_expires_at: NaiveDate,
}

impl From<PurchaseOrder> for OrderSummary {
    fn from(row: PurchaseOrder) -> Self {
        Self {
            id: row.id,
            product: row.product_name,
            model: row.model,
            purchase_date: row.purchase_date,
            warranty_expires_at: row.warranty_expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub user_id: String,
    pub orders: Vec<OrderSummary>,
}

// ── Service requests ─────────────────────────────────────────────────────────

pub const ALLOWED_REQUEST_TYPES: [&str; 2] = ["repair", "cleaning"];

pub fn is_allowed_request_type(value: &str) -> bool {
    ALLOWED_REQUEST_TYPES.contains(&value)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceServiceRequestBody {
    pub user_id: Option<String>,
    pub request_type: Option<String>,
    pub product_name: Option<String>,
    pub model: Option<String>,
    pub issue_description: Option<String>,
}

/// Validated insert payload for a new service request.
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub user_id: String,
    pub request_type: String,
    pub product_name: String,
    pub model: String,
    pub issue_description: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceRequestReceipt {
    pub id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestCreated {
    pub request_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceRequestReceipt> for ServiceRequestCreated {
    fn from(row: ServiceRequestReceipt) -> Self {
        Self { request_id: row.id, status: row.status, created_at: row.created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_type_whitelist() {
        assert!(is_allowed_request_type("repair"));
        assert!(is_allowed_request_type("cleaning"));
        assert!(!is_allowed_request_type("replacement"));
        assert!(!is_allowed_request_type("Repair"));
    }

    #[test]
    fn order_summary_renames_fields_for_the_wire() {
        let summary = OrderSummary::from(PurchaseOrder {
            id: "o-1".into(),
            product_name: "PureAir Pro".into(),
            model: "PA-200".into(),
            purchase_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            warranty_expires_at: NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(),
        });
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["product"], "PureAir Pro");
        assert_eq!(json["purchaseDate"], "2025-03-01");
        assert_eq!(json["warrantyExpiresAt"], "2027-03-01");
    }
}
