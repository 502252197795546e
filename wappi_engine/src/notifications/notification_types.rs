use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderClaimed,
    OrderUpdated,
}

/// The message pushed to clients, serialized as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new<P: Serialize>(notification_type: NotificationType, payload: &P) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_value(payload)?;
        Ok(Self { notification_type, payload })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderClaimedPayload {
    pub order_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub status: OrderStatusType,
    pub eta: Option<String>,
    pub claimed_at: DateTime<Utc>,
}

impl OrderClaimedPayload {
    pub fn for_order(order: &Order, user_id: &str) -> Self {
        Self {
            order_id: order.id.to_string(),
            user_id: user_id.to_string(),
            profile_id: order.profile_id.clone(),
            status: order.status,
            eta: order.eta.clone(),
            claimed_at: Utc::now(),
        }
    }
}
