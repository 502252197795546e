use serde::{Deserialize, Serialize};

use crate::db_types::{Location, Order, OrderItem, OrderStatusType};

/// A request to create an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    #[serde(default)]
    pub profile_id: Option<String>,
    /// The customer the order belongs to, if already known. Orders created with a claim link ignore this.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    pub items: Vec<OrderItem>,
    /// Rewrite item names and prices from the imported price list before saving.
    #[serde(default)]
    pub reconcile_prices: bool,
    /// Where the order is delivered to. When given, the delivery fee is computed and stored with the order.
    #[serde(default)]
    pub delivery_location: Option<Location>,
}

impl NewOrderRequest {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self { items, ..Default::default() }
    }

    pub fn with_reconciliation(mut self) -> Self {
        self.reconcile_prices = true;
        self
    }

    pub fn with_delivery_location(mut self, location: Location) -> Self {
        self.delivery_location = Some(location);
        self
    }
}

/// A partial update to an order as received from an admin. The status is validated before anything is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default)]
    pub reconcile_prices: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithLink {
    pub order: Order,
    pub token: String,
    pub link: String,
}

/// What the claim page shows before the customer claims the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimInfo {
    pub order_id: String,
    pub user_id: Option<String>,
    pub profile_id: Option<String>,
    pub status: OrderStatusType,
    pub is_claimed: bool,
}

impl From<&Order> for ClaimInfo {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.to_string(),
            user_id: order.user_id.clone(),
            profile_id: order.profile_id.clone(),
            status: order.status,
            is_claimed: order.is_claimed(),
        }
    }
}
