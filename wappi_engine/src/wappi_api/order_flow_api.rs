use std::fmt::Debug;

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType, OrderUpdate},
    notifications::{HubHandle, OrderClaimedPayload},
    pricing::{calculate_fee, correct_prices},
    traits::{ImportManagement, OrderManagement, SettingsManagement},
    wappi_api::{
        errors::OrderFlowError,
        order_objects::{ClaimInfo, NewOrderRequest, OrderUpdateRequest, OrderWithLink},
    },
};

const CLAIM_TOKEN_LENGTH: usize = 32;

/// `OrderFlowApi` is the primary API for the order lifecycle: it creates orders (reconciling prices and pricing the
/// delivery on the way), hands out claim links, lets customers claim orders and moves orders through their statuses.
///
/// Successful claims are announced to connected dashboards through the notification hub.
pub struct OrderFlowApi<B> {
    db: B,
    hub: HubHandle,
    frontend_url: String,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new<S: Into<String>>(db: B, hub: HubHandle, frontend_url: S) -> Self {
        let frontend_url = frontend_url.into().trim_end_matches('/').to_string();
        Self { db, hub, frontend_url }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// The link a customer follows to claim the order behind `token`.
    pub fn claim_link(&self, token: &str) -> String {
        format!("{}/claim/{token}", self.frontend_url)
    }
}

fn parse_order_id(id: &str) -> Result<OrderId, OrderFlowError> {
    id.parse::<OrderId>().map_err(|e| OrderFlowError::InvalidOrderId(e.to_string()))
}

fn parse_status(status: &str) -> Result<OrderStatusType, OrderFlowError> {
    status.trim().parse::<OrderStatusType>().map_err(|_| OrderFlowError::InvalidStatus(status.to_string()))
}

/// The outcome of claiming an order that `owner` already holds.
fn claimed_by(order: Order, owner: &str, user_id: &str) -> Result<Order, OrderFlowError> {
    if owner == user_id {
        debug!("🔄️ Order {} already belongs to {user_id}", order.id);
        Ok(order)
    } else {
        Err(OrderFlowError::AlreadyClaimed(order.id.to_string()))
    }
}

fn new_claim_token() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(CLAIM_TOKEN_LENGTH).map(char::from).collect()
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + ImportManagement + SettingsManagement
{
    async fn reconcile(&self, items: Vec<OrderItem>) -> Result<Vec<OrderItem>, OrderFlowError> {
        let records = self.db.fetch_import_records().await?;
        let (corrected, changed) = correct_prices(&items, &records);
        if changed {
            debug!("🔄️ Item prices were corrected against {} import records", records.len());
        } else {
            trace!("🔄️ No item prices needed correcting");
        }
        Ok(corrected)
    }

    /// Creates a new order in the initial status.
    ///
    /// If `reconcile_prices` is set, the items are corrected against the import records first. If a delivery location
    /// is given, the delivery fee is calculated from the current settings and stored with the order.
    pub async fn create_order(&self, request: NewOrderRequest) -> Result<Order, OrderFlowError> {
        let NewOrderRequest { profile_id, user_id, eta, status_message, items, reconcile_prices, delivery_location } =
            request;
        let items = if reconcile_prices { self.reconcile(items).await? } else { items };
        let delivery_fee = match delivery_location {
            Some(location) => {
                let settings = self.db.fetch_settings().await?;
                let fee = calculate_fee(&settings.business_location, &location, &items, &settings)?;
                trace!("🔄️ Delivery fee for new order is {fee}");
                Some(fee)
            },
            None => None,
        };
        let order = NewOrder { profile_id, user_id, eta, status_message, delivery_fee, ..NewOrder::new(items) };
        let order = self.db.insert_order(order).await?;
        info!("🔄️ Order {} created with {} items", order.id, order.data.items.len());
        Ok(order)
    }

    /// Creates an unclaimed order along with the link the customer uses to claim it.
    pub async fn create_order_with_link(&self, request: NewOrderRequest) -> Result<OrderWithLink, OrderFlowError> {
        let request = NewOrderRequest { user_id: None, ..request };
        let order = self.create_order(request).await?;
        let token = new_claim_token();
        self.db.insert_claim_token(&token, &order.id).await?;
        let link = self.claim_link(&token);
        debug!("🔄️ Claim link issued for order {}", order.id);
        Ok(OrderWithLink { order, token, link })
    }

    async fn order_for_token(&self, token: &str) -> Result<Order, OrderFlowError> {
        let claim = self.db.fetch_claim_token(token).await?.ok_or(OrderFlowError::ClaimTokenNotFound)?;
        let order_id = parse_order_id(&claim.order_id)?;
        self.db.fetch_order(&order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(claim.order_id))
    }

    /// Describes the order behind a claim token without claiming it.
    pub async fn claim_info(&self, token: &str) -> Result<ClaimInfo, OrderFlowError> {
        let order = self.order_for_token(token).await?;
        Ok(ClaimInfo::from(&order))
    }

    /// Assigns the order behind `token` to `user_id`.
    ///
    /// Claiming an order that the same user already holds succeeds without side effects. An order held by anyone else
    /// cannot be claimed. A successful first claim sends exactly one `order_claimed` notification.
    pub async fn claim_order(&self, token: &str, user_id: &str) -> Result<Order, OrderFlowError> {
        let order = self.order_for_token(token).await?;
        if let Some(owner) = order.user_id.clone() {
            return claimed_by(order, &owner, user_id);
        }
        let claimed = self.db.assign_user(&order.id, user_id).await?;
        let id = order.id;
        let order = self.db.fetch_order(&id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(id.to_string()))?;
        if !claimed {
            // Another claim landed between the read and the update
            let owner = order.user_id.clone().unwrap_or_default();
            return claimed_by(order, &owner, user_id);
        }
        info!("🔄️ Order {} claimed by {user_id}", order.id);
        self.hub.notify_order_claimed(&OrderClaimedPayload::for_order(&order, user_id)).await;
        Ok(order)
    }

    /// Moves an order to `status`. Both the id and the status are validated before storage is touched.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Order, OrderFlowError> {
        let id = parse_order_id(id)?;
        let status = parse_status(status)?;
        let order = self
            .db
            .update_order_status(&id, status)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(id.to_string()))?;
        info!("🔄️ Order {id} is now {status}");
        Ok(order)
    }

    /// Applies an admin's partial update to an order.
    pub async fn update_order(&self, id: &str, request: OrderUpdateRequest) -> Result<Order, OrderFlowError> {
        let id = parse_order_id(id)?;
        let OrderUpdateRequest { status, status_message, eta, items, reconcile_prices } = request;
        let status = status.as_deref().map(parse_status).transpose()?;
        let items = match items {
            Some(items) if reconcile_prices => Some(self.reconcile(items).await?),
            other => other,
        };
        let update = OrderUpdate { status, status_message, eta, items };
        if update.is_empty() {
            return Err(OrderFlowError::EmptyUpdate);
        }
        let order =
            self.db.update_order(&id, update).await?.ok_or_else(|| OrderFlowError::OrderNotFound(id.to_string()))?;
        debug!("🔄️ Order {id} updated");
        Ok(order)
    }

    pub async fn fetch_order(&self, id: &str) -> Result<Order, OrderFlowError> {
        let id = parse_order_id(id)?;
        self.db.fetch_order(&id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(id.to_string()))
    }

    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        Ok(orders)
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders().await?;
        Ok(orders)
    }
}
