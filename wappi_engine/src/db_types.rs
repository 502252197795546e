use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use thiserror::Error;
use uuid::Uuid;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The delivery states of an order, in lifecycle order. Any status can be set explicitly from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been captured but nobody has acted on it yet.
    Created,
    /// The business has accepted the order.
    Confirmed,
    Preparing,
    OnTheWay,
    Delivered,
}

pub const VALID_STATUSES: [OrderStatusType; 5] = [
    OrderStatusType::Created,
    OrderStatusType::Confirmed,
    OrderStatusType::Preparing,
    OrderStatusType::OnTheWay,
    OrderStatusType::Delivered,
];

impl OrderStatusType {
    pub fn initial() -> Self {
        OrderStatusType::Created
    }

    /// Position of the status in [`VALID_STATUSES`].
    pub fn index(&self) -> usize {
        VALID_STATUSES.iter().position(|s| s == self).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::Created => "CREATED",
            OrderStatusType::Confirmed => "CONFIRMED",
            OrderStatusType::Preparing => "PREPARING",
            OrderStatusType::OnTheWay => "ON_THE_WAY",
            OrderStatusType::Delivered => "DELIVERED",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(pub String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VALID_STATUSES.iter().find(|status| status.as_str() == s).copied().ok_or_else(|| ConversionError(s.to_string()))
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// Orders are identified by UUIDs, stored in their hyphenated string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Uuid::parse_str(s.trim()).map_err(|e| ConversionError(format!("{s} is not a valid order id. {e}")))?;
        Ok(Self(id.to_string()))
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
/// A free-text line item as captured from a chat or form. Name and price may be rewritten from the price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    /// Weight of one unit in whole kilograms. Falls back to the default item weight in the settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

fn default_quantity() -> i64 {
    1
}

impl OrderItem {
    pub fn new<S: Into<String>>(name: S, price: f64, quantity: i64) -> Self {
        Self { code: None, name: name.into(), price, quantity, weight: None }
    }

    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// The item code, if one was given and it is not blank.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub profile_id: Option<String>,
    pub user_id: Option<String>,
    pub status: OrderStatusType,
    pub status_message: Option<String>,
    pub eta: Option<String>,
    pub data: OrderData,
    pub delivery_fee: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status_index(&self) -> usize {
        self.status.index()
    }

    pub fn is_claimed(&self) -> bool {
        self.user_id.is_some()
    }
}

fn decode_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let status: String = row.try_get("status")?;
        let data: String = row.try_get("data")?;
        Ok(Self {
            id: OrderId(id),
            profile_id: row.try_get("profile_id")?,
            user_id: row.try_get("user_id")?,
            status: status.parse().map_err(decode_error)?,
            status_message: row.try_get("status_message")?,
            eta: row.try_get("eta")?,
            data: serde_json::from_str(&data).map_err(decode_error)?,
            delivery_fee: row.try_get("delivery_fee")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// The data needed to store a brand-new order. The order always starts out in the initial status.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: OrderId,
    pub profile_id: Option<String>,
    pub user_id: Option<String>,
    pub eta: Option<String>,
    pub status_message: Option<String>,
    pub items: Vec<OrderItem>,
    pub delivery_fee: Option<f64>,
}

impl NewOrder {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self {
            id: OrderId::new_random(),
            profile_id: None,
            user_id: None,
            eta: None,
            status_message: None,
            items,
            delivery_fee: None,
        }
    }
}

/// A partial update to an order. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatusType>,
    pub status_message: Option<String>,
    pub eta: Option<String>,
    pub items: Option<Vec<OrderItem>>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.status_message.is_none() && self.eta.is_none() && self.items.is_none()
    }
}

//--------------------------------------      ClaimToken       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClaimToken {
    pub token: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     ImportRecord      ---------------------------------------------------------
/// Spreadsheet header → cell value. Keys are kept exactly as they appeared in the sheet.
pub type ImportData = BTreeMap<String, Value>;

/// One row of an imported price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: String,
    pub data: ImportData,
    pub profile_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportRecord {
    /// Builds an unsaved record. Used when pricing against data that has not been stored.
    pub fn from_data(data: ImportData) -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4().to_string(), data, profile_id: None, created_at: now, updated_at: now }
    }
}

impl FromRow<'_, SqliteRow> for ImportRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let data: String = row.try_get("data")?;
        Ok(Self {
            id: row.try_get("id")?,
            data: serde_json::from_str(&data).map_err(decode_error)?,
            profile_id: row.try_get("profile_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewImportRecord {
    pub data: ImportData,
    #[serde(default)]
    pub profile_id: Option<String>,
}

impl NewImportRecord {
    pub fn new(data: ImportData) -> Self {
        Self { data, profile_id: None }
    }
}

//--------------------------------------       Settings        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Coefficients of the delivery fee formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPricing {
    pub base_price: f64,
    pub price_per_km: f64,
    pub price_per_kg: f64,
}

/// The business-wide settings singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub business_name: String,
    pub business_location: Location,
    pub default_map_location: Location,
    pub default_map_zoom: i64,
    /// Weight in whole kilograms assumed for items that don't carry their own weight.
    pub default_item_weight: i64,
    pub delivery: DeliveryPricing,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Settings {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            business_name: row.try_get("business_name")?,
            business_location: Location::new(row.try_get("business_lat")?, row.try_get("business_long")?),
            default_map_location: Location::new(row.try_get("default_map_lat")?, row.try_get("default_map_long")?),
            default_map_zoom: row.try_get("default_map_zoom")?,
            default_item_weight: row.try_get("default_item_weight")?,
            delivery: DeliveryPricing {
                base_price: row.try_get("delivery_base_price")?,
                price_per_km: row.try_get("delivery_price_per_km")?,
                price_per_kg: row.try_get("delivery_price_per_kg")?,
            },
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A partial settings update. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub business_name: Option<String>,
    pub business_location: Option<Location>,
    pub default_map_location: Option<Location>,
    pub default_map_zoom: Option<i64>,
    pub default_item_weight: Option<i64>,
    pub delivery_base_price: Option<f64>,
    pub delivery_price_per_km: Option<f64>,
    pub delivery_price_per_kg: Option<f64>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.business_name.is_none() &&
            self.business_location.is_none() &&
            self.default_map_location.is_none() &&
            self.default_map_zoom.is_none() &&
            self.default_item_weight.is_none() &&
            self.delivery_base_price.is_none() &&
            self.delivery_price_per_km.is_none() &&
            self.delivery_price_per_kg.is_none()
    }

    pub fn with_delivery_pricing(mut self, pricing: DeliveryPricing) -> Self {
        self.delivery_base_price = Some(pricing.base_price);
        self.delivery_price_per_km = Some(pricing.price_per_km);
        self.delivery_price_per_kg = Some(pricing.price_per_kg);
        self
    }
}
