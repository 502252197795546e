//! Wappi Engine
//!
//! The Wappi engine is the core of the Wappi order tracker. Orders arrive as free-text item lists; the engine
//! reconciles them against the business's imported price list, prices the delivery, hands out claim links and tells
//! connected dashboards when a customer claims an order.
//!
//! The library is divided into these sections:
//! 1. Pricing ([`mod@pricing`] and [`mod@helpers`]): pure functions that normalize spreadsheet text, match order items
//!    to price-list rows, correct prices and compute delivery fees.
//! 2. Notifications ([`mod@notifications`]): the hub actor that fans claim events out to websocket clients.
//! 3. Storage ([`mod@traits`] and the SQLite backend). You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The data types stored in the database are defined in
//!    [`mod@db_types`].
//! 4. The public API ([`OrderFlowApi`], [`ImportApi`], [`SettingsApi`]).
#[cfg(feature = "sqlite")]
mod sqlite;
mod wappi_api;

pub mod db_types;
pub mod helpers;
pub mod notifications;
pub mod pricing;
pub mod spreadsheet;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{ImportManagement, OrderManagement, SettingsManagement, WappiDatabase};
pub use wappi_api::{
    errors::{ErrorKind, OrderFlowError},
    import_api::{ImportApi, ImportSummary},
    order_flow_api::OrderFlowApi,
    order_objects,
    settings_api::SettingsApi,
};
