//! # Wappi engine public API
//!
//! The `wappi_api` module exposes the programmatic API for the Wappi engine.
//! The API is modular, so that clients of the API can pick and choose the functionality they want.
//!
//! * [`order_flow_api`] drives the order lifecycle: creation (with optional price reconciliation and delivery
//!   pricing), claim links, claims and status changes.
//! * [`import_api`] manages the imported price list, including spreadsheet uploads.
//! * [`settings_api`] reads and updates the business settings and quotes delivery fees.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use wappi_engine::{ImportApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements ImportManagement
//! let api = ImportApi::new(db);
//! let records = api.fetch_all().await?;
//! ```
pub mod errors;
pub mod import_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod settings_api;
