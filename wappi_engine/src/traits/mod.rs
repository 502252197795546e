//! # Storage backends
//!
//! The traits in this module are the contracts a storage backend fulfils to back the Wappi engine APIs.
//!
//! * [`ImportManagement`] stores the rows of imported price lists.
//! * [`OrderManagement`] stores orders and the claim tokens that link them to customers.
//! * [`SettingsManagement`] stores the business-wide settings singleton.
//!
//! [`WappiDatabase`] bundles all three for APIs that need the whole backend.
mod import_management;
mod order_management;
mod settings_management;

pub use import_management::{ImportApiError, ImportManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use settings_management::{SettingsApiError, SettingsManagement};

/// A backend that can serve every engine API.
pub trait WappiDatabase: ImportManagement + OrderManagement + SettingsManagement {}

impl<T> WappiDatabase for T where T: ImportManagement + OrderManagement + SettingsManagement {}
