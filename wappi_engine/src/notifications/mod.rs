//! Live notifications for connected dashboards.
//!
//! The [`NotificationHub`] is a single task that owns every connected client. Everything else talks to it through a
//! cloneable [`HubHandle`], so the client set is only ever touched from inside the hub loop.
mod hub;
mod notification_types;

pub use hub::{ClientId, HubClient, HubHandle, NotificationHub};
pub use notification_types::{Notification, NotificationType, OrderClaimedPayload};
