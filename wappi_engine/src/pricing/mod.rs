//! # Pricing
//!
//! Pure functions that reconcile free-text order items against the imported price list and price deliveries.
//!
//! * [`match_import`] finds the price-list row that an item refers to, by code first and then by name.
//! * [`correct_prices`] rewrites item names and prices from their matching rows.
//! * [`calculate_fee`] prices a delivery from the distance travelled and the weight carried.
mod corrector;
mod delivery_fee;
mod matcher;

pub use corrector::{correct_prices, parse_price};
pub use delivery_fee::{calculate_fee, haversine_km, DeliveryFeeError, EARTH_RADIUS_KM};
pub use matcher::match_import;
