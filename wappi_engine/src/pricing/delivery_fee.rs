use thiserror::Error;

use crate::db_types::{Location, OrderItem, Settings};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryFeeError {
    #[error("Delivery location ({0}, {1}) is out of range")]
    InvalidLocation(f64, f64),
    #[error("Item '{0}' has a negative quantity or weight")]
    InvalidItem(String),
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(from: &Location, to: &Location) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_long = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// `base + distance × per_km + per_kg × Σ quantity × weight`, where items without a weight count as the default item
/// weight from `settings`. No rounding is applied.
///
/// The destination must be a valid coordinate, and no item may carry a negative quantity or weight. Weights are summed
/// as floats, so huge quantities give a huge fee rather than an overflow.
pub fn calculate_fee(
    business: &Location,
    user: &Location,
    items: &[OrderItem],
    settings: &Settings,
) -> Result<f64, DeliveryFeeError> {
    if !user.is_valid() {
        return Err(DeliveryFeeError::InvalidLocation(user.latitude, user.longitude));
    }
    let pricing = &settings.delivery;
    let distance = haversine_km(business, user);
    let mut total_weight = 0.0;
    for item in items {
        let weight = item.weight.unwrap_or(settings.default_item_weight);
        if item.quantity < 0 || weight < 0 {
            return Err(DeliveryFeeError::InvalidItem(item.name.clone()));
        }
        #[allow(clippy::cast_precision_loss)]
        let item_weight = item.quantity as f64 * weight as f64;
        total_weight += item_weight;
    }
    Ok(pricing.base_price + distance * pricing.price_per_km + pricing.price_per_kg * total_weight)
}
