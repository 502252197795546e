use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Location, OrderItem, Settings, SettingsUpdate},
    pricing::calculate_fee,
    traits::{SettingsApiError, SettingsManagement},
};

/// `SettingsApi` reads and updates the business settings, and quotes delivery fees from them.
pub struct SettingsApi<B> {
    db: B,
}

impl<B> Debug for SettingsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettingsApi")
    }
}

impl<B> SettingsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

fn validate(update: &SettingsUpdate) -> Result<(), SettingsApiError> {
    if update.business_location.as_ref().is_some_and(|l| !l.is_valid()) ||
        update.default_map_location.as_ref().is_some_and(|l| !l.is_valid())
    {
        return Err(SettingsApiError::InvalidSettings("latitude or longitude out of range".into()));
    }
    if update.default_item_weight.is_some_and(|w| w < 0) {
        return Err(SettingsApiError::InvalidSettings("the default item weight cannot be negative".into()));
    }
    let prices = [update.delivery_base_price, update.delivery_price_per_km, update.delivery_price_per_kg];
    if prices.iter().flatten().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(SettingsApiError::InvalidSettings("delivery prices must be non-negative numbers".into()));
    }
    Ok(())
}

impl<B> SettingsApi<B>
where B: SettingsManagement
{
    pub async fn fetch(&self) -> Result<Settings, SettingsApiError> {
        self.db.fetch_settings().await
    }

    /// Writes the fields present in `update`. An empty update returns the current settings.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, SettingsApiError> {
        if update.is_empty() {
            trace!("🪛️ Empty settings update");
            return self.db.fetch_settings().await;
        }
        validate(&update)?;
        let settings = self.db.update_settings(update).await?;
        info!("🪛️ Settings updated");
        Ok(settings)
    }

    /// Quotes the delivery fee from the business location to `destination` for `items`.
    pub async fn calculate_delivery_fee(
        &self,
        destination: &Location,
        items: &[OrderItem],
    ) -> Result<f64, SettingsApiError> {
        let settings = self.db.fetch_settings().await?;
        let fee = calculate_fee(&settings.business_location, destination, items, &settings)?;
        Ok(fee)
    }
}
