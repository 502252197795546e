use thiserror::Error;

use crate::{
    db_types::{Settings, SettingsUpdate},
    pricing::DeliveryFeeError,
    ErrorKind,
};

#[derive(Debug, Clone, Error)]
pub enum SettingsApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The settings record is missing")]
    SettingsNotFound,
    #[error("Invalid settings. {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    InvalidDelivery(#[from] DeliveryFeeError),
}

impl SettingsApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DatabaseError(_) => ErrorKind::Internal,
            Self::SettingsNotFound => ErrorKind::NotFound,
            Self::InvalidSettings(_) | Self::InvalidDelivery(_) => ErrorKind::Validation,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "settings:database-error",
            Self::SettingsNotFound => "settings:not-found",
            Self::InvalidSettings(_) => "settings:invalid",
            Self::InvalidDelivery(_) => "delivery:invalid",
        }
    }
}

impl From<sqlx::Error> for SettingsApiError {
    fn from(e: sqlx::Error) -> Self {
        SettingsApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait SettingsManagement {
    async fn fetch_settings(&self) -> Result<Settings, SettingsApiError>;

    /// Writes the `Some` fields of `update` and returns the resulting settings.
    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, SettingsApiError>;
}
