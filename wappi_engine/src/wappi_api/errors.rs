use thiserror::Error;

use crate::{
    pricing::DeliveryFeeError,
    traits::{ImportApiError, OrderApiError, SettingsApiError},
};

/// The broad class of an engine error. Transports map these onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Parse,
    Conflict,
    Internal,
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("The claim link is not valid")]
    ClaimTokenNotFound,
    #[error("{0}")]
    InvalidOrderId(String),
    #[error("{0} is not a valid order status")]
    InvalidStatus(String),
    #[error("The update does not change anything")]
    EmptyUpdate,
    #[error("Order {0} has already been claimed by someone else")]
    AlreadyClaimed(String),
    #[error(transparent)]
    InvalidDelivery(#[from] DeliveryFeeError),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error(transparent)]
    ImportError(#[from] ImportApiError),
    #[error(transparent)]
    SettingsError(#[from] SettingsApiError),
}

impl OrderFlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OrderNotFound(_) | Self::ClaimTokenNotFound => ErrorKind::NotFound,
            Self::InvalidOrderId(_) | Self::InvalidStatus(_) | Self::EmptyUpdate | Self::InvalidDelivery(_) => {
                ErrorKind::Validation
            },
            Self::AlreadyClaimed(_) => ErrorKind::Conflict,
            Self::DatabaseError(_) => ErrorKind::Internal,
            Self::ImportError(e) => e.kind(),
            Self::SettingsError(e) => e.kind(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) => "order:not-found",
            Self::ClaimTokenNotFound => "order:claim-not-found",
            Self::InvalidOrderId(_) => "order:invalid-id",
            Self::InvalidStatus(_) => "order:invalid-status",
            Self::EmptyUpdate => "order:empty-update",
            Self::AlreadyClaimed(_) => "order:already-claimed",
            Self::InvalidDelivery(_) => "order:invalid-delivery",
            Self::DatabaseError(_) => "order:database-error",
            Self::ImportError(e) => e.code(),
            Self::SettingsError(e) => e.code(),
        }
    }
}

impl From<OrderApiError> for OrderFlowError {
    fn from(e: OrderApiError) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
