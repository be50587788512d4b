use thiserror::Error;

/// Errors raised by the pricing engines and the reporting layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Rejected input, detected before any table is allocated.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Probability mass outside [0, 1] or a non-finite value function.
    #[error("Numeric domain error: {0}")]
    NumericDomain(String),
    /// A report could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, PricingError>;

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::Serialization(e.to_string())
    }
}

impl PricingError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PricingError::InvalidParameter(msg.into())
    }

    pub(crate) fn numeric(msg: impl Into<String>) -> Self {
        PricingError::NumericDomain(msg.into())
    }
}
