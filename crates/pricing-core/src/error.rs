//! Error Types

use thiserror::Error;

/// Result type alias for pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Shown when the plan service fails without a message of its own
pub const LOAD_FALLBACK_MESSAGE: &str = "Failed to load pricing plans. Please try again later.";

/// Shown when the plan service answers with nothing
pub const NO_DATA_MESSAGE: &str = "No data returned from pricing function";

/// Inline message left behind by a failed checkout
pub const CHECKOUT_FAILED_MESSAGE: &str = "Failed to create checkout session. Please try again.";

/// Pricing error types
#[derive(Error, Debug)]
pub enum PricingError {
    /// Plan catalog could not be loaded
    #[error("Load failure: {0}")]
    LoadFailure(String),

    /// Plan service succeeded but returned no payload
    #[error("No data returned from pricing function")]
    NoData,

    /// Checkout service answered without a redirect URL
    #[error("No checkout URL returned")]
    MissingCheckoutUrl,

    /// Remote function reported an error
    #[error("Service error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Service {
        status: u16,
        message: Option<String>,
    },

    /// Request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PricingError {
    /// Message the service itself reported, if any
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            Self::LoadFailure(msg) => Some(msg),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::LoadFailure(msg) => msg.clone(),
            Self::NoData => NO_DATA_MESSAGE.into(),
            Self::MissingCheckoutUrl => CHECKOUT_FAILED_MESSAGE.into(),
            Self::Config(_) => "Service configuration error.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
