//! Injected Capabilities
//!
//! The loader and the initiator never reach for globals: the plan service,
//! the checkout service, the auth session, the toast sink and the browser
//! location are all passed in as trait objects so tests can swap them.
//!
//! Everything here is single-threaded (`?Send`): the pricing page runs on
//! the browser event loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Remote "list plans" function
#[async_trait(?Send)]
pub trait PlanSource {
    /// Invoke the function with no parameters
    ///
    /// `Ok(None)` means the call succeeded with an empty body.
    async fn list_plans(&self) -> Result<Option<serde_json::Value>>;
}

/// Body of a create-checkout-session call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub product_price_id: String,
    pub success_url: String,
    pub customer_email: String,
    pub metadata: CheckoutMetadata,
}

/// Metadata forwarded to the payment provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    pub user_id: String,
}

/// Response of a create-checkout-session call
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    #[serde(default)]
    pub url: Option<String>,
}

impl CheckoutSessionResponse {
    /// Redirect URL, if the provider returned a usable one
    pub fn redirect_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Header carrying the customer email alongside the body
pub const CUSTOMER_EMAIL_HEADER: &str = "X-Customer-Email";

/// Remote "create checkout session" function
#[async_trait(?Send)]
pub trait CheckoutBackend {
    /// Create a session; `customer_email` is also sent as [`CUSTOMER_EMAIL_HEADER`]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse>;
}

/// Signed-in user as far as checkout cares
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authentication provider
pub trait AuthProvider {
    fn current_user(&self) -> Option<User>;
}

/// Toast variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Destructive,
}

/// A user-visible notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Toast sink
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Browser location
pub trait Navigator {
    /// Scheme + host (+ port) of the current page
    fn origin(&self) -> String;

    /// Full client-side redirect
    fn redirect(&self, url: &str);
}
