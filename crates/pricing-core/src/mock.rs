//! Mock Capabilities
//!
//! In-memory stand-ins for the plan service, checkout service, auth session,
//! toast sink and browser location, for exercising the loader and the
//! initiator without a browser or a network.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use crate::capability::{
    AuthProvider, CheckoutBackend, CheckoutSessionRequest, CheckoutSessionResponse, Navigator,
    Notice, Notifier, PlanSource, User,
};
use crate::error::{PricingError, Result};

/// Plan service with a canned reply
pub struct MockPlanSource {
    reply: RefCell<Option<Result<Option<serde_json::Value>>>>,
    calls: Cell<usize>,
}

impl MockPlanSource {
    pub fn returning(payload: serde_json::Value) -> Self {
        Self::with_reply(Ok(Some(payload)))
    }

    /// Succeeds with an empty body
    pub fn empty() -> Self {
        Self::with_reply(Ok(None))
    }

    pub fn failing(error: PricingError) -> Self {
        Self::with_reply(Err(error))
    }

    fn with_reply(reply: Result<Option<serde_json::Value>>) -> Self {
        Self {
            reply: RefCell::new(Some(reply)),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl PlanSource for MockPlanSource {
    async fn list_plans(&self) -> Result<Option<serde_json::Value>> {
        self.calls.set(self.calls.get() + 1);
        // The canned error can only be handed out once; later calls see no data
        self.reply.borrow_mut().take().unwrap_or(Ok(None))
    }
}

/// Checkout service that records requests
pub struct MockCheckoutBackend {
    reply: RefCell<Option<Result<CheckoutSessionResponse>>>,
    requests: RefCell<Vec<CheckoutSessionRequest>>,
}

impl MockCheckoutBackend {
    pub fn redirecting(url: &str) -> Self {
        Self::responding(CheckoutSessionResponse {
            url: Some(url.to_string()),
        })
    }

    pub fn responding(response: CheckoutSessionResponse) -> Self {
        Self {
            reply: RefCell::new(Some(Ok(response))),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(error: PricingError) -> Self {
        Self {
            reply: RefCell::new(Some(Err(error))),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Replace the reply for subsequent calls
    pub fn respond_with(&self, response: CheckoutSessionResponse) {
        *self.reply.borrow_mut() = Some(Ok(response));
    }

    pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl CheckoutBackend for MockCheckoutBackend {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse> {
        self.requests.borrow_mut().push(request.clone());

        let mut reply = self.reply.borrow_mut();
        match reply.as_ref() {
            Some(Ok(response)) => Ok(response.clone()),
            // Errors are not `Clone`; hand the canned one out once
            Some(Err(_)) => reply.take().unwrap_or_else(|| Ok(CheckoutSessionResponse::default())),
            None => Ok(CheckoutSessionResponse::default()),
        }
    }
}

/// Fixed auth session
pub struct StaticAuth(Option<User>);

impl StaticAuth {
    pub fn signed_in(id: &str, email: Option<&str>) -> Self {
        Self(Some(User {
            id: id.to_string(),
            email: email.map(str::to_string),
        }))
    }

    pub const fn signed_out() -> Self {
        Self(None)
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<User> {
        self.0.clone()
    }
}

/// Toast sink that keeps every notice
#[derive(Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// Browser location that records redirects instead of leaving the page
pub struct RecordingNavigator {
    origin: String,
    redirects: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            redirects: RefCell::new(Vec::new()),
        }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn redirect(&self, url: &str) {
        self.redirects.borrow_mut().push(url.to_string());
    }
}
