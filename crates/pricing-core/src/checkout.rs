//! Checkout Initiator
//!
//! Drives a hosted checkout for one selected price:
//!
//! ```text
//! ┌─────────┐  signed in   ┌────────────┐  {url}   ┌──────────────────┐
//! │  Idle   │─────────────▶│ Processing │─────────▶│ redirect to URL  │
//! └─────────┘              └────────────┘          └──────────────────┘
//!      │ no user                 │ error / no url
//!      ▼                         ▼
//!  /login?redirect=pricing     Idle + inline error + toast
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::capability::{
    AuthProvider, CheckoutBackend, CheckoutMetadata, CheckoutSessionRequest, Navigator, Notice,
    Notifier, User,
};
use crate::error::{CHECKOUT_FAILED_MESSAGE, PricingError, Result};
use crate::plan::Plan;

/// How a second `initiate` behaves while one is already in flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentrancyPolicy {
    /// Callers disable the purchase controls; the initiator itself lets the
    /// second call through. The latest call owns the in-flight marker, and an
    /// earlier call finishing does not clear it.
    #[default]
    Lenient,

    /// Refuse any call while a checkout is processing
    RejectWhileProcessing,
}

/// Checkout configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Path appended to the page origin for the provider's success redirect
    #[serde(default = "default_success_path")]
    pub success_path: String,

    /// Where unauthenticated users are sent
    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default)]
    pub reentrancy: ReentrancyPolicy,
}

fn default_success_path() -> String {
    "/dashboard".into()
}

fn default_login_path() -> String {
    "/login?redirect=pricing".into()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            success_path: default_success_path(),
            login_path: default_login_path(),
            reentrancy: ReentrancyPolicy::default(),
        }
    }
}

/// Observable initiator status
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Idle,
    Processing {
        price_id: String,
    },
}

impl CheckoutState {
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }

    /// Price currently in flight
    pub fn in_flight(&self) -> Option<&str> {
        match self {
            Self::Processing { price_id } => Some(price_id),
            Self::Idle => None,
        }
    }
}

/// Result of one `initiate` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Browser sent to the provider's hosted page
    Redirected { url: String },

    /// Browser sent to the login page, no remote call made
    AuthRequired,

    /// Remote call failed; the inline error is set
    Failed { message: String },

    /// Refused before any I/O
    Rejected { reason: String },
}

/// State of a plan's purchase button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseControl {
    Ready,
    /// This plan's checkout is in flight
    Processing,
    Disabled,
}

/// Button state for `plan` given the initiator's state
///
/// Plans without prices are never purchasable. While any checkout is in
/// flight every button is disabled and the in-flight one shows progress.
pub fn purchase_control(plan: &Plan, state: &CheckoutState) -> PurchaseControl {
    let Some(price) = plan.primary_price() else {
        return PurchaseControl::Disabled;
    };
    match state.in_flight() {
        Some(id) if id == price.id => PurchaseControl::Processing,
        Some(_) => PurchaseControl::Disabled,
        None => PurchaseControl::Ready,
    }
}

/// Starts checkout sessions for the signed-in user
pub struct CheckoutInitiator {
    backend: Rc<dyn CheckoutBackend>,
    auth: Rc<dyn AuthProvider>,
    notifier: Rc<dyn Notifier>,
    navigator: Rc<dyn Navigator>,
    config: CheckoutConfig,
    state: watch::Sender<CheckoutState>,
    last_error: watch::Sender<Option<String>>,
}

impl CheckoutInitiator {
    pub fn new(
        backend: Rc<dyn CheckoutBackend>,
        auth: Rc<dyn AuthProvider>,
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self::with_config(backend, auth, notifier, navigator, CheckoutConfig::default())
    }

    pub fn with_config(
        backend: Rc<dyn CheckoutBackend>,
        auth: Rc<dyn AuthProvider>,
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            backend,
            auth,
            notifier,
            navigator,
            config,
            state: watch::Sender::new(CheckoutState::Idle),
            last_error: watch::Sender::new(None),
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CheckoutState {
        self.state.borrow().clone()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// Inline error left by the last failed attempt
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// Watch the inline error
    pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        self.last_error.subscribe()
    }

    /// Clear the inline error (banner dismissed)
    pub fn dismiss_error(&self) {
        self.last_error.send_replace(None);
    }

    /// Purchase button state for `plan`
    pub fn purchase_control(&self, plan: &Plan) -> PurchaseControl {
        purchase_control(plan, &self.state.borrow())
    }

    /// Check out the plan's primary price
    pub async fn initiate_plan(&self, plan: &Plan) -> CheckoutOutcome {
        match plan.primary_price() {
            Some(price) => self.initiate(&price.id).await,
            None => {
                tracing::warn!(plan_id = %plan.id, "Checkout requested for a plan without prices");
                CheckoutOutcome::Rejected {
                    reason: "Plan has no price".into(),
                }
            }
        }
    }

    /// Start a hosted checkout for `price_id`
    pub async fn initiate(&self, price_id: &str) -> CheckoutOutcome {
        if price_id.trim().is_empty() {
            tracing::warn!("Checkout requested without a price id");
            return CheckoutOutcome::Rejected {
                reason: "Missing price id".into(),
            };
        }

        let Some(user) = self.auth.current_user() else {
            return self.require_sign_in();
        };

        let in_flight = self.state.borrow().in_flight().map(str::to_string);
        if let Some(current) = in_flight {
            match self.config.reentrancy {
                ReentrancyPolicy::RejectWhileProcessing => {
                    tracing::debug!(
                        in_flight = %current,
                        requested = %price_id,
                        "Checkout already processing"
                    );
                    return CheckoutOutcome::Rejected {
                        reason: "A checkout is already in progress".into(),
                    };
                }
                ReentrancyPolicy::Lenient => {
                    tracing::debug!(
                        in_flight = %current,
                        requested = %price_id,
                        "Starting overlapping checkout"
                    );
                }
            }
        }

        self.state.send_replace(CheckoutState::Processing {
            price_id: price_id.to_string(),
        });
        self.last_error.send_replace(None);

        let outcome = match self.create_session(price_id, &user).await {
            Ok(url) => {
                tracing::info!(price_id = %price_id, user_id = %user.id, "Redirecting to checkout");
                self.notifier.notify(Notice::info(
                    "Redirecting to checkout",
                    "You'll be redirected to Stripe to complete your purchase.",
                ));
                self.navigator.redirect(&url);
                CheckoutOutcome::Redirected { url }
            }
            Err(err) => self.fail(price_id, &err),
        };

        self.finish(price_id);
        outcome
    }

    /// Back to `Idle` unless a later call has taken over the in-flight marker
    fn finish(&self, price_id: &str) {
        self.state.send_if_modified(|state| {
            if state.in_flight() == Some(price_id) {
                *state = CheckoutState::Idle;
                true
            } else {
                false
            }
        });
    }

    fn require_sign_in(&self) -> CheckoutOutcome {
        tracing::info!("Checkout requires sign in");
        self.notifier.notify(Notice::info(
            "Authentication required",
            "Please sign in to subscribe to a plan.",
        ));
        self.navigator.redirect(&self.config.login_path);
        CheckoutOutcome::AuthRequired
    }

    async fn create_session(&self, price_id: &str, user: &User) -> Result<String> {
        let request = CheckoutSessionRequest {
            product_price_id: price_id.to_string(),
            success_url: format!("{}{}", self.navigator.origin(), self.config.success_path),
            customer_email: user.email.clone().unwrap_or_default(),
            metadata: CheckoutMetadata {
                user_id: user.id.clone(),
            },
        };

        let response = self.backend.create_checkout_session(&request).await?;
        response
            .redirect_url()
            .map(str::to_string)
            .ok_or(PricingError::MissingCheckoutUrl)
    }

    fn fail(&self, price_id: &str, err: &PricingError) -> CheckoutOutcome {
        tracing::error!(price_id = %price_id, error = %err, "Error creating checkout session");

        let message = CHECKOUT_FAILED_MESSAGE.to_string();
        self.last_error.send_replace(Some(message.clone()));
        self.notifier.notify(Notice::destructive(
            "Checkout failed",
            "There was an error creating your checkout session. Please try again.",
        ));
        CheckoutOutcome::Failed { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::capability::{CheckoutSessionResponse, NoticeKind};
    use crate::mock::{
        MockCheckoutBackend, RecordingNavigator, RecordingNotifier, StaticAuth,
    };
    use crate::plan::Price;

    struct Harness {
        backend: Rc<MockCheckoutBackend>,
        notifier: Rc<RecordingNotifier>,
        navigator: Rc<RecordingNavigator>,
        initiator: CheckoutInitiator,
    }

    fn harness(backend: MockCheckoutBackend, auth: StaticAuth, config: CheckoutConfig) -> Harness {
        let backend = Rc::new(backend);
        let notifier = Rc::new(RecordingNotifier::default());
        let navigator = Rc::new(RecordingNavigator::new("https://app.example"));
        let initiator = CheckoutInitiator::with_config(
            backend.clone(),
            Rc::new(auth),
            notifier.clone(),
            navigator.clone(),
            config,
        );
        Harness { backend, notifier, navigator, initiator }
    }

    fn signed_in() -> StaticAuth {
        StaticAuth::signed_in("user_42", Some("ada@example.com"))
    }

    fn plan_with_price(price_id: &str) -> Plan {
        let mut plan = Plan::new("prod_1", "Starter");
        plan.prices.push(Price {
            id: price_id.into(),
            price_amount: 1900,
            price_currency: "usd".into(),
            recurring_interval: None,
            amount_type: String::new(),
            price_type: String::new(),
            is_archived: false,
            product_id: "prod_1".into(),
            created_at: None,
            modified_at: None,
        });
        plan
    }

    #[tokio::test]
    async fn test_unauthenticated_redirects_to_login() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            StaticAuth::signed_out(),
            CheckoutConfig::default(),
        );

        let outcome = h.initiator.initiate("price_1").await;

        assert_eq!(outcome, CheckoutOutcome::AuthRequired);
        assert!(h.backend.requests().is_empty());
        assert_eq!(h.navigator.redirects(), ["/login?redirect=pricing"]);
        assert_eq!(h.notifier.notices()[0].title, "Authentication required");
        assert_eq!(h.initiator.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_success_navigates_once() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            CheckoutConfig::default(),
        );

        let outcome = h.initiator.initiate("price_1").await;

        assert_eq!(
            outcome,
            CheckoutOutcome::Redirected { url: "https://pay.example/abc".into() }
        );
        assert_eq!(h.navigator.redirects(), ["https://pay.example/abc"]);
        assert_eq!(h.initiator.last_error(), None);
        assert_eq!(h.notifier.notices()[0].title, "Redirecting to checkout");
    }

    #[tokio::test]
    async fn test_request_shape() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            CheckoutConfig::default(),
        );

        h.initiator.initiate("price_1").await;

        let requests = h.backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            CheckoutSessionRequest {
                product_price_id: "price_1".into(),
                success_url: "https://app.example/dashboard".into(),
                customer_email: "ada@example.com".into(),
                metadata: CheckoutMetadata { user_id: "user_42".into() },
            }
        );
    }

    #[tokio::test]
    async fn test_missing_email_sends_empty_string() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            StaticAuth::signed_in("user_7", None),
            CheckoutConfig::default(),
        );

        h.initiator.initiate("price_1").await;
        assert_eq!(h.backend.requests()[0].customer_email, "");
    }

    #[tokio::test]
    async fn test_service_error_resets_to_idle() {
        let h = harness(
            MockCheckoutBackend::failing(PricingError::Service {
                status: 500,
                message: Some("boom".into()),
            }),
            signed_in(),
            CheckoutConfig::default(),
        );

        let outcome = h.initiator.initiate("price_1").await;

        let CheckoutOutcome::Failed { message } = outcome else {
            panic!("expected a failed checkout");
        };
        assert!(!message.is_empty());
        assert_eq!(h.initiator.state(), CheckoutState::Idle);
        assert_eq!(h.initiator.last_error(), Some(CHECKOUT_FAILED_MESSAGE.into()));
        assert!(h.navigator.redirects().is_empty());

        let notices = h.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Destructive);
        assert_eq!(notices[0].title, "Checkout failed");
    }

    #[tokio::test]
    async fn test_missing_url_is_a_failure() {
        for response in [
            CheckoutSessionResponse { url: None },
            CheckoutSessionResponse { url: Some("  ".into()) },
        ] {
            let h = harness(
                MockCheckoutBackend::responding(response),
                signed_in(),
                CheckoutConfig::default(),
            );

            let outcome = h.initiator.initiate("price_1").await;

            assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
            assert!(h.navigator.redirects().is_empty());
            assert_eq!(h.initiator.state(), CheckoutState::Idle);
            assert!(h.initiator.last_error().is_some());
        }
    }

    #[tokio::test]
    async fn test_retry_after_failure_clears_error() {
        let h = harness(
            MockCheckoutBackend::failing(PricingError::Transport("offline".into())),
            signed_in(),
            CheckoutConfig::default(),
        );
        h.initiator.initiate("price_1").await;
        assert!(h.initiator.last_error().is_some());

        h.backend.respond_with(CheckoutSessionResponse {
            url: Some("https://pay.example/retry".into()),
        });
        let outcome = h.initiator.initiate("price_1").await;

        assert!(matches!(outcome, CheckoutOutcome::Redirected { .. }));
        assert_eq!(h.initiator.last_error(), None);
        assert_eq!(h.backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_price_is_rejected() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            CheckoutConfig::default(),
        );

        let outcome = h.initiator.initiate("").await;

        assert!(matches!(outcome, CheckoutOutcome::Rejected { .. }));
        assert!(h.backend.requests().is_empty());
        assert!(h.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_plan_without_prices_is_not_purchasable() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            CheckoutConfig::default(),
        );
        let plan = Plan::new("prod_free", "Free");

        assert_eq!(h.initiator.purchase_control(&plan), PurchaseControl::Disabled);
        assert!(matches!(
            h.initiator.initiate_plan(&plan).await,
            CheckoutOutcome::Rejected { .. }
        ));
        assert!(h.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_initiate_plan_uses_primary_price() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            CheckoutConfig::default(),
        );

        h.initiator.initiate_plan(&plan_with_price("price_primary")).await;
        assert_eq!(h.backend.requests()[0].product_price_id, "price_primary");
    }

    #[test]
    fn test_purchase_control_states() {
        let plan = plan_with_price("price_a");
        let other = plan_with_price("price_b");
        let processing = CheckoutState::Processing { price_id: "price_a".into() };

        assert_eq!(purchase_control(&plan, &CheckoutState::Idle), PurchaseControl::Ready);
        assert_eq!(purchase_control(&plan, &processing), PurchaseControl::Processing);
        assert_eq!(purchase_control(&other, &processing), PurchaseControl::Disabled);
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_overlap() {
        let config = CheckoutConfig {
            reentrancy: ReentrancyPolicy::RejectWhileProcessing,
            ..CheckoutConfig::default()
        };
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            config,
        );
        h.initiator.state.send_replace(CheckoutState::Processing { price_id: "price_a".into() });

        let outcome = h.initiator.initiate("price_b").await;

        assert!(matches!(outcome, CheckoutOutcome::Rejected { .. }));
        assert!(h.backend.requests().is_empty());
        assert_eq!(h.initiator.state().in_flight(), Some("price_a"));
    }

    #[tokio::test]
    async fn test_lenient_policy_lets_overlap_through() {
        let h = harness(
            MockCheckoutBackend::redirecting("https://pay.example/abc"),
            signed_in(),
            CheckoutConfig::default(),
        );
        h.initiator.state.send_replace(CheckoutState::Processing { price_id: "price_a".into() });

        let outcome = h.initiator.initiate("price_b").await;

        assert!(matches!(outcome, CheckoutOutcome::Redirected { .. }));
        assert_eq!(h.backend.requests().len(), 1);
    }

    /// Backend that holds each request until its price's gate opens
    struct GatedBackend {
        gates: RefCell<Vec<(String, oneshot::Receiver<()>)>>,
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl CheckoutBackend for GatedBackend {
        async fn create_checkout_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> Result<CheckoutSessionResponse> {
            self.calls.set(self.calls.get() + 1);
            let gate = {
                let mut gates = self.gates.borrow_mut();
                let index = gates
                    .iter()
                    .position(|(id, _)| *id == request.product_price_id)
                    .unwrap();
                gates.remove(index).1
            };
            gate.await
                .map_err(|_| PricingError::Transport("gate dropped".into()))?;
            Ok(CheckoutSessionResponse {
                url: Some(format!("https://pay.example/{}", request.product_price_id)),
            })
        }
    }

    #[tokio::test]
    async fn test_earlier_overlap_does_not_clear_later_checkout() {
        let (open_a, gate_a) = oneshot::channel();
        let (open_b, gate_b) = oneshot::channel();
        let backend = Rc::new(GatedBackend {
            gates: RefCell::new(vec![("price_a".into(), gate_a), ("price_b".into(), gate_b)]),
            calls: Cell::new(0),
        });
        let navigator = Rc::new(RecordingNavigator::new("https://app.example"));
        let initiator = CheckoutInitiator::new(
            backend.clone(),
            Rc::new(signed_in()),
            Rc::new(RecordingNotifier::default()),
            navigator.clone(),
        );

        let driver = async {
            while backend.calls.get() < 2 {
                tokio::task::yield_now().await;
            }
            let latest = initiator.state().in_flight().unwrap().to_string();
            let (first_done, last_done) = if latest == "price_b" {
                (open_a, open_b)
            } else {
                (open_b, open_a)
            };

            first_done.send(()).unwrap();
            while navigator.redirects().is_empty() {
                tokio::task::yield_now().await;
            }
            assert_eq!(initiator.state().in_flight(), Some(latest.as_str()));
            last_done.send(()).unwrap();
        };

        let (a, b, ()) = tokio::join!(
            initiator.initiate("price_a"),
            initiator.initiate("price_b"),
            driver
        );

        assert!(matches!(a, CheckoutOutcome::Redirected { .. }));
        assert!(matches!(b, CheckoutOutcome::Redirected { .. }));
        assert_eq!(initiator.state(), CheckoutState::Idle);
        assert_eq!(navigator.redirects().len(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let h = harness(
            MockCheckoutBackend::responding(CheckoutSessionResponse::default()),
            signed_in(),
            CheckoutConfig::default(),
        );
        h.initiator.initiate("price_1").await;
        assert!(h.initiator.last_error().is_some());

        h.initiator.dismiss_error();
        assert_eq!(h.initiator.last_error(), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.success_path, "/dashboard");
        assert_eq!(config.login_path, "/login?redirect=pricing");
        assert_eq!(config.reentrancy, ReentrancyPolicy::Lenient);
    }
}
