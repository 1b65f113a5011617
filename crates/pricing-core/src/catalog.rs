//! Plan Catalog Loader
//!
//! Fetches plans once per view activation, normalizes the payload shape,
//! flags highlighted plans and sorts them for display.
//!
//! ```text
//! NotStarted ──load()──▶ Loading ──┬──▶ Loaded(plans)
//!                                  └──▶ Failed(message)
//! ```

use std::rc::Rc;

use serde_json::Value;
use tokio::sync::watch;

use crate::capability::PlanSource;
use crate::error::{LOAD_FALLBACK_MESSAGE, PricingError, Result};
use crate::plan::{Plan, sort_for_display};

/// Observable loader status
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CatalogState {
    #[default]
    NotStarted,
    Loading,
    Loaded(Vec<Plan>),
    Failed(String),
}

impl CatalogState {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Plans to render (empty unless loaded)
    pub fn plans(&self) -> &[Plan] {
        match self {
            Self::Loaded(plans) => plans,
            _ => &[],
        }
    }

    /// Banner text for a failed load
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Loads the plan catalog from a [`PlanSource`]
pub struct PlanCatalogLoader {
    source: Rc<dyn PlanSource>,
    state: watch::Sender<CatalogState>,
}

impl PlanCatalogLoader {
    pub fn new(source: Rc<dyn PlanSource>) -> Self {
        Self {
            source,
            state: watch::Sender::new(CatalogState::NotStarted),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Fetch, normalize and sort the catalog
    ///
    /// Meant to run once per activation. A second call while one is in
    /// flight is not rejected; the later completion wins.
    pub async fn load(&self) -> Result<Vec<Plan>> {
        if self.state.borrow().is_loading() {
            tracing::debug!("Plan catalog load already in flight");
        }
        self.state.send_replace(CatalogState::Loading);

        match self.fetch().await {
            Ok(plans) => {
                tracing::info!(count = plans.len(), "Loaded pricing plans");
                self.state.send_replace(CatalogState::Loaded(plans.clone()));
                Ok(plans)
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load pricing plans");
                let message = load_failure_message(&err);
                self.state.send_replace(CatalogState::Failed(message.clone()));
                Err(PricingError::LoadFailure(message))
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Plan>> {
        let payload = self.source.list_plans().await?;
        normalize_payload(payload)
    }
}

/// Banner text for a failed load: the service's message, else a fallback
fn load_failure_message(err: &PricingError) -> String {
    match err {
        PricingError::NoData => err.user_message(),
        other => other
            .service_message()
            .map_or_else(|| LOAD_FALLBACK_MESSAGE.to_string(), str::to_string),
    }
}

/// Turn a raw plan-service payload into a display-ready plan list
///
/// Accepts a bare array or an object with an `items` array. Any other shape
/// yields an empty list, and records that do not decode are skipped.
pub fn normalize_payload(payload: Option<Value>) -> Result<Vec<Plan>> {
    let records = match payload {
        None | Some(Value::Null) => return Err(PricingError::NoData),
        Some(Value::String(s)) if s.trim().is_empty() => return Err(PricingError::NoData),
        Some(Value::Array(records)) => records,
        Some(Value::Object(mut envelope)) => match envelope.remove("items") {
            Some(Value::Array(records)) => records,
            _ => {
                tracing::warn!("Plan payload object has no items array; treating as empty");
                Vec::new()
            }
        },
        Some(other) => {
            tracing::warn!(payload = %other, "Unexpected plan payload shape; treating as empty");
            Vec::new()
        }
    };

    let mut plans: Vec<Plan> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Plan>(record) {
            Ok(plan) => Some(plan),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed plan record");
                None
            }
        })
        .collect();

    for plan in &mut plans {
        plan.refresh_highlight();
    }
    sort_for_display(&mut plans);

    Ok(plans)
}
