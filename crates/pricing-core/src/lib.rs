//! # pricing-core
//!
//! Plan catalog loading and checkout orchestration for the pricing page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Pricing page                           │
//! │  ┌───────────────────┐            ┌────────────────────────┐  │
//! │  │ PlanCatalogLoader │            │   CheckoutInitiator    │  │
//! │  └─────────┬─────────┘            └───┬──────┬──────┬──────┘  │
//! │            │                          │      │      │         │
//! │      PlanSource            CheckoutBackend  Auth  Notifier    │
//! │                                                   Navigator   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both components receive their collaborators as `Rc<dyn Trait>`, so the
//! web front-end plugs in the HTTP client and browser adapters while tests
//! plug in the mocks from [`mock`].

pub mod capability;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod mock;
pub mod money;
pub mod plan;

pub use capability::{
    AuthProvider, CheckoutBackend, CheckoutSessionRequest, CheckoutSessionResponse, Navigator,
    Notice, NoticeKind, Notifier, PlanSource, User,
};
pub use catalog::{CatalogState, PlanCatalogLoader};
pub use checkout::{
    CheckoutConfig, CheckoutInitiator, CheckoutOutcome, CheckoutState, PurchaseControl,
    ReentrancyPolicy,
};
pub use error::{PricingError, Result};
pub use money::format_currency;
pub use plan::{Metadata, Plan, Price, RecurringInterval};
