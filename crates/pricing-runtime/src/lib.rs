//! # pricing-runtime
//!
//! HTTP clients for the hosted functions behind the pricing page.
//!
//! ## Functions
//!
//! - **list plans** (`supabase-functions-get-plans`): plan catalog, bare array
//!   or `{ items }` envelope
//! - **create checkout** (`supabase-functions-create-checkout`): returns the
//!   provider's hosted checkout URL
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use pricing_core::PlanCatalogLoader;
//! use pricing_runtime::{FunctionsClient, FunctionsConfig};
//!
//! let client = Rc::new(FunctionsClient::new(FunctionsConfig::from_env()?));
//! let loader = PlanCatalogLoader::new(client.clone());
//! let plans = loader.load().await?;
//! ```

pub mod config;
pub mod functions;

pub use config::FunctionsConfig;
pub use functions::FunctionsClient;
