//! Functions Configuration

use pricing_core::{PricingError, Result};

/// Default name of the plan listing function
pub const LIST_PLANS_FUNCTION: &str = "supabase-functions-get-plans";

/// Default name of the checkout session function
pub const CREATE_CHECKOUT_FUNCTION: &str = "supabase-functions-create-checkout";

/// Where the hosted functions live and how to call them
#[derive(Clone, Debug)]
pub struct FunctionsConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub base_url: String,

    /// Public anon key sent as `apikey` and bearer token
    pub anon_key: String,

    pub list_plans_function: String,
    pub create_checkout_function: String,
}

impl FunctionsConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            list_plans_function: LIST_PLANS_FUNCTION.into(),
            create_checkout_function: CREATE_CHECKOUT_FUNCTION.into(),
        }
    }

    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` (plus optional function
    /// name overrides) from the process environment
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| PricingError::Config("SUPABASE_URL not set".into()))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| PricingError::Config("SUPABASE_ANON_KEY not set".into()))?;

        let mut config = Self::new(base_url, anon_key);
        if let Ok(name) = std::env::var("LIST_PLANS_FUNCTION") {
            config.list_plans_function = name;
        }
        if let Ok(name) = std::env::var("CREATE_CHECKOUT_FUNCTION") {
            config.create_checkout_function = name;
        }
        Ok(config)
    }

    /// Values baked in at compile time (the WASM bundle has no environment)
    pub fn from_build_env() -> Result<Self> {
        let base_url = option_env!("SUPABASE_URL")
            .ok_or_else(|| PricingError::Config("SUPABASE_URL not set at build time".into()))?;
        let anon_key = option_env!("SUPABASE_ANON_KEY")
            .ok_or_else(|| PricingError::Config("SUPABASE_ANON_KEY not set at build time".into()))?;
        Ok(Self::new(base_url, anon_key))
    }

    /// `{base}/functions/v1/{name}`
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url.trim_end_matches('/'), name)
    }

    /// Project ref: the first host label of the base URL
    pub fn project_ref(&self) -> Option<&str> {
        let host = self.base_url.split("://").nth(1).unwrap_or(&self.base_url);
        host.split(['.', ':', '/'])
            .next()
            .filter(|label| !label.is_empty())
    }
}
