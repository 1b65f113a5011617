//! Hosted Functions Client
//!
//! Invokes edge functions by name (`POST {base}/functions/v1/{name}`) and
//! implements the core's `PlanSource` and `CheckoutBackend` on top.

use async_trait::async_trait;
use pricing_core::capability::CUSTOMER_EMAIL_HEADER;
use pricing_core::{
    CheckoutBackend, CheckoutSessionRequest, CheckoutSessionResponse, PlanSource, PricingError,
    Result,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::config::FunctionsConfig;

/// Edge function client
#[derive(Clone)]
pub struct FunctionsClient {
    http: reqwest::Client,
    config: FunctionsConfig,
}

impl FunctionsClient {
    pub fn new(config: FunctionsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(FunctionsConfig::from_env()?))
    }

    pub fn config(&self) -> &FunctionsConfig {
        &self.config
    }

    /// Invoke a function and decode its JSON reply
    ///
    /// Returns `Ok(None)` for a successful call with an empty body.
    pub async fn invoke(
        &self,
        name: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> Result<Option<Value>> {
        let url = self.config.function_url(name);
        tracing::debug!(function = %name, "Invoking function");

        let mut request = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.anon_key))
            .header("apikey", &self.config.anon_key);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PricingError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PricingError::Transport(e.to_string()))?;

        let result = parse_invoke_response(status, &text);
        if let Err(ref e) = result {
            tracing::warn!(function = %name, status, error = %e, "Function call failed");
        }
        result
    }
}

#[async_trait(?Send)]
impl PlanSource for FunctionsClient {
    async fn list_plans(&self) -> Result<Option<Value>> {
        self.invoke(&self.config.list_plans_function, None, &[]).await
    }
}

#[async_trait(?Send)]
impl CheckoutBackend for FunctionsClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse> {
        let body = serde_json::to_value(request)?;
        let headers = [(CUSTOMER_EMAIL_HEADER, request.customer_email.as_str())];

        match self
            .invoke(&self.config.create_checkout_function, Some(&body), &headers)
            .await?
        {
            Some(reply) => Ok(serde_json::from_value(reply)?),
            None => Ok(CheckoutSessionResponse::default()),
        }
    }
}

/// Map a raw function reply to a payload or a service error
pub fn parse_invoke_response(status: u16, body: &str) -> Result<Option<Value>> {
    if !(200..300).contains(&status) {
        return Err(PricingError::Service {
            status,
            message: error_message(body),
        });
    }

    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

/// Pull a human-readable message out of a JSON error body
///
/// Non-JSON bodies (proxy error pages and the like) are logged, never
/// surfaced.
fn error_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let text = body.trim();
        if !text.is_empty() {
            tracing::warn!(body = %text, "Function error body is not JSON");
        }
        return None;
    };

    let candidates = [
        value.get("error").and_then(Value::as_str),
        value.pointer("/error/message").and_then(Value::as_str),
        value.get("message").and_then(Value::as_str),
        value.get("msg").and_then(Value::as_str),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|m| !m.is_empty())
        .map(str::to_string)
}
