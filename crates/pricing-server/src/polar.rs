//! Polar Products API
//!
//! Lists an organization's active products and reshapes them into the
//! camelCase plan records the pricing page consumes.

use chrono::{DateTime, Utc};
use pricing_core::{Metadata, Plan, Price, RecurringInterval};
use serde::{Deserialize, Serialize};

use crate::config::PolarConfig;
use crate::error::ServerError;

/// Products per page requested from Polar
const PAGE_LIMIT: u32 = 100;

/// Polar API client
pub struct PolarClient {
    http: reqwest::Client,
    config: PolarConfig,
}

impl PolarClient {
    pub fn new(config: PolarConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.config.organization_id
    }

    /// Non-archived products of the configured organization
    pub async fn list_products(&self) -> Result<ProductPage, ServerError> {
        let url = format!("{}/v1/products/", self.config.base_url.trim_end_matches('/'));
        let limit = PAGE_LIMIT.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[
                ("organization_id", self.config.organization_id.as_str()),
                ("is_archived", "false"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// One page of products as Polar returns it
#[derive(Debug, Deserialize)]
pub struct ProductPage {
    pub items: Vec<PolarProduct>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Pagination {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub max_page: u64,
}

#[derive(Debug, Deserialize)]
pub struct PolarProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub prices: Vec<PolarPrice>,
    #[serde(default)]
    pub benefits: Vec<serde_json::Value>,
    #[serde(default)]
    pub medias: Vec<serde_json::Value>,
    #[serde(default)]
    pub attached_custom_fields: Vec<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PolarPrice {
    pub id: String,
    #[serde(default)]
    pub amount_type: Option<String>,
    #[serde(rename = "type", default)]
    pub price_type: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,
    #[serde(default)]
    pub price_currency: Option<String>,
    /// Absent for free and pay-what-you-want prices
    #[serde(default)]
    pub price_amount: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<PolarPrice> for Price {
    fn from(p: PolarPrice) -> Self {
        Self {
            id: p.id,
            price_amount: p.price_amount.unwrap_or(0),
            price_currency: p.price_currency.unwrap_or_default(),
            recurring_interval: p.recurring_interval,
            amount_type: p.amount_type.unwrap_or_default(),
            price_type: p.price_type.unwrap_or_default(),
            is_archived: p.is_archived,
            product_id: p.product_id,
            created_at: p.created_at,
            modified_at: p.modified_at,
        }
    }
}

impl From<PolarProduct> for Plan {
    fn from(p: PolarProduct) -> Self {
        let mut plan = Self::new(p.id, p.name);
        plan.description = p.description.unwrap_or_default();
        plan.is_recurring = p.is_recurring;
        plan.recurring_interval = p.recurring_interval;
        plan.is_archived = p.is_archived;
        plan.organization_id = p.organization_id;
        plan.metadata = p.metadata;
        plan.prices = p.prices.into_iter().map(Price::from).collect();
        plan.benefits = p.benefits;
        plan.medias = p.medias;
        plan.attached_custom_fields = p.attached_custom_fields;
        plan.created_at = p.created_at;
        plan.modified_at = p.modified_at;
        plan
    }
}

/// Envelope returned by the get-plans function
#[derive(Debug, Serialize)]
pub struct PlanPage {
    pub items: Vec<Plan>,
    pub pagination: Pagination,
}

impl From<ProductPage> for PlanPage {
    fn from(page: ProductPage) -> Self {
        Self {
            items: page.items.into_iter().map(Plan::from).collect(),
            pagination: page.pagination,
        }
    }
}
