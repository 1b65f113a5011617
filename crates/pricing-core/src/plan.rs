//! Plan Catalog Model
//!
//! Plans and prices as the plan service delivers them (camelCase JSON), plus
//! the display ordering and the derived "highlighted" flag.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::money::format_currency;

/// Open key-value map attached to a plan
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key that overrides price-based ordering
pub const TIER_KEY: &str = "tier";

/// Name fragment that marks a plan for visual emphasis
const HIGHLIGHT_MARKER: &str = "growth";

/// Billing interval unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInterval {
    Day,
    Week,
    Month,
    Year,
    #[serde(other)]
    Other,
}

impl RecurringInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Other => "period",
        }
    }

    /// "Monthly", "Yearly", ...
    pub const fn adjective(self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
            Self::Year => "Yearly",
            Self::Other => "Recurring",
        }
    }
}

/// A specific amount/currency/interval under a plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub id: String,

    /// Amount in minor currency units (cents)
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_amount: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price_currency: String,

    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub amount_type: String,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub price_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_archived: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub product_id: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Price {
    /// Currency code, assuming USD when the service leaves it blank
    pub fn currency(&self) -> &str {
        if self.price_currency.is_empty() {
            "usd"
        } else {
            &self.price_currency
        }
    }

    /// Formatted amount, e.g. `$19.99`
    pub fn formatted_amount(&self) -> String {
        format_currency(self.price_amount, self.currency())
    }
}

/// A purchasable subscription or one-time offering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Newline-delimited feature bullets
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_recurring: bool,

    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_archived: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,

    #[serde(default, deserialize_with = "null_as_default")]
    pub prices: Vec<Price>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub benefits: Vec<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub medias: Vec<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attached_custom_fields: Vec<serde_json::Value>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// Derived at load time from the name, never on the wire
    #[serde(skip)]
    pub highlighted: bool,
}

impl Plan {
    /// Create a plan with only an id and a name (everything else empty)
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut plan = Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            is_recurring: false,
            recurring_interval: None,
            is_archived: false,
            organization_id: String::new(),
            metadata: Metadata::new(),
            prices: Vec::new(),
            benefits: Vec::new(),
            medias: Vec::new(),
            attached_custom_fields: Vec::new(),
            created_at: None,
            modified_at: None,
            highlighted: false,
        };
        plan.refresh_highlight();
        plan
    }

    /// The price shown and sold for this plan
    pub fn primary_price(&self) -> Option<&Price> {
        self.prices.first()
    }

    /// Plans without prices are displayed but cannot be bought
    pub fn is_purchasable(&self) -> bool {
        self.primary_price().is_some()
    }

    /// Numeric `metadata.tier`, if present
    ///
    /// Accepts JSON numbers and numeric strings; anything else counts as no tier.
    pub fn tier(&self) -> Option<f64> {
        let tier = match self.metadata.get(TIER_KEY)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        tier.filter(|t| t.is_finite())
    }

    /// Amount used for price-based ordering (0 without prices)
    pub fn sort_amount(&self) -> i64 {
        self.primary_price().map_or(0, |p| p.price_amount)
    }

    /// Recompute `highlighted` from the current name
    pub fn refresh_highlight(&mut self) {
        self.highlighted = is_highlight_name(&self.name);
    }

    /// Name to render, falling back to "Basic"
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Basic"
        } else {
            &self.name
        }
    }

    /// "Monthly" style cadence, or "One-time"
    pub fn cadence_label(&self) -> &'static str {
        match (self.is_recurring, self.recurring_interval) {
            (true, Some(interval)) => interval.adjective(),
            (true, None) => RecurringInterval::Other.adjective(),
            (false, _) => "One-time",
        }
    }

    /// Formatted primary price and its per-interval suffix, e.g. `("$19.99", "/month")`
    pub fn price_label(&self) -> Option<(String, String)> {
        let price = self.primary_price()?;
        let suffix = price
            .recurring_interval
            .or(self.recurring_interval)
            .map(|i| format!("/{}", i.as_str()))
            .unwrap_or_default();
        Some((price.formatted_amount(), suffix))
    }

    /// Feature bullets from the description
    pub fn feature_lines(&self) -> impl Iterator<Item = &str> {
        self.description
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// True when the name contains "growth" in any case
pub fn is_highlight_name(name: &str) -> bool {
    name.to_lowercase().contains(HIGHLIGHT_MARKER)
}

/// Pairwise display order
///
/// By tier when both plans carry one, otherwise by primary price amount.
pub fn display_order(a: &Plan, b: &Plan) -> Ordering {
    match (a.tier(), b.tier()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.sort_amount().cmp(&b.sort_amount()),
    }
}

/// Stable in-place sort by [`display_order`]
///
/// `display_order` is not transitive over a mix of tiered and untiered plans,
/// so this uses insertion sort rather than `slice::sort_by`, which may panic
/// on an inconsistent order. Catalogs are a handful of plans.
pub fn sort_for_display(plans: &mut [Plan]) {
    for i in 1..plans.len() {
        let mut j = i;
        while j > 0 && display_order(&plans[j - 1], &plans[j]) == Ordering::Greater {
            plans.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
