//! Domain types shared by the API client, the session layer and the CLI.
//!
//! Field names follow the backend's JSON so the same structs serve as wire
//! types. Optional backend fields default rather than fail deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A city the user can scope searches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state_code {
            Some(code) => write!(f, "{} - {}", self.name, code),
            None => write!(f, "{} - {}", self.name, self.state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub display_name: String,
    pub brand: String,
    pub size: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub canonical_name: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub ean: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub neighborhood: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

/// A vendor. Embedded in offers and best-offer summaries with only a subset of
/// fields populated, so everything past `name` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supermarket {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// A price observation for one product at one supermarket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub product_id: String,
    pub supermarket_id: String,
    #[serde(default)]
    pub supermarket: Option<Supermarket>,
    pub price: Decimal,
    #[serde(default)]
    pub is_promotion: bool,
    /// Age of the observation in hours. Unknown ages rank as stalest.
    #[serde(default)]
    pub hours_ago: Option<u32>,
    #[serde(rename = "collected_at", alias = "observed_at")]
    pub observed_at: DateTime<Utc>,
    #[serde(default = "default_stock_status")]
    pub stock_status: String,
}

fn default_stock_status() -> String {
    "available".to_string()
}

/// Cheapest-offer digest the search collaborator attaches to each result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOfferSummary {
    pub price: Decimal,
    #[serde(default)]
    pub is_promotion: bool,
    #[serde(default)]
    pub hours_ago: Option<u32>,
    pub supermarket: Supermarket,
}

/// One search suggestion: a product plus its best offer in the queried city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub best_offer: Option<BestOfferSummary>,
}

/// A flat, vendor-tagged price point from the history collaborator.
///
/// `date` is kept as the raw string the backend sent (an ISO-8601 timestamp
/// in practice); [`crate::history`] derives the day key from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryRecord {
    pub date: String,
    pub supermarket_name: String,
    pub price: Decimal,
    #[serde(default)]
    pub supermarket_id: Option<String>,
}

impl PriceHistoryRecord {
    pub fn new(date: impl Into<String>, supermarket_name: impl Into<String>, price: Decimal) -> Self {
        Self {
            date: date.into(),
            supermarket_name: supermarket_name.into(),
            price,
            supermarket_id: None,
        }
    }
}
