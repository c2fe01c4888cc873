//! Request and response shapes specific to the backend API.
//!
//! Catalog entities (cities, products, offers, …) live in `pricewise-core`;
//! this module holds envelopes and the identity/favorites/alerts payloads.

use chrono::{DateTime, Utc};
use pricewise_core::{PriceHistoryRecord, Product, Supermarket};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response of `GET /products/{id}/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub product: Product,
    #[serde(default)]
    pub history: Vec<PriceHistoryRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteIds {
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub supermarkets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub reputation_score: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub favorites: FavoriteIds,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Issued by login and register. `access_token` is opaque to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// What a favorite refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Supermarket,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Supermarket => "supermarket",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" => Ok(EntityKind::Product),
            "supermarket" => Ok(EntityKind::Supermarket),
            other => Err(format!("unknown favorite kind \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub current_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Favorites {
    #[serde(default)]
    pub products: Vec<FavoriteProduct>,
    #[serde(default)]
    pub supermarkets: Vec<Supermarket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertProduct {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A price alert: notify when the product drops to `target_price`.
#[derive(Debug, Clone, Deserialize)]
pub struct Alert {
    pub id: String,
    pub product_id: String,
    pub target_price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub product: Option<AlertProduct>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAlert {
    pub product_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
}

/// A crowdsourced price report.
#[derive(Debug, Clone, Serialize)]
pub struct NewOffer {
    pub product_id: String,
    pub supermarket_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub is_promotion: bool,
}

/// `{"message": "..."}` acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}
