pub mod app_config;
pub mod config;
pub mod error;
pub mod history;
pub mod offers;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use history::{pivot, pivot_table, pivot_table_in, PivotRow, PriceTable};
pub use offers::{best_offer, compare_offers, rank_offers, RankedOffer};
pub use types::{
    Address, BestOfferSummary, City, Offer, PriceHistoryRecord, Product, SuggestionItem,
    Supermarket,
};
