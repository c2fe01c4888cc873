//! Typed HTTP client for the price-comparison backend.

pub mod account;
pub mod catalog;
pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, GENERIC_FAILURE_MESSAGE};
pub use types::{
    Ack, Alert, AlertProduct, Credentials, EntityKind, FavoriteIds, FavoriteProduct, Favorites,
    HistoryResponse, NewAlert, NewOffer, Registration, TokenResponse, User,
};
