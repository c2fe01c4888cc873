//! Client-side session state: the selected city, incremental search
//! suggestions, product page loading and the stored auth token.

pub mod auth;
pub mod city;
pub mod error;
pub mod product;
pub mod source;
pub mod store;
pub mod suggest;

pub use auth::AuthSession;
pub use city::CitySelection;
pub use error::StoreError;
pub use product::{ProductLoader, ProductView};
pub use source::{ProductSource, SuggestionSource};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use suggest::{SuggestionEngine, SuggestionState};
