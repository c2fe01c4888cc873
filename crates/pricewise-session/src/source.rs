//! Collaborator seams used by the suggestion engine and the product loader.
//!
//! [`ApiClient`] implements both; tests substitute in-memory fakes.

use std::future::Future;
use std::sync::Arc;

use pricewise_api::{ApiClient, ApiError};
use pricewise_core::{Offer, PriceHistoryRecord, Product, SuggestionItem};

/// City-scoped product search.
pub trait SuggestionSource: Send + Sync {
    fn search(
        &self,
        text: &str,
        city_id: &str,
    ) -> impl Future<Output = Result<Vec<SuggestionItem>, ApiError>> + Send;
}

/// Data behind a product page.
pub trait ProductSource: Send + Sync {
    fn product(&self, product_id: &str) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn offers(
        &self,
        product_id: &str,
        city_id: &str,
    ) -> impl Future<Output = Result<Vec<Offer>, ApiError>> + Send;

    fn history(
        &self,
        product_id: &str,
        city_id: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<PriceHistoryRecord>, ApiError>> + Send;
}

impl SuggestionSource for ApiClient {
    async fn search(&self, text: &str, city_id: &str) -> Result<Vec<SuggestionItem>, ApiError> {
        self.search_products(text, city_id).await
    }
}

impl ProductSource for ApiClient {
    async fn product(&self, product_id: &str) -> Result<Product, ApiError> {
        self.get_product(product_id).await
    }

    async fn offers(&self, product_id: &str, city_id: &str) -> Result<Vec<Offer>, ApiError> {
        self.get_offers(product_id, city_id).await
    }

    async fn history(
        &self,
        product_id: &str,
        city_id: &str,
        days: u32,
    ) -> Result<Vec<PriceHistoryRecord>, ApiError> {
        Ok(self.get_history(product_id, city_id, days).await?.history)
    }
}

impl<T: SuggestionSource> SuggestionSource for Arc<T> {
    fn search(
        &self,
        text: &str,
        city_id: &str,
    ) -> impl Future<Output = Result<Vec<SuggestionItem>, ApiError>> + Send {
        T::search(self, text, city_id)
    }
}

impl<T: ProductSource> ProductSource for Arc<T> {
    fn product(&self, product_id: &str) -> impl Future<Output = Result<Product, ApiError>> + Send {
        T::product(self, product_id)
    }

    fn offers(
        &self,
        product_id: &str,
        city_id: &str,
    ) -> impl Future<Output = Result<Vec<Offer>, ApiError>> + Send {
        T::offers(self, product_id, city_id)
    }

    fn history(
        &self,
        product_id: &str,
        city_id: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<PriceHistoryRecord>, ApiError>> + Send {
        T::history(self, product_id, city_id, days)
    }
}
