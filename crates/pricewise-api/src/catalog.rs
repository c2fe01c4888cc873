//! Catalog endpoints: cities, products, supermarkets, offers, price history.

use pricewise_core::{City, Offer, Product, SuggestionItem, Supermarket};
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{HistoryResponse, NewOffer};

impl ApiClient {
    /// Lists active cities, optionally filtered by a name fragment.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Status`] / [`ApiError::Rejected`] on non-2xx responses.
    /// - [`ApiError::Deserialize`] if the body does not match the expected shape.
    pub async fn list_cities(&self, search: Option<&str>) -> Result<Vec<City>, ApiError> {
        let query: Vec<(&str, &str)> = search
            .filter(|s| !s.trim().is_empty())
            .map(|s| vec![("search", s)])
            .unwrap_or_default();
        let url = self.endpoint(&["cities"], &query);
        self.get_json(url).await
    }

    /// Fetches a city by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id; otherwise as [`ApiClient::list_cities`].
    pub async fn get_city(&self, city_id: &str) -> Result<City, ApiError> {
        let url = self.endpoint(&["cities", city_id], &[]);
        self.get_json(url).await
    }

    /// Searches products by free text within a city. Each result carries the
    /// cheapest recent offer in that city, if any.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_cities`].
    pub async fn search_products(
        &self,
        text: &str,
        city_id: &str,
    ) -> Result<Vec<SuggestionItem>, ApiError> {
        let url = self.endpoint(&["products", "search"], &[("q", text), ("city_id", city_id)]);
        self.get_json(url).await
    }

    /// Fetches a product by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id; otherwise as [`ApiClient::list_cities`].
    pub async fn get_product(&self, product_id: &str) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", product_id], &[]);
        self.get_json(url).await
    }

    /// Fetches flat price observations for a product in a city over the last
    /// `days` days.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown product; otherwise as
    /// [`ApiClient::list_cities`].
    pub async fn get_history(
        &self,
        product_id: &str,
        city_id: &str,
        days: u32,
    ) -> Result<HistoryResponse, ApiError> {
        let days = days.to_string();
        let url = self.endpoint(
            &["products", product_id, "history"],
            &[("city_id", city_id), ("days", &days)],
        );
        self.get_json(url).await
    }

    /// Lists recent offers for a product in a city.
    ///
    /// The backend sorts by price but leaves ties unspecified; rank with
    /// [`pricewise_core::rank_offers`] before trusting index 0.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_cities`].
    pub async fn get_offers(&self, product_id: &str, city_id: &str) -> Result<Vec<Offer>, ApiError> {
        let url = self.endpoint(
            &["offers"],
            &[("product_id", product_id), ("city_id", city_id)],
        );
        self.get_json(url).await
    }

    /// Reports a price seen in store. Requires a bearer token.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthenticated`] when no token is set.
    /// - [`ApiError::NotFound`] if the product or supermarket does not exist.
    /// - Otherwise as [`ApiClient::list_cities`].
    pub async fn submit_offer(&self, offer: &NewOffer) -> Result<Offer, ApiError> {
        let url = self.endpoint(&["offers"], &[]);
        self.authed_json(Method::POST, url, Some(offer)).await
    }

    /// Lists supermarkets, optionally restricted to one city.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::list_cities`].
    pub async fn list_supermarkets(
        &self,
        city_id: Option<&str>,
    ) -> Result<Vec<Supermarket>, ApiError> {
        let query: Vec<(&str, &str)> = city_id.map(|id| vec![("city_id", id)]).unwrap_or_default();
        let url = self.endpoint(&["supermarkets"], &query);
        self.get_json(url).await
    }

    /// Fetches a supermarket by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id; otherwise as [`ApiClient::list_cities`].
    pub async fn get_supermarket(&self, supermarket_id: &str) -> Result<Supermarket, ApiError> {
        let url = self.endpoint(&["supermarkets", supermarket_id], &[]);
        self.get_json(url).await
    }
}
