//! Product page loading.
//!
//! A product page shows the product, the offers in the selected city ranked
//! best first, and the price history pivoted per day. All three are fetched
//! concurrently. Loads are token-guarded the same way as suggestions: only
//! the latest load for a still-selected city produces a view.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pricewise_core::{best_offer, pivot_table, rank_offers, City, Offer, PriceTable, Product};
use tokio::sync::watch;

use crate::source::ProductSource;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Everything a product page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub product: Product,
    pub city: City,
    /// Best offer first.
    pub offers: Vec<Offer>,
    pub history: PriceTable,
}

impl ProductView {
    #[must_use]
    pub fn best_offer(&self) -> Option<&Offer> {
        best_offer(&self.offers)
    }
}

pub struct ProductLoader<S> {
    source: S,
    generation: Mutex<u64>,
    city: Option<watch::Receiver<Option<City>>>,
    history_days: u32,
}

impl<S: ProductSource> ProductLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            generation: Mutex::new(0),
            city: None,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    #[must_use]
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    /// Discards loads that complete after the selected city changed.
    #[must_use]
    pub fn watching(mut self, city: watch::Receiver<Option<City>>) -> Self {
        self.city = Some(city);
        self
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the page for `product_id` in `city`.
    ///
    /// Returns `None` without touching the network when no city is selected,
    /// when the product itself cannot be fetched, or when a later load or a
    /// city change superseded this one. Offer and history failures degrade to
    /// empty sections.
    pub async fn load(&self, product_id: &str, city: Option<&City>) -> Option<ProductView> {
        let city = city?.clone();
        let generation = {
            let mut current = self.lock();
            *current += 1;
            *current
        };

        tracing::debug!(
            generation,
            product_id,
            city_id = %city.id,
            days = self.history_days,
            "loading product view"
        );
        let (product, offers, history) = tokio::join!(
            self.source.product(product_id),
            self.source.offers(product_id, &city.id),
            self.source.history(product_id, &city.id, self.history_days),
        );

        if *self.lock() != generation {
            tracing::debug!(generation, product_id, "discarding superseded product view");
            return None;
        }
        if !self.city_still_selected(&city.id) {
            tracing::debug!(
                generation,
                city_id = %city.id,
                "discarding product view for a city that is no longer selected"
            );
            return None;
        }

        let product = match product {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!(error = %e, product_id, "product lookup failed");
                return None;
            }
        };
        let mut offers = offers.unwrap_or_else(|e| {
            tracing::warn!(error = %e, product_id, "offer lookup failed");
            Vec::new()
        });
        let history = history.unwrap_or_else(|e| {
            tracing::warn!(error = %e, product_id, "price history lookup failed");
            Vec::new()
        });

        rank_offers(&mut offers);
        Some(ProductView {
            product,
            city,
            offers,
            history: pivot_table(&history),
        })
    }

    fn city_still_selected(&self, city_id: &str) -> bool {
        match &self.city {
            Some(rx) => rx.borrow().as_ref().is_some_and(|c| c.id == city_id),
            None => true,
        }
    }
}
