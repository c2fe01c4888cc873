//! Incremental, city-scoped search suggestions.
//!
//! Each call to [`SuggestionEngine::query`] takes a fresh generation number
//! tied to its `(text, city)` key. When the lookup completes, its result is
//! applied only if no later call, selection or clear has happened and, when the
//! engine watches the city selection, the city is still the one the lookup was
//! issued for. Responses that lose this check are dropped, so out-of-order
//! completions never flicker stale suggestions. Nothing is cancelled on the
//! wire.
//!
//! A watched city change is visible at once: the next read of the state sees
//! `Idle` even while the lookup for the old city is still outstanding.
//! Results are de-duplicated by product id, first occurrence kept.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pricewise_core::{City, SuggestionItem};
use tokio::sync::watch;

use crate::source::SuggestionSource;

pub const DEFAULT_MIN_CHARS: usize = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Externally visible state of the suggestion list.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionState {
    /// Nothing to show: the query is too short, no city is selected, the
    /// last lookup failed, the selected city changed, or a suggestion was
    /// picked.
    Idle,
    /// A lookup for the latest query is outstanding.
    Loading,
    /// The latest lookup resolved. May be empty.
    Ready(Vec<SuggestionItem>),
}

/// The key a lookup was issued for.
#[derive(Debug)]
struct QueryToken {
    generation: u64,
    text: String,
    city_id: String,
}

#[derive(Debug)]
struct Inner {
    generation: u64,
    state: SuggestionState,
    /// City the current `Loading` or `Ready` state belongs to.
    city_id: Option<String>,
}

pub struct SuggestionEngine<S> {
    source: S,
    inner: Mutex<Inner>,
    city: Option<watch::Receiver<Option<City>>>,
    min_chars: usize,
    timeout: Duration,
}

impl<S: SuggestionSource> SuggestionEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                generation: 0,
                state: SuggestionState::Idle,
                city_id: None,
            }),
            city: None,
            min_chars: DEFAULT_MIN_CHARS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Minimum query length, in characters, before a lookup is issued.
    #[must_use]
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Upper bound on a single lookup; a lookup that exceeds it clears the
    /// suggestions instead of staying in `Loading`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ties the engine to a city selection: a lookup that completes after the
    /// selected city changed is discarded.
    #[must_use]
    pub fn watching(mut self, city: watch::Receiver<Option<City>>) -> Self {
        self.city = Some(city);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handles one keystroke's worth of input.
    ///
    /// Returns the suggestions this call applied. Calls that were cleared,
    /// failed, timed out or were superseded return an empty list; the current
    /// list is always available from [`SuggestionEngine::suggestions`].
    pub async fn query(&self, text: &str, city: Option<&City>) -> Vec<SuggestionItem> {
        let token = {
            let mut inner = self.lock();
            inner.generation += 1;

            let city = city.filter(|_| text.chars().count() >= self.min_chars);
            let Some(city) = city else {
                inner.state = SuggestionState::Idle;
                inner.city_id = None;
                return Vec::new();
            };

            inner.state = SuggestionState::Loading;
            inner.city_id = Some(city.id.clone());
            QueryToken {
                generation: inner.generation,
                text: text.to_owned(),
                city_id: city.id.clone(),
            }
        };

        tracing::debug!(
            generation = token.generation,
            text = %token.text,
            city_id = %token.city_id,
            "issuing suggestion lookup"
        );
        let outcome =
            tokio::time::timeout(self.timeout, self.source.search(&token.text, &token.city_id))
                .await;

        let mut inner = self.lock();
        if inner.generation != token.generation {
            tracing::debug!(
                generation = token.generation,
                latest = inner.generation,
                text = %token.text,
                "discarding superseded suggestions"
            );
            return Vec::new();
        }
        if !self.city_still_selected(&token.city_id) {
            tracing::debug!(
                generation = token.generation,
                city_id = %token.city_id,
                "discarding suggestions for a city that is no longer selected"
            );
            inner.state = SuggestionState::Idle;
            inner.city_id = None;
            return Vec::new();
        }

        match outcome {
            Ok(Ok(mut items)) => {
                let received = items.len();
                let mut seen = HashSet::new();
                items.retain(|item| seen.insert(item.product.id.clone()));
                tracing::debug!(
                    generation = token.generation,
                    count = items.len(),
                    duplicates = received - items.len(),
                    "applying suggestions"
                );
                inner.state = SuggestionState::Ready(items.clone());
                items
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, text = %token.text, "suggestion lookup failed");
                inner.state = SuggestionState::Idle;
                inner.city_id = None;
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    text = %token.text,
                    "suggestion lookup timed out"
                );
                inner.state = SuggestionState::Idle;
                inner.city_id = None;
                Vec::new()
            }
        }
    }

    fn city_still_selected(&self, city_id: &str) -> bool {
        match &self.city {
            Some(rx) => rx.borrow().as_ref().is_some_and(|c| c.id == city_id),
            None => true,
        }
    }

    /// Locks the state after dropping anything that belongs to a city that is
    /// no longer selected. Bumping the generation makes the outstanding
    /// lookup, if any, lose its check when it completes.
    fn settled(&self) -> MutexGuard<'_, Inner> {
        let mut inner = self.lock();
        let stale = inner
            .city_id
            .as_deref()
            .is_some_and(|id| !self.city_still_selected(id));
        if stale {
            tracing::debug!(
                generation = inner.generation,
                city_id = inner.city_id.as_deref().unwrap_or_default(),
                "selected city changed, clearing suggestions"
            );
            inner.generation += 1;
            inner.state = SuggestionState::Idle;
            inner.city_id = None;
        }
        inner
    }

    /// Picks a suggestion. Ends the pipeline: the list is cleared and any
    /// outstanding lookup is invalidated.
    pub fn select(&self, item: SuggestionItem) -> SuggestionItem {
        self.clear();
        tracing::debug!(product_id = %item.product.id, "suggestion selected");
        item
    }

    /// Clears the list and invalidates any outstanding lookup.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = SuggestionState::Idle;
        inner.city_id = None;
    }

    #[must_use]
    pub fn state(&self) -> SuggestionState {
        self.settled().state.clone()
    }

    /// Suggestions currently on display; empty unless `Ready`.
    #[must_use]
    pub fn suggestions(&self) -> Vec<SuggestionItem> {
        match &self.settled().state {
            SuggestionState::Ready(items) => items.clone(),
            SuggestionState::Idle | SuggestionState::Loading => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.settled().state, SuggestionState::Loading)
    }
}

#[cfg(test)]
#[path = "suggest_test.rs"]
mod tests;
