//! Per-invocation wiring of config, client and persisted session state.

use std::sync::Arc;
use std::time::Duration;

use pricewise_api::ApiClient;
use pricewise_core::{AppConfig, City};
use pricewise_session::{AuthSession, CitySelection, FileStore, ProductLoader, SuggestionEngine};

pub(crate) struct Session {
    pub(crate) config: AppConfig,
    pub(crate) client: Arc<ApiClient>,
    pub(crate) selection: CitySelection<FileStore>,
    pub(crate) auth: AuthSession<FileStore>,
}

impl Session {
    /// Builds the client and restores the saved city and token from the
    /// state directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub(crate) fn open(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileStore::new(&config.state_dir));
        let client = Arc::new(ApiClient::from_config(&config)?);
        let selection = CitySelection::hydrated(Arc::clone(&store));
        let auth = AuthSession::new(Arc::clone(&store));
        auth.restore(&client);

        tracing::debug!(
            state_dir = %store.dir().display(),
            city = ?selection.get().map(|c| c.id),
            authenticated = client.has_bearer_token(),
            "session opened"
        );
        Ok(Self {
            config,
            client,
            selection,
            auth,
        })
    }

    /// The selected city, or an error telling the user how to pick one.
    pub(crate) fn require_city(&self) -> anyhow::Result<City> {
        self.selection
            .get()
            .ok_or_else(|| anyhow::anyhow!("no city selected; run `pricewise city set <id>` first"))
    }

    pub(crate) fn suggestion_engine(&self) -> SuggestionEngine<Arc<ApiClient>> {
        SuggestionEngine::new(Arc::clone(&self.client))
            .with_min_chars(self.config.suggest_min_chars)
            .with_timeout(Duration::from_millis(self.config.suggest_timeout_ms))
            .watching(self.selection.subscribe())
    }

    pub(crate) fn product_loader(&self, days: Option<u32>) -> ProductLoader<Arc<ApiClient>> {
        ProductLoader::new(Arc::clone(&self.client))
            .with_history_days(days.unwrap_or(self.config.history_days))
            .watching(self.selection.subscribe())
    }

    /// Waits for pending state writes.
    pub(crate) async fn close(&self) {
        self.selection.flush().await;
    }
}
