//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    search::{CollocationStore, SearchService},
};

/// Application state shared across handlers
///
/// Cloning is cheap: everything lives behind `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<Config>,
    search: Arc<SearchService>,
}

impl AppState {
    /// Create state serving searches from `store`
    pub fn new(config: Config, store: Arc<dyn CollocationStore>) -> Self {
        let search = SearchService::new(store, &config.search);
        Self {
            config: Arc::new(config),
            search: Arc::new(search),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the search service
    pub fn search(&self) -> &SearchService {
        &self.search
    }
}
