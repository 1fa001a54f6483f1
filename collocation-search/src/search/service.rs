//! Search orchestration

use std::sync::Arc;

use tracing::instrument;

use super::{
    builder::{QueryBuilder, QueryPlan},
    filters::SearchFilters,
    shaper::{shape, SearchResponse},
    store::CollocationStore,
};
use crate::{config::SearchConfig, error::Result};

/// Validates requests, compiles them and runs them against a store
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn CollocationStore>,
    builder: QueryBuilder,
    config: SearchConfig,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("builder", &self.builder)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    pub fn new(store: Arc<dyn CollocationStore>, config: &SearchConfig) -> Self {
        Self {
            store,
            builder: QueryBuilder::new(config),
            config: config.clone(),
        }
    }

    /// Validate and compile a request without running it
    pub fn explain(&self, filters: &SearchFilters) -> Result<QueryPlan> {
        filters.validate(&self.config)?;
        Ok(self.builder.page_plan(filters))
    }

    /// Run one search
    ///
    /// Invalid requests are rejected before the store is touched. When the
    /// page comes back empty because `results_offset` overshoots the matches,
    /// the total is recovered with a count query.
    #[instrument(
        skip_all,
        fields(
            head_text = filters.head_text(),
            dpdt_text = filters.dpdt_text(),
            results_offset = filters.results_offset,
        )
    )]
    pub async fn search(&self, filters: &SearchFilters) -> Result<SearchResponse> {
        let plan = self.explain(filters)?;

        tracing::info!(args = ?plan.args(), "Executing collocation search");
        tracing::debug!(sql = %plan.sql(), "Compiled search query");

        let rows = self.store.fetch_page(&plan).await?;
        let mut response = shape(rows);

        if response.results.is_empty() && filters.results_offset > 0 {
            let count_plan = self.builder.count_plan(filters);
            response.total_collocations_count = self.store.count_matches(&count_plan).await?;
            tracing::debug!(
                total = response.total_collocations_count,
                "Offset past the last match; total taken from count query"
            );
        }

        tracing::info!(
            total = response.total_collocations_count,
            returned = response.results.len(),
            "Search completed"
        );

        Ok(response)
    }

    /// Check that the underlying store is reachable
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
