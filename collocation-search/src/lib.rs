//! # collocation-search
//!
//! Parametric search over word-dependency collocations extracted from a
//! literary corpus. Each collocation (head word, dependent word, their POS
//! tags and the dependency relation) carries a frequency and the example
//! sentences it was found in; searches filter collocations by text, tags and
//! frequency, filter and paginate the examples by book metadata, and rank the
//! results by how many examples survive.
//!
//! ## Features
//!
//! - **Safe SQL**: every user value is a bound parameter; placeholders are
//!   always dense and ordered
//! - **Two-level pagination**: collocations and, within each, examples
//! - **HTTP service**: axum router with request IDs, timeouts, compression
//! - **Layered configuration**: defaults, TOML files, environment
//!
//! ## Example
//!
//! ```rust,no_run
//! use collocation_search::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let db = config
//!         .database
//!         .clone()
//!         .ok_or_else(|| Error::Internal("database.url is not configured".into()))?;
//!     let store = Arc::new(PgCollocationStore::new(create_pool(&db).await?));
//!
//!     let state = AppState::new(config.clone(), store);
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod search;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, SearchConfig};
    pub use crate::database::create_pool;
    pub use crate::error::{DatabaseError, DatabaseErrorKind, Error, ErrorResponse, Result};
    pub use crate::health::{health, readiness};
    pub use crate::observability::init_tracing;
    pub use crate::routes::{router, SearchQuery};
    pub use crate::search::{
        Collocation, CollocationStore, PgCollocationStore, QueryBuilder, QueryPlan,
        SearchFilters, SearchResponse, SearchService, SqlArg,
    };
    pub use crate::server::Server;
    pub use crate::state::AppState;

    pub use std::sync::Arc;

    pub use async_trait::async_trait;
    pub use tracing::{debug, error, info, instrument, warn};
}
