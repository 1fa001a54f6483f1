//! Collocation search engine
//!
//! A request flows through four stages:
//!
//! 1. [`SearchFilters::validate`] rejects malformed requests
//! 2. [`QueryBuilder`] compiles the request into a parameterized [`QueryPlan`]
//! 3. a [`CollocationStore`] runs the plan
//! 4. [`shape`] turns the rows into a [`SearchResponse`]
//!
//! [`SearchService`] drives the stages.

pub mod builder;
pub mod filters;
pub mod service;
pub mod shaper;
pub mod store;

pub use builder::{like_pattern, QueryBuilder, QueryPlan, SqlArg};
pub use filters::SearchFilters;
pub use service::SearchService;
pub use shaper::{shape, Collocation, CollocationRow, SearchResponse};
pub use store::{CollocationStore, PgCollocationStore};
