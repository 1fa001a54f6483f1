//! Execution of query plans against the collocation store

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    types::Json,
    FromRow, PgPool, Postgres, Row,
};

use super::{
    builder::{QueryPlan, SqlArg},
    shaper::CollocationRow,
};
use crate::error::{DatabaseError, DatabaseOperation, Result};

/// Backend able to run compiled search plans
///
/// Implementations execute the plan's SQL with its arguments bound in order
/// and must not reorder rows.
#[async_trait]
pub trait CollocationStore: Send + Sync {
    /// Run a page plan
    async fn fetch_page(&self, plan: &QueryPlan) -> Result<Vec<CollocationRow>>;

    /// Run a count plan
    async fn count_matches(&self, plan: &QueryPlan) -> Result<i64>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;
}

/// PostgreSQL-backed store
///
/// Each call checks one connection out of the pool and returns it when the
/// call finishes, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct PgCollocationStore {
    pool: PgPool,
}

impl PgCollocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<Postgres>> {
        let conn = self.pool.acquire().await.map_err(|e| {
            let mut err = DatabaseError::from(e);
            err.operation = DatabaseOperation::PoolAcquire;
            err.add_context("acquiring a connection for search")
        })?;
        Ok(conn)
    }
}

fn bind_args<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    args: &[SqlArg],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(value) => query.bind(value.clone()),
            SqlArg::TextArray(values) => query.bind(values.clone()),
            SqlArg::Int(value) => query.bind(*value),
        };
    }
    query
}

impl<'r> FromRow<'r, PgRow> for CollocationRow {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let examples: Option<Json<Vec<Value>>> = row.try_get("examples")?;
        Ok(Self {
            dependent_text: row.try_get("dependent_text")?,
            dependent_pos: row.try_get("dependent_pos")?,
            head_text: row.try_get("head_text")?,
            head_pos: row.try_get("head_pos")?,
            dependency_type: row.try_get("dependency_type")?,
            examples: examples.map(|Json(values)| values),
            example_count: row.try_get("example_count")?,
            frequency: row.try_get("frequency")?,
            total_collocations_count: row.try_get("total_collocations_count")?,
        })
    }
}

#[async_trait]
impl CollocationStore for PgCollocationStore {
    async fn fetch_page(&self, plan: &QueryPlan) -> Result<Vec<CollocationRow>> {
        let mut conn = self.acquire().await?;

        let rows = bind_args(sqlx::query_as::<_, CollocationRow>(plan.sql()), plan.args())
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from(e).add_context("fetching collocation page"))?;

        Ok(rows)
    }

    async fn count_matches(&self, plan: &QueryPlan) -> Result<i64> {
        let mut conn = self.acquire().await?;

        let (count,) = bind_args(sqlx::query_as::<_, (i64,)>(plan.sql()), plan.args())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from(e).add_context("counting collocations"))?;

        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.acquire().await?;

        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from(e).add_context("ping"))?;

        Ok(())
    }
}
