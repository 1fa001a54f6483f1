use std::sync::Arc;

use anyhow::{Context, Result};
use collocation_search::{
    config::{Config, DatabaseConfig},
    database::create_pool,
    error::ErrorResponse,
    search::{Collocation, PgCollocationStore, SearchFilters, SearchResponse, SearchService},
};
use colored::Colorize;

use crate::args::FilterArgs;

/// Where a search runs
pub enum Target {
    /// Straight against PostgreSQL
    Database { url: Option<String> },
    /// Through a running service
    Service { url: String },
}

pub async fn execute(config: Config, filters: FilterArgs, target: Target, json: bool) -> Result<()> {
    let filters: SearchFilters = filters.into();

    let response = match target {
        Target::Database { url } => search_database(config, &filters, url).await?,
        Target::Service { url } => search_service(&url, &filters).await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        render(&response, &filters);
    }

    Ok(())
}

async fn search_database(
    config: Config,
    filters: &SearchFilters,
    url: Option<String>,
) -> Result<SearchResponse> {
    let db = match (url, config.database.clone()) {
        (Some(url), Some(db)) => DatabaseConfig { url, ..db },
        (Some(url), None) => DatabaseConfig::with_url(url),
        (None, Some(db)) => db,
        (None, None) => anyhow::bail!(
            "No database configured; pass --database-url or set DATABASE_URL"
        ),
    };

    let pool = create_pool(&DatabaseConfig {
        max_retries: 0,
        ..db
    })
    .await
    .context("Failed to connect to database")?;

    let service = SearchService::new(Arc::new(PgCollocationStore::new(pool.clone())), &config.search);
    let result = service.search(filters).await;
    pool.close().await;

    Ok(result?)
}

async fn search_service(url: &str, filters: &SearchFilters) -> Result<SearchResponse> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")?;

    let endpoint = format!("{}/search", url.trim_end_matches('/'));
    let response = client
        .post(&endpoint)
        .json(filters)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {}", endpoint))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => anyhow::bail!(
                "HTTP {} {}: {}",
                status.as_u16(),
                err.code.unwrap_or_default(),
                err.error
            ),
            Err(_) => anyhow::bail!("HTTP {}: {}", status.as_u16(), body),
        }
    }

    response
        .json::<SearchResponse>()
        .await
        .context("Failed to decode search response")
}

fn render(response: &SearchResponse, filters: &SearchFilters) {
    let shown = response.results.len() as i64;
    let first = if shown == 0 { 0 } else { filters.results_offset + 1 };
    println!(
        "{} {}-{} of {}",
        "Collocations".bold(),
        first,
        filters.results_offset + shown,
        response.total_collocations_count
    );

    for collocation in &response.results {
        println!();
        println!("{}", headline(collocation));
        for example in collocation.examples.iter().flatten() {
            let book = example.get("book").and_then(|b| b.as_str()).unwrap_or("?");
            let sentence = example
                .get("sentence")
                .or_else(|| example.get("text"))
                .and_then(|s| s.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| example.to_string());
            println!("    {} {}", format!("[{}]", book).dimmed(), sentence);
        }
    }
}

fn headline(c: &Collocation) -> String {
    format!(
        "{} {} {}  {} {}",
        format!("{} ({})", c.head_text, c.head_pos).green().bold(),
        format!("-{}->", c.dependency_type).yellow(),
        format!("{} ({})", c.dependent_text, c.dependent_pos).cyan().bold(),
        format!("freq {}", c.frequency).dimmed(),
        format!("examples {}", c.example_count).dimmed(),
    )
}
