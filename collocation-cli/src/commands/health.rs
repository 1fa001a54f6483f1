use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    ready: Option<bool>,
    #[serde(default)]
    dependencies: HashMap<String, DependencyStatus>,
}

#[derive(Debug, Deserialize)]
struct DependencyStatus {
    healthy: bool,
    #[serde(default)]
    message: Option<String>,
}

pub async fn execute(verbose: bool, url: String) -> Result<()> {
    println!("{}", "Checking service health...".bold());
    println!();

    let base_url = url.trim_end_matches('/');

    for endpoint in ["health", "ready"] {
        let endpoint_url = format!("{}/{}", base_url, endpoint);
        print!("{} ({})... ", endpoint, endpoint_url);

        match check_endpoint(&endpoint_url, verbose).await {
            Ok(response) => {
                println!("{}", "✓ OK".green().bold());
                if verbose {
                    report(&response);
                }
            }
            Err(e) => {
                println!("{}", "✗ FAILED".red().bold());
                println!("  Error: {}", e);
                return Err(e);
            }
        }
    }

    println!();
    println!("{}", "Service is healthy and ready!".green().bold());

    Ok(())
}

fn report(response: &HealthResponse) {
    if let Some(status) = &response.status {
        println!("  Status: {}", status);
    }
    if let Some(version) = &response.version {
        println!("  Version: {}", version);
    }
    if let Some(ready) = response.ready {
        println!("  Ready: {}", ready);
    }
    for (name, dep) in &response.dependencies {
        let mark = if dep.healthy { "✓".green() } else { "✗".red() };
        println!(
            "  {} {} {}",
            mark,
            name,
            dep.message.as_deref().unwrap_or_default()
        );
    }
}

async fn check_endpoint(url: &str, verbose: bool) -> Result<HealthResponse> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to send request")?;

    let status = response.status();

    if verbose {
        println!();
        println!("  HTTP Status: {}", status);
    }

    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    if verbose {
        println!("  Response: {}", body);
    }

    if !status.is_success() {
        anyhow::bail!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
    }

    serde_json::from_str::<HealthResponse>(&body)
        .with_context(|| format!("Unexpected response format: {}", body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_readiness_body() {
        let body = r#"{"ready":false,"service":"collocation-search",
            "dependencies":{"database":{"healthy":false,"message":"Connection failed"}}}"#;
        let parsed: HealthResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.ready, Some(false));
        assert!(!parsed.dependencies["database"].healthy);
        assert!(parsed.status.is_none());
    }
}
