use clap::{Parser, Subcommand};
use colored::Colorize;

mod args;
mod commands;

use args::FilterArgs;
use collocation_search::config::Config;
use commands::search::Target;

/// colloc - Query the collocation search engine
#[derive(Parser)]
#[command(name = "colloc")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to the usual search path)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate filters and print the compiled SQL and its arguments
    Explain {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a search and print the results
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Query PostgreSQL directly at this URL
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,

        /// Query a running service instead of the database (takes precedence)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Check the /health and /ready endpoints of a running service
    Health {
        /// Service base URL
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,

        /// Show response details
        #[arg(short, long)]
        verbose: bool,
    },
}

fn load_config(path: Option<&str>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Explain { filters, json } => {
            let config = load_config(cli.config.as_deref())?;
            commands::explain::execute(&config, filters, json)
        }
        Commands::Search {
            filters,
            database_url,
            url,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let target = match url {
                Some(url) => Target::Service { url },
                None => Target::Database { url: database_url },
            };
            commands::search::execute(config, filters, target, json).await
        }
        Commands::Health { url, verbose } => commands::health::execute(verbose, url).await,
    }
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Handle result
    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            // Show context if available
            if let Some(source) = e.source() {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(1);
        }
    }
}
