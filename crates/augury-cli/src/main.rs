//! augury - run SQL against a remote analytics server.
//!
//! A thin front end over `augury-core`: assembles the configuration from
//! environment variables, wires in interactive login prompts (or
//! environment-supplied credentials for unattended runs), and prints query
//! results as JSON.

use std::collections::BTreeMap;
use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use augury_core::{ApiClient, Config, EnvCredentials};

/// Environment variable holding the base URL of the analytics server
const ENV_URL: &str = "AUGURY_URL";

/// Environment variable holding the session lifetime in days
const ENV_EXPIRE_DAYS: &str = "AUGURY_SESSION_EXPIRE_DAYS";

/// Environment variable holding comma-separated `alias=name` pairs
const ENV_ALIASES: &str = "AUGURY_ALIASES";

/// Session lifetime applied when AUGURY_SESSION_EXPIRE_DAYS is unset.
/// Two weeks keeps interactive logins rare without leaving tokens around
/// for months.
const DEFAULT_EXPIRE_DAYS: u32 = 14;

#[derive(Parser)]
#[command(name = "augury", version, about = "Run SQL against a remote analytics server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List queryable databases (aliases shown in place of their targets)
    Dbs,
    /// Run a SQL statement against a database
    Query {
        /// Database name or configured alias
        database: String,
        /// SQL to execute
        sql: String,
        /// Print the response even when it is error-shaped
        #[arg(long)]
        raw: bool,
    },
    /// Drop the cached session token
    Logout,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG to control the log level (e.g. RUST_LOG=augury_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn config_from_env() -> Result<Config> {
    let url = std::env::var(ENV_URL).with_context(|| format!("{ENV_URL} is not set"))?;

    let days: u32 = match std::env::var(ENV_EXPIRE_DAYS) {
        Ok(raw) => raw.parse().with_context(|| {
            format!("{ENV_EXPIRE_DAYS} must be a positive integer, got {raw:?}")
        })?,
        Err(_) => DEFAULT_EXPIRE_DAYS,
    };

    let mut aliases = BTreeMap::new();
    if let Ok(raw) = std::env::var(ENV_ALIASES) {
        for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let (alias, name) = pair.split_once('=').with_context(|| {
                format!("{ENV_ALIASES} entries must look like alias=name, got {pair:?}")
            })?;
            aliases.insert(alias.trim().to_string(), name.trim().to_string());
        }
    }

    Ok(Config::builder()
        .base_url(url)
        .session_expire_days(days)
        .database_aliases(aliases)
        .build()?)
}

fn build_client() -> Result<ApiClient> {
    let config = config_from_env()?;

    // Unattended runs export AUGURY_USERNAME/AUGURY_PASSWORD; everyone else
    // is prompted on the terminal when a login is actually needed.
    let client = if std::env::var(EnvCredentials::USERNAME).is_ok() {
        ApiClient::builder(config)
            .credential_source(Box::new(EnvCredentials))
            .build()?
    } else {
        ApiClient::new(config)?
    };

    Ok(client)
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let client = build_client()?;

    match cli.command {
        Command::Dbs => {
            for name in client.database_names()? {
                println!("{name}");
            }
        }
        Command::Query { database, sql, raw } => {
            let db = client.database(&database)?;
            info!(database = %db, "executing query");
            let result = if raw {
                client.raw_query(&db, &sql)?
            } else {
                client.query(&db, &sql)?
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Logout => {
            client.clear_session()?;
            eprintln!("Session cleared");
        }
    }

    Ok(())
}
