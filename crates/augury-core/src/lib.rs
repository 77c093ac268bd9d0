//! Core library for augury: a client for a remote analytics API.
//!
//! The client logs in with username and password, caches the session token
//! on disk with an expiration policy, resolves database names and
//! user-defined aliases to remote identifiers, and runs native SQL,
//! returning remote responses as plain JSON values.
//!
//! # Quick start
//!
//! ```no_run
//! use augury_core::{ApiClient, Config, StaticCredentials};
//!
//! fn main() -> augury_core::Result<()> {
//!     let config = Config::builder()
//!         .base_url("https://analytics.example.com")
//!         .session_expire_days(14)
//!         .alias("prod", "prod_replica")
//!         .build()?;
//!
//!     let client = ApiClient::builder(config)
//!         .credential_source(Box::new(StaticCredentials::new("ada", "s3cret")))
//!         .build()?;
//!
//!     let db = client.database("prod")?;
//!     let rows = client.query(&db, "SELECT count(*) FROM orders")?;
//!     println!("{rows}");
//!     Ok(())
//! }
//! ```
//!
//! The session token lives in `.augury-session.json` under the working
//! directory and is reused until it expires; the first call that needs a
//! token after that performs exactly one fresh login through the configured
//! credential source.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;

pub use api::client::{ApiClient, ApiClientBuilder};
pub use api::transport::{HttpTransport, Transport};
pub use auth::credentials::{
    CredentialSource, Credentials, EnvCredentials, StaticCredentials, TerminalPrompt,
};
pub use auth::store::{StoredToken, TokenStore};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, TransportError};
pub use models::Database;

/// Convenient result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
