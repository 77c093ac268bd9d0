//! Client for the remote analytics API.
//!
//! This module provides the `ApiClient` struct, which bundles configuration,
//! session lifecycle, and transport behind the operations callers actually
//! use: listing databases, resolving names and aliases, and running native
//! SQL. One client means one session file and one cached database listing.

use std::path::PathBuf;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use crate::api::transport::{HttpTransport, Transport};
use crate::auth::credentials::{CredentialSource, TerminalPrompt};
use crate::auth::session::SessionManager;
use crate::auth::store::{TokenStore, SESSION_FILE};
use crate::config::Config;
use crate::error::Error;
use crate::models::Database;

/// Database listing endpoint path
const DATABASE_ENDPOINT: &str = "/api/database";

/// Native-query endpoint path
const DATASET_ENDPOINT: &str = "/api/dataset/json";

pub struct ApiClient {
    config: Config,
    transport: Box<dyn Transport>,
    session: SessionManager,
    /// Database listing, fetched once and kept for the client's lifetime.
    listing: OnceCell<Vec<Database>>,
}

impl ApiClient {
    /// Client with the default wiring: blocking HTTP transport, interactive
    /// terminal login prompts, session file in the current working
    /// directory.
    pub fn new(config: Config) -> Result<Self, Error> {
        ApiClientBuilder::new(config).build()
    }

    pub fn builder(config: Config) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// All queryable databases, in remote listing order.
    ///
    /// Fetched from the remote on first use and cached until the client is
    /// dropped; databases created on the remote afterwards need a new
    /// client to become visible.
    pub fn databases(&self) -> Result<&[Database], Error> {
        self.listing
            .get_or_try_init(|| self.fetch_databases())
            .map(Vec::as_slice)
    }

    /// Resolve a database name or configured alias to its remote record.
    pub fn database(&self, name: &str) -> Result<Database, Error> {
        let canonical = self.config.canonical_name(name);
        if canonical != name {
            debug!(alias = name, canonical, "substituted database alias");
        }

        self.databases()?
            .iter()
            .find(|db| db.name == canonical)
            .cloned()
            .ok_or_else(|| Error::DatabaseNotFound {
                name: canonical.to_string(),
            })
    }

    /// Names callers can pass to [`database`](Self::database), one per
    /// queryable database. Where an alias points at a remote name, the
    /// alias is listed in its place.
    pub fn database_names(&self) -> Result<Vec<String>, Error> {
        let aliases = self.config.database_aliases();
        let mut names: Vec<String> = self
            .databases()?
            .iter()
            .map(|db| db.name.clone())
            .filter(|name| !aliases.values().any(|target| target == name))
            .collect();
        names.extend(aliases.keys().cloned());
        Ok(names)
    }

    /// Run `sql` and return whatever the remote responded with, including
    /// error-shaped payloads, as data. A body that is not JSON comes back
    /// verbatim as a JSON string.
    pub fn raw_query(&self, database: &Database, sql: &str) -> Result<Value, Error> {
        let token = self.session.ensure_token(&self.config, self.transport.as_ref())?;
        let url = self.config.endpoint(DATASET_ENDPOINT);

        // The remote wants the whole query document JSON-encoded into one
        // url-encoded form field, not as the request body itself.
        let payload = serde_json::json!({
            "type": "native",
            "database": database.id,
            "parameters": [],
            "native": {
                "query": sql,
                "template-tags": {},
            },
        });

        debug!(database = %database, "running native query");
        let body = self
            .transport
            .post_form(&url, &token, &[("query", payload.to_string())])?;

        let parsed: Result<Value, _> = serde_json::from_str(&body);
        Ok(parsed.unwrap_or_else(|_| {
            debug!("query response is not JSON, returning the raw body");
            Value::String(body)
        }))
    }

    /// Run `sql`, failing when the remote reports an error for it.
    ///
    /// This is the form for callers that must stop on a bad query; use
    /// [`raw_query`](Self::raw_query) to inspect error shapes as data
    /// instead.
    pub fn query(&self, database: &Database, sql: &str) -> Result<Value, Error> {
        let result = self.raw_query(database, sql)?;

        // The remote spells "no error" as a missing, null, or false member;
        // anything else in that slot is a reported failure.
        if let Some(reported) = result
            .as_object()
            .and_then(|map| map.get("error"))
            .filter(|value| !matches!(**value, Value::Null | Value::Bool(false)))
        {
            let message = reported
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| reported.to_string());
            return Err(Error::Query(message));
        }

        Ok(result)
    }

    /// Forget the cached session token. The next call that needs one logs
    /// in again.
    pub fn clear_session(&self) -> Result<(), Error> {
        self.session.clear()
    }

    fn fetch_databases(&self) -> Result<Vec<Database>, Error> {
        let token = self.session.ensure_token(&self.config, self.transport.as_ref())?;
        let url = self.config.endpoint(DATABASE_ENDPOINT);
        let body = self.transport.get(&url, &token)?;

        let listing: Vec<Database> = serde_json::from_str(&body)
            .map_err(|_| Error::remote_shape("database listing is not a JSON array", &body))?;
        debug!(count = listing.len(), "cached database listing");
        Ok(listing)
    }
}

/// Wiring for [`ApiClient`]. The defaults suit the interactive CLI;
/// embedders override the pieces they need, typically the credential source
/// and, in tests, the transport and the session file path.
pub struct ApiClientBuilder {
    config: Config,
    transport: Option<Box<dyn Transport>>,
    source: Option<Box<dyn CredentialSource>>,
    session_path: Option<PathBuf>,
}

impl ApiClientBuilder {
    fn new(config: Config) -> Self {
        Self {
            config,
            transport: None,
            source: None,
            session_path: None,
        }
    }

    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credential_source(mut self, source: Box<dyn CredentialSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Store the session record at `path` instead of the working directory.
    pub fn session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<ApiClient, Error> {
        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new()?),
        };
        let source = self
            .source
            .unwrap_or_else(|| Box::new(TerminalPrompt));
        let session_path = match self.session_path {
            Some(path) => path,
            None => std::env::current_dir()?.join(SESSION_FILE),
        };

        Ok(ApiClient {
            config: self.config,
            transport,
            session: SessionManager::new(TokenStore::new(session_path), source),
            listing: OnceCell::new(),
        })
    }
}
