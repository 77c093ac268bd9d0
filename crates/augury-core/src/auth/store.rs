//! Persistent session-token store.
//!
//! One JSON file holds at most one token record. A missing file, an
//! unreadable file, and a file without a complete record all read back as
//! "no token"; corruption is never an error, it just forces a fresh login.
//! Clearing writes an empty object rather than deleting the file, so a
//! cleared store is distinguishable on disk from one that never existed.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Session file name, created in the client's working directory by default
pub(crate) const SESSION_FILE: &str = ".augury-session.json";

/// A cached session token and the instant it stops being usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(rename = "expire_at")]
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Whether this token is unusable at `now`. Expiry is inclusive: a token
    /// is already expired at its exact expiration instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// File-backed store for the single cached session token.
///
/// Concurrent writers are not coordinated across processes; the last write
/// wins, which is harmless because any complete record is a usable one.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached record, if a complete one exists.
    pub fn load(&self) -> Option<StoredToken> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable session record"
                );
                None
            }
        }
    }

    /// Overwrite the store with `record`.
    pub fn save(&self, record: &StoredToken) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents =
            serde_json::to_string_pretty(record).map_err(std::io::Error::other)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Reset the store to an explicitly empty state. The next `load` finds
    /// no record.
    pub fn clear(&self) -> Result<(), Error> {
        fs::write(&self.path, "{}")?;
        Ok(())
    }
}
