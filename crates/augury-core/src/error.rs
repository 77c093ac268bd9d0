//! Error types for the augury client.
//!
//! Every fallible operation in this crate returns [`Error`]. The variants
//! separate the conditions callers react to differently: a rejected login is
//! not an unreachable host, and a query the remote refused is not a malformed
//! listing.

use thiserror::Error;

/// Maximum length for response bodies embedded in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum Error {
    /// The configuration was missing a required field or held an invalid
    /// value. Raised when the configuration is built, never later.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote rejected the login, or answered it without a token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The remote host could not be reached at all.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The requested database name (or alias) is not in the remote listing.
    #[error("Database not found: {name}\nTo see available databases, run: augury dbs")]
    DatabaseNotFound { name: String },

    /// The remote answered, but not with the shape this client understands.
    #[error("Unexpected remote response: {0}")]
    Remote(String),

    /// The remote accepted the query and reported an error for it.
    #[error("Query failed: {0}")]
    Query(String),

    /// The session file or another local resource could not be accessed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Remote answered with an unusable body; keep a truncated snippet.
    pub(crate) fn remote_shape(what: &str, body: &str) -> Self {
        Error::Remote(format!("{what}: {}", truncate_body(body)))
    }
}

/// Failure to reach the remote at the transport level (DNS, TCP, TLS,
/// timeout). Kept separate from [`Error::Auth`]: "could not reach the
/// server" and "reached it and was rejected" are different conditions.
#[derive(Error, Debug)]
#[error("Could not reach the remote: {detail}")]
pub struct TransportError {
    detail: String,
    #[source]
    source: Option<reqwest::Error>,
}

impl TransportError {
    /// Transport failure with a plain description and no underlying cause.
    /// Custom [`Transport`](crate::api::Transport) implementations use this.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            source: None,
        }
    }

    pub(crate) fn from_reqwest(detail: impl Into<String>, source: reqwest::Error) -> Self {
        Self {
            detail: detail.into(),
            source: Some(source),
        }
    }
}

/// Truncate a response body to avoid carrying excessive data in messages
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through_untruncated() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn long_bodies_are_truncated_with_byte_count() {
        let body = "x".repeat(2000);
        let truncated = truncate_body(&body);
        assert!(truncated.len() < body.len());
        assert!(truncated.contains("truncated, 2000 total bytes"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(600);
        let truncated = truncate_body(&body);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn database_not_found_names_the_listing_command() {
        let err = Error::DatabaseNotFound {
            name: "warehouse".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("warehouse"));
        assert!(message.contains("augury dbs"));
    }
}
