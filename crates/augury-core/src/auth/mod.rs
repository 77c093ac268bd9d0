//! Authentication: token persistence and the login flow.
//!
//! This module provides:
//! - `TokenStore`: one-file persistence of the cached session token
//! - `CredentialSource`: pluggable username/password sources
//! - `SessionManager`: decides cached-vs-renew and performs the login
//!
//! Tokens are cached on disk and renewed lazily, the first time a call
//! actually needs one after expiry.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::{
    CredentialSource, Credentials, EnvCredentials, StaticCredentials, TerminalPrompt,
};
pub use session::SessionManager;
pub use store::{StoredToken, TokenStore};
