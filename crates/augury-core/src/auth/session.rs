//! Session-token lifecycle.
//!
//! [`SessionManager::ensure_token`] is the only path that hands out tokens.
//! It returns the cached token while that token is fresh, and otherwise
//! drives one login round-trip through the configured
//! [`CredentialSource`](crate::auth::CredentialSource), persisting the new
//! record before returning. Renewal is lazy: nothing refreshes in the
//! background, the next call that needs a token pays for the login.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::transport::Transport;
use crate::auth::credentials::CredentialSource;
use crate::auth::store::{StoredToken, TokenStore};
use crate::config::Config;
use crate::error::Error;

/// Login endpoint path under the configured base URL
const SESSION_ENDPOINT: &str = "/api/session";

/// Login response; a missing or null `id` means the remote rejected us.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    id: Option<String>,
}

pub struct SessionManager {
    store: TokenStore,
    source: Box<dyn CredentialSource>,
    /// Serializes the whole check-clear-login-save sequence, so concurrent
    /// callers on one client cannot race two logins.
    renew_lock: Mutex<()>,
    /// Injected clock; tests pin this to exercise expiry without waiting.
    now: fn() -> DateTime<Utc>,
}

impl SessionManager {
    pub fn new(store: TokenStore, source: Box<dyn CredentialSource>) -> Self {
        Self {
            store,
            source,
            renew_lock: Mutex::new(()),
            now: Utc::now,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Return a token that is valid right now, logging in first if the
    /// cached one is missing, expired, or unreadable. At most one login
    /// round-trip happens per call: an expired record is cleared and the
    /// store is then treated as empty, it is never re-examined.
    pub fn ensure_token(
        &self,
        config: &Config,
        transport: &dyn Transport,
    ) -> Result<String, Error> {
        let _renewing = self.renew_lock.lock();

        match self.store.load() {
            Some(record) if !record.is_expired_at((self.now)()) => {
                debug!(expires_at = %record.expires_at, "using cached session token");
                return Ok(record.token);
            }
            Some(record) => {
                warn!(expired_at = %record.expires_at, "session token expired, clearing");
                self.store.clear()?;
            }
            None => debug!("no cached session token"),
        }

        self.login(config, transport)
    }

    /// Drop the cached token. The next `ensure_token` logs in again.
    pub fn clear(&self) -> Result<(), Error> {
        let _renewing = self.renew_lock.lock();
        self.store.clear()
    }

    fn login(&self, config: &Config, transport: &dyn Transport) -> Result<String, Error> {
        let creds = self.source.credentials()?;
        let url = config.endpoint(SESSION_ENDPOINT);
        let body = serde_json::json!({
            "username": creds.username,
            "password": creds.password,
        });

        let response = transport.post_json(&url, &body)?;

        // Anything without a token in it counts as a rejection: the remote
        // reports bad credentials in the body, not in a status we see here.
        let token = serde_json::from_str::<LoginResponse>(&response)
            .ok()
            .and_then(|login| login.id)
            .ok_or_else(|| Error::Auth("Wrong credentials".to_string()))?;

        let record = StoredToken {
            token,
            expires_at: (self.now)() + Duration::days(i64::from(config.session_expire_days())),
        };
        self.store.save(&record)?;
        info!(expires_at = %record.expires_at, "authenticated, session token stored");

        Ok(record.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::{Call, FakeTransport};
    use crate::auth::credentials::StaticCredentials;
    use crate::auth::store::SESSION_FILE;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn test_config(days: u32) -> Config {
        Config::builder()
            .base_url("https://analytics.example.com")
            .session_expire_days(days)
            .database_aliases(Default::default())
            .build()
            .unwrap()
    }

    fn manager_in(dir: &TempDir) -> SessionManager {
        SessionManager::new(
            TokenStore::new(dir.path().join(SESSION_FILE)),
            Box::new(StaticCredentials::new("ada", "hunter2")),
        )
    }

    fn store_in(dir: &TempDir) -> TokenStore {
        TokenStore::new(dir.path().join(SESSION_FILE))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn absent_token_triggers_exactly_one_login() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new();
        transport.respond(r#"{"id": "tok-1"}"#);

        let token = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap();

        assert_eq!(token, "tok-1");
        assert_eq!(transport.logins(), 1);
        assert_eq!(store_in(&dir).load().unwrap().token, "tok-1");
    }

    #[test]
    fn login_posts_credentials_to_the_session_endpoint() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new();
        transport.respond(r#"{"id": "tok-1"}"#);

        manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::PostJson { url, body } => {
                assert_eq!(url, "https://analytics.example.com/api/session");
                assert_eq!(body["username"], "ada");
                assert_eq!(body["password"], "hunter2");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn valid_token_is_returned_without_network_calls() {
        let dir = TempDir::new().unwrap();
        store_in(&dir)
            .save(&StoredToken {
                token: "cached".to_string(),
                expires_at: Utc::now() + Duration::days(1),
            })
            .unwrap();

        let transport = FakeTransport::new();
        let token = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap();

        assert_eq!(token, "cached");
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn expired_token_is_replaced_with_one_login() {
        let dir = TempDir::new().unwrap();
        let old_expiry = Utc::now() - Duration::days(1);
        store_in(&dir)
            .save(&StoredToken {
                token: "stale".to_string(),
                expires_at: old_expiry,
            })
            .unwrap();

        let transport = FakeTransport::new();
        transport.respond(r#"{"id": "tok-2"}"#);

        let token = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap();

        assert_eq!(token, "tok-2");
        assert_eq!(transport.logins(), 1);
        let record = store_in(&dir).load().unwrap();
        assert_eq!(record.token, "tok-2");
        assert!(record.expires_at > old_expiry);
    }

    #[test]
    fn corrupt_store_contents_force_a_single_login() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "][ definitely not json").unwrap();

        let transport = FakeTransport::new();
        transport.respond(r#"{"id": "tok-3"}"#);

        let token = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap();

        assert_eq!(token, "tok-3");
        assert_eq!(transport.logins(), 1);
    }

    #[test]
    fn tokenless_login_response_is_wrong_credentials() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new();
        transport.respond("{}");

        let err = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap_err();

        match err {
            Error::Auth(message) => assert_eq!(message, "Wrong credentials"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn unparsable_login_response_is_wrong_credentials() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new();
        transport.respond("<html>backend exploded</html>");

        let err = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn unreachable_remote_is_not_an_auth_failure() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new();
        transport.fail("connection refused");

        let err = manager_in(&dir)
            .ensure_token(&test_config(14), &transport)
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn expiry_honors_the_configured_day_count() {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new();
        transport.respond(r#"{"id": "tok-4"}"#);

        manager_in(&dir)
            .with_clock(fixed_now)
            .ensure_token(&test_config(3), &transport)
            .unwrap();

        let record = store_in(&dir).load().unwrap();
        assert_eq!(record.expires_at, fixed_now() + Duration::days(3));
    }

    #[test]
    fn clear_forgets_the_cached_token() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        store_in(&dir)
            .save(&StoredToken {
                token: "cached".to_string(),
                expires_at: Utc::now() + Duration::days(1),
            })
            .unwrap();

        manager.clear().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }
}
