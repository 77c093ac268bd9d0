//! Credential sources for the login flow.
//!
//! The session manager never talks to a terminal itself; it asks a
//! [`CredentialSource`] whenever the remote requires a fresh login. Callers
//! pick the implementation: [`TerminalPrompt`] for interactive use,
//! [`EnvCredentials`] for unattended runs, [`StaticCredentials`] for tests
//! and one-off scripts.

use std::io::{self, Write};

use crate::error::Error;

/// A username/password pair for the login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Supplies login credentials on demand.
///
/// Called at most once per token renewal, and only when the cached token is
/// missing or expired.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Result<Credentials, Error>;
}

/// Interactive terminal source: the username is echoed, the password is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl CredentialSource for TerminalPrompt {
    fn credentials(&self) -> Result<Credentials, Error> {
        print!("Username: ");
        io::stdout().flush()?;
        let mut username = String::new();
        io::stdin().read_line(&mut username)?;

        let password = rpassword::prompt_password("Password: ")?;

        Ok(Credentials {
            username: username.trim_end().to_string(),
            password,
        })
    }
}

/// Fixed credentials handed over by the embedding caller.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, Error> {
        Ok(Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// Reads credentials from the environment, for unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// Environment variable read for the username.
    pub const USERNAME: &'static str = "AUGURY_USERNAME";
    /// Environment variable read for the password.
    pub const PASSWORD: &'static str = "AUGURY_PASSWORD";
}

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, Error> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| Error::Auth(format!("{name} is not set")))
        };
        Ok(Credentials {
            username: read(Self::USERNAME)?,
            password: read(Self::PASSWORD)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials_return_the_fixed_pair() {
        let source = StaticCredentials::new("ada", "hunter2");
        let creds = source.credentials().unwrap();
        assert_eq!(creds.username, "ada");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn env_credentials_read_both_variables() {
        std::env::set_var(EnvCredentials::USERNAME, "ada");
        std::env::set_var(EnvCredentials::PASSWORD, "hunter2");

        let creds = EnvCredentials.credentials().unwrap();
        assert_eq!(creds.username, "ada");
        assert_eq!(creds.password, "hunter2");

        std::env::remove_var(EnvCredentials::PASSWORD);
        let err = EnvCredentials.credentials().unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        std::env::remove_var(EnvCredentials::USERNAME);
    }
}
