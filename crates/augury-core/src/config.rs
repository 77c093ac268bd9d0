//! Client configuration.
//!
//! Configuration is supplied programmatically through [`ConfigBuilder`]; the
//! library itself never reads files or the environment (the CLI layer does
//! that). All three fields are required and validated when the configuration
//! is built, so a misconfigured client cannot be constructed at all.

use std::collections::BTreeMap;

use url::Url;

use crate::error::Error;

/// Upper bound accepted for `session_expire_days`.
/// Ten years outlasts any real deployment and keeps the computed expiry
/// timestamp well inside chrono's representable range.
const MAX_SESSION_EXPIRE_DAYS: u32 = 3650;

/// Immutable client configuration: where the remote lives, how long a
/// session token stays usable, and which friendly aliases map onto remote
/// database names.
#[derive(Debug, Clone)]
pub struct Config {
    base_url: Url,
    session_expire_days: u32,
    database_aliases: BTreeMap<String, String>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session_expire_days(&self) -> u32 {
        self.session_expire_days
    }

    /// Alias-to-remote-name mapping, in alias order.
    pub fn database_aliases(&self) -> &BTreeMap<String, String> {
        &self.database_aliases
    }

    /// Render an API endpoint under the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Canonical remote name for `name`: one alias hop if one is configured,
    /// otherwise `name` itself. Aliases do not chain.
    pub(crate) fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.database_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }
}

/// Builder for [`Config`]. Every field must be supplied; `build` rejects
/// missing or invalid values with [`Error::Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    base_url: Option<String>,
    session_expire_days: Option<u32>,
    database_aliases: Option<BTreeMap<String, String>>,
}

impl ConfigBuilder {
    /// Base URL of the remote API, e.g. `https://analytics.example.com`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// How many days a freshly issued session token is considered valid.
    pub fn session_expire_days(mut self, days: u32) -> Self {
        self.session_expire_days = Some(days);
        self
    }

    /// Replace the whole alias map. An empty map is a valid choice.
    pub fn database_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.database_aliases = Some(aliases);
        self
    }

    /// Add a single `alias -> remote name` entry.
    pub fn alias(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
        self.database_aliases
            .get_or_insert_with(BTreeMap::new)
            .insert(alias.into(), name.into());
        self
    }

    pub fn build(self) -> Result<Config, Error> {
        let raw_url = self
            .base_url
            .ok_or_else(|| Error::Config("missing 'base_url'".to_string()))?;
        let session_expire_days = self
            .session_expire_days
            .ok_or_else(|| Error::Config("missing 'session_expire_days'".to_string()))?;
        let database_aliases = self
            .database_aliases
            .ok_or_else(|| Error::Config("missing 'database_aliases'".to_string()))?;

        if session_expire_days == 0 {
            return Err(Error::Config(
                "'session_expire_days' must be positive".to_string(),
            ));
        }
        if session_expire_days > MAX_SESSION_EXPIRE_DAYS {
            return Err(Error::Config(format!(
                "'session_expire_days' must be at most {MAX_SESSION_EXPIRE_DAYS}"
            )));
        }

        let base_url = Url::parse(&raw_url)
            .map_err(|err| Error::Config(format!("invalid 'base_url' {raw_url:?}: {err}")))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(Error::Config(format!(
                "'base_url' must use http or https, got {:?}",
                base_url.scheme()
            )));
        }

        Ok(Config {
            base_url,
            session_expire_days,
            database_aliases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder() -> ConfigBuilder {
        Config::builder()
            .base_url("https://analytics.example.com")
            .session_expire_days(14)
            .database_aliases(BTreeMap::new())
    }

    #[test]
    fn builds_with_all_fields_present() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.base_url().as_str(), "https://analytics.example.com/");
        assert_eq!(config.session_expire_days(), 14);
        assert!(config.database_aliases().is_empty());
    }

    #[test]
    fn each_missing_field_is_rejected_by_name() {
        let cases = [
            (
                Config::builder()
                    .session_expire_days(14)
                    .database_aliases(BTreeMap::new())
                    .build(),
                "base_url",
            ),
            (
                Config::builder()
                    .base_url("https://analytics.example.com")
                    .database_aliases(BTreeMap::new())
                    .build(),
                "session_expire_days",
            ),
            (
                Config::builder()
                    .base_url("https://analytics.example.com")
                    .session_expire_days(14)
                    .build(),
                "database_aliases",
            ),
        ];
        for (result, field) in cases {
            let err = result.unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert!(err.to_string().contains(field), "expected {field} in {err}");
        }
    }

    #[test]
    fn zero_expire_days_is_rejected() {
        let err = full_builder().session_expire_days(0).build().unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn oversized_expire_days_is_rejected() {
        let err = full_builder()
            .session_expire_days(u32::MAX)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("at most"));

        let at_bound = full_builder()
            .session_expire_days(MAX_SESSION_EXPIRE_DAYS)
            .build();
        assert!(at_bound.is_ok());
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        let err = full_builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = full_builder()
            .base_url("ftp://analytics.example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        let config = full_builder().build().unwrap();
        assert_eq!(
            config.endpoint("/api/session"),
            "https://analytics.example.com/api/session"
        );

        let with_slash = full_builder()
            .base_url("https://analytics.example.com/")
            .build()
            .unwrap();
        assert_eq!(
            with_slash.endpoint("/api/database"),
            "https://analytics.example.com/api/database"
        );
    }

    #[test]
    fn canonical_name_follows_one_alias_hop() {
        let config = full_builder().alias("p", "prod_replica").build().unwrap();
        assert_eq!(config.canonical_name("p"), "prod_replica");
        assert_eq!(config.canonical_name("prod_replica"), "prod_replica");
        assert_eq!(config.canonical_name("unknown"), "unknown");
    }
}
