//! Blocking HTTP transport.
//!
//! Exactly three request shapes ever reach the remote: the login POST (JSON
//! body, no token), the listing GET, and the query POST (both carrying the
//! session token in a header). [`Transport`] abstracts those shapes so tests
//! can substitute a scripted double; [`HttpTransport`] is the production
//! implementation on reqwest's blocking client.
//!
//! Responses come back as raw body text whatever the status code. This API
//! reports failures in the body shape rather than the status line, so
//! classification belongs to the callers, not the transport.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header;
use tracing::debug;

use crate::error::TransportError;

/// HTTP request timeout in seconds.
/// 30s rides out slow analytical queries while still failing in useful time.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the session token on authenticated calls
const SESSION_HEADER: &str = "X-Session-Token";

pub trait Transport: Send + Sync {
    /// POST a JSON body with no session attached (the login call).
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, TransportError>;

    /// GET with the session token attached.
    fn get(&self, url: &str, token: &str) -> Result<String, TransportError>;

    /// POST a url-encoded form with the session token attached.
    fn post_form(
        &self,
        url: &str,
        token: &str,
        form: &[(&str, String)],
    ) -> Result<String, TransportError>;
}

/// Production transport on a shared blocking client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| TransportError::from_reqwest("could not build HTTP client", err))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, TransportError> {
        debug!(url, "POST (json)");
        self.client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .and_then(|response| response.text())
            .map_err(|err| TransportError::from_reqwest(url, err))
    }

    fn get(&self, url: &str, token: &str) -> Result<String, TransportError> {
        debug!(url, "GET");
        self.client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(SESSION_HEADER, token)
            .send()
            .and_then(|response| response.text())
            .map_err(|err| TransportError::from_reqwest(url, err))
    }

    fn post_form(
        &self,
        url: &str,
        token: &str,
        form: &[(&str, String)],
    ) -> Result<String, TransportError> {
        debug!(url, "POST (form)");
        self.client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .header(SESSION_HEADER, token)
            .form(form)
            .send()
            .and_then(|response| response.text())
            .map_err(|err| TransportError::from_reqwest(url, err))
    }
}
