//! Remote API access.
//!
//! This module provides the `ApiClient` for talking to the analytics
//! server, and the `Transport` seam it talks through.
//!
//! The API authenticates with a session token obtained from the login
//! endpoint and passed in a request header on every other call.

pub mod client;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use transport::{HttpTransport, Transport};
