//! Data models for the analytics API.
//!
//! - `Database`: a queryable database from the remote listing
//!
//! Query results stay untyped (`serde_json::Value`): result shapes vary
//! per query and per remote version, and callers inspect them as data.

pub mod database;

pub use database::Database;
