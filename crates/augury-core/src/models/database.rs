use std::fmt;

use serde::{Deserialize, Serialize};

/// A queryable database as the remote lists it.
///
/// The listing endpoint returns many more fields (engine, timezone, feature
/// flags); only the identity matters to this client, so everything else is
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Remote-assigned identifier, the value query payloads must carry.
    pub id: i64,
    /// Human-facing name, the value callers resolve by.
    pub name: String,
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_listing_fields_are_ignored() {
        let body = r#"{"id": 7, "name": "prod", "engine": "postgres", "is_sample": false}"#;
        let db: Database = serde_json::from_str(body).unwrap();
        assert_eq!(db, Database { id: 7, name: "prod".to_string() });
    }
}
