use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque record identifier.
///
/// Stored as a plain string so identifiers written by earlier versions of the
/// app (`txn_<ms>_<rand>`, `rectxn_<ms>_<rand>`, `cat-exp-1`) round-trip as is.
/// New records get a v4 UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_ids_round_trip_unchanged() {
        let id: RecordId = serde_json::from_value(json!("rectxn_1700000000000_abc123xyz")).unwrap();
        assert_eq!(id.as_str(), "rectxn_1700000000000_abc123xyz");
        assert_eq!(
            serde_json::to_value(&id).unwrap(),
            json!("rectxn_1700000000000_abc123xyz")
        );
    }

    #[test]
    fn fresh_ids_are_unique_uuids() {
        let first = RecordId::new();
        assert_ne!(first, RecordId::new());
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }
}
