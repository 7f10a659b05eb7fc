//! Record identifiers and the sources that mint them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a record inside one namespace. Stored as a plain JSON string so ids
/// minted by older clients (short random tokens) keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Source of fresh identifiers. Ids only have to be unique within a namespace.
pub trait IdGenerator: Send + Sync + 'static {
    fn next_id(&self) -> RecordId;
}

/// Random v4 UUIDs without hyphens.
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> RecordId {
        RecordId(Uuid::new_v4().simple().to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let generator = UuidGenerator;
        let a = generator.next_id();
        let b = generator.next_id();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn record_id_is_a_bare_json_string() {
        let id = RecordId::new("k3j9x1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"k3j9x1\"");
        let parsed: RecordId = serde_json::from_str("\"k3j9x1\"").unwrap();
        assert_eq!(parsed, id);
    }
}
