use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Book identifier, the inventory store's partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Creates a new book ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the book ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BookId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BookId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for BookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// User identifier, the account store's partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a saga instance.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// saga IDs with other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SagaId(Uuid);

impl SagaId {
    /// Creates a new random saga ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a saga ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SagaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SagaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SagaId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<SagaId> for Uuid {
    fn from(id: SagaId) -> Self {
        id.0
    }
}

/// Opaque token correlating a queued fulfillment request with the
/// suspended saga awaiting its result.
///
/// Minted when a saga suspends for courier assignment and consumed
/// exactly once by the worker's success/failure signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumptionToken(Uuid);

impl ResumptionToken {
    /// Mints a new random resumption token.
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a token from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ResumptionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ResumptionToken {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ResumptionToken> for Uuid {
    fn from(token: ResumptionToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_id_string_conversion() {
        let id = BookId::new("book-123");
        assert_eq!(id.as_str(), "book-123");

        let id2: BookId = "book-456".into();
        assert_eq!(id2.as_str(), "book-456");
    }

    #[test]
    fn user_id_string_conversion() {
        let id = UserId::new("user-1");
        assert_eq!(id.as_str(), "user-1");
        assert_eq!(id.to_string(), "user-1");
    }

    #[test]
    fn saga_id_new_creates_unique_ids() {
        let id1 = SagaId::new();
        let id2 = SagaId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn saga_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = SagaId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn resumption_token_mint_creates_unique_tokens() {
        let t1 = ResumptionToken::mint();
        let t2 = ResumptionToken::mint();
        assert_ne!(t1, t2);
    }

    #[test]
    fn id_serialization_roundtrip() {
        let saga_id = SagaId::new();
        let json = serde_json::to_string(&saga_id).unwrap();
        let deserialized: SagaId = serde_json::from_str(&json).unwrap();
        assert_eq!(saga_id, deserialized);

        let token = ResumptionToken::mint();
        let json = serde_json::to_string(&token).unwrap();
        let deserialized: ResumptionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, deserialized);
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let id = BookId::new("book-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"book-123\"");
    }
}
