//! Identifier types for facilitator entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller-supplied identifier for an authorization.
///
/// Unlike [`BatchId`] and [`DisputeId`], authorization ids are minted by
/// the agent's payment handler, not by the facilitator, and are carried
/// verbatim into the canonical signature payload (see `x402f-crypto`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationId(String);

impl AuthorizationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AuthorizationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AuthorizationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Address of an agent: the payer in an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentAddress(String);

impl AgentAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate the address format: non-empty, bounded length.
    ///
    /// The facilitator does not interpret this as a chain-specific public
    /// key; it is opaque beyond the signature payload it participates in.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.len() <= 128
    }
}

impl fmt::Display for AgentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Address of a merchant: the payee in an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantAddress(String);

impl MerchantAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.len() <= 128
    }
}

impl fmt::Display for MerchantAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MerchantAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MerchantAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a settlement batch.
/// Uses UUID v7 for time-ordered identifiers, minted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a dispute record, minted by the dispute manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisputeId(Uuid);

impl DisputeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DisputeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DisputeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_uniqueness() {
        let id1 = BatchId::new();
        let id2 = BatchId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_batch_id_parse() {
        let uuid_str = "019456ab-1234-7def-8901-234567890abc";
        let id = BatchId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
    }

    #[test]
    fn test_agent_address_validation() {
        assert!(AgentAddress::new("agent_a").is_valid());
        assert!(!AgentAddress::new("").is_valid());
    }

    #[test]
    fn test_authorization_id_roundtrip() {
        let id = AuthorizationId::new("auth_a");
        assert_eq!(id.as_str(), "auth_a");
        assert_eq!(id.to_string(), "auth_a");
    }
}
