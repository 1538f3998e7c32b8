//! Core chain types with JSON-RPC hex serialization.
//!
//! `Address`, `Hash` and `U256` come from `primitive-types`, whose serde
//! impls already speak the `0x`-prefixed hex dialect used by Ethereum
//! JSON-RPC. `Bytes` adds the same treatment for variable-length data.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::PrimitivesError;

pub use primitive_types::{H160 as Address, H256 as Hash, U256};

/// Variable-length byte string serialized as `"0x..."`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl FromStr for Bytes {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = strip_hex_prefix(s);
        hex::decode(body)
            .map(Bytes)
            .map_err(|e| PrimitivesError::InvalidHex(e.to_string()))
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Bytes::from_str(&s).map_err(de::Error::custom)
    }
}

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_eth_address(s: &str) -> Result<Address, PrimitivesError> {
    let body = strip_hex_prefix(s.trim());
    if body.len() != 40 {
        return Err(PrimitivesError::InvalidHex(format!(
            "address must be 20 bytes, got {} hex chars",
            body.len()
        )));
    }
    let bytes = hex::decode(body).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Parse a `0x`-prefixed 32-byte hex hash.
pub fn parse_hash(s: &str) -> Result<Hash, PrimitivesError> {
    let body = strip_hex_prefix(s.trim());
    if body.len() != 64 {
        return Err(PrimitivesError::InvalidHex(format!(
            "hash must be 32 bytes, got {} hex chars",
            body.len()
        )));
    }
    let bytes = hex::decode(body).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
    Ok(Hash::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_serde() {
        let b = Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "\"0xdeadbeef\"");

        let back: Bytes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_empty_bytes() {
        let b: Bytes = serde_json::from_str("\"0x\"").unwrap();
        assert!(b.is_empty());
        assert_eq!(b.to_string(), "0x");
    }

    #[test]
    fn test_parse_eth_address() {
        let addr = parse_eth_address("0xd388ab098ed3e84c0d808776440b48f685198498").unwrap();
        assert_eq!(addr.as_bytes()[0], 0xd3);
        assert!(parse_eth_address("0x1234").is_err());
        assert!(parse_eth_address("0xzz88ab098ed3e84c0d808776440b48f685198498").is_err());
    }

    #[test]
    fn test_parse_hash_requires_32_bytes() {
        assert!(parse_hash(&format!("0x{}", "ab".repeat(32))).is_ok());
        assert!(parse_hash("0xabcd").is_err());
    }

    #[test]
    fn test_u256_uses_hex_quantity_serde() {
        let v = U256::from(26u64);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"0x1a\"");
    }
}
