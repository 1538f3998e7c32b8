//! JSON-RPC hex quantities for `u64` fields.
//!
//! Use with `#[serde(with = "glif_primitives::quantity")]`, or
//! `quantity::opt` for `Option<u64>` fields that may be `null`.

use serde::{de, Deserializer, Serializer};
use std::fmt;

use crate::PrimitivesError;

/// Encode a `u64` as a minimal `0x` hex quantity.
pub fn to_hex(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Decode a `0x` hex quantity (a bare decimal string is also accepted).
pub fn parse_u64(s: &str) -> Result<u64, PrimitivesError> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return Err(PrimitivesError::InvalidHex("empty quantity".into()));
        }
        u64::from_str_radix(hex, 16).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))
    } else {
        s.parse::<u64>()
            .map_err(|e| PrimitivesError::InvalidHex(e.to_string()))
    }
}

pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_hex(*value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(QuantityVisitor)
}

struct QuantityVisitor;

impl<'de> de::Visitor<'de> for QuantityVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a hex quantity string or an unsigned integer")
    }

    fn visit_str<E>(self, value: &str) -> Result<u64, E>
    where
        E: de::Error,
    {
        parse_u64(value).map_err(de::Error::custom)
    }

    fn visit_u64<E>(self, value: u64) -> Result<u64, E>
    where
        E: de::Error,
    {
        Ok(value)
    }
}

/// `Option<u64>` variant; `null` or a missing field decode as `None`.
pub mod opt {
    use super::*;
    use serde::Deserialize;

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&to_hex(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super")] u64);

        let v = Option::<Wrapper>::deserialize(deserializer)?;
        Ok(v.map(|Wrapper(n)| n))
    }
}
