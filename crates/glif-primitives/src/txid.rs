//! Transaction references accepted from users.
//!
//! Lotus reports FEVM transactions both by their Ethereum hash and by the
//! CID of the underlying Filecoin message; either may be pasted back in.

use std::fmt;
use std::str::FromStr;

use crate::types::{parse_hash, Hash};
use crate::PrimitivesError;

/// An Ethereum transaction hash or a Filecoin message CID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TxId {
    EthHash(Hash),
    Cid(String),
}

impl TxId {
    pub fn parse(input: &str) -> Result<Self, PrimitivesError> {
        let s = input.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            return parse_hash(s)
                .map(TxId::EthHash)
                .map_err(|_| PrimitivesError::InvalidTxId(input.to_string()));
        }

        // CIDv1 in base32 multibase: 'b' prefix, lowercase alphabet.
        let looks_like_cid = s.len() > 8
            && s.starts_with('b')
            && s
                .bytes()
                .all(|c| c.is_ascii_lowercase() || (b'2'..=b'7').contains(&c));
        if looks_like_cid {
            Ok(TxId::Cid(s.to_string()))
        } else {
            Err(PrimitivesError::InvalidTxId(input.to_string()))
        }
    }

    pub fn as_hash(&self) -> Option<Hash> {
        match self {
            TxId::EthHash(h) => Some(*h),
            TxId::Cid(_) => None,
        }
    }
}

impl FromStr for TxId {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxId::parse(s)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxId::EthHash(h) => write!(f, "{:?}", h),
            TxId::Cid(c) => f.write_str(c),
        }
    }
}
