//! # Filecoin Addresses
//!
//! Textual Filecoin addresses and their mapping onto the 20-byte addresses
//! the FEVM understands.
//!
//! ```text
//! f0<id>                     ID           -> 0xff 00..00 <id be64>
//! f1<base32(pk-hash|cksm)>   secp256k1    -> (none)
//! f2<base32(hash|cksm)>      actor        -> (none)
//! f3<base32(pubkey|cksm)>    BLS          -> (none)
//! f4<ns>f<base32(sub|cksm)>  delegated    -> sub, when ns == 10 and |sub| == 20
//! ```
//!
//! The checksum is blake2b with a 4-byte digest over the protocol byte and
//! the payload. Base32 is RFC 4648, lowercase, unpadded.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use data_encoding::BASE32_NOPAD;
use std::fmt;

use crate::types::{parse_eth_address, Address};
use crate::{Network, PrimitivesError};

/// Ethereum Address Manager namespace for `f410` addresses.
pub const EAM_NAMESPACE: u64 = 10;

const CHECKSUM_LEN: usize = 4;
const HASH_PAYLOAD_LEN: usize = 20;
const BLS_PAYLOAD_LEN: usize = 48;
const MAX_SUBADDRESS_LEN: usize = 54;
const MASKED_ID_PREFIX: u8 = 0xff;

/// A decoded Filecoin address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilAddress {
    Id(u64),
    Secp256k1([u8; HASH_PAYLOAD_LEN]),
    Actor([u8; HASH_PAYLOAD_LEN]),
    Bls(Vec<u8>),
    Delegated { namespace: u64, subaddress: Vec<u8> },
}

impl FilAddress {
    /// Protocol number (0-4).
    pub fn protocol(&self) -> u8 {
        match self {
            FilAddress::Id(_) => 0,
            FilAddress::Secp256k1(_) => 1,
            FilAddress::Actor(_) => 2,
            FilAddress::Bls(_) => 3,
            FilAddress::Delegated { .. } => 4,
        }
    }

    /// Parse an address string for either network.
    pub fn parse(input: &str) -> Result<Self, PrimitivesError> {
        let s = input.trim();
        let invalid = |reason| PrimitivesError::InvalidFilAddress {
            input: input.to_string(),
            reason,
        };

        let mut chars = s.chars();
        match chars.next() {
            Some('f') | Some('t') => {}
            _ => return Err(invalid("must start with 'f' or 't'")),
        }
        let protocol = chars.next().ok_or_else(|| invalid("missing protocol"))?;
        let rest = chars.as_str();
        if rest.is_empty() {
            return Err(invalid("missing payload"));
        }

        match protocol {
            '0' => {
                if rest.len() > 20 || !rest.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("ID must be a decimal u64"));
                }
                rest.parse::<u64>()
                    .map(FilAddress::Id)
                    .map_err(|_| invalid("ID must be a decimal u64"))
            }
            '1' | '2' | '3' => {
                let proto = if protocol == '1' { 1 } else if protocol == '2' { 2 } else { 3 };
                let raw = decode_base32(rest).ok_or_else(|| invalid("bad base32"))?;
                let payload = split_checksum(s, proto, &raw, &[])?;
                match proto {
                    3 if payload.len() == BLS_PAYLOAD_LEN => Ok(FilAddress::Bls(payload.to_vec())),
                    3 => Err(invalid("payload must be 48 bytes")),
                    _ => {
                        let bytes: [u8; HASH_PAYLOAD_LEN] = payload
                            .try_into()
                            .map_err(|_| invalid("payload must be 20 bytes"))?;
                        Ok(if proto == 1 {
                            FilAddress::Secp256k1(bytes)
                        } else {
                            FilAddress::Actor(bytes)
                        })
                    }
                }
            }
            '4' => {
                let (ns_str, encoded) = rest
                    .split_once('f')
                    .ok_or_else(|| invalid("delegated address needs '<namespace>f'"))?;
                let namespace: u64 = ns_str
                    .parse()
                    .map_err(|_| invalid("namespace must be a decimal u64"))?;
                let raw = decode_base32(encoded).ok_or_else(|| invalid("bad base32"))?;
                let sub = split_checksum(s, 4, &raw, &leb128(namespace))?;
                if sub.len() > MAX_SUBADDRESS_LEN {
                    return Err(invalid("subaddress longer than 54 bytes"));
                }
                Ok(FilAddress::Delegated {
                    namespace,
                    subaddress: sub.to_vec(),
                })
            }
            _ => Err(invalid("unknown protocol")),
        }
    }

    /// Encode for the given network.
    pub fn encode(&self, network: Network) -> String {
        let prefix = network.address_prefix();
        match self {
            FilAddress::Id(id) => format!("{}0{}", prefix, id),
            FilAddress::Secp256k1(p) | FilAddress::Actor(p) => format!(
                "{}{}{}",
                prefix,
                self.protocol(),
                encode_with_checksum(self.protocol(), p, p)
            ),
            FilAddress::Bls(p) => {
                format!("{}3{}", prefix, encode_with_checksum(3, p, p))
            }
            FilAddress::Delegated {
                namespace,
                subaddress,
            } => {
                let mut checked = leb128(*namespace);
                checked.extend_from_slice(subaddress);
                format!(
                    "{}4{}f{}",
                    prefix,
                    namespace,
                    encode_with_checksum(4, subaddress, &checked)
                )
            }
        }
    }

    /// FEVM address for this Filecoin address, when one exists.
    pub fn to_eth_address(&self) -> Result<Address, PrimitivesError> {
        match self {
            FilAddress::Id(id) => {
                let mut bytes = [0u8; 20];
                bytes[0] = MASKED_ID_PREFIX;
                bytes[12..].copy_from_slice(&id.to_be_bytes());
                Ok(Address::from(bytes))
            }
            FilAddress::Delegated {
                namespace,
                subaddress,
            } if *namespace == EAM_NAMESPACE && subaddress.len() == 20 => {
                Ok(Address::from_slice(subaddress))
            }
            other => Err(PrimitivesError::NoEthEquivalent(
                other.encode(Network::Mainnet),
            )),
        }
    }

    /// Filecoin form of an FEVM address: masked IDs become `f0`, anything
    /// else becomes `f410`.
    pub fn from_eth_address(address: &Address) -> Self {
        let bytes = address.as_bytes();
        if bytes[0] == MASKED_ID_PREFIX && bytes[1..12].iter().all(|b| *b == 0) {
            let mut id = [0u8; 8];
            id.copy_from_slice(&bytes[12..]);
            return FilAddress::Id(u64::from_be_bytes(id));
        }
        FilAddress::Delegated {
            namespace: EAM_NAMESPACE,
            subaddress: bytes.to_vec(),
        }
    }
}

impl fmt::Display for FilAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(Network::Mainnet))
    }
}

/// Parse either a `0x` address or a Filecoin address with an FEVM mapping.
pub fn parse_address(input: &str) -> Result<Address, PrimitivesError> {
    let s = input.trim();
    if s.starts_with("0x") || s.starts_with("0X") {
        parse_eth_address(s)
    } else {
        FilAddress::parse(s)?.to_eth_address()
    }
}

fn checksum(protocol: u8, payload: &[u8]) -> Result<[u8; CHECKSUM_LEN], PrimitivesError> {
    let mut out = [0u8; CHECKSUM_LEN];
    let mut hasher = Blake2bVar::new(CHECKSUM_LEN)
        .map_err(|_| PrimitivesError::ChecksumMismatch("invalid digest size".into()))?;
    hasher.update(&[protocol]);
    hasher.update(payload);
    hasher
        .finalize_variable(&mut out)
        .map_err(|_| PrimitivesError::ChecksumMismatch("invalid digest size".into()))?;
    Ok(out)
}

/// Verify the trailing checksum of `raw` and return the payload in front of
/// it. `prefix` is hashed ahead of the payload (the namespace for delegated
/// addresses).
fn split_checksum<'a>(
    input: &str,
    protocol: u8,
    raw: &'a [u8],
    prefix: &[u8],
) -> Result<&'a [u8], PrimitivesError> {
    if raw.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidFilAddress {
            input: input.to_string(),
            reason: "payload too short",
        });
    }
    let (payload, sum) = raw.split_at(raw.len() - CHECKSUM_LEN);
    let mut checked = prefix.to_vec();
    checked.extend_from_slice(payload);
    if checksum(protocol, &checked)? != sum {
        return Err(PrimitivesError::ChecksumMismatch(input.to_string()));
    }
    Ok(payload)
}

fn encode_with_checksum(protocol: u8, payload: &[u8], checked: &[u8]) -> String {
    let mut buf = payload.to_vec();
    // Blake2bVar only fails for digest sizes outside 1..=64.
    if let Ok(sum) = checksum(protocol, checked) {
        buf.extend_from_slice(&sum);
    }
    BASE32_NOPAD.encode(&buf).to_ascii_lowercase()
}

fn decode_base32(s: &str) -> Option<Vec<u8>> {
    BASE32_NOPAD.decode(s.to_ascii_uppercase().as_bytes()).ok()
}

fn leb128(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}
