//! Filecoin networks the client can target.

use std::fmt;
use std::str::FromStr;

use crate::PrimitivesError;

/// A Filecoin network with an FEVM chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Network {
    #[default]
    Mainnet,
    Calibration,
}

impl Network {
    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 314,
            Network::Calibration => 314_159,
        }
    }

    /// Leading character of textual Filecoin addresses.
    pub fn address_prefix(&self) -> char {
        match self {
            Network::Mainnet => 'f',
            Network::Calibration => 't',
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            314 => Some(Network::Mainnet),
            314_159 => Some(Network::Calibration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Calibration => "calibnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "calibnet" | "calibration" => Ok(Network::Calibration),
            other => Err(PrimitivesError::UnknownNetwork(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_network() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("Calibnet".parse::<Network>().unwrap(), Network::Calibration);
        assert_eq!("calibration".parse::<Network>().unwrap(), Network::Calibration);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_chain_ids() {
        assert_eq!(Network::Mainnet.chain_id(), 314);
        assert_eq!(Network::from_chain_id(314_159), Some(Network::Calibration));
        assert_eq!(Network::from_chain_id(1), None);
    }
}
