//! FIL denominations.
//!
//! On-chain values and gas prices are attoFIL (10^-18 FIL). User input and
//! output are decimal FIL strings.

use crate::{PrimitivesError, U256};

/// attoFIL in one FIL.
pub const ATTO_PER_FIL: u64 = 1_000_000_000_000_000_000;

/// attoFIL in one nanoFIL.
pub const ATTO_PER_NANO: u64 = 1_000_000_000;

const FIL_DECIMALS: usize = 18;

/// Parse a decimal FIL amount into attoFIL.
pub fn parse_fil(input: &str) -> Result<U256, PrimitivesError> {
    let s = input.trim();
    let invalid = |reason| PrimitivesError::InvalidAmount {
        input: input.to_string(),
        reason,
    };

    if s.is_empty() {
        return Err(invalid("empty amount"));
    }
    if s.starts_with('-') {
        return Err(invalid("amount must not be negative"));
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("no digits"));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }
    if frac_part.len() > FIL_DECIMALS {
        return Err(invalid("more than 18 decimal places"));
    }

    let whole = if int_part.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int_part).map_err(|_| invalid("amount too large"))?
    };

    let mut padded = frac_part.to_string();
    padded.extend(std::iter::repeat('0').take(FIL_DECIMALS - frac_part.len()));
    let frac = U256::from_dec_str(&padded).map_err(|_| invalid("not a decimal number"))?;

    whole
        .checked_mul(U256::from(ATTO_PER_FIL))
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| invalid("amount too large"))
}

/// Format attoFIL as a decimal FIL string without trailing zeros.
pub fn format_fil(value: U256) -> String {
    format_scaled(value, ATTO_PER_FIL, FIL_DECIMALS)
}

/// Format attoFIL as nanoFIL (used for gas prices).
pub fn format_nano_fil(value: U256) -> String {
    format_scaled(value, ATTO_PER_NANO, 9)
}

fn format_scaled(value: U256, unit: u64, decimals: usize) -> String {
    let unit = U256::from(unit);
    let whole = value / unit;
    let frac = (value % unit).low_u64();

    if frac == 0 {
        return whole.to_string();
    }

    let frac_str = format!("{:0width$}", frac, width = decimals);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
