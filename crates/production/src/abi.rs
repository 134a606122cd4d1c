//! Minimal ABI helpers for argument-less calls.

use provisioner_core::LedgerError;
use provisioner_types::Address;
use sha3::{Digest, Keccak256};

/// Four-byte function selector of `signature`, e.g. `osp()`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Calldata for an argument-less function, as `0x`-prefixed hex.
pub fn encode_call(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Normalize a getter name into a signature: `osp` becomes `osp()`.
pub fn getter_signature(getter: &str) -> String {
    if getter.ends_with(')') {
        getter.to_string()
    } else {
        format!("{getter}()")
    }
}

/// Decode a single `address` return value.
pub fn decode_address(data: &str) -> Result<Address, LedgerError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    if digits.len() < 64 {
        return Err(LedgerError::Decode(format!(
            "expected a 32-byte word, got {} hex digits",
            digits.len()
        )));
    }

    let mut word = [0u8; 32];
    hex::decode_to_slice(&digits[..64], &mut word)
        .map_err(|e| LedgerError::Decode(e.to_string()))?;
    Ok(Address::from_word(&word))
}

/// Parse a JSON-RPC quantity (`0x`-prefixed, no leading zeros required).
pub fn parse_quantity(raw: &str) -> Result<u64, LedgerError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::Decode(format!("quantity {raw:?} lacks 0x prefix")))?;
    u64::from_str_radix(digits, 16).map_err(|e| LedgerError::Decode(format!("{raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("arbOSVersion()")), "051038f2");
    }

    #[test]
    fn test_getter_signature() {
        assert_eq!(getter_signature("osp"), "osp()");
        assert_eq!(getter_signature("osp()"), "osp()");
    }

    #[test]
    fn test_decode_address_word() {
        let word = format!("0x{}{}", "00".repeat(12), "ab".repeat(20));
        assert_eq!(decode_address(&word).unwrap(), Address::new([0xab; 20]));
        assert!(decode_address("0x").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x1a").unwrap(), 26);
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert!(parse_quantity("26").is_err());
    }
}
