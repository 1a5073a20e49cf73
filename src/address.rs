use crate::error::{Result, WalletError};
use sha3::{Digest, Keccak256};

const ADDRESS_HEX_LEN: usize = 40;

/// EIP-55 mixed-case checksum encoding of a 20-byte address.
pub fn to_checksum_address(address: &str) -> Result<String> {
    let hex_part = strip_hex_prefix(address)
        .ok_or_else(|| WalletError::InvalidAddress(format!("{} is missing the 0x prefix", address)))?;
    let bytes = hex::decode(hex_part)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?;
    if bytes.len() * 2 != ADDRESS_HEX_LEN {
        return Err(WalletError::InvalidAddress(format!(
            "{} is not 20 bytes long",
            address
        )));
    }

    let lower = hex_part.to_ascii_lowercase();
    let hash = hex::encode(Keccak256::digest(lower.as_bytes()));

    let mut out = String::with_capacity(ADDRESS_HEX_LEN + 2);
    out.push_str("0x");
    for (c, h) in lower.chars().zip(hash.chars()) {
        // Letters are upper-cased where the hash nibble is >= 8
        if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Check that `input` looks like an account address before it is sent to the
/// provider. All-lowercase and all-uppercase input skip the checksum check.
pub fn validate_address(input: &str) -> Result<String> {
    let address = input.trim();
    if address.is_empty() {
        return Err(WalletError::InvalidAddress("address is empty".to_string()));
    }

    let checksummed = to_checksum_address(address)?;
    let hex_part = &address[2..];
    let mixed_case = hex_part.chars().any(|c| c.is_ascii_lowercase())
        && hex_part.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case && checksummed[2..] != *hex_part {
        return Err(WalletError::InvalidAddress(format!(
            "{} has an invalid checksum",
            address
        )));
    }

    Ok(address.to_string())
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors from EIP-55
    const CHECKSUMMED: &[&str] = &[
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for expected in CHECKSUMMED {
            let lower = expected.to_lowercase();
            assert_eq!(to_checksum_address(&lower).unwrap(), *expected);
        }
    }

    #[test]
    fn test_validate_accepts_checksummed_and_single_case() {
        for addr in CHECKSUMMED {
            assert_eq!(validate_address(addr).unwrap(), *addr);
            assert!(validate_address(&addr.to_lowercase()).is_ok());
        }
        assert_eq!(
            validate_address("  0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed \n").unwrap(),
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        );
    }

    #[test]
    fn test_validate_accepts_uppercase_prefix() {
        let input = "0X5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(validate_address(input).unwrap(), input);
        assert!(validate_address("0X5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").is_ok());
        assert!(validate_address("0X5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_checksum() {
        let err = validate_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        for input in ["", "   ", "0xABC", "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", "0xzzzz"] {
            assert!(
                matches!(validate_address(input), Err(WalletError::InvalidAddress(_))),
                "{:?} should be rejected",
                input
            );
        }
    }
}
