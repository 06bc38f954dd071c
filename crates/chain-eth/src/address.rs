use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Derives the EIP-55 checksummed address of an uncompressed secp256k1
/// public key (65 bytes, starting with 0x04).
///
/// The address is the last 20 bytes of Keccak-256 over the 64-byte key
/// without its prefix.
pub fn pubkey_to_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash[12..]);
    Ok(checksum_address(&addr_bytes))
}

/// Parses `0x` + 40 hex characters into address bytes.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are
/// accepted as is; mixed case must match EIP-55 exactly.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(hex_part, &mut bytes)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let is_all_lower = !hex_part.chars().any(|c| c.is_ascii_uppercase());
    let is_all_upper = !hex_part.chars().any(|c| c.is_ascii_lowercase());
    if !is_all_lower && !is_all_upper && checksum_address(&bytes)[2..] != *hex_part {
        return Err(EthError::InvalidAddress(format!(
            "{address} fails its EIP-55 checksum"
        )));
    }
    Ok(bytes)
}

pub fn validate_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

/// Canonical (checksummed) form of a valid address.
pub fn normalize_address(address: &str) -> Result<String, EthError> {
    parse_address(address).map(|bytes| checksum_address(&bytes))
}

/// EIP-55 mixed-case encoding: a hex letter is uppercased when the
/// matching nibble of Keccak-256(lowercase hex) is 8 or more.
pub fn checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}
