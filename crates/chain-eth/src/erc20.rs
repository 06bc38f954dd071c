//! The slice of the ERC-20 ABI the client needs: `balanceOf`.

use crate::error::EthError;

/// Function selector for `balanceOf(address)`: `0x70a08231`.
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Calldata for `balanceOf(owner)`: selector plus the address left-padded
/// to a 32-byte word.
pub fn encode_balance_of(owner: &[u8; 20]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(owner);
    data
}

/// Decodes the single uint256 a `balanceOf` call returns.
///
/// Balances above `u128::MAX` are rejected rather than truncated.
pub fn decode_balance(data: &[u8]) -> Result<u128, EthError> {
    if data.len() < 32 {
        return Err(EthError::EncodingError(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        )));
    }
    let (high, low) = data[..32].split_at(16);
    if high.iter().any(|&b| b != 0) {
        return Err(EthError::EncodingError("token balance exceeds u128".into()));
    }
    let mut word = [0u8; 16];
    word.copy_from_slice(low);
    Ok(u128::from_be_bytes(word))
}
