//! CashAddr encoding for Bitcoin Cash addresses.
//!
//! Only the 160-bit hash size is supported, which covers P2PKH and P2SH.

use crate::error::UtxoError;

pub const MAINNET_PREFIX: &str = "bitcoincash";
pub const TESTNET_PREFIX: &str = "bchtest";

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashAddrKind {
    P2pkh,
    P2sh,
}

impl CashAddrKind {
    fn version_byte(self) -> u8 {
        // type bits 3..6, size code 0 (160 bits)
        match self {
            CashAddrKind::P2pkh => 0x00,
            CashAddrKind::P2sh => 0x08,
        }
    }

    fn from_version_byte(byte: u8) -> Result<Self, UtxoError> {
        match byte {
            0x00 => Ok(CashAddrKind::P2pkh),
            0x08 => Ok(CashAddrKind::P2sh),
            other => Err(UtxoError::InvalidAddress(format!(
                "unsupported cashaddr version byte 0x{other:02x}"
            ))),
        }
    }
}

/// A decoded CashAddr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashAddr {
    pub prefix: String,
    pub kind: CashAddrKind,
    pub hash: [u8; 20],
}

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}

fn expand_prefix(prefix: &str) -> Vec<u8> {
    let mut out: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    out.push(0);
    out
}

/// Regroup bits; `pad` allows a trailing partial group on encode.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, UtxoError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        let value = u32::from(value);
        if value >> from != 0 {
            return Err(UtxoError::InvalidAddress("cashaddr value out of range".into()));
        }
        acc = ((acc << from) | value) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(UtxoError::InvalidAddress("cashaddr has non-zero padding".into()));
    }
    Ok(out)
}

pub fn encode(prefix: &str, kind: CashAddrKind, hash: &[u8; 20]) -> Result<String, UtxoError> {
    let mut payload = Vec::with_capacity(21);
    payload.push(kind.version_byte());
    payload.extend_from_slice(hash);
    let data = convert_bits(&payload, 8, 5, true)?;

    let mut checked = expand_prefix(prefix);
    checked.extend_from_slice(&data);
    checked.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let checksum = polymod(&checked);

    let mut out = String::with_capacity(prefix.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(prefix);
    out.push(':');
    for &d in &data {
        out.push(char::from(CHARSET[usize::from(d)]));
    }
    for i in 0..CHECKSUM_LEN {
        let d = (checksum >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f;
        out.push(char::from(CHARSET[d as usize]));
    }
    Ok(out)
}

/// Decode `address`; a missing prefix is taken to be `default_prefix`.
pub fn decode(address: &str, default_prefix: &str) -> Result<CashAddr, UtxoError> {
    let has_lower = address.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(UtxoError::InvalidAddress("cashaddr has mixed case".into()));
    }
    let address = address.to_ascii_lowercase();

    let (prefix, body) = match address.split_once(':') {
        Some((prefix, body)) => (prefix.to_string(), body),
        None => (default_prefix.to_string(), address.as_str()),
    };
    if body.len() <= CHECKSUM_LEN {
        return Err(UtxoError::InvalidAddress("cashaddr too short".into()));
    }

    let mut data = Vec::with_capacity(body.len());
    for c in body.bytes() {
        let value = CHARSET
            .iter()
            .position(|&x| x == c)
            .ok_or_else(|| UtxoError::InvalidAddress(format!("invalid cashaddr character '{}'", char::from(c))))?;
        data.push(value as u8);
    }

    let mut checked = expand_prefix(&prefix);
    checked.extend_from_slice(&data);
    if polymod(&checked) != 0 {
        return Err(UtxoError::InvalidAddress("cashaddr checksum mismatch".into()));
    }

    let payload = convert_bits(&data[..data.len() - CHECKSUM_LEN], 5, 8, false)?;
    let (&version, hash) = payload
        .split_first()
        .ok_or_else(|| UtxoError::InvalidAddress("empty cashaddr payload".into()))?;
    let kind = CashAddrKind::from_version_byte(version)?;
    let hash: [u8; 20] = hash
        .try_into()
        .map_err(|_| UtxoError::InvalidAddress(format!("cashaddr hash is {} bytes", hash.len())))?;

    Ok(CashAddr { prefix, kind, hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_HEX: &str = "76a04053bda0a88bda5177b86a15c3b29f559873";

    fn hash() -> [u8; 20] {
        hex::decode(HASH_HEX).unwrap().try_into().unwrap()
    }

    #[test]
    fn encodes_reference_p2pkh() {
        assert_eq!(
            encode(MAINNET_PREFIX, CashAddrKind::P2pkh, &hash()).unwrap(),
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
        );
    }

    #[test]
    fn encodes_reference_p2sh() {
        assert_eq!(
            encode(MAINNET_PREFIX, CashAddrKind::P2sh, &hash()).unwrap(),
            "bitcoincash:ppm2qsznhks23z7629mms6s4cwef74vcwvn0h829pq"
        );
    }

    #[test]
    fn decodes_with_and_without_prefix() {
        let full = decode("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a", MAINNET_PREFIX).unwrap();
        let bare = decode("qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a", MAINNET_PREFIX).unwrap();
        assert_eq!(full, bare);
        assert_eq!(full.kind, CashAddrKind::P2pkh);
        assert_eq!(full.hash, hash());
    }

    #[test]
    fn uppercase_is_accepted() {
        let upper = "BITCOINCASH:QPM2QSZNHKS23Z7629MMS6S4CWEF74VCWVY22GDX6A";
        assert_eq!(decode(upper, MAINNET_PREFIX).unwrap().hash, hash());
    }

    #[test]
    fn rejects_mixed_case_and_bad_checksum() {
        assert!(decode("bitcoincash:Qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a", MAINNET_PREFIX).is_err());
        assert!(decode("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6q", MAINNET_PREFIX).is_err());
    }

    #[test]
    fn prefix_is_part_of_checksum() {
        let testnet = encode(TESTNET_PREFIX, CashAddrKind::P2pkh, &hash()).unwrap();
        assert!(testnet.starts_with("bchtest:qpm2qsznhks23z7629mms6s4cwef74vcwv"));
        let body = testnet.trim_start_matches("bchtest:");
        assert!(decode(body, MAINNET_PREFIX).is_err());
        assert!(decode(body, TESTNET_PREFIX).is_ok());
    }
}
