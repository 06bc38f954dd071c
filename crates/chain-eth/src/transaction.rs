use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use crate::address::parse_address;
use crate::error::EthError;

/// EIP-2718 type byte of an EIP-1559 transaction.
const EIP1559_TX_TYPE: u8 = 0x02;

/// An unsigned EIP-1559 (type 2) value transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    pub to: [u8; 20],
    /// Transfer value in wei.
    pub value: u128,
}

/// A signed EIP-1559 transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// `0x02 || rlp(signed fields)`.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx`, 0x-prefixed.
    pub tx_hash: String,
}

impl SignedEthTransaction {
    /// 0x-prefixed hex, the form `eth_sendRawTransaction` takes.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }
}

/// Builds an unsigned EIP-1559 ETH transfer.
pub fn build_transfer(
    chain_id: u64,
    nonce: u64,
    to: &str,
    value_wei: u128,
    max_priority_fee: u128,
    max_fee: u128,
    gas_limit: u64,
) -> Result<EthTransaction, EthError> {
    let to = parse_address(to)?;
    if max_priority_fee > max_fee {
        return Err(EthError::TransactionBuildError(format!(
            "priority fee {max_priority_fee} exceeds max fee {max_fee}"
        )));
    }

    Ok(EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: max_priority_fee,
        max_fee_per_gas: max_fee,
        gas_limit,
        to,
        value: value_wei,
    })
}

/// Signs an EIP-1559 transaction with a secp256k1 private key.
///
/// The signature covers Keccak-256 of `0x02 || rlp(unsigned fields)`; the
/// signed encoding appends `y_parity`, `r` and `s` to the same fields.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EthError> {
    let msg_hash = Keccak256::digest(encode_unsigned_tx(tx));
    let (signature, recovery_id) = sign_prehash(private_key, &msg_hash)?;

    let signed_fields = SignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to),
        value: tx.value,
        data: RlpBytes::default(),
        access_list: Vec::new(),
        signature_y_parity: u8::from(recovery_id.is_y_odd()),
        signature_r: RlpU256::from_slice(&signature.r().to_bytes()),
        signature_s: RlpU256::from_slice(&signature.s().to_bytes()),
    };
    let raw_tx = typed_envelope(&signed_fields);
    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

/// `0x02 || rlp([chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas,
/// gas_limit, to, value, data, access_list])`.
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Vec<u8> {
    typed_envelope(&UnsignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to),
        value: tx.value,
        data: RlpBytes::default(),
        access_list: Vec::new(),
    })
}

fn typed_envelope(fields: &impl Encodable) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + fields.length());
    out.push(EIP1559_TX_TYPE);
    fields.encode(&mut out);
    out
}

fn sign_prehash(private_key: &[u8; 32], hash: &[u8]) -> Result<(Signature, RecoveryId), EthError> {
    let key_bytes = Zeroizing::new(*private_key);
    let key_bytes: &[u8; 32] = &key_bytes;
    let signing_key = SigningKey::from_bytes(key_bytes.into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    signing_key
        .sign_prehash(hash)
        .map_err(|e| EthError::SigningError(e.to_string()))
}

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: u128,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: u128,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
    signature_y_parity: u8,
    signature_r: RlpU256,
    signature_s: RlpU256,
}

/// EIP-2930 access list entry. Transfers always send an empty list.
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: RlpAddress,
    storage_keys: Vec<RlpAddress>,
}

/// 20-byte address encoded as an RLP string.
#[derive(Debug, Clone)]
struct RlpAddress([u8; 20]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Calldata encoded as an RLP string. A bare `Vec<u8>` would encode as a
/// list of single-byte items.
#[derive(Debug, Clone, Default)]
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// 256-bit integer encoded big-endian with leading zeros stripped.
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl RlpU256 {
    fn from_slice(bytes: &[u8]) -> Self {
        let mut word = [0u8; 32];
        word[32 - bytes.len()..].copy_from_slice(bytes);
        Self(word)
    }

    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}
