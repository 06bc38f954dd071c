use bitcoin::consensus::serialize;
use bitcoin::hashes::Hash;
use bitcoin::script::ScriptBuf;
use bitcoin::secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{Amount, CompressedPublicKey, Transaction, TxOut, Witness};
use sha2::{Digest, Sha256};

use crate::error::UtxoError;
use crate::params::{ScriptKind, SighashScheme, UtxoChain};
use crate::plan::{p2pkh_script_sig, skeleton, unsigned_input, TxPlan};

/// `SIGHASH_ALL | SIGHASH_FORKID`.
pub const SIGHASH_ALL_FORKID: u32 = 0x41;

/// An unsigned transaction ready for signing.
#[derive(Debug, Clone)]
pub struct UnsignedUtxoTx {
    pub chain: UtxoChain,
    /// The transaction with empty unlocking data.
    pub tx: Transaction,
    /// The outputs being spent, in input order. Needed for sighashes.
    pub prevouts: Vec<TxOut>,
}

/// A fully signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub txid: String,
    pub vsize: u64,
}

impl SignedTransaction {
    pub fn hex(&self) -> String {
        hex::encode(&self.raw)
    }
}

/// Turn a plan into an unsigned transaction, inputs and outputs in plan order.
pub fn build_unsigned(plan: &TxPlan) -> Result<UnsignedUtxoTx, UtxoError> {
    let mut inputs = Vec::with_capacity(plan.inputs.len());
    let mut prevouts = Vec::with_capacity(plan.inputs.len());
    for utxo in &plan.inputs {
        inputs.push(unsigned_input(plan.chain, utxo.outpoint()?));
        prevouts.push(TxOut {
            value: Amount::from_sat(utxo.value),
            script_pubkey: ScriptBuf::from(utxo.script_pubkey.clone()),
        });
    }
    Ok(UnsignedUtxoTx {
        chain: plan.chain,
        tx: skeleton(inputs, plan.txouts()),
        prevouts,
    })
}

/// Sign every input with `private_key`, in order.
///
/// All inputs must be locked to the key's own script for the chain.
pub fn sign_transaction(unsigned: &UnsignedUtxoTx, private_key: &[u8; 32]) -> Result<SignedTransaction, UtxoError> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(private_key)
        .map_err(|e| UtxoError::SigningError(format!("invalid secret key: {e}")))?;
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    let compressed = CompressedPublicKey(public_key);

    let own_script = match unsigned.chain.script_kind() {
        ScriptKind::P2wpkh => ScriptBuf::new_p2wpkh(&compressed.wpubkey_hash()),
        ScriptKind::P2pkh => ScriptBuf::new_p2pkh(&compressed.pubkey_hash()),
    };
    if unsigned.prevouts.len() != unsigned.tx.input.len() {
        return Err(UtxoError::SigningError("prevout count does not match inputs".into()));
    }
    if let Some(index) = unsigned
        .prevouts
        .iter()
        .position(|prevout| prevout.script_pubkey != own_script)
    {
        return Err(UtxoError::SigningError(format!(
            "input {index} is not locked to the signing key"
        )));
    }

    let mut signed_tx = unsigned.tx.clone();
    match unsigned.chain.sighash_scheme() {
        SighashScheme::SegwitV0 => {
            let mut sighash_cache = SighashCache::new(&unsigned.tx);
            for (input_index, prevout) in unsigned.prevouts.iter().enumerate() {
                let sighash = sighash_cache
                    .p2wpkh_signature_hash(input_index, &own_script, prevout.value, EcdsaSighashType::All)
                    .map_err(|e| UtxoError::SigningError(format!("sighash computation failed: {e}")))?;

                let msg = Message::from_digest(sighash.to_byte_array());
                let signature = secp.sign_ecdsa_low_r(&msg, &secret_key);

                let mut sig_bytes = signature.serialize_der().to_vec();
                sig_bytes.push(EcdsaSighashType::All as u8);

                signed_tx.input[input_index].witness =
                    Witness::from_slice(&[sig_bytes, public_key.serialize().to_vec()]);
            }
        }
        SighashScheme::ForkId => {
            for (input_index, prevout) in unsigned.prevouts.iter().enumerate() {
                let digest = forkid_sighash(&unsigned.tx, input_index, &own_script, prevout.value)?;
                let msg = Message::from_digest(digest);
                let signature = secp.sign_ecdsa_low_r(&msg, &secret_key);

                let mut sig_bytes = signature.serialize_der().to_vec();
                sig_bytes.push(SIGHASH_ALL_FORKID as u8);

                signed_tx.input[input_index].script_sig =
                    p2pkh_script_sig(&sig_bytes, &public_key.serialize())?;
            }
        }
    }

    Ok(SignedTransaction {
        raw: serialize(&signed_tx),
        txid: signed_tx.compute_txid().to_string(),
        vsize: signed_tx.vsize() as u64,
    })
}

fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// BIP-143 style digest with the fork id flag, as used by Bitcoin Cash.
pub(crate) fn forkid_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &ScriptBuf,
    value: Amount,
) -> Result<[u8; 32], UtxoError> {
    bip143_sighash(tx, input_index, script_code, value, SIGHASH_ALL_FORKID)
}

fn bip143_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &ScriptBuf,
    value: Amount,
    sighash_type: u32,
) -> Result<[u8; 32], UtxoError> {
    let input = tx.input.get(input_index).ok_or_else(|| {
        UtxoError::SigningError(format!("input {input_index} out of range"))
    })?;

    let mut prevouts = Vec::with_capacity(tx.input.len() * 36);
    let mut sequences = Vec::with_capacity(tx.input.len() * 4);
    for txin in &tx.input {
        prevouts.extend_from_slice(&serialize(&txin.previous_output));
        sequences.extend_from_slice(&txin.sequence.0.to_le_bytes());
    }
    let mut outputs = Vec::new();
    for txout in &tx.output {
        outputs.extend_from_slice(&serialize(txout));
    }

    let mut preimage = Vec::with_capacity(156 + script_code.len());
    preimage.extend_from_slice(&tx.version.0.to_le_bytes());
    preimage.extend_from_slice(&sha256d(&prevouts));
    preimage.extend_from_slice(&sha256d(&sequences));
    preimage.extend_from_slice(&serialize(&input.previous_output));
    preimage.extend_from_slice(&serialize(script_code));
    preimage.extend_from_slice(&value.to_sat().to_le_bytes());
    preimage.extend_from_slice(&input.sequence.0.to_le_bytes());
    preimage.extend_from_slice(&sha256d(&outputs));
    preimage.extend_from_slice(&tx.lock_time.to_consensus_u32().to_le_bytes());
    preimage.extend_from_slice(&sighash_type.to_le_bytes());
    Ok(sha256d(&preimage))
}
