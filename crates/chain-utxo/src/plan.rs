//! Coin selection and transaction planning.
//!
//! Sizes come from serialising a skeleton of the real transaction with
//! maximal placeholder signatures, so the fee paid is never below what the
//! signed transaction needs.

use bitcoin::absolute::LockTime;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, ScriptBuf, Transaction, TxIn, TxOut, Witness};
use client_core::fee_for;
use tracing::debug;

use crate::error::UtxoError;
use crate::params::{ScriptKind, UtxoChain, MAX_MEMO_BYTES};
use crate::utxo::{order_for_selection, total_value, UtxoEntry};

/// Largest low-R DER signature plus its sighash byte.
pub(crate) const MAX_SIGNATURE_LEN: usize = 71;
pub(crate) const COMPRESSED_PUBKEY_LEN: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRole {
    Recipient,
    Memo,
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOutput {
    pub role: OutputRole,
    pub value: u64,
    pub script_pubkey: ScriptBuf,
}

impl PlannedOutput {
    fn to_txout(&self) -> TxOut {
        TxOut {
            value: Amount::from_sat(self.value),
            script_pubkey: self.script_pubkey.clone(),
        }
    }
}

/// An unsigned transaction plan.
///
/// Always satisfies `input_total() == amount + fee + change`.
#[derive(Debug, Clone, PartialEq)]
pub struct TxPlan {
    pub chain: UtxoChain,
    /// Selected inputs, in signing order.
    pub inputs: Vec<UtxoEntry>,
    /// Recipient first, then the memo, then change.
    pub outputs: Vec<PlannedOutput>,
    pub amount: u64,
    pub fee_rate: f64,
    /// Virtual size of the planned transaction with maximal signatures.
    pub vsize: u64,
    pub fee: u64,
    pub change: u64,
}

impl TxPlan {
    pub fn input_total(&self) -> u64 {
        total_value(&self.inputs)
    }

    pub fn output_total(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    pub fn has_change(&self) -> bool {
        self.outputs.iter().any(|o| o.role == OutputRole::Change)
    }

    pub(crate) fn txouts(&self) -> Vec<TxOut> {
        self.outputs.iter().map(PlannedOutput::to_txout).collect()
    }
}

/// What to pay, and where change goes.
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub chain: UtxoChain,
    pub recipient: &'a ScriptBuf,
    pub amount: u64,
    pub memo: Option<&'a str>,
    pub change_script: &'a ScriptBuf,
    pub fee_rate: f64,
}

/// Reject memos that would not be relayed.
pub fn check_memo(memo: &str) -> Result<(), UtxoError> {
    if memo.len() > MAX_MEMO_BYTES {
        return Err(UtxoError::MemoTooLong {
            len: memo.len(),
            max: MAX_MEMO_BYTES,
        });
    }
    Ok(())
}

/// Zero-value `OP_RETURN <memo>` locking script.
pub fn memo_script(memo: &str) -> Result<ScriptBuf, UtxoError> {
    check_memo(memo)?;
    let data = PushBytesBuf::try_from(memo.as_bytes().to_vec())
        .map_err(|e| UtxoError::TransactionBuildError(format!("memo push failed: {e}")))?;
    Ok(ScriptBuf::new_op_return(&data))
}

/// `<sig> <pubkey>` unlocking script for a P2PKH input.
pub(crate) fn p2pkh_script_sig(signature: &[u8], pubkey: &[u8]) -> Result<ScriptBuf, UtxoError> {
    let push = |bytes: &[u8]| {
        PushBytesBuf::try_from(bytes.to_vec())
            .map_err(|e| UtxoError::TransactionBuildError(format!("script push failed: {e}")))
    };
    Ok(Builder::new()
        .push_slice(&push(signature)?)
        .push_slice(&push(pubkey)?)
        .into_script())
}

pub(crate) fn unsigned_input(chain: UtxoChain, previous_output: OutPoint) -> TxIn {
    TxIn {
        previous_output,
        script_sig: ScriptBuf::new(),
        sequence: chain.sequence(),
        witness: Witness::default(),
    }
}

pub(crate) fn skeleton(input: Vec<TxIn>, output: Vec<TxOut>) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input,
        output,
    }
}

/// Virtual size of a transaction spending `input_count` of the wallet's
/// own outputs into `outputs`, with maximal-length signatures.
pub fn planned_vsize(chain: UtxoChain, input_count: usize, outputs: &[TxOut]) -> Result<u64, UtxoError> {
    let placeholder_sig = [0u8; MAX_SIGNATURE_LEN];
    let placeholder_key = [0u8; COMPRESSED_PUBKEY_LEN];

    let mut inputs = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        let mut input = unsigned_input(chain, OutPoint::null());
        match chain.script_kind() {
            ScriptKind::P2wpkh => {
                input.witness = Witness::from_slice(&[&placeholder_sig[..], &placeholder_key[..]]);
            }
            ScriptKind::P2pkh => {
                input.script_sig = p2pkh_script_sig(&placeholder_sig, &placeholder_key)?;
            }
        }
        inputs.push(input);
    }
    Ok(skeleton(inputs, outputs.to_vec()).vsize() as u64)
}

/// Select inputs largest-first and lay out outputs.
///
/// Inputs are added until they cover `amount` plus the fee of a
/// transaction without change. Change is added when what remains after
/// the with-change fee reaches the dust threshold; otherwise the remainder
/// goes to the fee.
pub fn plan_transaction(request: &PlanRequest<'_>, mut utxos: Vec<UtxoEntry>) -> Result<TxPlan, UtxoError> {
    let chain = request.chain;
    let amount = request.amount;
    let rate = request.fee_rate;

    let mut outputs = vec![PlannedOutput {
        role: OutputRole::Recipient,
        value: amount,
        script_pubkey: request.recipient.clone(),
    }];
    if let Some(memo) = request.memo {
        outputs.push(PlannedOutput {
            role: OutputRole::Memo,
            value: 0,
            script_pubkey: memo_script(memo)?,
        });
    }
    let base: Vec<TxOut> = outputs.iter().map(PlannedOutput::to_txout).collect();
    let mut with_change = base.clone();
    with_change.push(TxOut {
        value: Amount::ZERO,
        script_pubkey: request.change_script.clone(),
    });

    order_for_selection(&mut utxos);

    let mut selected: Vec<UtxoEntry> = Vec::new();
    let mut total: u64 = 0;
    let mut vsize_without = planned_vsize(chain, 0, &base)?;
    let mut fee_without = fee_for(rate, vsize_without);

    let mut candidates = utxos.into_iter();
    loop {
        let Some(utxo) = candidates.next() else {
            return Err(UtxoError::InsufficientFunds {
                needed: amount.saturating_add(fee_without),
                available: total,
            });
        };
        total = total.saturating_add(utxo.value);
        selected.push(utxo);

        vsize_without = planned_vsize(chain, selected.len(), &base)?;
        fee_without = fee_for(rate, vsize_without);
        debug!(inputs = selected.len(), total, fee = fee_without, "selection step");
        if total >= amount.saturating_add(fee_without) {
            break;
        }
    }

    let vsize_with = planned_vsize(chain, selected.len(), &with_change)?;
    let fee_with = fee_for(rate, vsize_with);
    let change = total
        .checked_sub(amount.saturating_add(fee_with))
        .filter(|change| *change >= chain.dust_threshold());

    let (vsize, fee, change) = match change {
        Some(change) => {
            outputs.push(PlannedOutput {
                role: OutputRole::Change,
                value: change,
                script_pubkey: request.change_script.clone(),
            });
            (vsize_with, fee_with, change)
        }
        None => (vsize_without, total - amount, 0),
    };

    Ok(TxPlan {
        chain,
        inputs: selected,
        outputs,
        amount,
        fee_rate: rate,
        vsize,
        fee,
        change,
    })
}
