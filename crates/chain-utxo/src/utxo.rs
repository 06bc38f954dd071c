use bitcoin::{OutPoint, Txid};
use serde::{Deserialize, Serialize};

use crate::error::UtxoError;

/// A single unspent transaction output (UTXO).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    /// Transaction ID as a hex string (big-endian / display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// Value in base units.
    pub value: u64,
    /// Whether the funding transaction is mined.
    pub confirmed: bool,
    /// The locking script (scriptPubKey) serialized bytes.
    #[serde(with = "hex_bytes")]
    pub script_pubkey: Vec<u8>,
}

impl UtxoEntry {
    pub fn outpoint(&self) -> Result<OutPoint, UtxoError> {
        let txid: Txid = self
            .txid
            .parse()
            .map_err(|e| UtxoError::InvalidUtxo(format!("invalid txid {}: {e}", self.txid)))?;
        Ok(OutPoint::new(txid, self.vout))
    }
}

/// Entries that may fund a transfer. A memo transfer must not depend on
/// unconfirmed funds, so pending entries are dropped when `has_memo`.
pub fn eligible(utxos: Vec<UtxoEntry>, has_memo: bool) -> Vec<UtxoEntry> {
    if has_memo {
        utxos.into_iter().filter(|u| u.confirmed).collect()
    } else {
        utxos
    }
}

/// Largest value first. Stable, so equal values keep collaborator order.
pub fn order_for_selection(utxos: &mut [UtxoEntry]) {
    utxos.sort_by(|a, b| b.value.cmp(&a.value));
}

pub fn total_value(utxos: &[UtxoEntry]) -> u64 {
    utxos.iter().map(|u| u.value).sum()
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}
