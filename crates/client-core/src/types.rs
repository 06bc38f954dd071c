use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::index::{IntoWalletIndex, WalletIndex};

/// Network a client is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_testnet(self) -> bool {
        matches!(self, Network::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// An asset held on a chain: the native coin, or a token identified by contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub chain: String,
    pub symbol: String,
    pub contract: Option<String>,
}

impl Asset {
    pub fn native(chain: &str, symbol: &str) -> Self {
        Self {
            chain: chain.to_string(),
            symbol: symbol.to_string(),
            contract: None,
        }
    }

    pub fn token(chain: &str, symbol: &str, contract: &str) -> Self {
        Self {
            chain: chain.to_string(),
            symbol: symbol.to_string(),
            contract: Some(contract.to_string()),
        }
    }

    pub fn is_native(&self) -> bool {
        self.contract.is_none()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.contract {
            Some(contract) => write!(f, "{}.{}-{}", self.chain, self.symbol, contract),
            None => write!(f, "{}.{}", self.chain, self.symbol),
        }
    }
}

/// Balance of one asset, in the asset's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: Asset,
    pub amount: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Transfer,
    Unknown,
}

/// One side of a transaction movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLeg {
    pub address: String,
    pub amount: u128,
}

/// A transaction as reported by an explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub hash: String,
    pub asset: Asset,
    pub from: Vec<TxLeg>,
    pub to: Vec<TxLeg>,
    /// Block time in unix seconds; `None` while unconfirmed.
    pub date: Option<u64>,
    pub tx_type: TxType,
}

/// One page of transaction ids for an address, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub total: u64,
    pub txids: Vec<String>,
}

/// Assembled transaction history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPage {
    pub total: u64,
    pub txs: Vec<Tx>,
}

/// Parameters of one transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    /// Defaults to index 0.
    #[serde(default)]
    pub wallet_index: Option<WalletIndex>,
    pub recipient: String,
    pub amount: u128,
    #[serde(default)]
    pub memo: Option<String>,
    /// Base units per byte (UTXO) or per gas (EVM). Caller value wins over
    /// the suggested tier.
    #[serde(default)]
    pub fee_rate: Option<f64>,
    /// `None` means the chain's native asset.
    #[serde(default)]
    pub asset: Option<Asset>,
}

impl TransferParams {
    pub fn new(recipient: impl Into<String>, amount: u128) -> Self {
        Self {
            wallet_index: None,
            recipient: recipient.into(),
            amount,
            memo: None,
            fee_rate: None,
            asset: None,
        }
    }

    pub fn with_wallet_index(mut self, index: impl IntoWalletIndex) -> Result<Self, ClientError> {
        self.wallet_index = Some(index.into_wallet_index()?);
        Ok(self)
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_fee_rate(mut self, rate: f64) -> Self {
        self.fee_rate = Some(rate);
        self
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn index(&self) -> WalletIndex {
        self.wallet_index.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_display() {
        assert_eq!(Network::Mainnet.to_string(), "mainnet");
        assert_eq!(Network::Testnet.to_string(), "testnet");
        assert!(Network::Testnet.is_testnet());
    }

    #[test]
    fn asset_display() {
        assert_eq!(Asset::native("BTC", "BTC").to_string(), "BTC.BTC");
        let usdt = Asset::token("ETH", "USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7");
        assert!(!usdt.is_native());
        assert!(usdt.to_string().starts_with("ETH.USDT-0x"));
    }

    #[test]
    fn transfer_params_default_index_is_zero() {
        let params = TransferParams::new("bc1q...", 1_000);
        assert_eq!(params.index(), WalletIndex::ZERO);
    }

    #[test]
    fn transfer_params_reject_invalid_index() {
        let result = TransferParams::new("bc1q...", 1_000).with_wallet_index(-1);
        assert!(matches!(result, Err(ClientError::InvalidIndex(_))));
        let result = TransferParams::new("bc1q...", 1_000).with_wallet_index(0.5);
        assert!(matches!(result, Err(ClientError::InvalidIndex(_))));
    }

    #[test]
    fn transfer_params_from_json() {
        let params: TransferParams = serde_json::from_str(
            r#"{"walletIndex": 2, "recipient": "tb1qxyz", "amount": 40000, "memo": "SWAP:BTC.BTC"}"#,
        )
        .unwrap();
        assert_eq!(params.index().value(), 2);
        assert_eq!(params.memo.as_deref(), Some("SWAP:BTC.BTC"));
        assert!(params.fee_rate.is_none());

        let bad = serde_json::from_str::<TransferParams>(
            r#"{"walletIndex": -1, "recipient": "tb1qxyz", "amount": 1}"#,
        );
        assert!(bad.is_err());
    }
}
