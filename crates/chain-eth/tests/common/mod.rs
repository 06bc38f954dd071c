#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_eth::{default_config, EthClient, EvmNode};
use client_core::{
    Asset, Balance, Broadcaster, ClientError, Endpoints, Explorer, HistoryPage, Network,
    PhraseFactory, Tx, TxType,
};
use tokio::time::Instant;

pub const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const TEST_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";
pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";
pub const NODE_TXID: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

/// In-memory JSON-RPC node.
pub struct MockNode {
    pub chain_id: Result<u64, String>,
    pub nonce: u64,
    /// `None` makes `gas_price` fail.
    pub gas_price: Option<f64>,
    pub balance: u128,
    /// Keyed by lowercase contract address. Unknown contracts fail.
    pub token_balances: HashMap<String, u128>,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl MockNode {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id: Ok(chain_id),
            nonce: 4,
            gas_price: Some(20_000_000_000.0),
            balance: 2_000_000_000_000_000_000,
            token_balances: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token(mut self, contract: &str, balance: u128) -> Self {
        self.token_balances.insert(contract.to_lowercase(), balance);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

#[async_trait]
impl EvmNode for MockNode {
    async fn chain_id(&self) -> Result<u64, ClientError> {
        self.record("chain_id".into());
        self.chain_id.clone().map_err(ClientError::Collaborator)
    }

    async fn nonce(&self, address: &str) -> Result<u64, ClientError> {
        self.record(format!("nonce:{address}"));
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> Result<f64, ClientError> {
        self.record("gas_price".into());
        self.gas_price
            .ok_or_else(|| ClientError::Collaborator("rpc timeout".into()))
    }

    async fn balance(&self, address: &str) -> Result<u128, ClientError> {
        self.record(format!("balance:{address}"));
        Ok(self.balance)
    }

    async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ClientError> {
        self.record(format!("call:{to}:{}", hex::encode(data)));
        let balance = self
            .token_balances
            .get(&to.to_lowercase())
            .ok_or_else(|| ClientError::Collaborator(format!("execution reverted at {to}")))?;
        let mut word = vec![0u8; 16];
        word.extend_from_slice(&balance.to_be_bytes());
        Ok(word)
    }
}

/// Explorer holding a fixed history. Looking up `failing_tx` fails.
#[derive(Default)]
pub struct MockExplorer {
    pub history: Vec<String>,
    pub failing_tx: Option<String>,
    pub lookups: Mutex<Vec<String>>,
}

#[async_trait]
impl Explorer for MockExplorer {
    async fn get_balance(&self, _address: &str) -> Result<Vec<Balance>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_transaction(&self, txid: &str) -> Result<Tx, ClientError> {
        self.lookups.lock().unwrap().push(txid.to_string());
        if self.failing_tx.as_deref() == Some(txid) {
            return Err(ClientError::Collaborator(format!("{txid}: 500")));
        }
        Ok(Tx {
            hash: txid.to_string(),
            asset: Asset::native("ETH", "ETH"),
            from: Vec::new(),
            to: Vec::new(),
            date: None,
            tx_type: TxType::Transfer,
        })
    }

    async fn get_transaction_history(
        &self,
        _address: &str,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, ClientError> {
        Ok(HistoryPage {
            total: self.history.len() as u64,
            txids: self
                .history
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }

    async fn get_suggested_fee_rate(&self) -> Result<f64, ClientError> {
        Err(ClientError::Collaborator("not used on ethereum".into()))
    }
}

#[derive(Default)]
pub struct MockBroadcaster {
    pub sent: Mutex<Vec<(String, Network, String)>>,
}

impl MockBroadcaster {
    pub fn sent(&self) -> Vec<(String, Network, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for MockBroadcaster {
    async fn broadcast(
        &self,
        raw_tx: &str,
        network: Network,
        endpoints: &Endpoints,
    ) -> Result<String, ClientError> {
        self.sent
            .lock()
            .unwrap()
            .push((raw_tx.to_string(), network, endpoints.node_url.clone()));
        Ok(NODE_TXID.to_string())
    }
}

/// Mainnet client over `node`, unlocked with [`TEST_PHRASE`].
pub async fn unlocked_client(
    node: &Arc<MockNode>,
    explorer: &Arc<MockExplorer>,
    broadcaster: &Arc<MockBroadcaster>,
) -> EthClient {
    let client = EthClient::new(
        default_config(Network::Mainnet),
        node.clone(),
        explorer.clone(),
        broadcaster.clone(),
    )
    .await
    .unwrap();
    client
        .unlock(PhraseFactory::new(TEST_PHRASE).unwrap())
        .await
        .unwrap();
    client
}
