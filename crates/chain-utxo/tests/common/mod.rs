#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_utxo::address::parse_address;
use chain_utxo::{UtxoChain, UtxoEntry, UtxoExplorer};
use client_core::{
    Asset, Balance, Broadcaster, ClientError, Endpoints, Explorer, HistoryPage, Network, Tx, TxType,
};
use tokio::sync::Notify;

pub const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const NODE_TXID: &str = "9f1a0000000000000000000000000000000000000000000000000000000000aa";

/// Holds `get_unspent_outputs` open until the test releases it.
#[derive(Default)]
pub struct Gate {
    /// Signalled once the explorer is inside `get_unspent_outputs`.
    pub reached: Notify,
    pub resume: Notify,
}

/// In-memory explorer. Unspent outputs are locked to whichever address is
/// queried, so they are always spendable by the wallet asking for them.
pub struct MockExplorer {
    chain: UtxoChain,
    network: Network,
    /// `(value, confirmed)` per unspent output, in collaborator order.
    pub unspent: Vec<(u64, bool)>,
    /// `None` makes the fee sample fail.
    pub fee_rate: Option<f64>,
    pub history: Vec<String>,
    pub calls: Mutex<Vec<String>>,
    gate: Option<Arc<Gate>>,
}

impl MockExplorer {
    pub fn new(chain: UtxoChain, network: Network, unspent: &[(u64, bool)]) -> Self {
        Self {
            chain,
            network,
            unspent: unspent.to_vec(),
            fee_rate: Some(10.0),
            history: Vec::new(),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_fee_rate(mut self, rate: Option<f64>) -> Self {
        self.fee_rate = rate;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Explorer for MockExplorer {
    async fn get_balance(&self, address: &str) -> Result<Vec<Balance>, ClientError> {
        self.record(format!("balance:{address}"));
        let amount = self.unspent.iter().map(|(value, _)| u128::from(*value)).sum();
        let symbol = self.chain.symbol();
        Ok(vec![Balance {
            asset: Asset::native(symbol, symbol),
            amount,
        }])
    }

    async fn get_transaction(&self, txid: &str) -> Result<Tx, ClientError> {
        self.record(format!("tx:{txid}"));
        let symbol = self.chain.symbol();
        Ok(Tx {
            hash: txid.to_string(),
            asset: Asset::native(symbol, symbol),
            from: Vec::new(),
            to: Vec::new(),
            date: Some(1_700_000_000),
            tx_type: TxType::Transfer,
        })
    }

    async fn get_transaction_history(
        &self,
        address: &str,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, ClientError> {
        self.record(format!("history:{address}:{offset}:{limit}"));
        Ok(HistoryPage {
            total: self.history.len() as u64,
            txids: self.history.clone(),
        })
    }

    async fn get_suggested_fee_rate(&self) -> Result<f64, ClientError> {
        self.record("fee_rate".into());
        self.fee_rate
            .ok_or_else(|| ClientError::Collaborator("fee endpoint returned 503".into()))
    }
}

#[async_trait]
impl UtxoExplorer for MockExplorer {
    async fn get_unspent_outputs(
        &self,
        address: &str,
        include_pending: bool,
    ) -> Result<Vec<UtxoEntry>, ClientError> {
        self.record(format!("utxos:{include_pending}"));
        if let Some(gate) = &self.gate {
            gate.reached.notify_one();
            gate.resume.notified().await;
        }
        let script = parse_address(self.chain, self.network, address)?.script_pubkey;
        Ok(self
            .unspent
            .iter()
            .enumerate()
            .map(|(i, (value, confirmed))| UtxoEntry {
                txid: format!("{:02x}", i + 1).repeat(32),
                vout: i as u32,
                value: *value,
                confirmed: *confirmed,
                script_pubkey: script.to_bytes(),
            })
            .collect())
    }
}

/// Records every broadcast and answers with [`NODE_TXID`].
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

pub fn mocks(
    chain: UtxoChain,
    network: Network,
    unspent: &[(u64, bool)],
) -> (Arc<MockExplorer>, Arc<MockBroadcaster>) {
    (
        Arc::new(MockExplorer::new(chain, network, unspent)),
        Arc::new(MockBroadcaster::default()),
    )
}
