//! Collaborator seams: block explorers and transaction broadcasters.
//!
//! Concrete REST clients live outside this workspace; chain clients only
//! see these traits.

use async_trait::async_trait;
use tracing::debug;

use crate::config::Endpoints;
use crate::error::ClientError;
use crate::types::{Balance, HistoryPage, Network, Tx, TxPage};

pub const DEFAULT_HISTORY_OFFSET: u32 = 0;
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Read-only chain data for one network.
#[async_trait]
pub trait Explorer: Send + Sync {
    async fn get_balance(&self, address: &str) -> Result<Vec<Balance>, ClientError>;

    async fn get_transaction(&self, txid: &str) -> Result<Tx, ClientError>;

    /// Transaction ids touching `address`, newest first, plus the total count.
    async fn get_transaction_history(
        &self,
        address: &str,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, ClientError>;

    /// Suggested fee rate in base units per byte.
    async fn get_suggested_fee_rate(&self) -> Result<f64, ClientError>;
}

/// Submits a serialised transaction to a node and returns its txid.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(
        &self,
        raw_tx: &str,
        network: Network,
        endpoints: &Endpoints,
    ) -> Result<String, ClientError>;
}

/// Fetch one page of history and resolve each txid, one request at a time.
/// The first failing fetch aborts the page.
pub async fn assemble_history<E>(
    explorer: &E,
    address: &str,
    offset: Option<u32>,
    limit: Option<u32>,
) -> Result<TxPage, ClientError>
where
    E: Explorer + ?Sized,
{
    let offset = offset.unwrap_or(DEFAULT_HISTORY_OFFSET);
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let page = explorer.get_transaction_history(address, offset, limit).await?;
    debug!(address, offset, limit, total = page.total, found = page.txids.len(), "fetched history page");

    let mut txs = Vec::with_capacity(page.txids.len());
    for txid in &page.txids {
        txs.push(explorer.get_transaction(txid).await?);
    }
    Ok(TxPage {
        total: page.total,
        txs,
    })
}
