use async_trait::async_trait;
use client_core::{ClientError, Explorer};

use crate::utxo::UtxoEntry;

/// Explorer for UTXO chains: the shared queries plus unspent outputs.
#[async_trait]
pub trait UtxoExplorer: Explorer {
    /// Unspent outputs of `address`. Unconfirmed entries are only wanted
    /// when `include_pending` is set.
    async fn get_unspent_outputs(
        &self,
        address: &str,
        include_pending: bool,
    ) -> Result<Vec<UtxoEntry>, ClientError>;
}
