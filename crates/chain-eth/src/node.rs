use async_trait::async_trait;
use client_core::ClientError;

/// JSON-RPC node queries the Ethereum client needs. Broadcasting goes
/// through the shared [`client_core::Broadcaster`].
#[async_trait]
pub trait EvmNode: Send + Sync {
    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<u64, ClientError>;

    /// Pending-block transaction count of `address` (`eth_getTransactionCount`).
    async fn nonce(&self, address: &str) -> Result<u64, ClientError>;

    /// Current gas price in wei (`eth_gasPrice`).
    async fn gas_price(&self) -> Result<f64, ClientError>;

    /// Native balance in wei (`eth_getBalance`).
    async fn balance(&self, address: &str) -> Result<u128, ClientError>;

    /// Read-only contract call (`eth_call`); returns the raw return data.
    async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ClientError>;
}
