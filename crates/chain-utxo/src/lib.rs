//! UTXO chain support for the wallet client: Bitcoin, Litecoin and
//! Bitcoin Cash.
//!
//! Provides address validation and derivation, largest-first coin
//! selection with exact size-based fees, transaction building and signing
//! (P2WPKH, and P2PKH with fork-id sighash), and [`UtxoClient`], which ties
//! these to the shared wallet lifecycle.

pub mod address;
pub mod cashaddr;
pub mod client;
pub mod error;
pub mod explorer;
pub mod params;
pub mod plan;
pub mod transaction;
pub mod utxo;
pub mod wallet;

pub use client::UtxoClient;
pub use error::UtxoError;
pub use explorer::UtxoExplorer;
pub use params::{Bitcoin, BitcoinCash, Litecoin, UtxoChain, UtxoParams};
pub use plan::TxPlan;
pub use transaction::SignedTransaction;
pub use utxo::UtxoEntry;
pub use wallet::{UtxoSigner, UtxoWallet};

pub type BitcoinClient = UtxoClient<Bitcoin>;
pub type LitecoinClient = UtxoClient<Litecoin>;
pub type BitcoinCashClient = UtxoClient<BitcoinCash>;
