//! Chain-agnostic core of the multi-chain wallet client.
//!
//! Provides the wallet lifecycle every chain client shares, the tiered
//! fee-rate engine, the wallet index guard, and the collaborator traits
//! chain crates are written against.

pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod fees;
pub mod index;
pub mod keyring;
pub mod logging;
pub mod pacing;
pub mod types;
pub mod wallet;

pub use client::{Client, ClientBuilder, Initializer, WalletState};
pub use config::{AmountPolicy, ClientConfig, DerivationPaths, Endpoints, ExplorerUrl, ExplorerUrls, NodeCredentials};
pub use error::{ClientError, Result};
pub use explorer::{assemble_history, Broadcaster, Explorer};
pub use fees::{fee_for, FeeOption, FeeRates, Fees, FeesWithRates};
pub use index::{IntoWalletIndex, WalletIndex, MAX_WALLET_INDEX};
pub use keyring::{generate_phrase, validate_phrase, DerivedKey, HdKeyring, ZeroizingPhrase};
pub use types::{Asset, Balance, HistoryPage, Network, TransferParams, Tx, TxLeg, TxPage, TxType};
pub use wallet::{FnFactory, HdWallet, PhraseFactory, Wallet, WalletFactory, WalletHandle};
