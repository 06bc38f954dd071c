//! Ethereum support for the wallet client.
//!
//! This crate provides:
//! - EIP-55 address validation, normalisation and derivation
//! - EIP-1559 transfer building and signing
//! - An HD wallet under `m/44'/60'/0'/0/`
//! - [`EthClient`], which checks the node's chain id at construction and
//!   reads native and ERC-20 balances one paced request at a time

pub mod address;
pub mod chains;
pub mod client;
pub mod erc20;
pub mod error;
pub mod node;
pub mod transaction;
pub mod wallet;

pub use chains::{default_config, EvmChain};
pub use client::EthClient;
pub use error::EthError;
pub use node::EvmNode;
pub use transaction::{EthTransaction, SignedEthTransaction};
pub use wallet::{EthSigner, EthWallet};
