use client_core::{
    Asset, ClientConfig, DerivationPaths, Endpoints, ExplorerUrl, ExplorerUrls, Network,
};
use serde::Serialize;

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Tip offered to block producers, capped at the max fee per gas.
pub const DEFAULT_PRIORITY_FEE_WEI: u128 = 1_500_000_000;

/// Gas price assumed when the node cannot be asked (30 gwei).
pub const FALLBACK_GAS_PRICE_WEI: f64 = 30_000_000_000.0;

/// BIP-44 root shared by both networks.
pub const DERIVATION_ROOT: &str = "m/44'/60'/0'/0/";

/// Definition of an EVM network the client can talk to.
#[derive(Debug, Clone, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://eth.llamarpc.com",
    explorer_url: "https://etherscan.io",
    is_testnet: false,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
    is_testnet: true,
};

impl EvmChain {
    pub fn for_network(network: Network) -> &'static EvmChain {
        match network {
            Network::Mainnet => &ETHEREUM,
            Network::Testnet => &SEPOLIA,
        }
    }

    pub fn native_asset(&self) -> Asset {
        Asset::native(self.symbol, self.symbol)
    }
}

/// Stock Ethereum configuration for `network`.
pub fn default_config(network: Network) -> ClientConfig {
    let chain = EvmChain::for_network(network);
    ClientConfig {
        network,
        derivation_paths: DerivationPaths::new(DERIVATION_ROOT, DERIVATION_ROOT),
        explorer_urls: ExplorerUrls {
            mainnet: ExplorerUrl::new(ETHEREUM.explorer_url),
            testnet: ExplorerUrl::new(SEPOLIA.explorer_url),
        },
        endpoints: Endpoints {
            explorer_url: chain.explorer_url.to_string(),
            node_url: chain.rpc_url.to_string(),
            node_credentials: None,
        },
        amount_policy: Default::default(),
    }
}
