use bitcoin::Sequence;
use client_core::{
    Asset, ClientConfig, DerivationPaths, Endpoints, ExplorerUrl, ExplorerUrls, Network,
};

/// Default explorer API for Bitcoin mainnet.
pub const BTC_MAINNET_API: &str = "https://blockstream.info/api";
/// Default explorer API for Bitcoin testnet.
pub const BTC_TESTNET_API: &str = "https://blockstream.info/testnet/api";
pub const LTC_MAINNET_API: &str = "https://api.blockchair.com/litecoin";
pub const LTC_TESTNET_API: &str = "https://testnet.ltc.thorchain.info";
pub const LTC_MAINNET_NODE: &str = "https://litecoin.ninerealms.com";
pub const LTC_TESTNET_NODE: &str = "https://testnet.ltc.thorchain.info";
pub const BCH_MAINNET_API: &str = "https://api.haskoin.com/bch";
pub const BCH_TESTNET_API: &str = "https://api.haskoin.com/bchtest";
pub const BCH_MAINNET_NODE: &str = "https://bch.ninerealms.com";
pub const BCH_TESTNET_NODE: &str = "https://testnet.bch.thorchain.info";

/// Largest memo relayed in an OP_RETURN output.
pub const MAX_MEMO_BYTES: usize = 80;

/// How the chain locks outputs to the wallet's own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Native SegWit v0, witness `[sig, pubkey]`.
    P2wpkh,
    /// Legacy pay-to-pubkey-hash, scriptSig `<sig> <pubkey>`.
    P2pkh,
}

/// How input signatures commit to the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SighashScheme {
    /// BIP-143 with `SIGHASH_ALL`.
    SegwitV0,
    /// BIP-143 style digest with `SIGHASH_ALL | SIGHASH_FORKID`.
    ForkId,
}

/// Supported UTXO chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtxoChain {
    Bitcoin,
    Litecoin,
    BitcoinCash,
}

impl UtxoChain {
    pub fn symbol(self) -> &'static str {
        match self {
            UtxoChain::Bitcoin => "BTC",
            UtxoChain::Litecoin => "LTC",
            UtxoChain::BitcoinCash => "BCH",
        }
    }

    pub fn native_asset(self) -> Asset {
        Asset::native(self.symbol(), self.symbol())
    }

    /// Outputs below this value are not relayed; smaller change is folded
    /// into the fee.
    pub fn dust_threshold(self) -> u64 {
        match self {
            UtxoChain::Bitcoin => 546,
            UtxoChain::Litecoin => 1_000,
            UtxoChain::BitcoinCash => 546,
        }
    }

    /// Rate used when the explorer cannot be sampled, in sat/vbyte.
    pub fn fallback_fee_rate(self) -> f64 {
        match self {
            UtxoChain::Bitcoin => 20.0,
            UtxoChain::Litecoin => 10.0,
            UtxoChain::BitcoinCash => 1.0,
        }
    }

    /// SLIP-44 coin type on mainnet.
    pub fn coin_type(self) -> u32 {
        match self {
            UtxoChain::Bitcoin => 0,
            UtxoChain::Litecoin => 2,
            UtxoChain::BitcoinCash => 145,
        }
    }

    pub fn script_kind(self) -> ScriptKind {
        match self {
            UtxoChain::Bitcoin | UtxoChain::Litecoin => ScriptKind::P2wpkh,
            UtxoChain::BitcoinCash => ScriptKind::P2pkh,
        }
    }

    pub fn sighash_scheme(self) -> SighashScheme {
        match self {
            UtxoChain::Bitcoin | UtxoChain::Litecoin => SighashScheme::SegwitV0,
            UtxoChain::BitcoinCash => SighashScheme::ForkId,
        }
    }

    /// Input sequence: opt-in RBF where the chain supports it.
    pub fn sequence(self) -> Sequence {
        match self {
            UtxoChain::Bitcoin | UtxoChain::Litecoin => Sequence::ENABLE_RBF_NO_LOCKTIME,
            UtxoChain::BitcoinCash => Sequence::MAX,
        }
    }

    pub fn derivation_paths(self) -> DerivationPaths {
        let purpose = match self.script_kind() {
            ScriptKind::P2wpkh => 84,
            ScriptKind::P2pkh => 44,
        };
        DerivationPaths::new(
            &format!("m/{purpose}'/{}'/0'/0/", self.coin_type()),
            &format!("m/{purpose}'/1'/0'/0/"),
        )
    }

    /// Stock configuration for `network`.
    pub fn default_config(self, network: Network) -> ClientConfig {
        let (explorer_urls, mainnet_api, testnet_api, mainnet_node, testnet_node) = match self {
            UtxoChain::Bitcoin => (
                ExplorerUrls {
                    mainnet: ExplorerUrl::new("https://blockstream.info"),
                    testnet: ExplorerUrl::new("https://blockstream.info/testnet"),
                },
                BTC_MAINNET_API,
                BTC_TESTNET_API,
                BTC_MAINNET_API,
                BTC_TESTNET_API,
            ),
            UtxoChain::Litecoin => (
                ExplorerUrls {
                    mainnet: ExplorerUrl::new("https://blockchair.com/litecoin"),
                    testnet: ExplorerUrl::new("https://blockexplorer.one/litecoin/testnet"),
                },
                LTC_MAINNET_API,
                LTC_TESTNET_API,
                LTC_MAINNET_NODE,
                LTC_TESTNET_NODE,
            ),
            UtxoChain::BitcoinCash => (
                ExplorerUrls {
                    mainnet: ExplorerUrl::new("https://www.blockchain.com/bch"),
                    testnet: ExplorerUrl::new("https://www.blockchain.com/bch-testnet"),
                },
                BCH_MAINNET_API,
                BCH_TESTNET_API,
                BCH_MAINNET_NODE,
                BCH_TESTNET_NODE,
            ),
        };
        let (explorer_url, node_url) = match network {
            Network::Mainnet => (mainnet_api, mainnet_node),
            Network::Testnet => (testnet_api, testnet_node),
        };
        ClientConfig {
            network,
            derivation_paths: self.derivation_paths(),
            explorer_urls,
            endpoints: Endpoints {
                explorer_url: explorer_url.to_string(),
                node_url: node_url.to_string(),
                node_credentials: None,
            },
            amount_policy: Default::default(),
        }
    }
}

impl std::fmt::Display for UtxoChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtxoChain::Bitcoin => write!(f, "bitcoin"),
            UtxoChain::Litecoin => write!(f, "litecoin"),
            UtxoChain::BitcoinCash => write!(f, "bitcoincash"),
        }
    }
}

/// Type-level chain selector for wallets and clients.
pub trait UtxoParams: Send + Sync + 'static {
    const CHAIN: UtxoChain;
}

#[derive(Debug, Clone, Copy)]
pub struct Bitcoin;

#[derive(Debug, Clone, Copy)]
pub struct Litecoin;

#[derive(Debug, Clone, Copy)]
pub struct BitcoinCash;

impl UtxoParams for Bitcoin {
    const CHAIN: UtxoChain = UtxoChain::Bitcoin;
}

impl UtxoParams for Litecoin {
    const CHAIN: UtxoChain = UtxoChain::Litecoin;
}

impl UtxoParams for BitcoinCash {
    const CHAIN: UtxoChain = UtxoChain::BitcoinCash;
}
