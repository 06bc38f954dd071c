use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::index::WalletIndex;
use crate::types::Network;

/// Placeholder substituted by [`ClientConfig::explorer_address_url`].
pub const ADDRESS_PLACEHOLDER: &str = "%%ADDRESS%%";

/// Placeholder substituted by [`ClientConfig::explorer_tx_url`].
pub const TX_PLACEHOLDER: &str = "%%TX_ID%%";

/// BIP-44 style derivation roots, one per network. The full path for an
/// index is the root with the index appended, e.g. `m/84'/0'/0'/0/` + `3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationPaths {
    pub mainnet: String,
    pub testnet: String,
}

impl DerivationPaths {
    pub fn new(mainnet: &str, testnet: &str) -> Self {
        Self {
            mainnet: mainnet.to_string(),
            testnet: testnet.to_string(),
        }
    }

    pub fn root(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }

    pub fn full_path(&self, network: Network, index: WalletIndex) -> String {
        format!("{}{}", self.root(network), index)
    }
}

/// Block-explorer URL templates for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerUrl {
    pub root: String,
    /// Contains [`ADDRESS_PLACEHOLDER`].
    pub address: String,
    /// Contains [`TX_PLACEHOLDER`].
    pub tx: String,
}

impl ExplorerUrl {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            address: format!("{root}/address/{ADDRESS_PLACEHOLDER}"),
            tx: format!("{root}/tx/{TX_PLACEHOLDER}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerUrls {
    pub mainnet: ExplorerUrl,
    pub testnet: ExplorerUrl,
}

impl ExplorerUrls {
    pub fn get(&self, network: Network) -> &ExplorerUrl {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }
}

/// Basic-auth credentials for a node endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for NodeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Collaborator endpoints used by the concrete explorer and node clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub explorer_url: String,
    pub node_url: String,
    #[serde(default)]
    pub node_credentials: Option<NodeCredentials>,
}

/// Whether zero-amount transfers are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountPolicy {
    #[default]
    AllowZero,
    RejectZero,
}

impl AmountPolicy {
    pub fn check(self, amount: u128) -> Result<(), ClientError> {
        match self {
            AmountPolicy::RejectZero if amount == 0 => Err(ClientError::InvalidParams(
                "zero-amount transfers are rejected".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Chain-invariant client configuration. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub network: Network,
    pub derivation_paths: DerivationPaths,
    pub explorer_urls: ExplorerUrls,
    pub endpoints: Endpoints,
    #[serde(default)]
    pub amount_policy: AmountPolicy,
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::InvalidParams(format!("config: {e}")))
    }

    pub fn full_derivation_path(&self, index: WalletIndex) -> String {
        self.derivation_paths.full_path(self.network, index)
    }

    pub fn explorer_url(&self) -> &str {
        &self.explorer_urls.get(self.network).root
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        self.explorer_urls
            .get(self.network)
            .address
            .replace(ADDRESS_PLACEHOLDER, address)
    }

    pub fn explorer_tx_url(&self, txid: &str) -> String {
        self.explorer_urls
            .get(self.network)
            .tx
            .replace(TX_PLACEHOLDER, txid)
    }

    /// Structural checks run as the first client initializer.
    pub fn validate(&self) -> Result<(), ClientError> {
        for network in [Network::Mainnet, Network::Testnet] {
            let root = self.derivation_paths.root(network);
            if !root.starts_with("m/") || !root.ends_with('/') {
                return Err(ClientError::InvalidParams(format!(
                    "{network} derivation root '{root}' must look like m/.../"
                )));
            }
            let urls = self.explorer_urls.get(network);
            if !urls.address.contains(ADDRESS_PLACEHOLDER) {
                return Err(ClientError::InvalidParams(format!(
                    "{network} address url lacks {ADDRESS_PLACEHOLDER}"
                )));
            }
            if !urls.tx.contains(TX_PLACEHOLDER) {
                return Err(ClientError::InvalidParams(format!(
                    "{network} tx url lacks {TX_PLACEHOLDER}"
                )));
            }
        }
        Ok(())
    }
}
