//! Client lifecycle shared by every chain.
//!
//! A chain client is a [`Client`] plus chain-specific collaborators. The
//! client is constructed through a [`ClientBuilder`] that runs an ordered
//! list of asynchronous [`Initializer`] steps exactly once: the generic
//! config check first, then whatever each chain layer appended, in the
//! order they were appended.

use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::index::IntoWalletIndex;
use crate::types::Network;
use crate::wallet::{Wallet, WalletFactory, WalletHandle};

/// One asynchronous setup step contributed by a chain layer.
#[async_trait]
pub trait Initializer: Send + Sync {
    fn name(&self) -> &str;

    async fn initialize(&self, config: &ClientConfig) -> Result<(), ClientError>;
}

/// Structural config validation; always the first step.
struct ConfigCheck;

#[async_trait]
impl Initializer for ConfigCheck {
    fn name(&self) -> &str {
        "config"
    }

    async fn initialize(&self, config: &ClientConfig) -> Result<(), ClientError> {
        config.validate()
    }
}

pub struct ClientBuilder<W> {
    config: ClientConfig,
    initializers: Vec<Box<dyn Initializer>>,
    _wallet: PhantomData<fn() -> W>,
}

impl<W: Wallet> ClientBuilder<W> {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            initializers: vec![Box::new(ConfigCheck)],
            _wallet: PhantomData,
        }
    }

    /// Append a setup step. Steps run in the order they were appended.
    pub fn initializer(mut self, step: impl Initializer + 'static) -> Self {
        self.initializers.push(Box::new(step));
        self
    }

    /// Run every initializer once, in order. The first failure aborts
    /// construction.
    pub async fn build(self) -> Result<Client<W>, ClientError> {
        for step in &self.initializers {
            debug!(step = step.name(), network = %self.config.network, "running client initializer");
            step.initialize(&self.config)
                .await
                .map_err(|e| ClientError::Initialization {
                    step: step.name().to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(Client {
            config: self.config,
            state: RwLock::new(WalletState::Absent),
        })
    }
}

/// Whether a wallet is attached.
pub enum WalletState<W> {
    Absent,
    Unlocked(Arc<WalletHandle<W>>),
}

/// Generic client: owns config and the current wallet handle.
pub struct Client<W> {
    config: ClientConfig,
    state: RwLock<WalletState<W>>,
}

impl<W: Wallet> Client<W> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(*self.read_state(), WalletState::Unlocked(_))
    }

    /// Build a wallet from `factory` and make it current.
    ///
    /// The new wallet is fully constructed before the swap; on failure the
    /// previous state is untouched. On success the previous handle is
    /// purged, so operations that captured it can no longer sign.
    pub async fn unlock<F>(&self, factory: F) -> Result<(), ClientError>
    where
        F: WalletFactory<W>,
    {
        let wallet = factory.create(&self.config).await?;
        let fresh = Arc::new(WalletHandle::new(wallet));

        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, WalletState::Unlocked(fresh))
        };
        let replaced = matches!(previous, WalletState::Unlocked(_));
        if let WalletState::Unlocked(old) = previous {
            old.purge();
        }
        info!(network = %self.config.network, replaced, "wallet unlocked");
        Ok(())
    }

    /// Discard the current wallet. Idempotent.
    pub fn purge(&self) {
        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, WalletState::Absent)
        };
        if let WalletState::Unlocked(old) = previous {
            old.purge();
            info!(network = %self.config.network, "wallet purged");
        }
    }

    /// The current wallet handle, or [`ClientError::ClientLocked`].
    pub fn wallet(&self) -> Result<Arc<WalletHandle<W>>, ClientError> {
        match &*self.read_state() {
            WalletState::Unlocked(handle) => Ok(Arc::clone(handle)),
            WalletState::Absent => Err(ClientError::ClientLocked),
        }
    }

    /// Address at `index`; the index is checked before the lock state.
    pub fn get_address(&self, index: impl IntoWalletIndex) -> Result<String, ClientError> {
        let index = index.into_wallet_index()?;
        self.wallet()?.address(index)
    }

    pub fn get_full_derivation_path(&self, index: impl IntoWalletIndex) -> Result<String, ClientError> {
        Ok(self.config.full_derivation_path(index.into_wallet_index()?))
    }

    pub fn get_explorer_url(&self) -> &str {
        self.config.explorer_url()
    }

    pub fn get_explorer_address_url(&self, address: &str) -> String {
        self.config.explorer_address_url(address)
    }

    pub fn get_explorer_tx_url(&self, txid: &str) -> String {
        self.config.explorer_tx_url(txid)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, WalletState<W>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
