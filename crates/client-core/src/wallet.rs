//! Wallet capability: the secret-holding half of a client.
//!
//! A [`Wallet`] derives addresses and signing material for wallet indices.
//! It is built by a [`WalletFactory`] and lives inside a [`WalletHandle`],
//! which a client swaps wholesale on unlock and empties on purge.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::index::WalletIndex;
use crate::keyring::{HdKeyring, ZeroizingPhrase};

/// Capability set every chain wallet implements.
///
/// Same seed and same index always yield the same address. Implementations
/// never hand out the seed or phrase.
pub trait Wallet: Send + Sync + 'static {
    /// Per-chain signing material for one index.
    type Signer: Send;

    fn address(&self, index: WalletIndex) -> Result<String, ClientError>;

    fn signer(&self, index: WalletIndex) -> Result<Self::Signer, ClientError>;
}

/// A wallet that can be built from a BIP-32 keyring and client config.
pub trait HdWallet: Wallet + Sized {
    fn from_keyring(keyring: HdKeyring, config: &ClientConfig) -> Result<Self, ClientError>;
}

/// Builds a wallet for a client. Consumed by [`crate::client::Client::unlock`].
#[async_trait]
pub trait WalletFactory<W: Wallet>: Send {
    async fn create(self, config: &ClientConfig) -> Result<W, ClientError>;
}

/// Factory over a BIP-39 phrase and optional passphrase.
#[derive(Debug)]
pub struct PhraseFactory {
    phrase: ZeroizingPhrase,
    passphrase: ZeroizingPhrase,
}

impl PhraseFactory {
    /// Fails with [`ClientError::InvalidPhrase`] when the phrase does not
    /// pass the word-list and checksum check.
    pub fn new(phrase: &str) -> Result<Self, ClientError> {
        Self::with_passphrase(phrase, "")
    }

    pub fn with_passphrase(phrase: &str, passphrase: &str) -> Result<Self, ClientError> {
        if !crate::keyring::validate_phrase(phrase) {
            return Err(ClientError::InvalidPhrase(
                "phrase failed word-list or checksum validation".into(),
            ));
        }
        Ok(Self {
            phrase: ZeroizingPhrase::new(phrase),
            passphrase: ZeroizingPhrase::new(passphrase),
        })
    }
}

#[async_trait]
impl<W: HdWallet> WalletFactory<W> for PhraseFactory {
    async fn create(self, config: &ClientConfig) -> Result<W, ClientError> {
        let keyring = HdKeyring::from_phrase(&self.phrase, &self.passphrase)?;
        W::from_keyring(keyring, config)
    }
}

/// Factory delegating to a closure, for wallets backed by something other
/// than a phrase (a pre-derived key, a remote signer).
pub struct FnFactory<F>(pub F);

#[async_trait]
impl<W, F> WalletFactory<W> for FnFactory<F>
where
    W: Wallet,
    F: FnOnce(&ClientConfig) -> Result<W, ClientError> + Send,
{
    async fn create(self, config: &ClientConfig) -> Result<W, ClientError> {
        (self.0)(config)
    }
}

/// Exclusive owner of one wallet.
///
/// Either *Unlocked* (wallet resident) or *Absent*. Once purged a handle
/// stays absent: operations that captured it earlier fail with
/// [`ClientError::ClientLocked`] instead of reaching the discarded key.
pub struct WalletHandle<W> {
    slot: RwLock<Option<W>>,
}

impl<W: Wallet> WalletHandle<W> {
    pub(crate) fn new(wallet: W) -> Self {
        Self {
            slot: RwLock::new(Some(wallet)),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.slot
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn address(&self, index: WalletIndex) -> Result<String, ClientError> {
        self.with_wallet(|wallet| wallet.address(index))
    }

    pub fn signer(&self, index: WalletIndex) -> Result<W::Signer, ClientError> {
        self.with_wallet(|wallet| wallet.signer(index))
    }

    fn with_wallet<R>(
        &self,
        f: impl FnOnce(&W) -> Result<R, ClientError>,
    ) -> Result<R, ClientError> {
        let slot = self
            .slot
            .read()
            .map_err(|_| ClientError::Internal("wallet slot poisoned".into()))?;
        match slot.as_ref() {
            Some(wallet) => f(wallet),
            None => Err(ClientError::ClientLocked),
        }
    }

    /// Drop the wallet and its key material. Idempotent.
    pub(crate) fn purge(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.take();
    }
}
