use std::fmt;

use client_core::{ClientConfig, ClientError, HdKeyring, HdWallet, Wallet, WalletIndex};
use zeroize::Zeroizing;

use crate::address::pubkey_to_address;
use crate::transaction::{sign_transaction, EthTransaction, SignedEthTransaction};

/// HD wallet for Ethereum accounts under `m/44'/60'/0'/0/`.
pub struct EthWallet {
    keyring: HdKeyring,
    config: ClientConfig,
}

impl Wallet for EthWallet {
    type Signer = EthSigner;

    fn address(&self, index: WalletIndex) -> Result<String, ClientError> {
        let key = self.keyring.derive(&self.config.full_derivation_path(index))?;
        Ok(pubkey_to_address(key.public_key_uncompressed())?)
    }

    fn signer(&self, index: WalletIndex) -> Result<EthSigner, ClientError> {
        let key = self.keyring.derive(&self.config.full_derivation_path(index))?;
        Ok(EthSigner {
            private_key: Zeroizing::new(*key.private_key()),
            address: pubkey_to_address(key.public_key_uncompressed())?,
        })
    }
}

impl HdWallet for EthWallet {
    fn from_keyring(keyring: HdKeyring, config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            keyring,
            config: config.clone(),
        })
    }
}

/// Signing key for one account. Erased when dropped.
pub struct EthSigner {
    private_key: Zeroizing<[u8; 32]>,
    address: String,
}

impl EthSigner {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn sign(&self, tx: &EthTransaction) -> Result<SignedEthTransaction, ClientError> {
        Ok(sign_transaction(tx, &self.private_key)?)
    }
}

impl fmt::Debug for EthSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
