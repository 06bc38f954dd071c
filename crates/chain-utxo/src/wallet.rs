use std::fmt;
use std::marker::PhantomData;

use client_core::{ClientConfig, ClientError, HdKeyring, HdWallet, Network, Wallet, WalletIndex};
use zeroize::Zeroizing;

use crate::address::address_from_pubkey;
use crate::params::UtxoParams;
use crate::transaction::{sign_transaction, SignedTransaction, UnsignedUtxoTx};

/// HD wallet for one UTXO chain.
pub struct UtxoWallet<P> {
    keyring: HdKeyring,
    config: ClientConfig,
    _chain: PhantomData<P>,
}

impl<P: UtxoParams> UtxoWallet<P> {
    fn network(&self) -> Network {
        self.config.network
    }
}

impl<P: UtxoParams> Wallet for UtxoWallet<P> {
    type Signer = UtxoSigner;

    fn address(&self, index: WalletIndex) -> Result<String, ClientError> {
        let key = self.keyring.derive(&self.config.full_derivation_path(index))?;
        Ok(address_from_pubkey(P::CHAIN, self.network(), key.public_key_compressed())?)
    }

    fn signer(&self, index: WalletIndex) -> Result<UtxoSigner, ClientError> {
        let key = self.keyring.derive(&self.config.full_derivation_path(index))?;
        Ok(UtxoSigner {
            private_key: Zeroizing::new(*key.private_key()),
            public_key: *key.public_key_compressed(),
        })
    }
}

impl<P: UtxoParams> HdWallet for UtxoWallet<P> {
    fn from_keyring(keyring: HdKeyring, config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            keyring,
            config: config.clone(),
            _chain: PhantomData,
        })
    }
}

/// Signing key for one wallet index. Erased when dropped.
pub struct UtxoSigner {
    private_key: Zeroizing<[u8; 32]>,
    public_key: [u8; 33],
}

impl UtxoSigner {
    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn sign(&self, unsigned: &UnsignedUtxoTx) -> Result<SignedTransaction, ClientError> {
        Ok(sign_transaction(unsigned, &self.private_key)?)
    }
}

impl fmt::Debug for UtxoSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtxoSigner")
            .field("public_key", &hex::encode(self.public_key))
            .finish_non_exhaustive()
    }
}
