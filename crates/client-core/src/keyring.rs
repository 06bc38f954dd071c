use std::fmt;
use std::ops::Deref;

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::SigningKey;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::ClientError;

/// A mnemonic phrase that is wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizingPhrase(String);

impl ZeroizingPhrase {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(phrase.into())
    }
}

impl Deref for ZeroizingPhrase {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ZeroizingPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ZeroizingPhrase(<redacted>)")
    }
}

/// Generate a new 24-word BIP-39 phrase (256 bits of entropy).
pub fn generate_phrase() -> Result<ZeroizingPhrase, ClientError> {
    let mut entropy = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| ClientError::InvalidPhrase(e.to_string()));
    entropy.zeroize();
    Ok(ZeroizingPhrase::new(mnemonic?.to_string()))
}

/// Check a phrase against the English word list and its checksum.
pub fn validate_phrase(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// BIP-32 keyring over one BIP-39 seed. The seed never leaves this type.
pub struct HdKeyring {
    seed: Zeroizing<Vec<u8>>,
}

impl HdKeyring {
    /// Fails with [`ClientError::InvalidPhrase`] on an unknown word or a bad checksum.
    pub fn from_phrase(phrase: &str, passphrase: &str) -> Result<Self, ClientError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| ClientError::InvalidPhrase(e.to_string()))?;
        let mut seed = mnemonic.to_seed(passphrase);
        let keyring = Self {
            seed: Zeroizing::new(seed.to_vec()),
        };
        seed.zeroize();
        Ok(keyring)
    }

    /// Derive the secp256k1 key at `path` (e.g. `m/84'/0'/0'/0/0`).
    pub fn derive(&self, path: &str) -> Result<DerivedKey, ClientError> {
        let parsed: DerivationPath = path
            .parse()
            .map_err(|e: bip32::Error| ClientError::Derivation(format!("{path}: {e}")))?;

        let xprv = XPrv::derive_from_path(self.seed.as_slice(), &parsed)
            .map_err(|e| ClientError::Derivation(e.to_string()))?;

        let mut private_key: [u8; 32] = xprv.to_bytes().into();
        let signing_key = SigningKey::from_bytes(&private_key.into())
            .map_err(|e| ClientError::Derivation(e.to_string()));
        let signing_key = match signing_key {
            Ok(key) => key,
            Err(e) => {
                private_key.zeroize();
                return Err(e);
            }
        };

        let verifying_key = signing_key.verifying_key();
        let public_key_compressed: [u8; 33] = verifying_key
            .to_encoded_point(true)
            .as_bytes()
            .try_into()
            .map_err(|_| ClientError::Derivation("invalid compressed public key".into()))?;
        let public_key_uncompressed: [u8; 65] = verifying_key
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .map_err(|_| ClientError::Derivation("invalid uncompressed public key".into()))?;

        Ok(DerivedKey {
            private_key,
            public_key_compressed,
            public_key_uncompressed,
            path: path.to_string(),
        })
    }
}

impl fmt::Debug for HdKeyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HdKeyring(<redacted>)")
    }
}

/// A derived secp256k1 key pair; the private half is wiped on drop.
pub struct DerivedKey {
    private_key: [u8; 32],
    public_key_compressed: [u8; 33],
    public_key_uncompressed: [u8; 65],
    path: String,
}

impl DerivedKey {
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn public_key_compressed(&self) -> &[u8; 33] {
        &self.public_key_compressed
    }

    pub fn public_key_uncompressed(&self) -> &[u8; 65] {
        &self.public_key_uncompressed
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("path", &self.path)
            .field("public_key", &self.public_key_compressed)
            .finish_non_exhaustive()
    }
}
