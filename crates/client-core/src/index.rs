use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Largest index addressable without hardened derivation (2^31 - 1).
pub const MAX_WALLET_INDEX: u32 = 0x7FFF_FFFF;

/// A validated wallet index: one derived address/key inside a wallet.
///
/// Raw numbers enter through [`IntoWalletIndex`]; negative, fractional,
/// non-finite and out-of-range values are rejected with
/// [`ClientError::InvalidIndex`] before any network or key work happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u32")]
pub struct WalletIndex(u32);

impl WalletIndex {
    pub const ZERO: WalletIndex = WalletIndex(0);

    pub fn new(index: u32) -> Result<Self, ClientError> {
        if index > MAX_WALLET_INDEX {
            return Err(ClientError::InvalidIndex(format!(
                "{index} exceeds {MAX_WALLET_INDEX}"
            )));
        }
        Ok(Self(index))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WalletIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WalletIndex> for u32 {
    fn from(index: WalletIndex) -> Self {
        index.0
    }
}

impl TryFrom<i64> for WalletIndex {
    type Error = ClientError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        let index = u32::try_from(raw)
            .map_err(|_| ClientError::InvalidIndex(format!("{raw} is out of range")))?;
        Self::new(index)
    }
}

impl TryFrom<f64> for WalletIndex {
    type Error = ClientError;

    fn try_from(raw: f64) -> Result<Self, Self::Error> {
        if !raw.is_finite() || raw.fract() != 0.0 {
            return Err(ClientError::InvalidIndex(format!("{raw} is not an integer")));
        }
        if raw < 0.0 || raw > f64::from(MAX_WALLET_INDEX) {
            return Err(ClientError::InvalidIndex(format!("{raw} is out of range")));
        }
        Self::new(raw as u32)
    }
}

/// Conversion of caller-supplied numbers into a [`WalletIndex`].
pub trait IntoWalletIndex {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError>;
}

impl IntoWalletIndex for WalletIndex {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError> {
        Ok(self)
    }
}

impl IntoWalletIndex for u32 {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError> {
        WalletIndex::new(self)
    }
}

impl IntoWalletIndex for i32 {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError> {
        WalletIndex::try_from(i64::from(self))
    }
}

impl IntoWalletIndex for i64 {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError> {
        WalletIndex::try_from(self)
    }
}

impl IntoWalletIndex for u64 {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError> {
        let index = u32::try_from(self)
            .map_err(|_| ClientError::InvalidIndex(format!("{self} is out of range")))?;
        WalletIndex::new(index)
    }
}

impl IntoWalletIndex for f64 {
    fn into_wallet_index(self) -> Result<WalletIndex, ClientError> {
        WalletIndex::try_from(self)
    }
}
