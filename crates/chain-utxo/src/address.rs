use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::bech32::{segwit, Fe32, Hrp};
use bitcoin::hashes::Hash;
use bitcoin::{CompressedPublicKey, PubkeyHash, ScriptBuf, ScriptHash};
use client_core::Network;

use crate::cashaddr::{self, CashAddrKind};
use crate::error::UtxoError;
use crate::params::UtxoChain;

const LTC_MAINNET_HRP: Hrp = Hrp::parse_unchecked("ltc");
const LTC_TESTNET_HRP: Hrp = Hrp::parse_unchecked("tltc");

/// Base58 version bytes for (p2pkh, p2sh) payloads, per chain and network.
fn base58_versions(chain: UtxoChain, network: Network) -> (&'static [u8], &'static [u8]) {
    match (chain, network) {
        (UtxoChain::Litecoin, Network::Mainnet) => (&[0x30], &[0x32, 0x05]),
        (UtxoChain::Litecoin, Network::Testnet) => (&[0x6f], &[0x3a, 0xc4]),
        (_, Network::Mainnet) => (&[0x00], &[0x05]),
        (_, Network::Testnet) => (&[0x6f], &[0xc4]),
    }
}

pub(crate) fn bitcoin_network(network: Network) -> bitcoin::Network {
    match network {
        Network::Mainnet => bitcoin::Network::Bitcoin,
        Network::Testnet => bitcoin::Network::Testnet,
    }
}

/// A validated recipient: canonical text form plus its locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub canonical: String,
    pub script_pubkey: ScriptBuf,
}

/// Parse `address` for `chain` on `network`.
pub fn parse_address(chain: UtxoChain, network: Network, address: &str) -> Result<Destination, UtxoError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(UtxoError::InvalidAddress("empty address".into()));
    }
    match chain {
        UtxoChain::Bitcoin => parse_bitcoin(network, address),
        UtxoChain::Litecoin => parse_litecoin(network, address),
        UtxoChain::BitcoinCash => parse_bitcoin_cash(network, address),
    }
}

pub fn validate_address(chain: UtxoChain, network: Network, address: &str) -> bool {
    parse_address(chain, network, address).is_ok()
}

/// Canonical form: lowercase bech32 for SegWit chains, prefixed CashAddr
/// for Bitcoin Cash. Legacy base58 stays as given except on Bitcoin Cash,
/// where it is converted.
pub fn normalize_address(chain: UtxoChain, network: Network, address: &str) -> Result<String, UtxoError> {
    parse_address(chain, network, address).map(|d| d.canonical)
}

/// Receive address of the wallet's own key on `chain`.
pub fn address_from_pubkey(chain: UtxoChain, network: Network, pubkey: &[u8; 33]) -> Result<String, UtxoError> {
    let key = compressed_key(pubkey)?;
    match chain {
        UtxoChain::Bitcoin => Ok(Address::p2wpkh(&key, bitcoin_network(network)).to_string()),
        UtxoChain::Litecoin => {
            let hrp = match network {
                Network::Mainnet => LTC_MAINNET_HRP,
                Network::Testnet => LTC_TESTNET_HRP,
            };
            segwit::encode(hrp, Fe32::Q, key.wpubkey_hash().as_byte_array())
                .map_err(|e| UtxoError::InvalidPublicKey(format!("bech32 encoding failed: {e}")))
        }
        UtxoChain::BitcoinCash => cashaddr::encode(
            cashaddr_prefix(network),
            CashAddrKind::P2pkh,
            key.pubkey_hash().as_byte_array(),
        ),
    }
}

/// Locking script of the wallet's own key on `chain`.
pub fn wallet_script(chain: UtxoChain, pubkey: &[u8; 33]) -> Result<ScriptBuf, UtxoError> {
    let key = compressed_key(pubkey)?;
    Ok(match chain.script_kind() {
        crate::params::ScriptKind::P2wpkh => ScriptBuf::new_p2wpkh(&key.wpubkey_hash()),
        crate::params::ScriptKind::P2pkh => ScriptBuf::new_p2pkh(&key.pubkey_hash()),
    })
}

fn compressed_key(pubkey: &[u8; 33]) -> Result<CompressedPublicKey, UtxoError> {
    CompressedPublicKey::from_slice(pubkey)
        .map_err(|e| UtxoError::InvalidPublicKey(format!("failed to parse compressed public key: {e}")))
}

fn cashaddr_prefix(network: Network) -> &'static str {
    match network {
        Network::Mainnet => cashaddr::MAINNET_PREFIX,
        Network::Testnet => cashaddr::TESTNET_PREFIX,
    }
}

fn parse_bitcoin(network: Network, address: &str) -> Result<Destination, UtxoError> {
    let checked = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| UtxoError::InvalidAddress(format!("failed to parse address: {e}")))?
        .require_network(bitcoin_network(network))
        .map_err(|e| UtxoError::InvalidAddress(format!("address wrong network: {e}")))?;
    Ok(Destination {
        canonical: checked.to_string(),
        script_pubkey: checked.script_pubkey(),
    })
}

fn parse_litecoin(network: Network, address: &str) -> Result<Destination, UtxoError> {
    let expected_hrp = match network {
        Network::Mainnet => LTC_MAINNET_HRP,
        Network::Testnet => LTC_TESTNET_HRP,
    };
    if let Ok((hrp, version, program)) = segwit::decode(address) {
        if hrp != expected_hrp {
            return Err(UtxoError::InvalidAddress(format!(
                "address prefix '{hrp}' is not '{expected_hrp}'"
            )));
        }
        let canonical = segwit::encode(expected_hrp, version, &program)
            .map_err(|e| UtxoError::InvalidAddress(format!("bech32 re-encoding failed: {e}")))?;
        return Ok(Destination {
            canonical,
            script_pubkey: witness_script(version, &program),
        });
    }
    parse_base58(UtxoChain::Litecoin, network, address).map(|(script_pubkey, _)| Destination {
        canonical: address.to_string(),
        script_pubkey,
    })
}

fn parse_bitcoin_cash(network: Network, address: &str) -> Result<Destination, UtxoError> {
    let prefix = cashaddr_prefix(network);
    let (kind, hash) = match cashaddr::decode(address, prefix) {
        Ok(decoded) if decoded.prefix == prefix => (decoded.kind, decoded.hash),
        Ok(decoded) => {
            return Err(UtxoError::InvalidAddress(format!(
                "address prefix '{}' is not '{prefix}'",
                decoded.prefix
            )))
        }
        Err(cashaddr_err) => match parse_base58(UtxoChain::BitcoinCash, network, address) {
            Ok((_, legacy)) => legacy,
            Err(_) => return Err(cashaddr_err),
        },
    };
    let script_pubkey = match kind {
        CashAddrKind::P2pkh => ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)),
        CashAddrKind::P2sh => ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)),
    };
    Ok(Destination {
        canonical: cashaddr::encode(prefix, kind, &hash)?,
        script_pubkey,
    })
}

/// Base58check payload: returns the locking script and the decoded hash.
fn parse_base58(
    chain: UtxoChain,
    network: Network,
    address: &str,
) -> Result<(ScriptBuf, (CashAddrKind, [u8; 20])), UtxoError> {
    let payload = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| UtxoError::InvalidAddress(format!("failed to parse address: {e}")))?;
    let (&version, hash) = payload
        .split_first()
        .ok_or_else(|| UtxoError::InvalidAddress("empty base58 payload".into()))?;
    let hash: [u8; 20] = hash
        .try_into()
        .map_err(|_| UtxoError::InvalidAddress(format!("base58 payload is {} bytes", payload.len())))?;

    let (p2pkh, p2sh) = base58_versions(chain, network);
    if p2pkh.contains(&version) {
        Ok((
            ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)),
            (CashAddrKind::P2pkh, hash),
        ))
    } else if p2sh.contains(&version) {
        Ok((
            ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)),
            (CashAddrKind::P2sh, hash),
        ))
    } else {
        Err(UtxoError::InvalidAddress(format!(
            "version byte 0x{version:02x} is not a {chain} {network} address"
        )))
    }
}

/// `OP_n <program>` for witness version `n`.
fn witness_script(version: Fe32, program: &[u8]) -> ScriptBuf {
    let version = version.to_u8();
    let opcode = if version == 0 { 0x00 } else { 0x50 + version };
    let mut script = Vec::with_capacity(program.len() + 2);
    script.push(opcode);
    script.push(program.len() as u8);
    script.extend_from_slice(program);
    ScriptBuf::from(script)
}
