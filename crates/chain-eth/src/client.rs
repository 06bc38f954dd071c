use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use client_core::fees::{sample_fee_rate, validate_fee_rate};
use client_core::pacing::paced;
use client_core::{
    assemble_history, Asset, Balance, Broadcaster, Client, ClientBuilder, ClientConfig, ClientError,
    Explorer, FeeRates, Fees, FeesWithRates, Initializer, IntoWalletIndex, Network, TransferParams,
    Tx, TxPage, WalletFactory,
};
use tracing::{debug, info, instrument};

use crate::address::{normalize_address, parse_address, validate_address};
use crate::chains::{EvmChain, DEFAULT_PRIORITY_FEE_WEI, FALLBACK_GAS_PRICE_WEI, TRANSFER_GAS_LIMIT};
use crate::erc20::{decode_balance, encode_balance_of};
use crate::error::EthError;
use crate::node::EvmNode;
use crate::transaction::{build_transfer, SignedEthTransaction};
use crate::wallet::EthWallet;

/// Delay between per-asset balance requests.
pub const DEFAULT_BALANCE_PACE: Duration = Duration::from_millis(250);

/// Asks the node for its chain id and refuses to build a client against
/// a node on the wrong network.
struct ChainIdCheck {
    node: Arc<dyn EvmNode>,
    resolved: Arc<OnceLock<u64>>,
}

#[async_trait]
impl Initializer for ChainIdCheck {
    fn name(&self) -> &str {
        "chain-id"
    }

    async fn initialize(&self, config: &ClientConfig) -> Result<(), ClientError> {
        let expected = EvmChain::for_network(config.network).chain_id;
        let actual = self.node.chain_id().await?;
        if actual != expected {
            return Err(EthError::ChainIdMismatch { expected, actual }.into());
        }
        let _ = self.resolved.set(actual);
        Ok(())
    }
}

/// Ethereum client: shared lifecycle plus node, explorer and broadcaster.
pub struct EthClient {
    core: Client<EthWallet>,
    chain_id: u64,
    node: Arc<dyn EvmNode>,
    explorer: Arc<dyn Explorer>,
    broadcaster: Arc<dyn Broadcaster>,
    tokens: Vec<Asset>,
    balance_pace: Duration,
}

impl EthClient {
    pub async fn new(
        config: ClientConfig,
        node: Arc<dyn EvmNode>,
        explorer: Arc<dyn Explorer>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Result<Self, ClientError> {
        let resolved = Arc::new(OnceLock::new());
        let core = ClientBuilder::new(config)
            .initializer(ChainIdCheck {
                node: node.clone(),
                resolved: resolved.clone(),
            })
            .build()
            .await?;
        let chain_id = resolved
            .get()
            .copied()
            .ok_or_else(|| ClientError::Internal("chain id was not resolved".into()))?;
        debug!(chain_id, network = %core.network(), "eth client ready");

        Ok(Self {
            core,
            chain_id,
            node,
            explorer,
            broadcaster,
            tokens: Vec::new(),
            balance_pace: DEFAULT_BALANCE_PACE,
        })
    }

    /// ERC-20 tokens reported by [`EthClient::get_balance`] after the
    /// native balance.
    pub fn with_tokens(mut self, tokens: Vec<Asset>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_balance_pace(mut self, pace: Duration) -> Self {
        self.balance_pace = pace;
        self
    }

    /// Chain id confirmed by the node at construction.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn core(&self) -> &Client<EthWallet> {
        &self.core
    }

    pub fn get_network(&self) -> Network {
        self.core.network()
    }

    pub fn get_explorer_url(&self) -> &str {
        self.core.get_explorer_url()
    }

    pub fn get_explorer_address_url(&self, address: &str) -> String {
        self.core.get_explorer_address_url(address)
    }

    pub fn get_explorer_tx_url(&self, txid: &str) -> String {
        self.core.get_explorer_tx_url(txid)
    }

    pub fn get_full_derivation_path(&self, index: impl IntoWalletIndex) -> Result<String, ClientError> {
        self.core.get_full_derivation_path(index)
    }

    pub fn validate_address(&self, address: &str) -> bool {
        validate_address(address)
    }

    pub fn normalize_address(&self, address: &str) -> Result<String, ClientError> {
        Ok(normalize_address(address)?)
    }

    pub async fn unlock<F>(&self, factory: F) -> Result<(), ClientError>
    where
        F: WalletFactory<EthWallet>,
    {
        self.core.unlock(factory).await
    }

    pub fn purge_client(&self) {
        self.core.purge();
    }

    pub fn get_address(&self, index: impl IntoWalletIndex) -> Result<String, ClientError> {
        self.core.get_address(index)
    }

    /// Balances of `assets`, or of ETH followed by the configured tokens.
    ///
    /// One request per asset, paced; the first failure aborts.
    #[instrument(skip(self, assets), fields(chain_id = self.chain_id))]
    pub async fn get_balance(
        &self,
        address: &str,
        assets: Option<&[Asset]>,
    ) -> Result<Vec<Balance>, ClientError> {
        let owner = parse_address(address)?;
        let address = normalize_address(address)?;
        let assets = match assets {
            Some(assets) => assets.to_vec(),
            None => std::iter::once(self.native_asset())
                .chain(self.tokens.iter().cloned())
                .collect(),
        };

        let address = &address;
        paced(assets, self.balance_pace, |asset| async move {
            let amount = match &asset.contract {
                None if asset == self.native_asset() => self.node.balance(address).await?,
                None => {
                    return Err(ClientError::InvalidParams(format!(
                        "{asset} is not an Ethereum asset"
                    )))
                }
                Some(contract) => {
                    let contract = normalize_address(contract)?;
                    let data = self.node.call(&contract, &encode_balance_of(&owner)).await?;
                    decode_balance(&data)?
                }
            };
            Ok(Balance { asset, amount })
        })
        .await
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    pub async fn get_transactions(
        &self,
        address: &str,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<TxPage, ClientError> {
        let address = self.normalize_address(address)?;
        assemble_history(self.explorer.as_ref(), &address, offset, limit).await
    }

    pub async fn get_transaction_data(&self, txid: &str) -> Result<Tx, ClientError> {
        self.explorer.get_transaction(txid).await
    }

    /// Node gas price expanded into tiers; falls back to a fixed gas price
    /// when the node fails.
    pub async fn get_fee_rates(&self) -> Result<FeeRates, ClientError> {
        let sample = sample_fee_rate(self.node.gas_price(), FALLBACK_GAS_PRICE_WEI).await;
        Ok(FeeRates::from_sample(sample))
    }

    /// Rates plus absolute fees for a plain transfer. Ethereum transfers
    /// carry no memo.
    pub async fn get_fees_with_rates(&self, memo: Option<&str>) -> Result<FeesWithRates, ClientError> {
        reject_memo(memo)?;
        Ok(FeesWithRates::for_size(self.get_fee_rates().await?, TRANSFER_GAS_LIMIT))
    }

    pub async fn get_fees(&self) -> Result<Fees, ClientError> {
        Ok(self.get_fees_with_rates(None).await?.fees)
    }

    /// Build and sign an ETH transfer without broadcasting it.
    ///
    /// `fee_rate` is the max fee per gas in wei; the fast tier is used when
    /// it is unset.
    #[instrument(skip(self, params), fields(chain_id = self.chain_id, index = %params.index()))]
    pub async fn build_transfer(&self, params: &TransferParams) -> Result<SignedEthTransaction, ClientError> {
        let index = params.index();
        let wallet = self.core.wallet()?;

        if let Some(asset) = &params.asset {
            if *asset != self.native_asset() {
                return Err(ClientError::InvalidParams(format!(
                    "only ETH transfers are supported, got {asset}"
                )));
            }
        }
        reject_memo(params.memo.as_deref())?;
        let recipient = self.normalize_address(&params.recipient)?;
        self.core.config().amount_policy.check(params.amount)?;

        let fee_rate = match params.fee_rate {
            Some(rate) => validate_fee_rate(rate)?,
            None => self.get_fee_rates().await?.fast,
        };
        let max_fee = fee_rate.ceil() as u128;
        let priority_fee = DEFAULT_PRIORITY_FEE_WEI.min(max_fee);

        let sender = wallet.address(index)?;
        let nonce = self.node.nonce(&sender).await?;
        let tx = build_transfer(
            self.chain_id,
            nonce,
            &recipient,
            params.amount,
            priority_fee,
            max_fee,
            TRANSFER_GAS_LIMIT,
        )?;
        debug!(nonce, max_fee, priority_fee, "transfer built");

        wallet.signer(index)?.sign(&tx)
    }

    /// Build, sign and broadcast; returns the node's transaction hash.
    pub async fn transfer(&self, params: TransferParams) -> Result<String, ClientError> {
        let signed = self.build_transfer(&params).await?;
        let txid = self
            .broadcaster
            .broadcast(&signed.raw_hex(), self.get_network(), &self.core.config().endpoints)
            .await?;
        info!(chain_id = self.chain_id, txid = %txid, "transfer broadcast");
        Ok(txid)
    }

    fn native_asset(&self) -> Asset {
        EvmChain::for_network(self.get_network()).native_asset()
    }
}

fn reject_memo(memo: Option<&str>) -> Result<(), ClientError> {
    match memo {
        Some(memo) if !memo.is_empty() => Err(ClientError::InvalidParams(
            "memos are not supported on Ethereum transfers".into(),
        )),
        _ => Ok(()),
    }
}
