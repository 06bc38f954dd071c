use std::sync::Arc;

use bitcoin::hashes::Hash;
use bitcoin::{Amount, PubkeyHash, ScriptBuf, TxOut, WPubkeyHash};
use client_core::fees::{sample_fee_rate, validate_fee_rate};
use client_core::{
    assemble_history, Balance, Broadcaster, Client, ClientBuilder, ClientConfig, ClientError,
    FeeRates, Fees, FeesWithRates, IntoWalletIndex, Network, TransferParams, Tx, TxPage, WalletFactory,
};
use tracing::{debug, info, instrument};

use crate::address::{normalize_address, parse_address, validate_address};
use crate::explorer::UtxoExplorer;
use crate::params::{ScriptKind, UtxoChain, UtxoParams};
use crate::plan::{check_memo, memo_script, plan_transaction, planned_vsize, PlanRequest, TxPlan};
use crate::transaction::{build_unsigned, SignedTransaction};
use crate::utxo::eligible;
use crate::wallet::UtxoWallet;

/// Client for one UTXO chain.
pub struct UtxoClient<P: UtxoParams> {
    core: Client<UtxoWallet<P>>,
    explorer: Arc<dyn UtxoExplorer>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl<P: UtxoParams> UtxoClient<P> {
    pub async fn new(
        config: ClientConfig,
        explorer: Arc<dyn UtxoExplorer>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Result<Self, ClientError> {
        let core = ClientBuilder::new(config).build().await?;
        debug!(chain = %P::CHAIN, network = %core.network(), "utxo client ready");
        Ok(Self {
            core,
            explorer,
            broadcaster,
        })
    }

    pub fn chain(&self) -> UtxoChain {
        P::CHAIN
    }

    /// The shared lifecycle this client is built on.
    pub fn core(&self) -> &Client<UtxoWallet<P>> {
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
        validate_address(P::CHAIN, self.get_network(), address)
    }

    pub fn normalize_address(&self, address: &str) -> Result<String, ClientError> {
        Ok(normalize_address(P::CHAIN, self.get_network(), address)?)
    }

    pub async fn unlock<F>(&self, factory: F) -> Result<(), ClientError>
    where
        F: WalletFactory<UtxoWallet<P>>,
    {
        self.core.unlock(factory).await
    }

    pub fn purge_client(&self) {
        self.core.purge();
    }

    pub fn get_address(&self, index: impl IntoWalletIndex) -> Result<String, ClientError> {
        self.core.get_address(index)
    }

    #[instrument(skip(self), fields(chain = %P::CHAIN))]
    pub async fn get_balance(&self, address: &str) -> Result<Vec<Balance>, ClientError> {
        let address = self.normalize_address(address)?;
        self.explorer.get_balance(&address).await
    }

    #[instrument(skip(self), fields(chain = %P::CHAIN))]
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

    /// Explorer sample expanded into tiers; falls back to the chain
    /// constant when the explorer fails.
    pub async fn get_fee_rates(&self) -> Result<FeeRates, ClientError> {
        let sample = sample_fee_rate(
            self.explorer.get_suggested_fee_rate(),
            P::CHAIN.fallback_fee_rate(),
        )
        .await;
        Ok(FeeRates::from_sample(sample))
    }

    /// Rates plus absolute fees for a one-input transfer with change.
    pub async fn get_fees_with_rates(&self, memo: Option<&str>) -> Result<FeesWithRates, ClientError> {
        let size = typical_vsize(P::CHAIN, memo)?;
        Ok(FeesWithRates::for_size(self.get_fee_rates().await?, size))
    }

    pub async fn get_fees(&self) -> Result<Fees, ClientError> {
        Ok(self.get_fees_with_rates(None).await?.fees)
    }

    /// Select, build and sign a transfer without broadcasting it.
    #[instrument(skip(self, params), fields(chain = %P::CHAIN, index = %params.index()))]
    pub async fn build_transfer(
        &self,
        params: &TransferParams,
    ) -> Result<(TxPlan, SignedTransaction), ClientError> {
        let network = self.get_network();
        let index = params.index();
        let wallet = self.core.wallet()?;

        if let Some(asset) = &params.asset {
            if *asset != P::CHAIN.native_asset() {
                return Err(ClientError::InvalidParams(format!(
                    "{asset} cannot be sent on {}",
                    P::CHAIN
                )));
            }
        }
        let recipient = parse_address(P::CHAIN, network, &params.recipient)?;
        self.core.config().amount_policy.check(params.amount)?;
        let amount = u64::try_from(params.amount)
            .map_err(|_| ClientError::InvalidParams(format!("amount {} overflows", params.amount)))?;
        let memo = params.memo.as_deref().filter(|m| !m.is_empty());
        if let Some(memo) = memo {
            check_memo(memo)?;
        }

        let fee_rate = match params.fee_rate {
            Some(rate) => validate_fee_rate(rate)?,
            None => self.get_fee_rates().await?.fast,
        };

        let sender = wallet.address(index)?;
        let change_script = parse_address(P::CHAIN, network, &sender)?.script_pubkey;
        let utxos = self
            .explorer
            .get_unspent_outputs(&sender, memo.is_none())
            .await?;
        let utxos = eligible(utxos, memo.is_some());

        let plan = plan_transaction(
            &PlanRequest {
                chain: P::CHAIN,
                recipient: &recipient.script_pubkey,
                amount,
                memo,
                change_script: &change_script,
                fee_rate,
            },
            utxos,
        )?;
        debug!(
            inputs = plan.inputs.len(),
            fee = plan.fee,
            change = plan.change,
            vsize = plan.vsize,
            "transfer planned"
        );

        let unsigned = build_unsigned(&plan)?;
        let signed = wallet.signer(index)?.sign(&unsigned)?;
        Ok((plan, signed))
    }

    /// Build, sign and broadcast; returns the node's transaction id.
    pub async fn transfer(&self, params: TransferParams) -> Result<String, ClientError> {
        let (plan, signed) = self.build_transfer(&params).await?;
        let txid = self
            .broadcaster
            .broadcast(&signed.hex(), self.get_network(), &self.core.config().endpoints)
            .await?;
        info!(chain = %P::CHAIN, txid = %txid, fee = plan.fee, "transfer broadcast");
        Ok(txid)
    }
}

/// Planned size of one own-script input paying one own-script output
/// plus change, with the memo if any.
fn typical_vsize(chain: UtxoChain, memo: Option<&str>) -> Result<u64, ClientError> {
    let script = match chain.script_kind() {
        ScriptKind::P2wpkh => ScriptBuf::new_p2wpkh(&WPubkeyHash::from_byte_array([0; 20])),
        ScriptKind::P2pkh => ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array([0; 20])),
    };
    let out = TxOut {
        value: Amount::ZERO,
        script_pubkey: script,
    };
    let mut outputs = vec![out.clone(), out];
    if let Some(memo) = memo.filter(|m| !m.is_empty()) {
        outputs.push(TxOut {
            value: Amount::ZERO,
            script_pubkey: memo_script(memo)?,
        });
    }
    Ok(planned_vsize(chain, 1, &outputs)?)
}
