mod common;

use std::sync::Arc;
use std::time::Duration;

use chain_eth::transaction::build_transfer;
use chain_eth::{default_config, EthClient};
use client_core::{
    AmountPolicy, Asset, ClientError, Network, PhraseFactory, TransferParams, WalletIndex,
};
use common::{
    unlocked_client, MockBroadcaster, MockExplorer, MockNode, NODE_TXID, TEST_ADDRESS, TEST_PHRASE,
    USDC, USDT,
};

const RECIPIENT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const RECIPIENT_CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const GWEI: u128 = 1_000_000_000;

fn collaborators(node: MockNode) -> (Arc<MockNode>, Arc<MockExplorer>, Arc<MockBroadcaster>) {
    (
        Arc::new(node),
        Arc::new(MockExplorer::default()),
        Arc::new(MockBroadcaster::default()),
    )
}

#[tokio::test]
async fn construction_checks_chain_id() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = unlocked_client(&node, &explorer, &broadcaster).await;
    assert_eq!(client.chain_id(), 1);
    assert_eq!(node.calls(), ["chain_id"]);

    let (node, explorer, broadcaster) = collaborators(MockNode::new(11155111));
    let err = EthClient::new(
        default_config(Network::Mainnet),
        node.clone(),
        explorer,
        broadcaster,
    )
    .await
    .err()
    .unwrap();
    match err {
        ClientError::Initialization { step, reason } => {
            assert_eq!(step, "chain-id");
            assert!(reason.contains("11155111"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_node_fails_construction() {
    let mut node = MockNode::new(1);
    node.chain_id = Err("connection refused".into());
    let (node, explorer, broadcaster) = collaborators(node);
    let result = EthClient::new(default_config(Network::Mainnet), node, explorer, broadcaster).await;
    assert!(matches!(result, Err(ClientError::Initialization { .. })));
}

#[tokio::test]
async fn testnet_client_talks_to_sepolia() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(11155111));
    let client = EthClient::new(default_config(Network::Testnet), node, explorer, broadcaster)
        .await
        .unwrap();
    assert_eq!(client.chain_id(), 11155111);
    assert_eq!(client.get_explorer_url(), "https://sepolia.etherscan.io");
    assert!(matches!(client.get_address(0u32), Err(ClientError::ClientLocked)));
}

#[tokio::test]
async fn derives_reference_account() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    assert_eq!(client.get_address(0u32).unwrap(), TEST_ADDRESS);
    assert_eq!(client.get_full_derivation_path(2u32).unwrap(), "m/44'/60'/0'/0/2");
    assert!(matches!(client.get_address(-1), Err(ClientError::InvalidIndex(_))));
    assert_eq!(
        client.get_explorer_address_url(TEST_ADDRESS),
        format!("https://etherscan.io/address/{TEST_ADDRESS}")
    );
}

#[tokio::test]
async fn transfer_signs_with_node_nonce_and_fast_tier() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let txid = client
        .transfer(TransferParams::new(RECIPIENT, 100_000_000_000_000_000))
        .await
        .unwrap();
    assert_eq!(txid, NODE_TXID);
    assert!(node.calls().contains(&format!("nonce:{TEST_ADDRESS}")));

    let expected_tx = build_transfer(
        1,
        4,
        RECIPIENT_CHECKSUMMED,
        100_000_000_000_000_000,
        3 * GWEI / 2,
        20 * GWEI,
        21_000,
    )
    .unwrap();
    let expected = client
        .core()
        .wallet()
        .unwrap()
        .signer(WalletIndex::ZERO)
        .unwrap()
        .sign(&expected_tx)
        .unwrap();

    let sent = broadcaster.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, expected.raw_hex());
    assert_eq!(sent[0].1, Network::Mainnet);
    assert_eq!(sent[0].2, "https://eth.llamarpc.com");
}

#[tokio::test]
async fn low_fee_rate_caps_priority_fee() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let signed = client
        .build_transfer(&TransferParams::new(RECIPIENT, 1).with_fee_rate(1e9))
        .await
        .unwrap();
    let expected_tx = build_transfer(1, 4, RECIPIENT, 1, GWEI, GWEI, 21_000).unwrap();
    let expected = client
        .core()
        .wallet()
        .unwrap()
        .signer(WalletIndex::ZERO)
        .unwrap()
        .sign(&expected_tx)
        .unwrap();
    assert_eq!(signed.raw_tx, expected.raw_tx);
    assert!(!node.calls().contains(&"gas_price".to_string()));
}

#[tokio::test]
async fn rejected_transfers_do_no_io() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let memo = TransferParams::new(RECIPIENT, 1).with_memo("SWAP:BTC.BTC");
    assert!(matches!(
        client.transfer(memo).await,
        Err(ClientError::InvalidParams(_))
    ));

    let token = TransferParams::new(RECIPIENT, 1).with_asset(Asset::token("ETH", "USDC", USDC));
    assert!(matches!(
        client.transfer(token).await,
        Err(ClientError::InvalidParams(_))
    ));

    let bad_checksum = TransferParams::new("0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed", 1);
    assert!(matches!(
        client.transfer(bad_checksum).await,
        Err(ClientError::InvalidAddress(_))
    ));

    assert_eq!(node.calls(), ["chain_id"]);
    assert!(broadcaster.sent().is_empty());
}

#[tokio::test]
async fn locked_and_purged_clients_refuse() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = EthClient::new(
        default_config(Network::Mainnet),
        node.clone(),
        explorer.clone(),
        broadcaster.clone(),
    )
    .await
    .unwrap();

    assert!(matches!(
        client.transfer(TransferParams::new(RECIPIENT, 1)).await,
        Err(ClientError::ClientLocked)
    ));

    client
        .unlock(PhraseFactory::new(TEST_PHRASE).unwrap())
        .await
        .unwrap();
    client.purge_client();
    assert!(matches!(
        client.transfer(TransferParams::new(RECIPIENT, 1)).await,
        Err(ClientError::ClientLocked)
    ));
    assert!(broadcaster.sent().is_empty());
}

#[tokio::test]
async fn zero_amount_respects_policy() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let mut config = default_config(Network::Mainnet);
    config.amount_policy = AmountPolicy::RejectZero;
    let client = EthClient::new(config, node.clone(), explorer, broadcaster)
        .await
        .unwrap();
    client
        .unlock(PhraseFactory::new(TEST_PHRASE).unwrap())
        .await
        .unwrap();

    assert!(matches!(
        client.build_transfer(&TransferParams::new(RECIPIENT, 0)).await,
        Err(ClientError::InvalidParams(_))
    ));
}

#[tokio::test]
async fn fees_follow_gas_price() {
    let (node, explorer, broadcaster) = collaborators(MockNode::new(1));
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let with_rates = client.get_fees_with_rates(None).await.unwrap();
    assert_eq!(with_rates.rates.average, 10e9);
    assert_eq!(with_rates.fees.average, 21_000 * 10 * GWEI);
    assert_eq!(with_rates.fees.fast, 21_000 * 20 * GWEI);
    assert_eq!(with_rates.fees.fastest, 21_000 * 100 * GWEI);
    assert_eq!(client.get_fees().await.unwrap(), with_rates.fees);

    assert!(matches!(
        client.get_fees_with_rates(Some("memo")).await,
        Err(ClientError::InvalidParams(_))
    ));
}

#[tokio::test]
async fn fee_rates_fall_back_when_node_fails() {
    let mut node = MockNode::new(1);
    node.gas_price = None;
    let (node, explorer, broadcaster) = collaborators(node);
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let rates = client.get_fee_rates().await.unwrap();
    assert_eq!(rates.average, 15e9);
    assert_eq!(rates.fast, 30e9);
    assert_eq!(rates.fastest, 150e9);
}

#[tokio::test(start_paused = true)]
async fn balances_are_fetched_one_asset_at_a_time() {
    let node = MockNode::new(1).with_token(USDC, 5_000_000).with_token(USDT, 7);
    let (node, explorer, broadcaster) = collaborators(node);
    let client = unlocked_client(&node, &explorer, &broadcaster)
        .await
        .with_tokens(vec![
            Asset::token("ETH", "USDC", USDC),
            Asset::token("ETH", "USDT", USDT),
        ])
        .with_balance_pace(Duration::from_millis(300));

    let balances = client.get_balance(&TEST_ADDRESS.to_lowercase(), None).await.unwrap();
    let amounts: Vec<u128> = balances.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, [2_000_000_000_000_000_000, 5_000_000, 7]);
    assert_eq!(balances[0].asset, Asset::native("ETH", "ETH"));
    assert_eq!(balances[2].asset.symbol, "USDT");

    let calls = node.calls();
    assert_eq!(calls[1], format!("balance:{TEST_ADDRESS}"));
    assert!(calls[2].starts_with(&format!("call:{USDC}:70a08231")));
    assert!(calls[2].ends_with(&TEST_ADDRESS[2..].to_lowercase()));

    let times = node.call_times();
    assert_eq!(times[2] - times[1], Duration::from_millis(300));
    assert_eq!(times[3] - times[2], Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn failing_token_aborts_enumeration() {
    let node = MockNode::new(1).with_token(USDT, 7);
    let (node, explorer, broadcaster) = collaborators(node);
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let assets = [
        Asset::token("ETH", "USDC", USDC),
        Asset::token("ETH", "USDT", USDT),
    ];
    let result = client.get_balance(TEST_ADDRESS, Some(&assets)).await;
    assert!(matches!(result, Err(ClientError::Collaborator(_))));
    assert_eq!(node.calls().len(), 2);

    assert!(matches!(
        client.get_balance("0x1234", None).await,
        Err(ClientError::InvalidAddress(_))
    ));
}

#[tokio::test]
async fn history_resolves_each_transaction() {
    let node = Arc::new(MockNode::new(1));
    let explorer = Arc::new(MockExplorer {
        history: vec!["0xaa".into(), "0xbb".into(), "0xcc".into()],
        ..Default::default()
    });
    let broadcaster = Arc::new(MockBroadcaster::default());
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    let page = client.get_transactions(TEST_ADDRESS, Some(1), Some(5)).await.unwrap();
    assert_eq!(page.total, 3);
    let hashes: Vec<&str> = page.txs.iter().map(|tx| tx.hash.as_str()).collect();
    assert_eq!(hashes, ["0xbb", "0xcc"]);
    assert_eq!(client.get_transaction_data("0xaa").await.unwrap().hash, "0xaa");
}

#[tokio::test]
async fn history_aborts_on_first_failed_lookup() {
    let node = Arc::new(MockNode::new(1));
    let explorer = Arc::new(MockExplorer {
        history: vec!["0xaa".into(), "0xbb".into(), "0xcc".into()],
        failing_tx: Some("0xbb".into()),
        ..Default::default()
    });
    let broadcaster = Arc::new(MockBroadcaster::default());
    let client = unlocked_client(&node, &explorer, &broadcaster).await;

    assert!(client.get_transactions(TEST_ADDRESS, None, None).await.is_err());
    assert_eq!(*explorer.lookups.lock().unwrap(), ["0xaa", "0xbb"]);
}
