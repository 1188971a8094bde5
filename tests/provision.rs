use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cosmwasm_std::Uint128;
use interchain_harness::{
    chain::FAUCET_ACCOUNT_KEY_NAME,
    provision::{get_and_fund_test_user_with_mnemonic, get_and_fund_test_users},
    Chain, ChainConfig, ClientError, Result, Wallet, WalletAmount,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(20);
const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[derive(Default)]
struct Behaviour {
    delay: Duration,
    fail_wallet: bool,
    fail_send: bool,
}

struct MockChain {
    config: ChainConfig,
    behaviour: Behaviour,
    sends: Mutex<Vec<(String, WalletAmount)>>,
}

impl MockChain {
    fn new(chain_id: &str, prefix: &str, denom: &str, coin_decimals: Option<u32>) -> Self {
        Self::with_behaviour(chain_id, prefix, denom, coin_decimals, Behaviour::default())
    }

    fn with_behaviour(
        chain_id: &str,
        prefix: &str,
        denom: &str,
        coin_decimals: Option<u32>,
        behaviour: Behaviour,
    ) -> Self {
        Self {
            config: ChainConfig {
                chain_id: chain_id.to_string(),
                name: chain_id.to_string(),
                bech32_prefix: prefix.to_string(),
                coin_type: "118".to_string(),
                gas_prices: format!("0.025{denom}"),
                gas_adjustment: 1.3,
                denom: denom.to_string(),
                coin_decimals,
            },
            behaviour,
            sends: Mutex::new(Vec::new()),
        }
    }

    fn sends(&self) -> Vec<(String, WalletAmount)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl Chain for MockChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    async fn build_wallet(&self, key_name: &str, mnemonic: &str) -> Result<Wallet> {
        tokio::time::sleep(self.behaviour.delay).await;

        if self.behaviour.fail_wallet {
            return Err(ClientError::WalletError("keyring unavailable".to_string()));
        }

        let coin_type = self.config.hd_coin_type()?;
        let prefix = &self.config.bech32_prefix;
        if mnemonic.is_empty() {
            Wallet::generate(key_name, prefix, coin_type)
        } else {
            Wallet::from_mnemonic(key_name, mnemonic, prefix, coin_type)
        }
        .map_err(|e| ClientError::WalletError(format!("{e:#}")))
    }

    async fn send_funds(&self, key_name: &str, amount: WalletAmount) -> Result<()> {
        if self.behaviour.fail_send {
            return Err(ClientError::TransactionError(
                "Transaction failed: insufficient funds".to_string(),
            ));
        }

        self.sends
            .lock()
            .unwrap()
            .push((key_name.to_string(), amount));
        Ok(())
    }
}

#[tokio::test]
async fn funds_one_user_per_chain() {
    let chains = vec![
        Arc::new(MockChain::new("gaia-1", "cosmos", "uatom", None)),
        Arc::new(MockChain::new("evmos_9000-1", "evmos", "aevmos", Some(18))),
        Arc::new(MockChain::new("osmosis-1", "osmo", "uosmo", Some(6))),
    ];

    let users = get_and_fund_test_users("user", Uint128::new(10), &chains)
        .await
        .unwrap();

    assert_eq!(users.len(), chains.len());

    let expected = [
        Uint128::new(10_000_000),
        Uint128::new(10_000_000_000_000_000_000),
        Uint128::new(10_000_000),
    ];

    for ((user, chain), expected_amount) in users.iter().zip(&chains).zip(expected) {
        let cfg = chain.config();
        let address = user.formatted_address();
        assert!(address.starts_with(&format!("{}1", cfg.bech32_prefix)));

        let suffix = user
            .key_name
            .strip_prefix(&format!("user-{}-", cfg.chain_id))
            .unwrap();
        assert_eq!(suffix.len(), 3);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));

        let sends = chain.sends();
        assert_eq!(sends.len(), 1);
        let (from, amount) = &sends[0];
        assert_eq!(from, FAUCET_ACCOUNT_KEY_NAME);
        assert_eq!(amount.address, address);
        assert_eq!(amount.denom, cfg.denom);
        assert_eq!(amount.amount, expected_amount);
    }
}

#[tokio::test]
async fn results_follow_input_order() {
    let slow = Behaviour {
        delay: Duration::from_millis(300),
        ..Default::default()
    };
    let chains = vec![
        Arc::new(MockChain::with_behaviour("slow-1", "slow", "uslow", None, slow)),
        Arc::new(MockChain::new("fast-1", "fast", "ufast", None)),
    ];

    let users = get_and_fund_test_users("order", Uint128::new(1), &chains)
        .await
        .unwrap();

    assert!(users[0].formatted_address().starts_with("slow1"));
    assert!(users[1].formatted_address().starts_with("fast1"));
}

#[tokio::test]
async fn wallet_failure_is_reported_after_all_tasks_finish() {
    let broken = Behaviour {
        fail_wallet: true,
        ..Default::default()
    };
    let slow = Behaviour {
        delay: Duration::from_millis(200),
        ..Default::default()
    };
    let chains = vec![
        Arc::new(MockChain::with_behaviour("broken-1", "cosmos", "uatom", None, broken)),
        Arc::new(MockChain::with_behaviour("slow-1", "osmo", "uosmo", None, slow)),
    ];

    let result = tokio::time::timeout(
        TEST_TIMEOUT,
        get_and_fund_test_users("user", Uint128::new(5), &chains),
    )
    .await
    .expect("provisioning hung");

    match result {
        Err(ClientError::WalletCreation { chain_id, source }) => {
            assert_eq!(chain_id, "broken-1");
            assert!(matches!(*source, ClientError::WalletError(_)));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // the healthy chain is not cancelled
    assert!(chains[0].sends().is_empty());
    assert_eq!(chains[1].sends().len(), 1);
}

#[tokio::test]
async fn faucet_failure_is_reported() {
    let broke = Behaviour {
        fail_send: true,
        ..Default::default()
    };
    let chains = vec![Arc::new(MockChain::with_behaviour(
        "gaia-1", "cosmos", "uatom", None, broke,
    ))];

    let err = get_and_fund_test_users("user", Uint128::new(1), &chains)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Faucet { ref chain_id, .. } if chain_id == "gaia-1"));
    assert!(err.to_string().contains("Failed to get funds from faucet"));
}

#[tokio::test]
async fn amount_overflow_is_an_error() {
    let chains = vec![Arc::new(MockChain::new("big-1", "big", "abig", Some(60)))];

    let err = get_and_fund_test_users("user", Uint128::new(1), &chains)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Overflow(_)));
    assert!(chains[0].sends().is_empty());
}

#[tokio::test]
async fn restores_user_from_mnemonic() {
    let chain = MockChain::new("gaia-1", "cosmos", "uatom", None);

    let first = get_and_fund_test_user_with_mnemonic(&chain, "restored", MNEMONIC, Uint128::new(2))
        .await
        .unwrap();
    let second =
        get_and_fund_test_user_with_mnemonic(&chain, "restored", MNEMONIC, Uint128::new(2))
            .await
            .unwrap();

    assert_eq!(first.formatted_address(), second.formatted_address());
    assert_eq!(first.mnemonic, MNEMONIC);

    let sends = chain.sends();
    assert_eq!(sends.len(), 2);
    assert_eq!(sends[0].1.amount, Uint128::new(2_000_000));
}

#[tokio::test]
async fn mixed_chain_types() {
    let chains: Vec<Arc<dyn Chain>> = vec![
        Arc::new(MockChain::new("gaia-1", "cosmos", "uatom", None)),
        Arc::new(MockChain::new("juno-1", "juno", "ujuno", None)),
    ];

    let users = get_and_fund_test_users("mixed", Uint128::new(1), &chains)
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| !u.formatted_address().is_empty()));
}

#[tokio::test]
async fn ethermint_chain_is_refused() {
    let mut evmos = MockChain::new("evmos_9000-1", "evmos", "aevmos", Some(18));
    evmos.config.coin_type = "60".to_string();
    let chains = vec![Arc::new(evmos)];

    let err = get_and_fund_test_users("user", Uint128::new(1), &chains)
        .await
        .unwrap_err();

    match err {
        ClientError::WalletCreation { chain_id, source } => {
            assert_eq!(chain_id, "evmos_9000-1");
            assert!(matches!(*source, ClientError::ConfigError(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(chains[0].sends().is_empty());
}
