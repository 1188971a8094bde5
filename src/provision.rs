//! Funded test users.
//!
//! Funds are sent but not awaited: callers should let the chains produce a
//! few blocks before spending from the returned wallets.

use std::sync::Arc;

use cosmwasm_std::Uint128;
use rand::Rng;
use tokio::task::JoinSet;

use crate::{
    chain::{Chain, WalletAmount, FAUCET_ACCOUNT_KEY_NAME},
    error::{ClientError, Result},
    wallet::Wallet,
};

const KEY_NAME_SUFFIX_LEN: usize = 3;

/// Random string of lowercase ASCII letters.
pub fn rand_lower_case_letter_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Converts whole coins into base units of a token with `decimals` decimals.
pub fn to_base_units(amount: Uint128, decimals: u32) -> Result<Uint128> {
    Uint128::new(10)
        .checked_pow(decimals)
        .and_then(|pow| amount.checked_mul(pow))
        .map_err(|e| {
            ClientError::Overflow(format!(
                "{} coins with {} decimals: {}",
                amount, decimals, e
            ))
        })
}

/// Restores a user from `mnemonic` (or generates one if it is empty) and funds
/// it with `amount` whole coins of the chain's native denom.
pub async fn get_and_fund_test_user_with_mnemonic<C>(
    chain: &C,
    key_name_prefix: &str,
    mnemonic: &str,
    amount: Uint128,
) -> Result<Wallet>
where
    C: Chain + ?Sized,
{
    let chain_cfg = chain.config();
    let key_name = format!(
        "{}-{}-{}",
        key_name_prefix,
        chain_cfg.chain_id,
        rand_lower_case_letter_string(KEY_NAME_SUFFIX_LEN)
    );

    let user = chain
        .build_wallet(&key_name, mnemonic)
        .await
        .map_err(|e| ClientError::WalletCreation {
            chain_id: chain_cfg.chain_id.clone(),
            source: Box::new(e),
        })?;

    let amount = to_base_units(amount, chain_cfg.coin_decimals())?;

    chain
        .send_funds(
            FAUCET_ACCOUNT_KEY_NAME,
            WalletAmount {
                address: user.formatted_address(),
                denom: chain_cfg.denom.clone(),
                amount,
            },
        )
        .await
        .map_err(|e| ClientError::Faucet {
            chain_id: chain_cfg.chain_id.clone(),
            source: Box::new(e),
        })?;

    tracing::info!(
        chain_id = %chain_cfg.chain_id,
        key_name = %user.key_name,
        address = %user.formatted_address(),
        %amount,
        "Funded test user"
    );

    Ok(user)
}

/// Creates and funds one fresh user per chain, concurrently.
///
/// `amount` is in whole coins and is scaled by each chain's decimals. Every
/// task runs to completion; if any failed, the first failure to complete is
/// returned and no wallets are. On success the wallets are in `chains` order.
pub async fn get_and_fund_test_users<C>(
    key_name_prefix: &str,
    amount: Uint128,
    chains: &[Arc<C>],
) -> Result<Vec<Wallet>>
where
    C: Chain + ?Sized + 'static,
{
    let mut tasks = JoinSet::new();
    for (i, chain) in chains.iter().enumerate() {
        let chain = Arc::clone(chain);
        let key_name_prefix = key_name_prefix.to_string();

        tasks.spawn(async move {
            let user =
                get_and_fund_test_user_with_mnemonic(chain.as_ref(), &key_name_prefix, "", amount)
                    .await;
            (i, user)
        });
    }

    let mut users: Vec<Option<Wallet>> = vec![None; chains.len()];
    let mut first_err = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((i, Ok(user))) => users[i] = Some(user),
            Ok((i, Err(e))) => {
                tracing::warn!(chain_index = i, error = %e, "Failed to fund test user");
                first_err.get_or_insert(e);
            }
            Err(e) => {
                first_err.get_or_insert(ClientError::TaskError(e.to_string()));
            }
        }
    }

    if let Some(e) = first_err {
        return Err(e);
    }

    users
        .into_iter()
        .map(|user| user.ok_or_else(|| ClientError::TaskError("Missing funded user".to_string())))
        .collect()
}
