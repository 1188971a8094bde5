use async_trait::async_trait;
use cosmwasm_std::Uint128;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ClientError, Result},
    wallet::Wallet,
};

/// Key name of the pre-funded account every test user is seeded from.
pub const FAUCET_ACCOUNT_KEY_NAME: &str = "faucet";

pub const DEFAULT_COIN_DECIMALS: u32 = 6;
pub const GAS_LIMIT: u64 = 200_000;

/// Coin type of Ethermint-based chains (`eth_secp256k1` keys).
pub const ETHERMINT_COIN_TYPE: &str = "60";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    #[serde(default)]
    pub name: String,
    pub bech32_prefix: String,
    pub coin_type: String,
    /// Gas price amount immediately followed by the denom, e.g. `0.025uatom`.
    pub gas_prices: String,
    pub gas_adjustment: f64,
    pub denom: String,
    #[serde(default)]
    pub coin_decimals: Option<u32>,
}

impl ChainConfig {
    pub fn coin_decimals(&self) -> u32 {
        self.coin_decimals.unwrap_or(DEFAULT_COIN_DECIMALS)
    }

    /// Numeric gas price with every occurrence of the denom stripped.
    ///
    /// The price must be a finite, non-negative number.
    pub fn gas_price(&self) -> Result<f64> {
        let parse_err = |reason: String| ClientError::GasPriceParse {
            gas_prices: self.gas_prices.clone(),
            denom: self.denom.clone(),
            reason,
        };

        let price = self
            .gas_prices
            .replace(&self.denom, "")
            .parse::<f64>()
            .map_err(|e| parse_err(e.to_string()))?;

        if !price.is_finite() {
            return Err(parse_err("value out of range".to_string()));
        }
        if price < 0.0 {
            return Err(parse_err("value is negative".to_string()));
        }

        Ok(price)
    }

    /// BIP-44 coin type used in the HD path of new wallets.
    ///
    /// Wallets get cosmos addresses, so Ethermint chains are rejected.
    pub fn hd_coin_type(&self) -> Result<u32> {
        if self.coin_type == ETHERMINT_COIN_TYPE {
            return Err(ClientError::ConfigError(format!(
                "chain {} uses eth_secp256k1 keys, cosmos wallets cannot be built for it",
                self.chain_id
            )));
        }

        self.coin_type.parse().map_err(|_| {
            ClientError::ConfigError(format!(
                "coin type {:?} of chain {} is not a number",
                self.coin_type, self.chain_id
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAmount {
    pub address: String,
    pub denom: String,
    pub amount: Uint128,
}

/// The operations the harness needs from a running chain.
#[async_trait]
pub trait Chain: Send + Sync {
    fn config(&self) -> &ChainConfig;

    /// Restores the wallet from `mnemonic`, or generates a fresh one when it
    /// is empty, and registers it under `key_name`.
    async fn build_wallet(&self, key_name: &str, mnemonic: &str) -> Result<Wallet>;

    /// Sends `amount` from the wallet registered under `key_name`.
    async fn send_funds(&self, key_name: &str, amount: WalletAmount) -> Result<()>;
}
