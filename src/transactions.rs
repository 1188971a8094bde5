use crate::chain::{Chain, WalletAmount, GAS_LIMIT};
use crate::client::CosmosChain;
use crate::wallet::Wallet;
use anyhow::Context;
use cosmrs::bank::MsgSend;
use cosmrs::tendermint::chain::Id as ChainId;
use cosmrs::tx::{BodyBuilder, Fee, Msg, Raw, SignDoc, SignerInfo};
use cosmrs::{AccountId, Any, Coin, Denom};
use std::str::FromStr;

/// Fee for a transaction of `gas_limit` gas at `gas_price`, rounded up to whole base units.
pub fn fee_amount(gas_price: f64, gas_limit: u64) -> u128 {
    (gas_price * gas_limit as f64).ceil() as u128
}

impl CosmosChain {
    /// Sends a bank transfer signed by `sender`, returning the tx hash.
    pub async fn send(&self, sender: &Wallet, amount: &WalletAmount) -> anyhow::Result<String> {
        let to_address = AccountId::from_str(&amount.address)
            .map_err(|e| anyhow::anyhow!("Invalid recipient address {}: {}", amount.address, e))?;

        let coin = Coin {
            denom: Denom::from_str(&amount.denom)
                .map_err(|e| anyhow::anyhow!("Invalid denom: {}", e))?,
            amount: amount.amount.u128(),
        };

        let send_msg = MsgSend {
            from_address: sender.account_id.clone(),
            to_address,
            amount: vec![coin],
        };

        self.build_and_broadcast_tx(
            sender,
            send_msg
                .to_any()
                .map_err(|e| anyhow::anyhow!("Failed to convert message to Any: {}", e))?,
        )
        .await
    }

    async fn build_and_broadcast_tx(&self, signer: &Wallet, msg: Any) -> anyhow::Result<String> {
        let tx_raw = self.build_tx(signer, msg).await?;

        let tx_bytes = tx_raw
            .to_bytes()
            .map_err(|e| anyhow::anyhow!("Failed to serialize transaction: {}", e))?;

        let response = self.broadcast_tx(tx_bytes).await?;
        let tx_response = response
            .tx_response
            .ok_or_else(|| anyhow::anyhow!("Transaction response is empty"))?;

        if tx_response.code != 0 {
            return Err(anyhow::anyhow!(
                "Transaction failed: {}",
                tx_response.raw_log
            ));
        }

        Ok(tx_response.txhash)
    }

    /// Builds and signs a transaction with the given message
    pub async fn build_tx(&self, signer: &Wallet, msg: Any) -> anyhow::Result<Raw> {
        let account = self
            .get_account_info(signer.formatted_address())
            .await
            .context("Failed to query signer account")?;
        let account_number = account.account_number;
        let sequence = account.sequence;

        let config = self.config();
        let chain_id = ChainId::from_str(&config.chain_id)
            .map_err(|e| anyhow::anyhow!("Invalid chain ID: {}", e))?;

        let fee = Coin {
            amount: fee_amount(config.gas_price()?, GAS_LIMIT),
            denom: Denom::from_str(&config.denom)
                .map_err(|e| anyhow::anyhow!("Invalid denom: {}", e))?,
        };
        let fee = Fee::from_amount_and_gas(fee, GAS_LIMIT);

        let tx_body = BodyBuilder::new().msg(msg).finish();

        let auth_info =
            SignerInfo::single_direct(Some(signer.public_key.clone()), sequence).auth_info(fee);

        let sign_doc = SignDoc::new(&tx_body, &auth_info, &chain_id, account_number)
            .map_err(|e| anyhow::anyhow!("Failed to create sign doc: {}", e))?;

        signer.sign(sign_doc)
    }
}
