use std::collections::HashMap;

use async_trait::async_trait;
use prost::Message;
use tendermint_rpc::{Client, HttpClient};
use tokio::sync::RwLock;

use cosmos_sdk_proto::cosmos::{
    auth::v1beta1::{query_client::QueryClient, BaseAccount, QueryAccountRequest},
    tx::v1beta1::{
        service_client::ServiceClient, BroadcastMode, BroadcastTxRequest, BroadcastTxResponse,
    },
};

use crate::{
    chain::{Chain, ChainConfig, WalletAmount},
    error::{ClientError, Result},
    wallet::Wallet,
};

/// A Cosmos SDK chain reached over gRPC, with an in-memory keyring.
pub struct CosmosChain {
    config: ChainConfig,
    grpc_url: String,
    keyring: RwLock<HashMap<String, Wallet>>,
}

impl CosmosChain {
    /// Connects to the node and checks that it serves `config.chain_id`.
    pub async fn connect(config: ChainConfig, rpc_addr: &str, grpc_url: &str) -> Result<Self> {
        let rpc_client = HttpClient::new(rpc_addr).map_err(|e| {
            ClientError::RpcError(format!("Failed to create RPC client for {}: {}", rpc_addr, e))
        })?;

        let status = rpc_client
            .status()
            .await
            .map_err(|e| ClientError::RpcError(format!("Failed to get node status: {}", e)))?;

        let network = status.node_info.network.to_string();
        if network != config.chain_id {
            return Err(ClientError::ConfigError(format!(
                "Node at {} serves chain {}, expected {}",
                rpc_addr, network, config.chain_id
            )));
        }

        tracing::info!(chain_id = %config.chain_id, rpc_addr, grpc_url, "Connected to chain");

        Ok(Self {
            config,
            grpc_url: grpc_url.to_string(),
            keyring: RwLock::new(HashMap::new()),
        })
    }

    /// Registers `wallet` in the keyring under its key name, replacing any previous entry.
    pub async fn add_key(&self, wallet: Wallet) {
        self.keyring
            .write()
            .await
            .insert(wallet.key_name.clone(), wallet);
    }

    pub async fn get_key(&self, key_name: &str) -> Result<Wallet> {
        self.keyring
            .read()
            .await
            .get(key_name)
            .cloned()
            .ok_or_else(|| {
                ClientError::WalletError(format!(
                    "Key {} not found in keyring of {}",
                    key_name, self.config.chain_id
                ))
            })
    }

    pub async fn broadcast_tx(&self, tx_bytes: Vec<u8>) -> Result<BroadcastTxResponse> {
        let mut client = ServiceClient::connect(self.grpc_url.clone())
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to connect: {}", e)))?;

        let request = tonic::Request::new(BroadcastTxRequest {
            tx_bytes,
            mode: BroadcastMode::Sync as i32,
        });

        let response = client.broadcast_tx(request).await.map_err(|e| {
            ClientError::GrpcError(format!("Failed to broadcast transaction: {}", e))
        })?;

        Ok(response.into_inner())
    }

    pub async fn get_account_info(&self, address: String) -> Result<BaseAccount> {
        let mut client = QueryClient::connect(self.grpc_url.clone())
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to connect: {}", e)))?;

        let response = client
            .account(QueryAccountRequest { address })
            .await
            .map_err(|e| ClientError::GrpcError(format!("Failed to get account: {}", e)))?;

        let account = response
            .into_inner()
            .account
            .ok_or_else(|| ClientError::ParseError("No account data found".to_string()))?;

        BaseAccount::decode(account.value.as_slice())
            .map_err(|e| ClientError::ParseError(format!("Failed to decode account: {}", e)))
    }
}

#[async_trait]
impl Chain for CosmosChain {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    async fn build_wallet(&self, key_name: &str, mnemonic: &str) -> Result<Wallet> {
        let coin_type = self.config.hd_coin_type()?;
        let prefix = &self.config.bech32_prefix;

        let wallet = if mnemonic.is_empty() {
            Wallet::generate(key_name, prefix, coin_type)
        } else {
            Wallet::from_mnemonic(key_name, mnemonic, prefix, coin_type)
        }
        .map_err(|e| ClientError::WalletError(format!("{e:#}")))?;

        tracing::debug!(
            chain_id = %self.config.chain_id,
            key_name,
            address = %wallet.formatted_address(),
            "Built wallet"
        );

        self.add_key(wallet.clone()).await;
        Ok(wallet)
    }

    async fn send_funds(&self, key_name: &str, amount: WalletAmount) -> Result<()> {
        let sender = self.get_key(key_name).await?;

        let tx_hash = self
            .send(&sender, &amount)
            .await
            .map_err(|e| ClientError::TransactionError(format!("{e:#}")))?;

        tracing::info!(
            chain_id = %self.config.chain_id,
            from = key_name,
            to = %amount.address,
            amount = %amount.amount,
            denom = %amount.denom,
            %tx_hash,
            "Sent funds"
        );
        Ok(())
    }
}
