//! Hermes relayer `config.toml` generation.
//!
//! Only a handful of fields come from the chains themselves; everything else
//! is taken from [`defaults`], which follows the sample config shipped with
//! Hermes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    chain::{ChainConfig, ETHERMINT_COIN_TYPE},
    error::{ClientError, Result},
};

pub mod defaults {
    pub const LOG_LEVEL: &str = "info";

    pub const CLIENTS_ENABLED: bool = true;
    pub const CLIENTS_REFRESH: bool = true;
    pub const CLIENTS_MISBEHAVIOUR: bool = true;
    pub const CONNECTIONS_ENABLED: bool = true;
    pub const CHANNELS_ENABLED: bool = true;
    pub const PACKETS_ENABLED: bool = true;
    pub const PACKETS_CLEAR_INTERVAL: u64 = 0;
    pub const PACKETS_CLEAR_ON_START: bool = true;
    pub const PACKETS_TX_CONFIRMATION: bool = false;
    pub const PACKETS_AUTO_REGISTER_COUNTERPARTY_PAYEE: bool = false;

    pub const REST_ENABLED: bool = false;
    pub const TELEMETRY_ENABLED: bool = false;
    pub const TRACING_SERVER_ENABLED: bool = false;

    pub const GRPC_SCHEME: &str = "http://";
    pub const WEBSOCKET_PATH: &str = "/websocket";
    pub const EVENT_SOURCE_MODE: &str = "push";
    pub const EVENT_SOURCE_BATCH_DELAY: &str = "200ms";

    pub const CCV_CONSUMER_CHAIN: bool = false;
    pub const RPC_TIMEOUT: &str = "10s";
    pub const TRUSTED_NODE: bool = false;
    pub const STORE_PREFIX: &str = "ibc";
    pub const DEFAULT_GAS: u64 = 200_000;
    pub const MAX_GAS: u64 = 400_000;
    pub const MAX_MSG_NUM: u64 = 30;
    pub const MAX_TX_SIZE: u64 = 2_097_152;
    pub const CLOCK_DRIFT: &str = "5s";
    pub const MAX_BLOCK_TIME: &str = "30s";
    pub const TRUSTING_PERIOD: &str = "14days";
    pub const TRUST_THRESHOLD_NUMERATOR: &str = "1";
    pub const TRUST_THRESHOLD_DENOMINATOR: &str = "3";
    pub const MEMO_PREFIX: &str = "hermes";

    pub const COSMOS_DERIVATION: &str = "cosmos";
    pub const ETHERMINT_DERIVATION: &str = "ethermint";
    pub const ETHERMINT_PK_TYPE: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
}

/// A chain as seen by the relayer: its parameters, the relayer's key on it,
/// and the node endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HermesChainConfig {
    #[serde(flatten)]
    pub cfg: ChainConfig,
    pub key_name: String,
    pub rpc_addr: String,
    /// Bare `host:port`, the scheme is added when the config is built.
    pub grpc_addr: String,
}

impl HermesChainConfig {
    pub fn new(cfg: ChainConfig, key_name: &str, rpc_addr: &str, grpc_addr: &str) -> Self {
        Self {
            cfg,
            key_name: key_name.to_string(),
            rpc_addr: rpc_addr.to_string(),
            grpc_addr: grpc_addr.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChainsFile {
    chains: Vec<HermesChainConfig>,
}

/// Parses a TOML document made of `[[chains]]` tables.
pub fn parse_chain_configs(content: &str) -> Result<Vec<HermesChainConfig>> {
    let file: ChainsFile = toml::from_str(content)
        .map_err(|e| ClientError::ConfigError(format!("Invalid chains file: {}", e)))?;
    Ok(file.chains)
}

pub fn load_chain_configs(path: &Path) -> Result<Vec<HermesChainConfig>> {
    let content = fs::read_to_string(path).map_err(|e| {
        ClientError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_chain_configs(&content)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub global: Global,
    pub mode: Mode,
    pub rest: Rest,
    pub telemetry: Telemetry,
    pub tracing_server: TracingServer,
    pub chains: Vec<Chain>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Global {
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub clients: Clients,
    pub connections: Connections,
    pub channels: Channels,
    pub packets: Packets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clients {
    pub enabled: bool,
    pub refresh: bool,
    pub misbehaviour: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connections {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channels {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packets {
    pub enabled: bool,
    pub clear_interval: u64,
    pub clear_on_start: bool,
    pub tx_confirmation: bool,
    pub auto_register_counterparty_payee: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracingServer {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub id: String,
    pub ccv_consumer_chain: bool,
    pub rpc_addr: String,
    pub grpc_addr: String,
    pub event_source: EventSource,
    pub rpc_timeout: String,
    pub trusted_node: bool,
    pub account_prefix: String,
    pub key_name: String,
    pub address_type: AddressType,
    pub store_prefix: String,
    pub default_gas: u64,
    pub max_gas: u64,
    pub gas_price: GasPrice,
    pub gas_multiplier: f64,
    pub max_msg_num: u64,
    pub max_tx_size: u64,
    pub clock_drift: String,
    pub max_block_time: String,
    pub trusting_period: String,
    pub trust_threshold: TrustThreshold,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memo_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSource {
    pub mode: String,
    pub url: String,
    pub batch_delay: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressType {
    pub derivation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto_type: Option<ProtoType>,
}

impl AddressType {
    /// Ethermint chains sign with `eth_secp256k1`, everything else uses the cosmos scheme.
    pub fn for_coin_type(coin_type: &str) -> Self {
        if coin_type == ETHERMINT_COIN_TYPE {
            Self {
                derivation: defaults::ETHERMINT_DERIVATION.to_string(),
                proto_type: Some(ProtoType {
                    pk_type: defaults::ETHERMINT_PK_TYPE.to_string(),
                }),
            }
        } else {
            Self {
                derivation: defaults::COSMOS_DERIVATION.to_string(),
                proto_type: None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtoType {
    pub pk_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub price: f64,
    pub denom: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustThreshold {
    pub numerator: String,
    pub denominator: String,
}

/// Websocket endpoint of a node given its RPC address.
pub fn event_source_url(rpc_addr: &str) -> String {
    let rpc_addr = rpc_addr.trim_end_matches('/');

    let ws_addr = if let Some(rest) = rpc_addr.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = rpc_addr.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        rpc_addr.to_string()
    };

    format!("{ws_addr}{}", defaults::WEBSOCKET_PATH)
}

pub fn grpc_url(grpc_addr: &str) -> String {
    format!("{}{grpc_addr}", defaults::GRPC_SCHEME)
}

/// Builds a Hermes config with one `[[chains]]` entry per chain, in order.
///
/// Fails without producing anything if any chain's gas prices do not parse.
pub fn new_config(chain_configs: &[HermesChainConfig]) -> Result<Config> {
    let chains = chain_configs
        .iter()
        .map(chain_section)
        .collect::<Result<Vec<_>>>()?;

    Ok(Config {
        global: Global {
            log_level: defaults::LOG_LEVEL.to_string(),
        },
        mode: Mode {
            clients: Clients {
                enabled: defaults::CLIENTS_ENABLED,
                refresh: defaults::CLIENTS_REFRESH,
                misbehaviour: defaults::CLIENTS_MISBEHAVIOUR,
            },
            connections: Connections {
                enabled: defaults::CONNECTIONS_ENABLED,
            },
            channels: Channels {
                enabled: defaults::CHANNELS_ENABLED,
            },
            packets: Packets {
                enabled: defaults::PACKETS_ENABLED,
                clear_interval: defaults::PACKETS_CLEAR_INTERVAL,
                clear_on_start: defaults::PACKETS_CLEAR_ON_START,
                tx_confirmation: defaults::PACKETS_TX_CONFIRMATION,
                auto_register_counterparty_payee: defaults::PACKETS_AUTO_REGISTER_COUNTERPARTY_PAYEE,
            },
        },
        rest: Rest {
            enabled: defaults::REST_ENABLED,
            host: String::new(),
            port: 0,
        },
        telemetry: Telemetry {
            enabled: defaults::TELEMETRY_ENABLED,
            host: String::new(),
            port: 0,
        },
        tracing_server: TracingServer {
            enabled: defaults::TRACING_SERVER_ENABLED,
            port: 0,
        },
        chains,
    })
}

fn chain_section(hermes_cfg: &HermesChainConfig) -> Result<Chain> {
    let chain_cfg = &hermes_cfg.cfg;

    let gas_price = chain_cfg.gas_price()?;
    let address_type = AddressType::for_coin_type(&chain_cfg.coin_type);

    tracing::debug!(
        chain_id = %chain_cfg.chain_id,
        name = %chain_cfg.name,
        key_name = %hermes_cfg.key_name,
        coin_type = %chain_cfg.coin_type,
        derivation = %address_type.derivation,
        "Adding hermes chain"
    );

    Ok(Chain {
        id: chain_cfg.chain_id.clone(),
        ccv_consumer_chain: defaults::CCV_CONSUMER_CHAIN,
        rpc_addr: hermes_cfg.rpc_addr.clone(),
        grpc_addr: grpc_url(&hermes_cfg.grpc_addr),
        event_source: EventSource {
            mode: defaults::EVENT_SOURCE_MODE.to_string(),
            url: event_source_url(&hermes_cfg.rpc_addr),
            batch_delay: defaults::EVENT_SOURCE_BATCH_DELAY.to_string(),
        },
        rpc_timeout: defaults::RPC_TIMEOUT.to_string(),
        trusted_node: defaults::TRUSTED_NODE,
        account_prefix: chain_cfg.bech32_prefix.clone(),
        key_name: hermes_cfg.key_name.clone(),
        address_type,
        store_prefix: defaults::STORE_PREFIX.to_string(),
        default_gas: defaults::DEFAULT_GAS,
        max_gas: defaults::MAX_GAS,
        gas_price: GasPrice {
            price: gas_price,
            denom: chain_cfg.denom.clone(),
        },
        gas_multiplier: chain_cfg.gas_adjustment,
        max_msg_num: defaults::MAX_MSG_NUM,
        max_tx_size: defaults::MAX_TX_SIZE,
        clock_drift: defaults::CLOCK_DRIFT.to_string(),
        max_block_time: defaults::MAX_BLOCK_TIME.to_string(),
        trusting_period: defaults::TRUSTING_PERIOD.to_string(),
        trust_threshold: TrustThreshold {
            numerator: defaults::TRUST_THRESHOLD_NUMERATOR.to_string(),
            denominator: defaults::TRUST_THRESHOLD_DENOMINATOR.to_string(),
        },
        memo_prefix: defaults::MEMO_PREFIX.to_string(),
    })
}

impl Config {
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::EncodingError(format!("Failed to encode hermes config: {}", e)))
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;

        fs::write(path, content).map_err(|e| {
            ClientError::Other(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), chains = self.chains.len(), "Wrote hermes config");
        Ok(())
    }
}
