use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid gas prices {gas_prices:?} for denom {denom:?}: {reason}")]
    GasPriceParse {
        gas_prices: String,
        denom: String,
        reason: String,
    },

    #[error("gRPC error: {0}")]
    GrpcError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Wallet error: {0}")]
    WalletError(String),

    #[error("Failed to get source user wallet on {chain_id}: {source}")]
    WalletCreation {
        chain_id: String,
        #[source]
        source: Box<ClientError>,
    },

    #[error("Failed to get funds from faucet on {chain_id}: {source}")]
    Faucet {
        chain_id: String,
        #[source]
        source: Box<ClientError>,
    },

    #[error("Amount overflow: {0}")]
    Overflow(String),

    #[error("Task error: {0}")]
    TaskError(String),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
