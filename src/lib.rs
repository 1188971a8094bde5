pub mod chain;
pub mod client;
pub mod error;
pub mod provision;
pub mod relayer;
pub mod transactions;
pub mod wallet;
pub use chain::{Chain, ChainConfig, WalletAmount};
pub use client::CosmosChain;
pub use error::{ClientError, Result};
pub use relayer::hermes::HermesChainConfig;
pub use wallet::Wallet;
