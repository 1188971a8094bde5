use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cosmwasm_std::Uint128;
use interchain_harness::{
    chain::FAUCET_ACCOUNT_KEY_NAME,
    provision::get_and_fund_test_users,
    relayer::hermes::{self, grpc_url},
    CosmosChain, Wallet,
};
use serde_json::{json, Value};
use tracing_subscriber::fmt;

#[derive(Parser)]
#[command(version, about = "Interchain test harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a Hermes config.toml for the chains in a chains file
    HermesConfig {
        #[arg(long)]
        chains: PathBuf,
        #[arg(long, default_value = "config.toml")]
        out: PathBuf,
    },
    /// Create one funded user per chain in a chains file
    Fund {
        #[arg(long)]
        chains: PathBuf,
        #[arg(long, default_value = "user")]
        prefix: String,
        /// Whole coins, scaled by each chain's decimals
        #[arg(long, default_value_t = 10)]
        amount: u128,
        /// Hex private key of the faucet account on every chain
        #[arg(long, env = "FAUCET_PRIVATE_KEY", hide_env_values = true)]
        faucet_key: String,
        /// Include the generated mnemonics in the output
        #[arg(long)]
        show_mnemonics: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Setup logging
    fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::HermesConfig { chains, out } => {
            let chain_configs = hermes::load_chain_configs(&chains)?;
            let config = hermes::new_config(&chain_configs)?;
            config.write_to_file(&out)?;
        }
        Command::Fund {
            chains,
            prefix,
            amount,
            faucet_key,
            show_mnemonics,
        } => {
            let chain_configs = hermes::load_chain_configs(&chains)?;

            let mut cosmos_chains = Vec::with_capacity(chain_configs.len());
            for hermes_cfg in chain_configs {
                let faucet = Wallet::from_private_key(
                    FAUCET_ACCOUNT_KEY_NAME,
                    &faucet_key,
                    &hermes_cfg.cfg.bech32_prefix,
                )
                .context("Invalid faucet key")?;

                let chain = CosmosChain::connect(
                    hermes_cfg.cfg,
                    &hermes_cfg.rpc_addr,
                    &grpc_url(&hermes_cfg.grpc_addr),
                )
                .await?;
                chain.add_key(faucet).await;

                cosmos_chains.push(Arc::new(chain));
            }

            let users =
                get_and_fund_test_users(&prefix, Uint128::new(amount), &cosmos_chains).await?;

            let summary = funded_users_json(&users, show_mnemonics);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Key names and addresses of funded users, with mnemonics only on request.
fn funded_users_json(users: &[Wallet], show_mnemonics: bool) -> Value {
    users
        .iter()
        .map(|user| {
            let mut entry = json!({
                "key_name": user.key_name,
                "address": user.formatted_address(),
            });
            if show_mnemonics {
                entry["mnemonic"] = json!(user.mnemonic);
            }
            entry
        })
        .collect()
}
