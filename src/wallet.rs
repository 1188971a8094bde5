use anyhow::Context;
use bip39::Mnemonic;
use cosmrs::{
    bip32::{DerivationPath, XPrv},
    crypto::{secp256k1::SigningKey, PublicKey},
    tx::{Raw, SignDoc},
    AccountId,
};

const MNEMONIC_WORD_COUNT: usize = 24;

#[derive(Debug, Clone)]
pub struct Wallet {
    pub key_name: String,
    /// Empty when the wallet was imported from a raw private key.
    pub mnemonic: String,
    pub private_key: Vec<u8>,
    pub public_key: PublicKey,
    pub account_id: AccountId,
}

impl Wallet {
    /// Imports a wallet from a hex encoded secp256k1 private key.
    pub fn from_private_key(
        key_name: &str,
        private_key: &str,
        account_prefix: &str,
    ) -> anyhow::Result<Self> {
        let private_key = hex::decode(private_key).context("Invalid private key hex format")?;

        Self::from_key_bytes(key_name, String::new(), private_key, account_prefix)
    }

    /// Restores a wallet from a BIP-39 mnemonic on the path `m/44'/{coin_type}'/0'/0/0`.
    pub fn from_mnemonic(
        key_name: &str,
        mnemonic: &str,
        account_prefix: &str,
        coin_type: u32,
    ) -> anyhow::Result<Self> {
        let mnemonic = Mnemonic::parse(mnemonic).context("Invalid mnemonic")?;
        let seed = mnemonic.to_seed("");

        let path: DerivationPath = format!("m/44'/{coin_type}'/0'/0/0")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid derivation path: {e}"))?;
        let xprv = XPrv::derive_from_path(seed, &path)
            .map_err(|e| anyhow::anyhow!("Failed to derive private key: {e}"))?;

        Self::from_key_bytes(
            key_name,
            mnemonic.to_string(),
            xprv.to_bytes().to_vec(),
            account_prefix,
        )
    }

    /// Generates a fresh mnemonic and restores the wallet from it.
    pub fn generate(key_name: &str, account_prefix: &str, coin_type: u32) -> anyhow::Result<Self> {
        let mnemonic =
            Mnemonic::generate(MNEMONIC_WORD_COUNT).context("Failed to generate mnemonic")?;

        Self::from_mnemonic(key_name, &mnemonic.to_string(), account_prefix, coin_type)
    }

    fn from_key_bytes(
        key_name: &str,
        mnemonic: String,
        private_key: Vec<u8>,
        account_prefix: &str,
    ) -> anyhow::Result<Self> {
        let signing_key = SigningKey::from_slice(&private_key)
            .map_err(|e| anyhow::anyhow!("Failed to parse signing key: {e}"))?;

        let public_key = signing_key.public_key();
        let account_id = public_key
            .account_id(account_prefix)
            .map_err(|e| anyhow::anyhow!("Failed to generate account ID: {e}"))?;

        Ok(Self {
            key_name: key_name.to_string(),
            mnemonic,
            private_key,
            public_key,
            account_id,
        })
    }

    /// Bech32 address of the wallet.
    pub fn formatted_address(&self) -> String {
        self.account_id.to_string()
    }

    pub fn sign(&self, sign_doc: SignDoc) -> anyhow::Result<Raw> {
        let signing_key = SigningKey::from_slice(&self.private_key)
            .map_err(|e| anyhow::anyhow!("Failed to parse signing key: {e}"))?;

        sign_doc
            .sign(&signing_key)
            .map_err(|e| anyhow::anyhow!("Failed to sign transaction: {e}"))
    }
}
