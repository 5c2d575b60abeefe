//! Coinbase Wallet adapter
//!
//! Shares the injected EVM provider slot; presence additionally requires the
//! provider to identify itself as Coinbase Wallet.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::{eip1193, Address, WalletAdapter, WalletConnector};
use crate::error::{ConnectError, Result};
use crate::provider::{EvmProvider, ProviderEnvironment};

pub const INSTALL_URL: &str = "https://www.coinbase.com/wallet/downloads";

const WALLET_NAME: &str = "Coinbase";

pub fn adapter(env: &ProviderEnvironment) -> WalletAdapter {
    WalletAdapter::new(
        "coinbase",
        WALLET_NAME,
        "/wallets/coinbase.svg",
        Url::parse(INSTALL_URL).ok(),
        Arc::new(CoinbaseConnector::new(env.evm.clone())),
    )
}

pub struct CoinbaseConnector {
    provider: Option<Arc<dyn EvmProvider>>,
}

impl CoinbaseConnector {
    pub fn new(provider: Option<Arc<dyn EvmProvider>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletConnector for CoinbaseConnector {
    async fn connect(&self) -> Result<Address> {
        let provider = self
            .provider
            .as_ref()
            .filter(|p| p.flags().is_coinbase)
            .ok_or_else(|| ConnectError::ProviderNotInstalled {
                wallet: WALLET_NAME.to_string(),
                install_url: Url::parse(INSTALL_URL).ok(),
            })?;

        let address = eip1193::request_accounts(WALLET_NAME, provider.as_ref()).await?;
        info!(address = %address.short(), "Coinbase Wallet connected");
        Ok(address)
    }
}
