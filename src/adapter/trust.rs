//! Trust Wallet adapter
//!
//! Shares the injected EVM provider slot; presence additionally requires the
//! provider to identify itself as Trust.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::{eip1193, Address, WalletAdapter, WalletConnector};
use crate::error::{ConnectError, Result};
use crate::provider::{EvmProvider, ProviderEnvironment};

pub const INSTALL_URL: &str = "https://trustwallet.com/download";

const WALLET_NAME: &str = "Trust Wallet";

pub fn adapter(env: &ProviderEnvironment) -> WalletAdapter {
    WalletAdapter::new(
        "trust",
        WALLET_NAME,
        "/wallets/trustwallets.png",
        Url::parse(INSTALL_URL).ok(),
        Arc::new(TrustConnector::new(env.evm.clone())),
    )
}

pub struct TrustConnector {
    provider: Option<Arc<dyn EvmProvider>>,
}

impl TrustConnector {
    pub fn new(provider: Option<Arc<dyn EvmProvider>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletConnector for TrustConnector {
    async fn connect(&self) -> Result<Address> {
        let provider = self
            .provider
            .as_ref()
            .filter(|p| p.flags().is_trust)
            .ok_or_else(|| ConnectError::ProviderNotInstalled {
                wallet: WALLET_NAME.to_string(),
                install_url: Url::parse(INSTALL_URL).ok(),
            })?;

        let address = eip1193::request_accounts(WALLET_NAME, provider.as_ref()).await?;
        info!(address = %address.short(), "Trust Wallet connected");
        Ok(address)
    }
}
