//! Phantom adapter
//!
//! Session-based: the Solana provider keeps the connection open until an
//! explicit disconnect. Phantom's approval popup has no native timeout, so
//! the orchestrator races this connector against its configured deadline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::{Address, WalletAdapter, WalletConnector};
use crate::error::{ConnectError, Result};
use crate::provider::{ProviderEnvironment, ProviderError, SolanaProvider, CODE_USER_REJECTED};

pub const INSTALL_URL: &str = "https://phantom.app/";

const WALLET_NAME: &str = "Phantom";

pub fn adapter(env: &ProviderEnvironment) -> WalletAdapter {
    WalletAdapter::new(
        "phantom",
        WALLET_NAME,
        "/wallets/phantom.jpg",
        Url::parse(INSTALL_URL).ok(),
        Arc::new(PhantomConnector::new(env.solana.clone())),
    )
}

pub struct PhantomConnector {
    provider: Option<Arc<dyn SolanaProvider>>,
}

impl PhantomConnector {
    pub fn new(provider: Option<Arc<dyn SolanaProvider>>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletConnector for PhantomConnector {
    async fn connect(&self) -> Result<Address> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ConnectError::ProviderNotInstalled {
                wallet: WALLET_NAME.to_string(),
                install_url: Url::parse(INSTALL_URL).ok(),
            })?;

        let pubkey = provider.connect().await.map_err(|e| match e.code {
            Some(CODE_USER_REJECTED) => ConnectError::UserRejected,
            _ => ConnectError::Provider {
                wallet: WALLET_NAME.to_string(),
                message: e.message,
            },
        })?;

        if pubkey.is_empty() {
            return Err(ConnectError::NoAccountReturned {
                wallet: WALLET_NAME.to_string(),
            });
        }

        let address = Address::new(pubkey);
        info!(address = %address.short(), "Phantom connected");
        Ok(address)
    }

    async fn teardown(&self) -> Result<(), ProviderError> {
        match self.provider.as_ref() {
            Some(provider) => provider.disconnect().await,
            None => Ok(()),
        }
    }

    fn session_based(&self) -> bool {
        true
    }

    fn unbounded_approval(&self) -> bool {
        true
    }
}
