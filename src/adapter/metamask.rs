//! MetaMask adapter
//!
//! Presence requires only an injected EVM provider: MetaMask is the default
//! owner of that slot. On success the connector attaches an accounts-changed
//! logger and keeps its handle so teardown can detach it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::{eip1193, Address, WalletAdapter, WalletConnector};
use crate::error::{ConnectError, Result};
use crate::provider::{EvmProvider, ListenerHandle, ProviderEnvironment, ProviderError};

pub const INSTALL_URL: &str = "https://metamask.io/download/";

const WALLET_NAME: &str = "MetaMask";

pub fn adapter(env: &ProviderEnvironment) -> WalletAdapter {
    WalletAdapter::new(
        "metamask",
        WALLET_NAME,
        "/wallets/metamask.svg",
        Url::parse(INSTALL_URL).ok(),
        Arc::new(MetaMaskConnector::new(env.evm.clone())),
    )
}

pub struct MetaMaskConnector {
    provider: Option<Arc<dyn EvmProvider>>,
    /// Subscription registered on the last successful connect
    listener: Mutex<Option<ListenerHandle>>,
}

impl MetaMaskConnector {
    pub fn new(provider: Option<Arc<dyn EvmProvider>>) -> Self {
        Self {
            provider,
            listener: Mutex::new(None),
        }
    }
}

#[async_trait]
impl WalletConnector for MetaMaskConnector {
    async fn connect(&self) -> Result<Address> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ConnectError::ProviderNotInstalled {
                wallet: WALLET_NAME.to_string(),
                install_url: Url::parse(INSTALL_URL).ok(),
            })?;

        let address = eip1193::request_accounts(WALLET_NAME, provider.as_ref()).await?;

        // Replace any listener left over from a previous session
        let mut slot = self.listener.lock().await;
        if let Some(handle) = slot.take() {
            provider.remove_accounts_changed(handle);
        }
        *slot = provider.on_accounts_changed(Arc::new(|accounts: &[String]| {
            match accounts.first() {
                Some(active) => debug!(account = %active, "Active account changed"),
                None => info!("Provider reports no connected accounts"),
            }
        }));

        info!(address = %address.short(), "MetaMask connected");
        Ok(address)
    }

    async fn teardown(&self) -> Result<(), ProviderError> {
        if let Some(provider) = self.provider.as_ref() {
            if let Some(handle) = self.listener.lock().await.take() {
                provider.remove_accounts_changed(handle);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{AccountsChangedHandler, EvmFlags, ProviderError};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEvm {
        listeners: AtomicUsize,
    }

    #[async_trait]
    impl EvmProvider for StubEvm {
        fn flags(&self) -> EvmFlags {
            EvmFlags {
                is_metamask: true,
                ..EvmFlags::default()
            }
        }

        async fn request(&self, method: &str, _params: Vec<Value>) -> Result<Value, ProviderError> {
            assert_eq!(method, "eth_requestAccounts");
            Ok(json!(["0xfeedface00000000000000000000000000000000"]))
        }

        fn on_accounts_changed(&self, _handler: AccountsChangedHandler) -> Option<ListenerHandle> {
            self.listeners.fetch_add(1, Ordering::SeqCst);
            Some(ListenerHandle(1))
        }

        fn remove_accounts_changed(&self, _handle: ListenerHandle) {
            self.listeners.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_missing_provider_reports_install_url() {
        let connector = MetaMaskConnector::new(None);
        let err = connector.connect().await.unwrap_err();
        assert!(matches!(
            &err,
            ConnectError::ProviderNotInstalled { wallet, .. } if wallet == "MetaMask"
        ));
        assert_eq!(err.install_url().unwrap().as_str(), INSTALL_URL);
    }

    #[tokio::test]
    async fn test_teardown_detaches_subscription() {
        let stub = Arc::new(StubEvm {
            listeners: AtomicUsize::new(0),
        });
        let connector = MetaMaskConnector::new(Some(stub.clone()));

        connector.connect().await.unwrap();
        assert_eq!(stub.listeners.load(Ordering::SeqCst), 1);

        connector.teardown().await.unwrap();
        assert_eq!(stub.listeners.load(Ordering::SeqCst), 0);
    }
}
