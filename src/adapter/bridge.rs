//! WalletConnect bridge adapter
//!
//! Connects through the remote-session bridge rather than an injected
//! extension. Requires a project registration id from configuration; without
//! it this one adapter is unusable for the session while the rest of the
//! registry is unaffected.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{eip1193, Address, WalletAdapter, WalletConnector};
use crate::config::BridgeConfig;
use crate::error::{ConnectError, Result};
use crate::provider::{
    AppMetadata, BridgeSettings, ProviderEnvironment, ProviderError, SessionBridge,
};

const WALLET_NAME: &str = "WalletConnect";

pub fn adapter(env: &ProviderEnvironment, config: &BridgeConfig) -> WalletAdapter {
    WalletAdapter::new(
        "walletconnect",
        WALLET_NAME,
        "/wallets/walletconnect.png",
        None,
        Arc::new(BridgeConnector::new(env.bridge.clone(), config)),
    )
}

pub struct BridgeConnector {
    bridge: Option<Arc<dyn SessionBridge>>,
    /// Session parameters, absent when no project id is configured
    settings: Option<BridgeSettings>,
}

impl BridgeConnector {
    pub fn new(bridge: Option<Arc<dyn SessionBridge>>, config: &BridgeConfig) -> Self {
        let settings = config.project_id.as_ref().map(|project_id| BridgeSettings {
            project_id: project_id.clone(),
            chain_ids: config.chain_ids.clone(),
            show_qr_modal: config.show_qr_modal,
            metadata: AppMetadata {
                name: config.app_name.clone(),
                description: config.app_description.clone(),
                url: config.app_url.clone(),
                icons: vec![config.app_icon.clone()],
            },
        });
        Self { bridge, settings }
    }
}

#[async_trait]
impl WalletConnector for BridgeConnector {
    async fn connect(&self) -> Result<Address> {
        // Config check comes first: a missing project id fails regardless of
        // whether a bridge handle is present
        let settings = self.settings.as_ref().ok_or_else(|| {
            ConnectError::ConfigurationMissing("WalletConnect project id".to_string())
        })?;

        let bridge = self
            .bridge
            .as_ref()
            .ok_or_else(|| ConnectError::ProviderNotInstalled {
                wallet: WALLET_NAME.to_string(),
                install_url: None,
            })?;

        bridge
            .open_session(settings)
            .await
            .map_err(|e| eip1193::normalize(WALLET_NAME, e))?;

        let accounts = bridge
            .accounts()
            .await
            .map_err(|e| eip1193::normalize(WALLET_NAME, e))?;

        match accounts.first() {
            Some(account) if !account.is_empty() => {
                let address = Address::new(account.clone());
                info!(address = %address.short(), "WalletConnect session established");
                Ok(address)
            }
            _ => Err(ConnectError::NoAccountReturned {
                wallet: WALLET_NAME.to_string(),
            }),
        }
    }

    async fn teardown(&self) -> Result<(), ProviderError> {
        match self.bridge.as_ref() {
            Some(bridge) => bridge.close_session().await,
            None => Ok(()),
        }
    }

    fn session_based(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBridge;

    #[async_trait]
    impl SessionBridge for StubBridge {
        async fn open_session(&self, settings: &BridgeSettings) -> Result<(), ProviderError> {
            assert_eq!(settings.project_id, "proj-1234");
            Ok(())
        }

        async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(vec!["0xabc123000000000000000000000000000000dead".into()])
        }

        async fn close_session(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn configured(project_id: Option<&str>) -> BridgeConfig {
        BridgeConfig {
            project_id: project_id.map(str::to_string),
            ..BridgeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_missing_project_id_is_configuration_error() {
        let connector = BridgeConnector::new(Some(Arc::new(StubBridge)), &configured(None));
        assert!(matches!(
            connector.connect().await,
            Err(ConnectError::ConfigurationMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_session_yields_first_account() {
        let connector =
            BridgeConnector::new(Some(Arc::new(StubBridge)), &configured(Some("proj-1234")));
        let address = connector.connect().await.unwrap();
        assert_eq!(address.short(), "0xabc1...dead");
    }
}
