//! Wallet adapters
//!
//! One adapter per supported wallet, each wrapping an injected provider
//! handle behind the uniform [`WalletConnector`] operation:
//! - MetaMask, Trust and Coinbase share the EIP-1193 request path
//! - Phantom uses the session-based Solana provider
//! - WalletConnect goes through the remote-session bridge
//!
//! Adapters return results; they never write orchestrator state.

pub mod bridge;
pub mod coinbase;
mod eip1193;
pub mod metamask;
pub mod phantom;
pub mod trust;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{ConnectError, Result};
use crate::provider::{ProviderEnvironment, ProviderError};

pub use bridge::BridgeConnector;
pub use coinbase::CoinbaseConnector;
pub use metamask::MetaMaskConnector;
pub use phantom::PhantomConnector;
pub use trust::TrustConnector;

/// Opaque chain-specific account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for surfaces and logs: first six and last four chars
    pub fn short(&self) -> String {
        let s = &self.0;
        if s.chars().count() <= 10 {
            return s.clone();
        }
        let head: String = s.chars().take(6).collect();
        let tail: String = s.chars().skip(s.chars().count() - 4).collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Uniform connection operation over heterogeneous wallet providers
///
/// This is the polymorphism point: the orchestrator treats every adapter
/// through this one trait while each implementation encapsulates its own
/// presence check, approval flow and failure mapping.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Run the provider's approval flow and resolve exactly one address
    async fn connect(&self) -> Result<Address>;

    /// Best-effort cleanup: close sessions, detach subscriptions
    async fn teardown(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// True when the provider holds a session open until explicitly closed
    fn session_based(&self) -> bool {
        false
    }

    /// True when the approval flow has no native timeout and the
    /// orchestrator must race it against its own deadline
    fn unbounded_approval(&self) -> bool {
        false
    }
}

/// Static descriptor for one supported wallet
#[derive(Clone)]
pub struct WalletAdapter {
    /// Unique registry key
    pub id: String,
    /// Human-readable label for the selection surface
    pub display_name: String,
    /// Opaque icon resource reference, passed through to the surface
    pub icon: String,
    /// Where the user can install the wallet when it is missing
    pub install_url: Option<Url>,
    connector: Arc<dyn WalletConnector>,
}

impl WalletAdapter {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        icon: impl Into<String>,
        install_url: Option<Url>,
        connector: Arc<dyn WalletConnector>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            icon: icon.into(),
            install_url,
            connector,
        }
    }

    pub(crate) fn connector(&self) -> Arc<dyn WalletConnector> {
        Arc::clone(&self.connector)
    }

    pub fn session_based(&self) -> bool {
        self.connector.session_based()
    }
}

impl fmt::Debug for WalletAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAdapter")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Fixed, ordered set of supported wallet adapters
///
/// Built once at orchestrator initialization and read-only thereafter.
/// Registration order is preserved for menu rendering.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    adapters: Vec<WalletAdapter>,
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<WalletAdapter>) -> Self {
        Self { adapters }
    }

    /// Adapters in registration order
    pub fn adapters(&self) -> &[WalletAdapter] {
        &self.adapters
    }

    /// Look up an adapter by id
    pub fn get(&self, id: &str) -> Result<&WalletAdapter> {
        self.adapters
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| ConnectError::UnknownAdapter(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Build the default registry over the given provider environment
///
/// Order matches the selection surface: MetaMask, Phantom, Trust,
/// WalletConnect, Coinbase.
pub fn default_registry(env: &ProviderEnvironment, config: &Config) -> AdapterRegistry {
    AdapterRegistry::new(vec![
        metamask::adapter(env),
        phantom::adapter(env),
        trust::adapter(env),
        bridge::adapter(env, &config.bridge),
        coinbase::adapter(env),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_short() {
        let addr = Address::new("0x1234567890abcdef1234567890abcdef12345678");
        assert_eq!(addr.short(), "0x1234...5678");

        // Short addresses are shown whole
        let tiny = Address::new("0x1234");
        assert_eq!(tiny.short(), "0x1234");
    }

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry(&ProviderEnvironment::empty(), &Config::default());
        let ids: Vec<&str> = registry.adapters().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["metamask", "phantom", "trust", "walletconnect", "coinbase"]
        );
    }

    #[test]
    fn test_registry_lookup() {
        let registry = default_registry(&ProviderEnvironment::empty(), &Config::default());
        assert_eq!(registry.get("phantom").unwrap().display_name, "Phantom");
        assert!(matches!(
            registry.get("ledger"),
            Err(ConnectError::UnknownAdapter(id)) if id == "ledger"
        ));
    }

    #[test]
    fn test_descriptors_carry_install_urls() {
        let registry = default_registry(&ProviderEnvironment::empty(), &Config::default());
        for id in ["metamask", "phantom", "trust", "coinbase"] {
            assert!(
                registry.get(id).unwrap().install_url.is_some(),
                "{id} should carry an install url"
            );
        }
        // The bridge has no extension to install
        assert!(registry.get("walletconnect").unwrap().install_url.is_none());
    }
}
