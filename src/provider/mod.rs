//! External wallet provider seams
//!
//! Models the provider objects the host environment injects: EVM browser
//! extensions behind the EIP-1193 request interface, a Solana extension with
//! a session-based connect/disconnect pair, and a remote-session bridge.
//! Providers are passed in at construction so the registry can be built and
//! tested against fakes; a missing handle is a normal condition that adapters
//! surface as a presence failure, never a crash.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// EIP-1193 error code: user rejected the request
pub const CODE_USER_REJECTED: i64 = 4001;

/// EIP-1193 error code: a request of this type is already being processed
pub const CODE_REQUEST_PENDING: i64 = -32002;

/// Raw failure reported by a provider, before normalization
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ProviderError {
    /// Provider-specific numeric code (EIP-1193 style), if any
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// Identification flags an injected EVM provider exposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvmFlags {
    pub is_metamask: bool,
    pub is_trust: bool,
    pub is_coinbase: bool,
}

/// Handler invoked when the provider's active account set changes
pub type AccountsChangedHandler = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Opaque handle to a registered provider subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(pub u64);

/// Injected EVM provider (EIP-1193 request interface)
#[async_trait]
pub trait EvmProvider: Send + Sync {
    fn flags(&self) -> EvmFlags;

    /// Submit a JSON-RPC style request. May suspend for an unbounded time
    /// while the wallet's own UI awaits user approval.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError>;

    /// Register an accounts-changed listener; `None` if the provider does
    /// not support subscriptions
    fn on_accounts_changed(&self, handler: AccountsChangedHandler) -> Option<ListenerHandle>;

    /// Detach a previously registered listener. Best-effort: providers may
    /// not guarantee full removal.
    fn remove_accounts_changed(&self, handle: ListenerHandle);
}

/// Injected Solana provider (session-based connect/disconnect pair)
#[async_trait]
pub trait SolanaProvider: Send + Sync {
    /// Prompt the user for approval; resolves with the account public key
    async fn connect(&self) -> Result<String, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;
}

/// App metadata shown by the remote wallet during session approval
#[derive(Debug, Clone, PartialEq)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

/// Session parameters handed to the bridge when opening a session
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSettings {
    pub project_id: String,
    pub chain_ids: Vec<u64>,
    pub show_qr_modal: bool,
    pub metadata: AppMetadata,
}

/// Remote-session bridge (WalletConnect-style)
///
/// Unlike the extension providers, a bridge session survives until it is
/// explicitly closed, so orchestrator teardown must issue the close.
#[async_trait]
pub trait SessionBridge: Send + Sync {
    /// Open a session, driving approval through an out-of-band surface
    /// (QR code scan, mobile deep link)
    async fn open_session(&self, settings: &BridgeSettings) -> Result<(), ProviderError>;

    /// Accounts authorized by the active session
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    async fn close_session(&self) -> Result<(), ProviderError>;
}

/// Provider handles available in the current environment
///
/// Every field is optional: an empty environment is a valid one in which all
/// connect attempts fail with a presence error.
#[derive(Clone, Default)]
pub struct ProviderEnvironment {
    pub evm: Option<Arc<dyn EvmProvider>>,
    pub solana: Option<Arc<dyn SolanaProvider>>,
    pub bridge: Option<Arc<dyn SessionBridge>>,
}

impl ProviderEnvironment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_evm(mut self, provider: Arc<dyn EvmProvider>) -> Self {
        self.evm = Some(provider);
        self
    }

    pub fn with_solana(mut self, provider: Arc<dyn SolanaProvider>) -> Self {
        self.solana = Some(provider);
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn SessionBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_codes() {
        let rejected = ProviderError::with_code(CODE_USER_REJECTED, "User rejected the request");
        assert_eq!(rejected.code, Some(4001));
        assert_eq!(rejected.to_string(), "User rejected the request");

        let plain = ProviderError::new("boom");
        assert_eq!(plain.code, None);
    }

    #[test]
    fn test_empty_environment_has_no_handles() {
        let env = ProviderEnvironment::empty();
        assert!(env.evm.is_none());
        assert!(env.solana.is_none());
        assert!(env.bridge.is_none());
    }
}
