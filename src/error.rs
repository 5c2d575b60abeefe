//! Error types for the wallet orchestrator

use thiserror::Error;
use url::Url;

/// Result type alias using the connection error taxonomy
pub type Result<T, E = ConnectError> = std::result::Result<T, E>;

/// Normalized connection error taxonomy
///
/// Every adapter-level failure is converted into one of these kinds at the
/// adapter boundary; the state machine never observes a raw provider error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectError {
    // Environment errors
    #[error("{wallet} is not installed")]
    ProviderNotInstalled {
        wallet: String,
        /// Remediation: where the user can install the missing provider
        install_url: Option<Url>,
    },

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    // User-driven outcomes
    #[error("Connection rejected by user")]
    UserRejected,

    #[error("Provider is already processing a request")]
    AlreadyPending,

    #[error("Connection timed out after {secs}s")]
    Timeout { secs: u64 },

    // Provider result errors
    #[error("No accounts returned by {wallet}")]
    NoAccountReturned { wallet: String },

    #[error("{wallet}: {message}")]
    Provider { wallet: String, message: String },

    // Orchestrator guard errors
    #[error("Unknown wallet adapter: {0}")]
    UnknownAdapter(String),

    #[error("Already connecting to {in_flight}")]
    AlreadyConnecting { in_flight: String },

    #[error("Orchestrator has been disposed")]
    Disposed,
}

impl ConnectError {
    /// Check if the same adapter can be retried without external action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConnectError::UserRejected
                | ConnectError::AlreadyPending
                | ConnectError::Timeout { .. }
                | ConnectError::NoAccountReturned { .. }
                | ConnectError::Provider { .. }
        )
    }

    /// Remediation URL for presence failures
    pub fn install_url(&self) -> Option<&Url> {
        match self {
            ConnectError::ProviderNotInstalled { install_url, .. } => install_url.as_ref(),
            _ => None,
        }
    }
}

/// Errors from the signup client
#[derive(Error, Debug)]
pub enum SignupError {
    #[error("Signup request failed: {0}")]
    Http(String),

    #[error("Signup rejected: {0}")]
    Rejected(String),
}

// Conversion from reqwest errors
impl From<reqwest::Error> for SignupError {
    fn from(e: reqwest::Error) -> Self {
        SignupError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ConnectError::UserRejected.is_retryable());
        assert!(ConnectError::Timeout { secs: 30 }.is_retryable());
        assert!(ConnectError::AlreadyPending.is_retryable());
        assert!(!ConnectError::ConfigurationMissing("project id".into()).is_retryable());
        assert!(!ConnectError::ProviderNotInstalled {
            wallet: "MetaMask".into(),
            install_url: None,
        }
        .is_retryable());
        assert!(!ConnectError::AlreadyConnecting {
            in_flight: "phantom".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_install_url_only_on_presence_failures() {
        let url = Url::parse("https://metamask.io/download/").unwrap();
        let err = ConnectError::ProviderNotInstalled {
            wallet: "MetaMask".into(),
            install_url: Some(url.clone()),
        };
        assert_eq!(err.install_url(), Some(&url));
        assert_eq!(ConnectError::UserRejected.install_url(), None);
    }
}
