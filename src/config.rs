//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connect: ConnectConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub signup: SignupConfig,
}

/// Connection attempt policy
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectConfig {
    /// Upper bound for approval flows with no native timeout (seconds)
    #[serde(default = "default_approval_timeout_secs")]
    pub approval_timeout_secs: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            approval_timeout_secs: default_approval_timeout_secs(),
        }
    }
}

/// Remote-session bridge (WalletConnect) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Project registration id; without it the bridge adapter cannot connect
    #[serde(default = "default_project_id")]
    pub project_id: Option<String>,
    #[serde(default = "default_chain_ids")]
    pub chain_ids: Vec<u64>,
    #[serde(default = "default_true")]
    pub show_qr_modal: bool,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_name")]
    pub app_description: String,
    #[serde(default = "default_app_url")]
    pub app_url: String,
    #[serde(default = "default_app_icon")]
    pub app_icon: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            chain_ids: default_chain_ids(),
            show_qr_modal: true,
            app_name: default_app_name(),
            app_description: default_app_name(),
            app_url: default_app_url(),
            app_icon: default_app_icon(),
        }
    }
}

/// Signup service endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SignupConfig {
    #[serde(default = "default_signup_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_signup_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            endpoint: default_signup_endpoint(),
            timeout_secs: default_signup_timeout_secs(),
        }
    }
}

// Default value functions
fn default_approval_timeout_secs() -> u64 {
    30
}

fn default_project_id() -> Option<String> {
    std::env::var("WALLETCONNECT_PROJECT_ID").ok()
}

fn default_chain_ids() -> Vec<u64> {
    vec![1]
}

fn default_app_name() -> String {
    "checkerchain".to_string()
}

fn default_app_url() -> String {
    "https://checkerchain.com".to_string()
}

fn default_app_icon() -> String {
    "https://checkerchain.com/icon.png".to_string()
}

fn default_signup_endpoint() -> String {
    std::env::var("SIGNUP_ENDPOINT")
        .unwrap_or_else(|_| "http://127.0.0.1:3000/api/signup".into())
}

fn default_signup_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Pick up a local .env before reading the environment
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path.as_ref()).required(false))
            // Override with environment variables (prefix WALLET_)
            .add_source(
                config::Environment::with_prefix("WALLET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.connect.approval_timeout_secs == 0 {
            anyhow::bail!("approval_timeout_secs must be positive");
        }

        if self.bridge.chain_ids.is_empty() {
            anyhow::bail!("bridge.chain_ids must not be empty");
        }

        if let Some(id) = &self.bridge.project_id {
            if id.trim().is_empty() {
                anyhow::bail!("bridge.project_id must not be blank when set");
            }
        }

        url::Url::parse(&self.signup.endpoint)
            .with_context(|| format!("Invalid signup endpoint: {}", self.signup.endpoint))?;

        if self.signup.timeout_secs == 0 {
            anyhow::bail!("signup.timeout_secs must be positive");
        }

        Ok(())
    }

    /// Bridge project id with most of the secret masked, for logs
    pub fn masked_project_id(&self) -> String {
        match &self.bridge.project_id {
            Some(id) if id.len() > 4 => format!("{}***", &id[..4]),
            Some(_) => "***".to_string(),
            None => "<unset>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connect.approval_timeout_secs, 30);
        assert_eq!(config.bridge.chain_ids, vec![1]);
        assert!(config.bridge.show_qr_modal);
        assert_eq!(config.bridge.app_name, "checkerchain");
        assert_eq!(config.signup.timeout_secs, 10);
    }

    #[test]
    fn test_default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.connect.approval_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.signup.endpoint = "/api/signup".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_project_id() {
        let mut config = Config::default();
        config.bridge.project_id = Some("abcdef123456".to_string());
        assert_eq!(config.masked_project_id(), "abcd***");

        config.bridge.project_id = None;
        assert_eq!(config.masked_project_id(), "<unset>");
    }
}
