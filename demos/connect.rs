//! Drive the orchestrator against a simulated provider environment
//!
//! Run with: cargo run --example connect

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use wallet_orchestrator::adapter::default_registry;
use wallet_orchestrator::provider::{
    AccountsChangedHandler, EvmFlags, EvmProvider, ListenerHandle, ProviderEnvironment,
    ProviderError,
};
use wallet_orchestrator::{Config, WalletOrchestrator};

/// Simulated extension wallet: approves every request after a short pause
struct SimulatedEvm;

#[async_trait]
impl EvmProvider for SimulatedEvm {
    fn flags(&self) -> EvmFlags {
        EvmFlags {
            is_metamask: true,
            ..EvmFlags::default()
        }
    }

    async fn request(&self, _method: &str, _params: Vec<Value>) -> Result<Value, ProviderError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(json!(["0x1234567890abcdef1234567890abcdef12345678"]))
    }

    fn on_accounts_changed(&self, _handler: AccountsChangedHandler) -> Option<ListenerHandle> {
        Some(ListenerHandle(1))
    }

    fn remove_accounts_changed(&self, _handle: ListenerHandle) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallet_orchestrator=debug".parse()?),
        )
        .with_target(true)
        .init();

    let config = Config::load("config.toml")?;

    let env = ProviderEnvironment::empty().with_evm(Arc::new(SimulatedEvm));
    let orchestrator = WalletOrchestrator::with_hook(
        default_registry(&env, &config),
        &config.connect,
        Arc::new(|session| {
            println!("downstream consumer received {}", session.address.short());
        }),
    );

    println!("Available wallets:");
    for adapter in orchestrator.adapters() {
        println!("  {:14} {}", adapter.id, adapter.display_name);
    }

    let session = orchestrator.connect("metamask").await?;
    println!("connected via {}: {}", session.adapter, session.address);
    orchestrator.disconnect().await;

    // Phantom is absent in this environment: an expected, user-facing outcome
    if let Err(err) = orchestrator.connect("phantom").await {
        println!("phantom: {err}");
        if let Some(url) = err.install_url() {
            println!("  install from {url}");
        }
    }
    orchestrator.reset().await;

    orchestrator.dispose().await;
    Ok(())
}
