//! Wallet connection orchestration
//!
//! Owns the connection state machine and the single-attempt guard over the
//! adapter registry. Adapters return results; every state transition happens
//! here, serialized under one lock. Provider calls cannot be cancelled, only
//! ignored: each attempt carries a generation token, and anything resolving
//! after the attempt has already been settled (timeout won, a newer attempt
//! started, the orchestrator was disposed) is discarded without touching
//! state.

pub mod state;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapter::{AdapterRegistry, Address, WalletAdapter};
use crate::config::ConnectConfig;
use crate::error::{ConnectError, Result};

pub use state::{ConnectedSession, ConnectionState};

/// Hook handed the established session, fired exactly once per successful
/// connect, synchronously with the `Connected` transition
pub type ConnectedHook = Arc<dyn Fn(&ConnectedSession) + Send + Sync>;

/// Wallet connection orchestrator
///
/// One instance per selection surface. Construct, drive with [`select`] or
/// [`connect`], observe through [`subscribe`], and [`dispose`] when the
/// surface closes.
///
/// [`select`]: WalletOrchestrator::select
/// [`connect`]: WalletOrchestrator::connect
/// [`subscribe`]: WalletOrchestrator::subscribe
/// [`dispose`]: WalletOrchestrator::dispose
pub struct WalletOrchestrator {
    registry: AdapterRegistry,
    approval_timeout: Duration,
    core: Arc<Core>,
}

struct Core {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    on_connected: Option<ConnectedHook>,
}

struct Inner {
    state: ConnectionState,
    /// Monotonic attempt token; results carrying an older value are stale
    generation: u64,
    /// Adapter ids engaged since construction, swept at disposal
    engaged: Vec<String>,
}

impl WalletOrchestrator {
    pub fn new(registry: AdapterRegistry, config: &ConnectConfig) -> Self {
        Self::build(registry, config, None)
    }

    /// Construct with a downstream hook receiving the session on success
    pub fn with_hook(registry: AdapterRegistry, config: &ConnectConfig, hook: ConnectedHook) -> Self {
        Self::build(registry, config, Some(hook))
    }

    fn build(registry: AdapterRegistry, config: &ConnectConfig, hook: Option<ConnectedHook>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Self {
            registry,
            approval_timeout: Duration::from_secs(config.approval_timeout_secs),
            core: Arc::new(Core {
                inner: Mutex::new(Inner {
                    state: ConnectionState::Idle,
                    generation: 0,
                    engaged: Vec::new(),
                }),
                state_tx,
                cancel: CancellationToken::new(),
                on_connected: hook,
            }),
        }
    }

    /// Adapters in registration order, for menu rendering
    pub fn adapters(&self) -> &[WalletAdapter] {
        self.registry.adapters()
    }

    /// Current state snapshot
    pub fn state(&self) -> ConnectionState {
        self.core.state_tx.borrow().clone()
    }

    /// Watch channel of state snapshots for the selection surface
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.core.state_tx.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        self.core.cancel.is_cancelled()
    }

    /// Begin a connection attempt for the given adapter
    ///
    /// Returns once the transition to `Connecting` is made; the attempt's
    /// outcome is published on the state channel. Guard rejections (unknown
    /// adapter, an attempt already in flight, disposed orchestrator) are
    /// returned without any state change.
    pub async fn select(&self, adapter_id: &str) -> Result<()> {
        if self.core.cancel.is_cancelled() {
            return Err(ConnectError::Disposed);
        }

        let adapter = self.registry.get(adapter_id)?;
        let connector = adapter.connector();
        let unbounded = connector.unbounded_approval();
        let id = adapter.id.clone();

        // Check-and-set under one lock acquisition: no suspension between
        // the mutual exclusion guard and the Connecting write
        let generation = {
            let mut inner = self.core.inner.lock().await;
            if let ConnectionState::Connecting { adapter } = &inner.state {
                return Err(ConnectError::AlreadyConnecting {
                    in_flight: adapter.clone(),
                });
            }
            inner.generation += 1;
            if !inner.engaged.iter().any(|e| e == &id) {
                inner.engaged.push(id.clone());
            }
            // Entering Connecting clears any prior failure banner
            inner.state = ConnectionState::Connecting { adapter: id.clone() };
            self.core.state_tx.send_replace(inner.state.clone());
            inner.generation
        };

        debug!(adapter = %id, generation, "Connection attempt started");

        // The provider call runs detached; it cannot be cancelled, only
        // ignored once the attempt is settled
        let core = Arc::clone(&self.core);
        let attempt_id = id.clone();
        tokio::spawn(async move {
            let result = connector.connect().await;
            core.resolve(generation, &attempt_id, result).await;
        });

        // Deadline race for approval flows with no native timeout
        if unbounded {
            let core = Arc::clone(&self.core);
            let cancel = self.core.cancel.clone();
            let timeout = self.approval_timeout;
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        core.resolve(
                            generation,
                            &id,
                            Err(ConnectError::Timeout {
                                secs: timeout.as_secs(),
                            }),
                        )
                        .await;
                    }
                    _ = cancel.cancelled() => {}
                }
            });
        }

        Ok(())
    }

    /// Select an adapter and wait for the attempt's terminal outcome
    pub async fn connect(&self, adapter_id: &str) -> Result<ConnectedSession> {
        let mut rx = self.core.state_tx.subscribe();
        rx.borrow_and_update();
        self.select(adapter_id).await?;

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(ConnectError::Disposed);
                    }
                }
                _ = self.core.cancel.cancelled() => {
                    return Err(ConnectError::Disposed);
                }
            }
            let snapshot = rx.borrow_and_update().clone();
            match snapshot {
                ConnectionState::Connected(session) => return Ok(session),
                ConnectionState::Failed { error, .. } => return Err(error),
                _ => {}
            }
        }
    }

    /// Dismiss a failure banner: `Failed` becomes `Idle`
    ///
    /// Independent of retry; a no-op in any other state.
    pub async fn reset(&self) {
        let mut inner = self.core.inner.lock().await;
        if matches!(inner.state, ConnectionState::Failed { .. }) {
            inner.state = ConnectionState::Idle;
            self.core.state_tx.send_replace(inner.state.clone());
        }
    }

    /// Tear down an established connection: `Connected` becomes `Idle`
    pub async fn disconnect(&self) {
        let session = {
            let mut inner = self.core.inner.lock().await;
            match &inner.state {
                ConnectionState::Connected(session) => {
                    let session = session.clone();
                    inner.state = ConnectionState::Idle;
                    self.core.state_tx.send_replace(inner.state.clone());
                    Some(session)
                }
                _ => None,
            }
        };

        if let Some(session) = session {
            if let Ok(adapter) = self.registry.get(&session.adapter) {
                if let Err(e) = adapter.connector().teardown().await {
                    warn!(adapter = %session.adapter, error = %e, "Wallet teardown failed");
                }
            }
            info!(adapter = %session.adapter, "Wallet disconnected");
        }
    }

    /// Tear down the orchestrator when its surface closes
    ///
    /// Cancels outstanding attempt timers, permanently detaches from any
    /// in-flight result, and issues best-effort teardown on every adapter
    /// engaged during this orchestrator's lifetime. Teardown failures are
    /// logged, never propagated. Idempotent.
    pub async fn dispose(&self) {
        if self.core.cancel.is_cancelled() {
            return;
        }
        self.core.cancel.cancel();

        let engaged = {
            let mut inner = self.core.inner.lock().await;
            std::mem::take(&mut inner.engaged)
        };

        for adapter_id in engaged {
            if let Ok(adapter) = self.registry.get(&adapter_id) {
                if let Err(e) = adapter.connector().teardown().await {
                    warn!(adapter = %adapter_id, error = %e, "Wallet teardown failed during disposal");
                }
            }
        }
        debug!("Orchestrator disposed");
    }
}

impl Core {
    /// Single-use completion point for an attempt
    ///
    /// The first resolution wins. Anything arriving later, a late provider
    /// result after the timeout already settled the attempt, or any result
    /// after disposal or a newer attempt, is discarded without touching
    /// state.
    async fn resolve(&self, generation: u64, adapter_id: &str, result: Result<Address>) {
        let mut inner = self.inner.lock().await;

        if self.cancel.is_cancelled() {
            debug!(adapter = %adapter_id, "Result after disposal discarded");
            return;
        }
        if inner.generation != generation || !inner.state.is_connecting() {
            debug!(adapter = %adapter_id, generation, "Stale attempt result discarded");
            return;
        }

        match result {
            Ok(address) => {
                let session = ConnectedSession {
                    adapter: adapter_id.to_string(),
                    address,
                    connected_at: Utc::now(),
                };
                inner.state = ConnectionState::Connected(session.clone());
                self.state_tx.send_replace(inner.state.clone());
                info!(adapter = %adapter_id, address = %session.address.short(), "Wallet connected");
                // Exactly once, synchronous with the transition: the state
                // lock is still held, nothing can interleave
                if let Some(hook) = &self.on_connected {
                    hook(&session);
                }
            }
            Err(error) => {
                warn!(adapter = %adapter_id, %error, "Connection attempt failed");
                inner.state = ConnectionState::Failed {
                    adapter: adapter_id.to_string(),
                    error,
                };
                self.state_tx.send_replace(inner.state.clone());
            }
        }
    }
}
