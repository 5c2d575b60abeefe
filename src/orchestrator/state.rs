//! Connection state types

use std::fmt;

use chrono::{DateTime, Utc};

use crate::adapter::Address;
use crate::error::ConnectError;

/// An established wallet connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedSession {
    /// Id of the adapter that produced the connection
    pub adapter: String,
    pub address: Address,
    pub connected_at: DateTime<Utc>,
}

/// Connection state machine
///
/// At most one attempt is outstanding at any time. `Failed` is recoverable:
/// the user may retry the same adapter or pick a different one. Entering
/// `Connecting` always clears a prior failure, so one error is shown at a
/// time, tied to the latest attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting {
        adapter: String,
    },
    Connected(ConnectedSession),
    Failed {
        adapter: String,
        error: ConnectError,
    },
}

impl ConnectionState {
    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting { .. })
    }

    /// Adapter id of the in-flight attempt, if any
    pub fn connecting_adapter(&self) -> Option<&str> {
        match self {
            ConnectionState::Connecting { adapter } => Some(adapter),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&ConnectedSession> {
        match self {
            ConnectionState::Connected(session) => Some(session),
            _ => None,
        }
    }

    /// The surfaced error and the adapter it belongs to, if any
    pub fn error(&self) -> Option<(&str, &ConnectError)> {
        match self {
            ConnectionState::Failed { adapter, error } => Some((adapter, error)),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting { adapter } => write!(f, "connecting({adapter})"),
            ConnectionState::Connected(session) => {
                write!(f, "connected({})", session.address.short())
            }
            ConnectionState::Failed { adapter, error } => {
                write!(f, "failed({adapter}: {error})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        let idle = ConnectionState::Idle;
        assert!(!idle.is_connecting());
        assert!(idle.session().is_none());
        assert!(idle.error().is_none());

        let connecting = ConnectionState::Connecting {
            adapter: "phantom".into(),
        };
        assert_eq!(connecting.connecting_adapter(), Some("phantom"));

        let failed = ConnectionState::Failed {
            adapter: "metamask".into(),
            error: ConnectError::UserRejected,
        };
        let (adapter, error) = failed.error().unwrap();
        assert_eq!(adapter, "metamask");
        assert_eq!(*error, ConnectError::UserRejected);
    }

    #[test]
    fn test_display_abbreviates_address() {
        let state = ConnectionState::Connected(ConnectedSession {
            adapter: "metamask".into(),
            address: Address::new("0x1234567890abcdef1234567890abcdef12345678"),
            connected_at: Utc::now(),
        });
        assert_eq!(state.to_string(), "connected(0x1234...5678)");
    }
}
