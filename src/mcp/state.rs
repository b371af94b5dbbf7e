//! Transport Lifecycle State Machine
//!
//! Tracks the lifecycle of one session transport. A transport is allocated
//! before its session id exists, becomes open once the initialize exchange
//! has assigned an id, and is closed exactly once.

use std::sync::RwLock;

/// Transport lifecycle states
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransportState {
    /// Allocated for an initialize request, session id not yet known
    Allocated,
    /// Session id assigned, requests may be forwarded
    Open,
    /// Terminated; never reopened
    Closed,
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportState::Allocated => write!(f, "Allocated"),
            TransportState::Open => write!(f, "Open"),
            TransportState::Closed => write!(f, "Closed"),
        }
    }
}

/// Error type for state machine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportStateError {
    /// Attempted an invalid state transition
    #[error("Invalid transport state transition: {from} → {to}")]
    InvalidTransition {
        from: TransportState,
        to: TransportState,
    },
}

/// Thread-safe transport state machine
#[derive(Debug)]
pub struct TransportStateMachine {
    state: RwLock<TransportState>,
}

impl TransportStateMachine {
    /// Create a new state machine in Allocated state
    pub fn new() -> Self {
        Self {
            state: RwLock::new(TransportState::Allocated),
        }
    }

    /// Get the current state
    pub fn current(&self) -> TransportState {
        match self.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Attempt to transition to a new state
    ///
    /// Valid transitions:
    /// - Allocated → Open (session id assigned)
    /// - Allocated → Closed (initialize never completed)
    /// - Open → Closed (terminated)
    pub fn transition(&self, to: TransportState) -> Result<(), TransportStateError> {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let from = *state;

        let valid = matches!(
            (from, to),
            (TransportState::Allocated, TransportState::Open)
                | (TransportState::Allocated, TransportState::Closed)
                | (TransportState::Open, TransportState::Closed)
        );

        if valid {
            *state = to;
            tracing::debug!(from = %from, to = %to, "transport state transition");
            Ok(())
        } else {
            Err(TransportStateError::InvalidTransition { from, to })
        }
    }

    /// Move to Closed. Returns `true` only for the call that performed the
    /// transition, so close side effects run once.
    pub fn close(&self) -> bool {
        self.transition(TransportState::Closed).is_ok()
    }

    /// Check if in Open state
    pub fn is_open(&self) -> bool {
        self.current() == TransportState::Open
    }

    /// Check if in Closed state
    pub fn is_closed(&self) -> bool {
        self.current() == TransportState::Closed
    }
}

impl Default for TransportStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
