//! Session Registry
//!
//! Owns every live session and guarantees that a session id maps to exactly
//! one open transport. Creation is two-phase: a transport is allocated by
//! [`SessionRegistry::create`], handles its initialize request, and is only
//! then inserted by [`SessionRegistry::commit`] under the id it reported. A
//! lookup can therefore never observe a half-registered session.
//!
//! Transports remove themselves through their close callback, which captures
//! a weak handle to the registry and the transport's own id.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use super::transport::{CloseCallback, Transport, TransportFactory};

type Sessions = HashMap<String, Arc<dyn Transport>>;

/// A transport allocated for an initialize request, not yet registered
pub struct PendingSession {
    transport: Arc<dyn Transport>,
}

impl PendingSession {
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

/// Outcome of closing every session at shutdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub closed: Vec<String>,
    pub failed: Vec<String>,
}

pub struct SessionRegistry {
    factory: Arc<dyn TransportFactory>,
    sessions: RwLock<Sessions>,
    this: Weak<SessionRegistry>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            factory,
            sessions: RwLock::new(HashMap::new()),
            this: this.clone(),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Sessions> {
        match self.sessions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sessions> {
        match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Allocate a transport for a new session. It is not visible to
    /// [`get`](Self::get) until committed.
    pub fn create(&self) -> PendingSession {
        let registry = self.this.clone();
        let on_close: CloseCallback = Arc::new(move |session_id: &str| {
            if let Some(registry) = registry.upgrade() {
                if registry.remove(session_id).is_some() {
                    tracing::info!(
                        session_id = %session_id,
                        "Transport closed, removed session from registry"
                    );
                }
            }
        });
        PendingSession {
            transport: self.factory.open(on_close),
        }
    }

    /// Register a pending session under the id its transport reported.
    ///
    /// Returns `None` when the transport never completed initialization or
    /// closed before registration; the transport is then dropped.
    pub fn commit(&self, pending: PendingSession) -> Option<String> {
        let transport = pending.transport;
        let session_id = transport.session_id()?;
        if transport.is_closed() {
            return None;
        }
        self.write().insert(session_id.clone(), transport);
        tracing::debug!(session_id = %session_id, "Session registered");
        Some(session_id)
    }

    /// Look up a live session. Never creates.
    pub fn get(&self, session_id: &str) -> Option<Arc<dyn Transport>> {
        self.read().get(session_id).cloned()
    }

    /// Forget a session. Removing an unknown id is a no-op.
    pub fn remove(&self, session_id: &str) -> Option<Arc<dyn Transport>> {
        self.write().remove(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.read().contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Close every session and clear the registry.
    ///
    /// Entries are drained under the lock and closed outside it; a failure
    /// to close one session is logged and does not stop the rest.
    pub async fn close_all(&self) -> ShutdownReport {
        let drained: Vec<(String, Arc<dyn Transport>)> = self.write().drain().collect();
        let mut report = ShutdownReport::default();

        for (session_id, transport) in drained {
            tracing::info!(session_id = %session_id, "Closing transport for session");
            match transport.close().await {
                Ok(()) => report.closed.push(session_id),
                Err(e) => {
                    tracing::error!(
                        session_id = %session_id,
                        error = %e,
                        "Error closing transport for session"
                    );
                    report.failed.push(session_id);
                }
            }
        }

        report
    }
}
