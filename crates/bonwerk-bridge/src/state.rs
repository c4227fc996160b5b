// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-writer broadcast of a printer's connection state.
//
// The print service owns one `StateChannel` for its whole lifetime, so
// observers can subscribe before, during, and after any session.  Each
// session gets a `StateWriter` stamped with the session epoch; once the
// service opens or closes another session the old writer's `set` calls are
// discarded.  Epoch changes and writes both happen under the watch lock, so
// a stale write can never land after the session moved on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use bonwerk_core::types::ConnectionState;

/// Owner side of the connection state, held by the print service.
#[derive(Debug)]
pub struct StateChannel {
    tx: Arc<watch::Sender<ConnectionState>>,
    epoch: Arc<AtomicU64>,
}

impl Default for StateChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StateChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::default());
        Self {
            tx: Arc::new(tx),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a new session: invalidate every existing writer, reset the
    /// state to `CheckingForPrinter`, and hand out the new session's writer.
    pub fn open_session(&self) -> StateWriter {
        let mut session = 0;
        self.tx.send_modify(|state| {
            session = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
            *state = ConnectionState::CheckingForPrinter;
        });
        debug!(session, "connection state session opened");
        StateWriter {
            tx: Arc::clone(&self.tx),
            epoch: Arc::clone(&self.epoch),
            session,
        }
    }

    /// End the current session and publish its final state.
    pub fn close_session(&self, final_state: ConnectionState) {
        self.tx.send_modify(|state| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            *state = final_state;
        });
    }

    /// Epoch of the most recently opened or closed session.
    pub fn current_session(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }
}

/// Write handle given to the controller of one session.
#[derive(Debug, Clone)]
pub struct StateWriter {
    tx: Arc<watch::Sender<ConnectionState>>,
    epoch: Arc<AtomicU64>,
    session: u64,
}

impl StateWriter {
    /// Publish `state`.  Returns `false` when this writer's session is no
    /// longer current and the write was dropped.  Repeating the current
    /// value does not wake observers.
    pub fn set(&self, state: ConnectionState) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|current| {
            if self.epoch.load(Ordering::Acquire) != self.session {
                return false;
            }
            accepted = true;
            if *current == state {
                return false;
            }
            debug!(session = self.session, from = %current, to = %state, "connection state changed");
            *current = state;
            true
        });
        if !accepted {
            debug!(session = self.session, "dropped state write from stale session");
        }
        accepted
    }

    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::Acquire) == self.session
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Read-only check of whether this writer's session is still current.
    pub fn guard(&self) -> SessionGuard {
        SessionGuard {
            epoch: Arc::clone(&self.epoch),
            session: self.session,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }
}

/// Lets holders of a controller detect that its session has ended without
/// giving them write access to the state.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    epoch: Arc<AtomicU64>,
    session: u64,
}

impl SessionGuard {
    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::Acquire) == self.session
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}
