// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print service boundary.
//
// Holds the controller of the active session (if any) and the connection
// state observers subscribe to.  Every call into a controller goes through
// `with_controller`, which turns errors and panics into a `PrintResult` so
// that nothing a vendor backend does escapes this layer.

use std::any::Any;
use std::future::Future;
use std::ops::Deref;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, instrument, warn};

use bonwerk_bridge::registry::FactoryRegistry;
use bonwerk_bridge::state::{SessionGuard, StateChannel};
use bonwerk_bridge::traits::{DispatchMode, PrinterController};
use bonwerk_core::error::{BonwerkError, PrintError, PrintResult, Result};
use bonwerk_core::types::{ConnectionDescriptor, ConnectionErrorKind, ConnectionState};

/// The controller handed to a `with_controller` body, tied to the session
/// it was bound in.
pub struct ControllerLease {
    controller: Arc<dyn PrinterController>,
    guard: SessionGuard,
}

impl ControllerLease {
    /// Fails with `SessionReplaced` once the service has disconnected or
    /// bound another controller.  Long-running bodies call this between
    /// controller calls.
    pub fn ensure_current(&self) -> Result<()> {
        if self.guard.is_current() {
            Ok(())
        } else {
            Err(BonwerkError::SessionReplaced)
        }
    }

    pub fn session(&self) -> u64 {
        self.guard.session()
    }
}

impl Deref for ControllerLease {
    type Target = dyn PrinterController;

    fn deref(&self) -> &Self::Target {
        self.controller.as_ref()
    }
}

struct Bound {
    controller: Arc<dyn PrinterController>,
    guard: SessionGuard,
}

pub struct PrintService {
    registry: FactoryRegistry,
    state: StateChannel,
    bound: RwLock<Option<Bound>>,
}

impl PrintService {
    pub fn new(registry: FactoryRegistry) -> Self {
        Self {
            registry,
            state: StateChannel::new(),
            bound: RwLock::new(None),
        }
    }

    /// Open a session with the printer described by `descriptor`, replacing
    /// any bound controller.
    ///
    /// The factory is resolved by manufacturer once, here.  On failure the
    /// state becomes `Error(NotAvailable)` and no controller is bound.
    #[instrument(skip(self, descriptor), fields(manufacturer = %descriptor.manufacturer, address = %descriptor.address))]
    pub async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<()> {
        let mut bound = self.bound.write().await;
        if bound.take().is_some() {
            info!("replacing bound printer controller");
        }

        let factory = match self.registry.resolve(&descriptor.manufacturer) {
            Ok(factory) => factory,
            Err(e) => {
                self.state
                    .close_session(ConnectionState::Error(ConnectionErrorKind::NotAvailable));
                warn!(error = %e, "cannot open printer session");
                return Err(e);
            }
        };

        let writer = self.state.open_session();
        let guard = writer.guard();
        match factory.create(descriptor, writer).await {
            Ok(controller) => {
                info!(
                    session = guard.session(),
                    mode = ?controller.dispatch_mode(),
                    "printer controller bound"
                );
                *bound = Some(Bound { controller, guard });
                Ok(())
            }
            Err(e) => {
                self.state
                    .close_session(ConnectionState::Error(ConnectionErrorKind::NotAvailable));
                warn!(error = %e, "controller factory failed");
                Err(e)
            }
        }
    }

    /// Unbind the current controller.  Its state writer stops working and
    /// in-flight bodies see `SessionReplaced` at their next check.
    pub async fn disconnect(&self) {
        let previous = self.bound.write().await.take();
        self.state
            .close_session(ConnectionState::Error(ConnectionErrorKind::NotAvailable));
        if let Some(previous) = previous {
            info!(session = previous.guard.session(), "printer controller unbound");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.bound.read().await.is_some()
    }

    pub async fn dispatch_mode(&self) -> Option<DispatchMode> {
        self.bound
            .read()
            .await
            .as_ref()
            .map(|b| b.controller.dispatch_mode())
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> ConnectionState {
        self.state.current()
    }

    async fn lease(&self) -> Option<ControllerLease> {
        self.bound.read().await.as_ref().map(|b| ControllerLease {
            controller: Arc::clone(&b.controller),
            guard: b.guard.clone(),
        })
    }

    /// Run `body` against the bound controller.
    ///
    /// Without a controller the body is never called and the result is
    /// `PrinterNotConnected`.  Errors and panics from the body become
    /// `WithException`, except `SessionReplaced` which reads as
    /// `PrinterNotConnected`.
    pub async fn with_controller<T, F, Fut>(&self, body: F) -> PrintResult<T>
    where
        F: FnOnce(ControllerLease) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(lease) = self.lease().await else {
            debug!("no printer controller bound");
            return Err(PrintError::PrinterNotConnected);
        };

        match AssertUnwindSafe(async move { body(lease).await })
            .catch_unwind()
            .await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(PrintError::from(e)),
            Err(panic) => {
                let message = panic_message(panic);
                warn!(panic = %message, "printer controller panicked");
                Err(PrintError::WithException(BonwerkError::Panicked(message)))
            }
        }
    }

    /// Like `with_controller`, for calls whose failure only needs logging.
    pub async fn with_controller_or<T, F, Fut>(&self, default: T, body: F) -> T
    where
        F: FnOnce(ControllerLease) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.with_controller(body).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "printer call failed, using default");
                default
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
