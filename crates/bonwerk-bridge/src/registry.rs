// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manufacturer-keyed lookup of controller factories.
//
// The vendor is resolved once, when a session is opened.  After that the
// engine only holds a `dyn PrinterController` and never branches on vendor.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use bonwerk_core::error::{BonwerkError, Result};

use crate::traits::ControllerFactory;

#[derive(Default, Clone)]
pub struct FactoryRegistry {
    factories: HashMap<String, Arc<dyn ControllerFactory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its manufacturer name.  A later registration
    /// for the same manufacturer replaces the earlier one.
    pub fn register(&mut self, factory: Arc<dyn ControllerFactory>) -> &mut Self {
        let key = normalize(factory.manufacturer());
        debug!(manufacturer = %key, "controller factory registered");
        self.factories.insert(key, factory);
        self
    }

    pub fn with(mut self, factory: Arc<dyn ControllerFactory>) -> Self {
        self.register(factory);
        self
    }

    pub fn resolve(&self, manufacturer: &str) -> Result<Arc<dyn ControllerFactory>> {
        self.factories
            .get(&normalize(manufacturer))
            .cloned()
            .ok_or_else(|| BonwerkError::NoControllerFactory(manufacturer.to_owned()))
    }

    pub fn manufacturers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

fn normalize(manufacturer: &str) -> String {
    manufacturer.trim().to_ascii_lowercase()
}
