// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bonwerk Bridge: contracts that vendor printer backends implement, the
// manufacturer-keyed factory registry, and the single-writer connection
// state channel shared between the engine and the active controller.

pub mod registry;
pub mod state;
pub mod stub;
pub mod traits;

pub use registry::FactoryRegistry;
pub use state::{SessionGuard, StateChannel, StateWriter};
pub use stub::{NoBarcodeEncoder, TracingAnalytics};
pub use traits::{
    AnalyticsSink, BarcodeEncoder, ControllerFactory, DiscoverySource, DispatchMode,
    PrinterController, ScanConfig, Symbology,
};
