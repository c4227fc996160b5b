// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bonwerk Engine: the batched document controller, the print service
// boundary with its safe invocation, job orchestration, and the discovery
// aggregator.  Vendor backends plug in through the contracts in
// `bonwerk-bridge`.

pub mod discovery;
pub mod document;
pub mod markup;
pub mod orchestrator;
pub mod service;
pub mod session;

#[cfg(test)]
mod testing;

pub use discovery::{DiscoveryAggregator, merge_discovery};
pub use document::{DocumentBackend, DocumentController};
pub use orchestrator::{JobOrchestrator, JobPhase};
pub use service::{ControllerLease, PrintService};
pub use session::PrinterSession;
