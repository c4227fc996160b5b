// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bonwerk Core: domain types, state taxonomies, and errors shared across all crates.

pub mod command;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use command::{Bitmap, PrintCommand, PrintJob};
pub use config::{DiscoveryConfig, DocumentConfig, EngineConfig, FinishPolicy};
pub use error::{BonwerkError, PrintError, PrintResult};
pub use types::*;
