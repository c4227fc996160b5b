// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bonwerk.

use thiserror::Error;

/// Top-level error type for all Bonwerk operations.
#[derive(Debug, Error)]
pub enum BonwerkError {
    // -- Controller / vendor errors --
    #[error("vendor backend error: {0}")]
    Vendor(String),

    #[error("controller panicked: {0}")]
    Panicked(String),

    #[error("printer session was replaced while the operation was running")]
    SessionReplaced,

    #[error("no controller factory registered for manufacturer `{0}`")]
    NoControllerFactory(String),

    // -- Rendering --
    #[error("encoding failed: {0}")]
    Encoding(String),

    // -- Discovery --
    #[error("printer discovery failed: {0}")]
    Discovery(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("feature not available on this backend")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BonwerkError>;

/// Typed outcome of any operation routed through the print service.
///
/// `Ok(value)` is success; nothing a controller does escapes as anything
/// other than one of these variants.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("printer not connected")]
    PrinterNotConnected,

    #[error("print operation failed: {0}")]
    WithException(#[source] BonwerkError),
}

impl From<BonwerkError> for PrintError {
    fn from(err: BonwerkError) -> Self {
        match err {
            BonwerkError::SessionReplaced => Self::PrinterNotConnected,
            other => Self::WithException(other),
        }
    }
}

pub type PrintResult<T> = std::result::Result<T, PrintError>;
