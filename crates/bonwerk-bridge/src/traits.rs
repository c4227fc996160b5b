// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contracts between the engine and vendor backends.
//
// The engine never talks to printer hardware itself.  Each vendor backend
// implements these traits; the engine only sees trait objects.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::watch;

use bonwerk_core::error::Result;
use bonwerk_core::types::{
    ConnectionDescriptor, ConnectionState, ConnectionType, DiscoveryState, FontType,
    PrinterInfo, PrintingIntensity,
};
use bonwerk_core::Bitmap;

use crate::state::StateWriter;

/// When a controller's print, feed, and cut primitives take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Primitives accumulate and are sent by `start()`.
    Buffered,
    /// Each primitive goes to the vendor channel as it is called.
    Immediate,
}

/// Capability interface every vendor backend implements for one session.
///
/// Calls may arrive in any connection state.  Returning `Err` (or
/// panicking) is caught by the print service; nothing here needs to guard
/// against being called while disconnected beyond returning an error.
///
/// `set_font_size`, `set_intensity`, and `cut_paper` default to silent
/// no-ops for vendors that lack them.
#[async_trait]
pub trait PrinterController: Send + Sync {
    /// Fixed for the controller's lifetime.
    fn dispatch_mode(&self) -> DispatchMode;

    async fn send_raw_data(&self, data: &[u8]) -> Result<()>;

    async fn set_font_size(&self, _font: FontType) -> Result<()> {
        Ok(())
    }

    async fn print_text(&self, text: &str) -> Result<()>;

    async fn print_barcode(&self, value: &str) -> Result<()>;

    async fn print_qr(&self, value: &str) -> Result<()>;

    async fn print_image(&self, image: &Bitmap) -> Result<()>;

    async fn feed_paper(&self) -> Result<()>;

    async fn cut_paper(&self) -> Result<()> {
        Ok(())
    }

    async fn set_intensity(&self, _level: PrintingIntensity) -> Result<()> {
        Ok(())
    }

    /// Flush buffered output.  A second call with nothing pending is a no-op.
    async fn start(&self) -> Result<()>;

    /// Drop anything buffered for a job that will not be started.  Called
    /// after a failed job; controllers without a buffer ignore it.
    async fn discard(&self) {}

    async fn printer_info(&self) -> Result<PrinterInfo>;

    /// Live connection state of this controller's session.
    fn connection_state(&self) -> watch::Receiver<ConnectionState>;
}

/// Builds a controller for one manufacturer.
#[async_trait]
pub trait ControllerFactory: Send + Sync {
    /// Manufacturer identity this factory serves (matched case-insensitively).
    fn manufacturer(&self) -> &str;

    /// Open a session.  The controller publishes connection state through
    /// `state` only; the writer goes inert once the session is replaced.
    async fn create(
        &self,
        descriptor: &ConnectionDescriptor,
        state: StateWriter,
    ) -> Result<Arc<dyn PrinterController>>;
}

/// Parameters handed to every discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub timeout: Duration,
    /// Transports to scan.  Empty means every transport the source supports.
    pub connection_types: Vec<ConnectionType>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connection_types: Vec::new(),
        }
    }
}

/// A scanner for one transport or vendor SDK.
///
/// Dropping the returned stream must stop the scan and release every vendor
/// resource, whether or not a terminal state was reached.
pub trait DiscoverySource: Send + Sync {
    fn name(&self) -> &str;

    fn discover(&self, config: &ScanConfig) -> BoxStream<'static, DiscoveryState>;
}

/// Barcode symbologies the encoder is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Code128,
    QrCode,
}

/// Rasterizes barcodes and QR codes.
///
/// Unsupported or invalid content yields `None`, never a panic.
pub trait BarcodeEncoder: Send + Sync {
    fn encode(&self, content: &str, symbology: Symbology, width: u32, height: u32)
    -> Option<Bitmap>;
}

/// Fire-and-forget receipt telemetry.
pub trait AnalyticsSink: Send + Sync {
    fn log_print_receipt(&self, description: &str);

    fn log_error_print_receipt(&self, reason: &str);
}
