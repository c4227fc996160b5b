// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default collaborators for builds that have no vendor analytics or barcode
// rasterizer wired in.

use bonwerk_core::Bitmap;

use crate::traits::{AnalyticsSink, BarcodeEncoder, Symbology};

/// Analytics sink that records receipts as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn log_print_receipt(&self, description: &str) {
        tracing::info!(
            target: "bonwerk::analytics",
            lines = description.lines().count(),
            "receipt printed"
        );
    }

    fn log_error_print_receipt(&self, reason: &str) {
        tracing::warn!(target: "bonwerk::analytics", reason, "receipt failed");
    }
}

/// Encoder that never produces an image.  Barcode and QR commands are
/// dropped by document controllers that use it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBarcodeEncoder;

impl BarcodeEncoder for NoBarcodeEncoder {
    fn encode(
        &self,
        content: &str,
        symbology: Symbology,
        _width: u32,
        _height: u32,
    ) -> Option<Bitmap> {
        tracing::warn!(?symbology, len = content.len(), "no barcode encoder configured");
        None
    }
}
