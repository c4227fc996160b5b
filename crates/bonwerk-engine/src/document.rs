// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Controller for vendors that print rendered documents.
//
// Every command becomes an HTML fragment.  In batch mode fragments are
// appended to one buffer and `start()` sends the whole receipt as a single
// document, followed by any cut that was requested; otherwise each command
// is wrapped and sent on its own.  Both
// modes share fragment generation and differ only in when the backend's
// `print_content` runs.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tracing::debug;

use bonwerk_bridge::state::StateWriter;
use bonwerk_bridge::traits::{BarcodeEncoder, DispatchMode, PrinterController, Symbology};
use bonwerk_core::config::DocumentConfig;
use bonwerk_core::error::{BonwerkError, Result};
use bonwerk_core::types::{ConnectionState, FontType, PrinterInfo, PrintingIntensity};
use bonwerk_core::Bitmap;

use crate::markup;

/// Vendor side of a document controller.
///
/// Only `print_content` and `printer_info` are mandatory; the remaining
/// hooks default to no-ops (or `PlatformUnavailable` for raw bytes, which a
/// document printer cannot interpret).
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Print one complete document.
    async fn print_content(&self, document: String) -> Result<()>;

    async fn printer_info(&self) -> Result<PrinterInfo>;

    async fn send_raw_data(&self, _data: &[u8]) -> Result<()> {
        Err(BonwerkError::PlatformUnavailable)
    }

    async fn cut_paper(&self) -> Result<()> {
        Ok(())
    }

    async fn set_font_size(&self, _font: FontType) -> Result<()> {
        Ok(())
    }

    async fn set_intensity(&self, _level: PrintingIntensity) -> Result<()> {
        Ok(())
    }

    /// Vendor session teardown run by `start()` once output has been sent.
    async fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Receipt waiting for `start()` in batch mode.
#[derive(Default)]
struct Pending {
    markup: String,
    cut: bool,
}

pub struct DocumentController<B> {
    config: DocumentConfig,
    backend: B,
    encoder: Arc<dyn BarcodeEncoder>,
    state: StateWriter,
    pending: Mutex<Pending>,
}

impl<B: DocumentBackend> DocumentController<B> {
    pub fn new(
        config: DocumentConfig,
        backend: B,
        encoder: Arc<dyn BarcodeEncoder>,
        state: StateWriter,
    ) -> Self {
        Self {
            config,
            backend,
            encoder,
            state,
            pending: Mutex::new(Pending::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Bytes of markup waiting for `start()`.  Always zero in immediate mode.
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.markup.len()
    }

    async fn emit(&self, fragment: String) -> Result<()> {
        if self.config.batch_mode {
            let mut pending = self.pending.lock().await;
            pending.markup.push_str(&fragment);
            pending.markup.push_str(markup::LINE_BREAK);
            Ok(())
        } else {
            let document = markup::wrap_document(&fragment, self.config.include_style_wrapper);
            self.backend.print_content(document).await
        }
    }

    /// Rasterize `value` and emit it with its text underneath.  Content the
    /// encoder rejects is dropped without error.
    async fn emit_symbol(
        &self,
        value: &str,
        symbology: Symbology,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let Some(bitmap) = self.encoder.encode(value, symbology, width, height) else {
            debug!(?symbology, value, "encoder produced no image, command dropped");
            return Ok(());
        };
        let mut fragment = markup::image_fragment(&bitmap)?;
        fragment.push_str(&markup::centered_text_fragment(value, self.config.font_size));
        self.emit(fragment).await
    }

    /// Send the pending receipt, then the pending cut.  Returns whether
    /// anything reached the backend.
    async fn flush(&self) -> Result<bool> {
        let pending = std::mem::take(&mut *self.pending.lock().await);
        let mut sent = false;
        if !pending.markup.is_empty() {
            debug!(bytes = pending.markup.len(), "flushing batched document");
            let document =
                markup::wrap_document(&pending.markup, self.config.include_style_wrapper);
            self.backend.print_content(document).await?;
            sent = true;
        }
        if pending.cut {
            self.backend.cut_paper().await?;
            sent = true;
        }
        Ok(sent)
    }
}

#[async_trait]
impl<B: DocumentBackend> PrinterController for DocumentController<B> {
    fn dispatch_mode(&self) -> DispatchMode {
        if self.config.batch_mode {
            DispatchMode::Buffered
        } else {
            DispatchMode::Immediate
        }
    }

    async fn send_raw_data(&self, data: &[u8]) -> Result<()> {
        self.backend.send_raw_data(data).await
    }

    async fn set_font_size(&self, font: FontType) -> Result<()> {
        self.backend.set_font_size(font).await
    }

    async fn print_text(&self, text: &str) -> Result<()> {
        self.emit(markup::text_fragment(text, self.config.font_size)).await
    }

    async fn print_barcode(&self, value: &str) -> Result<()> {
        let (width, height) = (self.config.barcode_width, self.config.barcode_height);
        self.emit_symbol(value, Symbology::Code128, width, height).await
    }

    async fn print_qr(&self, value: &str) -> Result<()> {
        let size = self.config.qr_code_size;
        self.emit_symbol(value, Symbology::QrCode, size, size).await
    }

    async fn print_image(&self, image: &Bitmap) -> Result<()> {
        self.emit(markup::image_fragment(image)?).await
    }

    async fn feed_paper(&self) -> Result<()> {
        self.emit(self.config.feed_markup.clone()).await
    }

    /// In batch mode the cut is held until `start()` and runs after the
    /// document, however many cuts the job asked for.
    async fn cut_paper(&self) -> Result<()> {
        if self.config.batch_mode {
            self.pending.lock().await.cut = true;
            Ok(())
        } else {
            self.backend.cut_paper().await
        }
    }

    async fn set_intensity(&self, level: PrintingIntensity) -> Result<()> {
        self.backend.set_intensity(level).await
    }

    async fn start(&self) -> Result<()> {
        if self.config.batch_mode {
            if self.flush().await? {
                self.backend.finish().await?;
            }
            Ok(())
        } else {
            self.backend.finish().await
        }
    }

    async fn discard(&self) {
        let dropped = std::mem::take(&mut *self.pending.lock().await);
        if !dropped.markup.is_empty() || dropped.cut {
            debug!(bytes = dropped.markup.len(), "discarded unprinted receipt");
        }
    }

    async fn printer_info(&self) -> Result<PrinterInfo> {
        self.backend.printer_info().await
    }

    fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}
