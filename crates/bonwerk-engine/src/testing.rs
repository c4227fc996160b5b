// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory controller, factory, and analytics sink for engine tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use bonwerk_bridge::state::StateWriter;
use bonwerk_bridge::traits::{AnalyticsSink, ControllerFactory, DispatchMode, PrinterController};
use bonwerk_core::error::{BonwerkError, Result};
use bonwerk_core::types::{
    ConnectionDescriptor, ConnectionState, ConnectionType, ExternalPrinter, FontType,
    PrinterInfo, PrintingIntensity,
};
use bonwerk_core::Bitmap;

/// A controller call as observed by the recorder.  `printer_info` queries
/// are counted separately because they are reads, not printer actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetIntensity(PrintingIntensity),
    SetFontSize(FontType),
    Text(String),
    Barcode(String),
    Qr(String),
    Image(u32, u32),
    Raw(Vec<u8>),
    Feed,
    Cut,
    Start,
    Discard,
}

impl Call {
    fn kind(&self) -> &'static str {
        match self {
            Self::SetIntensity(_) => "intensity",
            Self::SetFontSize(_) => "font",
            Self::Text(_) => "text",
            Self::Barcode(_) => "barcode",
            Self::Qr(_) => "qr",
            Self::Image(..) => "image",
            Self::Raw(_) => "raw",
            Self::Feed => "feed",
            Self::Cut => "cut",
            Self::Start => "start",
            Self::Discard => "discard",
        }
    }
}

#[derive(Clone, Default)]
struct Behaviour {
    fail_on: Option<&'static str>,
    panic_on: Option<&'static str>,
    info: PrinterInfo,
}

pub struct RecordingController {
    calls: Arc<Mutex<Vec<Call>>>,
    info_queries: Arc<Mutex<usize>>,
    behaviour: Behaviour,
    state: StateWriter,
}

impl RecordingController {
    fn record(&self, call: Call) -> Result<()> {
        let kind = call.kind();
        if self.behaviour.panic_on == Some(kind) {
            panic!("{kind} exploded");
        }
        if self.behaviour.fail_on == Some(kind) {
            return Err(BonwerkError::Vendor(format!("{kind} failed")));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl PrinterController for RecordingController {
    fn dispatch_mode(&self) -> DispatchMode {
        DispatchMode::Immediate
    }

    async fn send_raw_data(&self, data: &[u8]) -> Result<()> {
        self.record(Call::Raw(data.to_vec()))
    }

    async fn set_font_size(&self, font: FontType) -> Result<()> {
        self.record(Call::SetFontSize(font))
    }

    async fn print_text(&self, text: &str) -> Result<()> {
        self.record(Call::Text(text.to_owned()))
    }

    async fn print_barcode(&self, value: &str) -> Result<()> {
        self.record(Call::Barcode(value.to_owned()))
    }

    async fn print_qr(&self, value: &str) -> Result<()> {
        self.record(Call::Qr(value.to_owned()))
    }

    async fn print_image(&self, image: &Bitmap) -> Result<()> {
        self.record(Call::Image(image.width(), image.height()))
    }

    async fn feed_paper(&self) -> Result<()> {
        self.record(Call::Feed)
    }

    async fn cut_paper(&self) -> Result<()> {
        self.record(Call::Cut)
    }

    async fn set_intensity(&self, level: PrintingIntensity) -> Result<()> {
        self.record(Call::SetIntensity(level))
    }

    async fn start(&self) -> Result<()> {
        self.record(Call::Start)
    }

    async fn discard(&self) {
        self.calls.lock().unwrap().push(Call::Discard);
    }

    async fn printer_info(&self) -> Result<PrinterInfo> {
        *self.info_queries.lock().unwrap() += 1;
        Ok(self.behaviour.info.clone())
    }

    fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

/// Factory whose controllers all share one call log.
#[derive(Clone)]
pub struct RecordingFactory {
    manufacturer: &'static str,
    calls: Arc<Mutex<Vec<Call>>>,
    info_queries: Arc<Mutex<usize>>,
    writers: Arc<Mutex<Vec<StateWriter>>>,
    behaviour: Behaviour,
    fail_create: bool,
}

impl RecordingFactory {
    pub fn new(manufacturer: &'static str) -> Self {
        Self {
            manufacturer,
            calls: Arc::default(),
            info_queries: Arc::default(),
            writers: Arc::default(),
            behaviour: Behaviour::default(),
            fail_create: false,
        }
    }

    pub fn failing_on(mut self, kind: &'static str) -> Self {
        self.behaviour.fail_on = Some(kind);
        self
    }

    pub fn panicking_on(mut self, kind: &'static str) -> Self {
        self.behaviour.panic_on = Some(kind);
        self
    }

    pub fn with_font(mut self, font: FontType) -> Self {
        self.behaviour.info.font_type = font;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn info_queries(&self) -> usize {
        *self.info_queries.lock().unwrap()
    }

    pub fn last_writer(&self) -> Option<StateWriter> {
        self.writers.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ControllerFactory for RecordingFactory {
    fn manufacturer(&self) -> &str {
        self.manufacturer
    }

    async fn create(
        &self,
        _descriptor: &ConnectionDescriptor,
        state: StateWriter,
    ) -> Result<Arc<dyn PrinterController>> {
        if self.fail_create {
            return Err(BonwerkError::Vendor("bind failed".into()));
        }
        self.writers.lock().unwrap().push(state.clone());
        Ok(Arc::new(RecordingController {
            calls: Arc::clone(&self.calls),
            info_queries: Arc::clone(&self.info_queries),
            behaviour: self.behaviour.clone(),
            state,
        }))
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    pub printed: Mutex<Vec<String>>,
    pub failed: Mutex<Vec<String>>,
}

impl AnalyticsSink for RecordingAnalytics {
    fn log_print_receipt(&self, description: &str) {
        self.printed.lock().unwrap().push(description.to_owned());
    }

    fn log_error_print_receipt(&self, reason: &str) {
        self.failed.lock().unwrap().push(reason.to_owned());
    }
}

pub fn descriptor(manufacturer: &str) -> ConnectionDescriptor {
    ConnectionDescriptor {
        manufacturer: manufacturer.to_owned(),
        connection_type: ConnectionType::Internal,
        address: "internal".to_owned(),
    }
}

pub fn printer(address: &str, model: &str) -> ExternalPrinter {
    ExternalPrinter {
        info: PrinterInfo {
            device_model: model.to_owned(),
            ..PrinterInfo::default()
        },
        connection_type: ConnectionType::Bluetooth,
        connection_address: address.to_owned(),
        manufacturer_name: "Sunmi".to_owned(),
        last_seen: Utc::now(),
    }
}
