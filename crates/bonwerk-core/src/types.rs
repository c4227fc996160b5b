// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bonwerk receipt printer engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Connection / hardware state
// ---------------------------------------------------------------------------

/// Availability of the printer bound to the current session.
///
/// Exactly one value is current at any time.  Only the controller of the
/// active session writes it; everything else observes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Session opened, waiting for the vendor backend to report in.
    #[default]
    CheckingForPrinter,
    /// Ready to accept commands.
    Connected,
    /// Printer is warming up or initialising.
    Preparing,
    /// Printer is executing a job.
    Busy,
    /// Hardware fault or unavailability.
    Error(ConnectionErrorKind),
}

impl ConnectionState {
    /// Whether a job can be handed to the printer right now.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckingForPrinter => f.write_str("checking-for-printer"),
            Self::Connected => f.write_str("connected"),
            Self::Preparing => f.write_str("preparing"),
            Self::Busy => f.write_str("busy"),
            Self::Error(kind) => write!(f, "error({kind:?})"),
        }
    }
}

/// Closed set of faults a controller may classify vendor status codes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionErrorKind {
    ConnectionLost,
    NotAvailable,
    AbnormalCommunication,
    OutOfPaper,
    Overheated,
    CoverNotClosed,
    PaperCutterAbnormal,
    PaperAbnormal,
    BlackMarkNotFound,
    FirmwareUpgradeFailed,
    PaperJam,
    VoltageTooLow,
    PrintingUnfinished,
    Malfunctions,
    Unknown,
    /// Fault only one vendor reports.  `code` is the vendor's own identifier.
    Vendor { vendor: String, code: String },
}

impl ConnectionErrorKind {
    /// Faults that clear once someone attends to the printer (or on their
    /// own), as opposed to faults that need service or a new device.
    /// Unknown and vendor-specific faults count as recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::FirmwareUpgradeFailed | Self::Malfunctions)
    }
}

// ---------------------------------------------------------------------------
// Printer information
// ---------------------------------------------------------------------------

/// Paper roll fitted to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperWidth {
    Mm58,
    Mm80,
    /// Width reported by the vendor that matches neither standard roll,
    /// expressed in characters per line.
    External(u16),
}

impl PaperWidth {
    /// Characters per line at the printer's default font.
    pub fn chars_per_line(&self) -> u16 {
        match self {
            Self::Mm58 => 32,
            Self::Mm80 => 48,
            Self::External(chars) => *chars,
        }
    }
}

/// Font size class understood by the controller contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontType {
    Small,
    #[default]
    Normal,
    Large,
}

/// Version of the vendor print service the controller is talking to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceVersion {
    #[default]
    Unknown,
    Info { name: String, code: i64 },
}

/// Snapshot of the printer as reported by its controller.
///
/// Produced on demand; never cached past the call that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub serial_number: String,
    pub device_model: String,
    pub printer_version: String,
    pub paper: PaperWidth,
    pub font_type: FontType,
    pub print_head_id: String,
    /// Cumulative distance printed, in millimetres.
    pub printed_distance_mm: u64,
    pub service_version: ServiceVersion,
}

impl Default for PrinterInfo {
    fn default() -> Self {
        Self {
            serial_number: String::new(),
            device_model: String::new(),
            printer_version: String::new(),
            paper: PaperWidth::Mm58,
            font_type: FontType::Normal,
            print_head_id: String::new(),
            printed_distance_mm: 0,
            service_version: ServiceVersion::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Print darkness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintingIntensity {
    #[default]
    Default,
    Light,
    Dark,
    Darker,
    Darkest,
}

/// Per-session printer settings, read before every job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    /// When false, jobs are accepted and reported as successful without
    /// touching the printer.
    pub enabled: bool,
    pub printing_intensity: PrintingIntensity,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            printing_intensity: PrintingIntensity::Default,
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Transport a printer is reachable over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    /// Printer built into the POS terminal itself.
    Internal,
    Usb,
    Bluetooth,
    Lan,
    Serial,
}

/// A printer reported by a discovery collaborator.
///
/// Logically keyed by `connection_address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPrinter {
    pub info: PrinterInfo,
    pub connection_type: ConnectionType,
    pub connection_address: String,
    pub manufacturer_name: String,
    /// When the reporting source last saw this printer.
    pub last_seen: DateTime<Utc>,
}

/// Progress of a printer discovery scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiscoveryState {
    Idle,
    Discovering(Vec<ExternalPrinter>),
    Finished(Vec<ExternalPrinter>),
    Error(String),
}

impl DiscoveryState {
    /// Printers carried by this state, if any.
    pub fn printers(&self) -> &[ExternalPrinter] {
        match self {
            Self::Discovering(list) | Self::Finished(list) => list,
            Self::Idle | Self::Error(_) => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Error(_))
    }
}

/// Everything a controller factory needs to open a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Manufacturer identity used to pick the controller factory.
    pub manufacturer: String,
    pub connection_type: ConnectionType,
    pub address: String,
}

impl From<&ExternalPrinter> for ConnectionDescriptor {
    fn from(printer: &ExternalPrinter) -> Self {
        Self {
            manufacturer: printer.manufacturer_name.clone(),
            connection_type: printer.connection_type,
            address: printer.connection_address.clone(),
        }
    }
}
