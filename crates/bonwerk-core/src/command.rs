// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print commands and the job that carries them to a printer.

use std::sync::OnceLock;

use crate::types::JobId;

/// Monochrome raster handed to controllers for image printing.
pub type Bitmap = image::GrayImage;

/// One semantic unit of work for a receipt printer.
///
/// Equality is structural: two `RawData` commands are equal when their bytes
/// are, regardless of where the bytes live.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintCommand {
    Text(String),
    Image(Bitmap),
    Barcode(String),
    QrCode(String),
    RawData(Vec<u8>),
    FeedPaper,
    CutPaper,
}

impl PrintCommand {
    /// Line used for this command in a job description.
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Image(bitmap) => {
                format!("==IMG: {}x{} ==", bitmap.width(), bitmap.height())
            }
            Self::Barcode(value) => format!("==BC: {value} =="),
            Self::QrCode(value) => format!("==QR: {value} =="),
            Self::RawData(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::FeedPaper => "-----FEED PAPER-----".to_owned(),
            Self::CutPaper => "-----CUT PAPER-----".to_owned(),
        }
    }

    /// Short variant name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Barcode(_) => "barcode",
            Self::QrCode(_) => "qr",
            Self::RawData(_) => "raw",
            Self::FeedPaper => "feed",
            Self::CutPaper => "cut",
        }
    }
}

/// An ordered, immutable list of commands submitted as one receipt.
#[derive(Debug, Clone)]
pub struct PrintJob {
    id: JobId,
    commands: Vec<PrintCommand>,
    description: OnceLock<String>,
}

impl PrintJob {
    pub fn new(commands: Vec<PrintCommand>) -> Self {
        Self {
            id: JobId::new(),
            commands,
            description: OnceLock::new(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn commands(&self) -> &[PrintCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Human-readable rendering of the job, one line per command.
    ///
    /// Computed on first read and returned unchanged afterwards.
    pub fn description(&self) -> &str {
        self.description.get_or_init(|| {
            self.commands
                .iter()
                .map(PrintCommand::describe)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

impl PartialEq for PrintJob {
    fn eq(&self, other: &Self) -> bool {
        self.commands == other.commands
    }
}

impl From<Vec<PrintCommand>> for PrintJob {
    fn from(commands: Vec<PrintCommand>) -> Self {
        Self::new(commands)
    }
}
