// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BonwerkError, Result};
use crate::types::PrinterSettings;

/// Top-level configuration read at startup.  Every field has a default so a
/// partial (or empty) JSON object is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Construction parameters for document-rendering controllers.
    pub document: DocumentConfig,
    /// Settings each new printer session starts with.
    pub settings: PrinterSettings,
    pub discovery: DiscoveryConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    fn validate(&self) -> Result<()> {
        let doc = &self.document;
        if doc.barcode_width == 0 || doc.barcode_height == 0 {
            return Err(BonwerkError::Config(
                "barcode dimensions must be non-zero".into(),
            ));
        }
        if doc.qr_code_size == 0 {
            return Err(BonwerkError::Config("qr_code_size must be non-zero".into()));
        }
        if doc.font_size == 0 {
            return Err(BonwerkError::Config("font_size must be non-zero".into()));
        }
        Ok(())
    }
}

/// How a document controller renders and when it hands output to the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Accumulate fragments until `start()` instead of sending each one.
    pub batch_mode: bool,
    /// Barcode raster size in pixels.
    pub barcode_width: u32,
    pub barcode_height: u32,
    /// QR codes are square.
    pub qr_code_size: u32,
    /// Text size in CSS pixels.
    pub font_size: u32,
    /// Wrap assembled output in an `<html>` document with the base style.
    pub include_style_wrapper: bool,
    /// Markup emitted for a paper feed.
    pub feed_markup: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            batch_mode: true,
            barcode_width: 384,
            barcode_height: 120,
            qr_code_size: 256,
            font_size: 24,
            include_style_wrapper: true,
            feed_markup: "<br/><br/><br/>".to_owned(),
        }
    }
}

/// When the merged discovery stream reports `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishPolicy {
    /// Every source's `Finished` is re-emitted with the merged list.
    #[default]
    PerSource,
    /// `Finished` is held back until every source has finished, failed, or
    /// ended; earlier completions surface as `Discovering`.
    AllSources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub finish_policy: FinishPolicy,
    /// How long each discovery collaborator should scan before finishing.
    pub scan_timeout_secs: u64,
}

impl DiscoveryConfig {
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            finish_policy: FinishPolicy::PerSource,
            scan_timeout_secs: 10,
        }
    }
}
