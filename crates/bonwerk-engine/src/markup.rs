// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTML fragments for document-rendering controllers.
//
// Vendors whose SDK prints a web view (rather than accepting ESC/POS) get
// each command as a small styled fragment.  Fragments are plain strings and
// are only ever concatenated, never rewritten.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use bonwerk_core::Bitmap;
use bonwerk_core::error::{BonwerkError, Result};

/// Separator appended after each fragment in batch mode.
pub const LINE_BREAK: &str = "<br/>";

const BASE_STYLE: &str = "body { margin: 0; padding: 0; background: #fff; color: #000; } \
     img { display: block; margin: 0 auto; }";

/// Escape text for inclusion in element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Monospace text block.  Whitespace is preserved so column layouts survive.
pub fn text_fragment(text: &str, font_size: u32) -> String {
    format!(
        "<div style=\"font-family: monospace; font-size: {font_size}px; white-space: pre-wrap;\">{}</div>",
        escape(text)
    )
}

/// Centred monospace line, used for the human-readable value under a barcode.
pub fn centered_text_fragment(text: &str, font_size: u32) -> String {
    format!(
        "<div style=\"font-family: monospace; font-size: {font_size}px; text-align: center;\">{}</div>",
        escape(text)
    )
}

/// Centred image embedded as a PNG data URI.
pub fn image_fragment(bitmap: &Bitmap) -> Result<String> {
    let mut png = Vec::new();
    bitmap
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| BonwerkError::Encoding(format!("png: {e}")))?;
    Ok(format!(
        "<div style=\"text-align: center;\"><img src=\"data:image/png;base64,{}\" width=\"{}\" height=\"{}\"/></div>",
        STANDARD.encode(&png),
        bitmap.width(),
        bitmap.height()
    ))
}

/// Turn accumulated fragments into the document handed to the vendor.
pub fn wrap_document(body: &str, include_style_wrapper: bool) -> String {
    if include_style_wrapper {
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{BASE_STYLE}</style></head><body>{body}</body></html>"
        )
    } else {
        body.to_owned()
    }
}
