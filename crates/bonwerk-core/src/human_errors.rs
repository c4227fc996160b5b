// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable printer status for cashiers.
//
// Every fault kind and print failure is mapped to a short message with a
// concrete next step.  Severity drives how the till UI presents it.

use crate::error::{BonwerkError, PrintError};
use crate::types::{ConnectionErrorKind, ConnectionState};

/// Severity of a problem from the cashier's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Clears by itself or on a plain retry.
    Transient,
    /// Someone has to touch the printer (paper, cover, jam).
    ActionRequired,
    /// Needs service or a replacement device.
    Permanent,
}

/// A plain message with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: &str, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable: severity != Severity::Permanent,
            severity,
        }
    }
}

/// Describe a connection state.  Returns `None` for states that need no
/// attention.
pub fn humanize_state(state: &ConnectionState) -> Option<HumanError> {
    match state {
        ConnectionState::Error(kind) => {
            let mut human = humanize_kind(kind);
            human.retriable = kind.is_recoverable();
            Some(human)
        }
        ConnectionState::CheckingForPrinter
        | ConnectionState::Connected
        | ConnectionState::Preparing
        | ConnectionState::Busy => None,
    }
}

fn humanize_kind(kind: &ConnectionErrorKind) -> HumanError {
    use ConnectionErrorKind as K;
    use Severity::*;

    match kind {
        K::ConnectionLost => HumanError::new(
            "The printer disconnected.",
            "Check the cable or Bluetooth pairing. We'll reconnect when it comes back.",
            Transient,
        ),
        K::NotAvailable => HumanError::new(
            "No printer is available.",
            "Make sure the printer is switched on, then select it again.",
            Transient,
        ),
        K::AbnormalCommunication => HumanError::new(
            "The printer isn't answering properly.",
            "Turn the printer off and on again.",
            Transient,
        ),
        K::OutOfPaper => HumanError::new(
            "The printer is out of paper.",
            "Load a new paper roll, then print again.",
            ActionRequired,
        ),
        K::Overheated => HumanError::new(
            "The print head is too hot.",
            "Wait a minute for it to cool down, then print again.",
            Transient,
        ),
        K::CoverNotClosed => HumanError::new(
            "The printer cover is open.",
            "Close the paper cover until it clicks.",
            ActionRequired,
        ),
        K::PaperCutterAbnormal => HumanError::new(
            "The paper cutter is stuck.",
            "Open the cover, remove any paper near the cutter, and close it again.",
            ActionRequired,
        ),
        K::PaperAbnormal => HumanError::new(
            "The paper is loaded incorrectly.",
            "Reload the roll with the shiny side facing the print head.",
            ActionRequired,
        ),
        K::BlackMarkNotFound => HumanError::new(
            "The label mark can't be found.",
            "Check that label paper is loaded and aligned.",
            ActionRequired,
        ),
        K::FirmwareUpgradeFailed => HumanError::new(
            "The printer update failed.",
            "Contact support to reinstall the printer firmware.",
            Permanent,
        ),
        K::PaperJam => HumanError::new(
            "Paper is jammed in the printer.",
            "Open the cover and gently pull out the stuck paper.",
            ActionRequired,
        ),
        K::VoltageTooLow => HumanError::new(
            "The printer isn't getting enough power.",
            "Charge the terminal or check the power supply.",
            ActionRequired,
        ),
        K::PrintingUnfinished => HumanError::new(
            "The last receipt didn't finish printing.",
            "Wait for the printer to finish, or print the receipt again.",
            Transient,
        ),
        K::Malfunctions => HumanError::new(
            "The printer has a hardware fault.",
            "Contact support; the printer may need service.",
            Permanent,
        ),
        K::Unknown => HumanError::new(
            "The printer reported a problem.",
            "Turn the printer off and on again. If it keeps happening, contact support.",
            Transient,
        ),
        K::Vendor { vendor, code } => HumanError {
            message: format!("The {vendor} printer reported a problem."),
            suggestion: format!(
                "Turn the printer off and on again. If it keeps happening, contact support (code {code})."
            ),
            retriable: true,
            severity: Transient,
        },
    }
}

/// Describe a failed print operation.
pub fn humanize_print_error(err: &PrintError) -> HumanError {
    match err {
        PrintError::PrinterNotConnected => HumanError::new(
            "No printer is connected.",
            "Choose a printer in the settings, then print again.",
            Severity::ActionRequired,
        ),
        PrintError::WithException(BonwerkError::PlatformUnavailable) => HumanError::new(
            "This printer can't do that.",
            "The selected printer doesn't support this kind of output.",
            Severity::Permanent,
        ),
        PrintError::WithException(BonwerkError::Encoding(_)) => HumanError::new(
            "Part of the receipt couldn't be prepared.",
            "Check the logo or barcode content and try again.",
            Severity::Permanent,
        ),
        PrintError::WithException(_) => HumanError::new(
            "The receipt didn't print.",
            "Check the printer, then print the receipt again.",
            Severity::Transient,
        ),
    }
}
