// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job orchestration.
//
// A job runs as a straight line: validate settings, then inside one safe
// invocation set intensity and font, dispatch every command in order, and
// flush.  The first failure ends the job and drops whatever the
// controller buffered for it; there is no retry.  Classifying the printer's
// state after a failure is left to the controller.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, trace, warn};

use bonwerk_bridge::traits::AnalyticsSink;
use bonwerk_core::error::{PrintError, PrintResult, Result};
use bonwerk_core::types::{JobId, PrinterInfo, PrinterSettings, PrintingIntensity};
use bonwerk_core::{PrintCommand, PrintJob};

use crate::service::{ControllerLease, PrintService};

/// Where a job is in its run.  `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Validating,
    Executing,
    Flushing,
    Done,
    Failed,
}

fn advance(job: JobId, phase: &mut JobPhase, next: JobPhase) {
    debug!(job_id = %job, from = ?*phase, to = ?next, "job phase");
    *phase = next;
}

pub struct JobOrchestrator {
    service: Arc<PrintService>,
    settings: RwLock<PrinterSettings>,
    analytics: Arc<dyn AnalyticsSink>,
    /// Jobs for one session never interleave.
    running: Mutex<()>,
}

impl JobOrchestrator {
    pub fn new(
        service: Arc<PrintService>,
        settings: PrinterSettings,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            service,
            settings: RwLock::new(settings),
            analytics,
            running: Mutex::new(()),
        }
    }

    pub async fn settings(&self) -> PrinterSettings {
        self.settings.read().await.clone()
    }

    /// Applies to the next job; a job already running keeps the settings it
    /// started with.
    pub async fn set_settings(&self, settings: PrinterSettings) {
        *self.settings.write().await = settings;
    }

    /// Execute `job` against the bound controller.
    ///
    /// Disabled printing and empty jobs succeed without any controller call.
    #[instrument(skip(self, job), fields(job_id = %job.id(), commands = job.commands().len()))]
    pub async fn start_print_job(&self, job: &PrintJob) -> PrintResult<()> {
        let _running = self.running.lock().await;
        let mut phase = JobPhase::Idle;

        advance(job.id(), &mut phase, JobPhase::Validating);
        let settings = self.settings().await;
        if !settings.enabled || job.is_empty() {
            debug!(enabled = settings.enabled, empty = job.is_empty(), "job skipped");
            advance(job.id(), &mut phase, JobPhase::Done);
            return Ok(());
        }

        let intensity = settings.printing_intensity;
        let outcome = self
            .service
            .with_controller(|lease| execute(lease, job, intensity, &mut phase))
            .await;

        match outcome {
            Ok(()) => {
                advance(job.id(), &mut phase, JobPhase::Done);
                info!("print job completed");
                self.analytics.log_print_receipt(job.description());
                Ok(())
            }
            Err(e) => {
                let failed_in = phase;
                advance(job.id(), &mut phase, JobPhase::Failed);
                warn!(error = %e, phase = ?failed_in, "print job failed");
                if !matches!(e, PrintError::PrinterNotConnected) {
                    self.discard_pending().await;
                }
                self.analytics
                    .log_error_print_receipt(&format!("{failed_in:?}: {e}"));
                Err(e)
            }
        }
    }

    /// Keep a failed job's buffered output out of the next receipt.
    async fn discard_pending(&self) {
        self.service
            .with_controller_or((), |lease| async move {
                lease.discard().await;
                Ok(())
            })
            .await;
    }

    pub async fn printer_info(&self) -> PrintResult<PrinterInfo> {
        self.service
            .with_controller(|lease| async move { lease.printer_info().await })
            .await
    }
}

async fn execute(
    lease: ControllerLease,
    job: &PrintJob,
    intensity: PrintingIntensity,
    phase: &mut JobPhase,
) -> Result<()> {
    advance(job.id(), phase, JobPhase::Executing);

    lease.ensure_current()?;
    lease.set_intensity(intensity).await?;
    lease.ensure_current()?;
    let font = lease.printer_info().await?.font_type;
    lease.ensure_current()?;
    lease.set_font_size(font).await?;

    for (index, command) in job.commands().iter().enumerate() {
        lease.ensure_current()?;
        trace!(index, kind = command.kind(), "dispatching command");
        dispatch(&lease, command).await?;
    }

    advance(job.id(), phase, JobPhase::Flushing);
    lease.ensure_current()?;
    lease.start().await
}

async fn dispatch(lease: &ControllerLease, command: &PrintCommand) -> Result<()> {
    match command {
        PrintCommand::Text(text) => lease.print_text(text).await,
        PrintCommand::Image(bitmap) => lease.print_image(bitmap).await,
        PrintCommand::Barcode(value) => lease.print_barcode(value).await,
        PrintCommand::QrCode(value) => lease.print_qr(value).await,
        PrintCommand::RawData(bytes) => lease.send_raw_data(bytes).await,
        PrintCommand::FeedPaper => lease.feed_paper().await,
        PrintCommand::CutPaper => lease.cut_paper().await,
    }
}
