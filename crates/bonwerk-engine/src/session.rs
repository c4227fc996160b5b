// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-owned printer session.
//
// Bundles the print service, the job orchestrator, and discovery behind one
// object built from explicit dependencies.  There is no process-wide
// instance; "one active printer" holds per `PrinterSession`.

use std::sync::Arc;

use futures::stream::BoxStream;
use tokio::sync::watch;
use tracing::info;

use bonwerk_bridge::registry::FactoryRegistry;
use bonwerk_bridge::traits::{AnalyticsSink, DiscoverySource, ScanConfig};
use bonwerk_core::config::EngineConfig;
use bonwerk_core::error::{PrintResult, Result};
use bonwerk_core::types::{
    ConnectionDescriptor, ConnectionState, DiscoveryState, ExternalPrinter, PrinterInfo,
    PrinterSettings,
};
use bonwerk_core::PrintJob;

use crate::discovery::DiscoveryAggregator;
use crate::orchestrator::JobOrchestrator;
use crate::service::PrintService;

pub struct PrinterSession {
    service: Arc<PrintService>,
    jobs: JobOrchestrator,
    discovery: DiscoveryAggregator,
}

impl PrinterSession {
    pub fn new(
        registry: FactoryRegistry,
        settings: PrinterSettings,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self::from_config(
            registry,
            &EngineConfig {
                settings,
                ..EngineConfig::default()
            },
            analytics,
        )
    }

    pub fn from_config(
        registry: FactoryRegistry,
        config: &EngineConfig,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        info!(
            manufacturers = ?registry.manufacturers(),
            enabled = config.settings.enabled,
            "printer session created"
        );
        let service = Arc::new(PrintService::new(registry));
        let jobs = JobOrchestrator::new(Arc::clone(&service), config.settings.clone(), analytics);
        Self {
            service,
            jobs,
            discovery: DiscoveryAggregator::from_config(&config.discovery),
        }
    }

    pub fn add_discovery_source(&mut self, source: Arc<dyn DiscoverySource>) {
        self.discovery.add_source(source);
    }

    pub async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<()> {
        self.service.connect(descriptor).await
    }

    /// Connect to a printer found by discovery.
    pub async fn connect_to(&self, printer: &ExternalPrinter) -> Result<()> {
        self.service.connect(&ConnectionDescriptor::from(printer)).await
    }

    pub async fn disconnect(&self) {
        self.service.disconnect().await;
    }

    pub async fn is_connected(&self) -> bool {
        self.service.is_connected().await
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.service.connection_state()
    }

    pub fn current_state(&self) -> ConnectionState {
        self.service.current_state()
    }

    pub async fn start_print_job(&self, job: &PrintJob) -> PrintResult<()> {
        self.jobs.start_print_job(job).await
    }

    pub async fn printer_info(&self) -> PrintResult<PrinterInfo> {
        self.jobs.printer_info().await
    }

    /// Printer info, or defaults when no printer answers.
    pub async fn printer_info_or_default(&self) -> PrinterInfo {
        self.service
            .with_controller_or(PrinterInfo::default(), |lease| async move {
                lease.printer_info().await
            })
            .await
    }

    pub async fn settings(&self) -> PrinterSettings {
        self.jobs.settings().await
    }

    pub async fn set_settings(&self, settings: PrinterSettings) {
        self.jobs.set_settings(settings).await;
    }

    /// Scan with the configured timeout on every transport.
    pub fn discover_printers(&self) -> BoxStream<'static, DiscoveryState> {
        self.discovery.discover(&self.discovery.scan_config())
    }

    pub fn discover_with(&self, config: &ScanConfig) -> BoxStream<'static, DiscoveryState> {
        self.discovery.discover(config)
    }

    pub fn service(&self) -> &Arc<PrintService> {
        &self.service
    }
}
