// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-source printer discovery.
//
// Each discovery source (one per transport or vendor SDK) produces its own
// `DiscoveryState` stream.  The aggregator polls them all concurrently and
// folds their printer lists into one map keyed by connection address, so a
// printer reported by two sources appears once, as whichever source
// reported it last.  `Idle` and `Error` are forwarded as they arrive; one
// failing source never ends the merged stream.
//
// Dropping the merged stream drops every source stream, which is how
// sources learn to stop scanning.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, warn};

use bonwerk_bridge::traits::{DiscoverySource, ScanConfig};
use bonwerk_core::config::{DiscoveryConfig, FinishPolicy};
use bonwerk_core::types::{DiscoveryState, ExternalPrinter};

/// Merge `sources` into one stream of deduplicated discovery states.
///
/// The merged stream ends once every source stream has ended.
pub fn merge_discovery(
    sources: Vec<BoxStream<'static, DiscoveryState>>,
    policy: FinishPolicy,
) -> BoxStream<'static, DiscoveryState> {
    let total = sources.len();
    // `None` marks the end of a source so completion can be tracked.
    let tagged = sources.into_iter().enumerate().map(|(idx, source)| {
        source
            .map(move |state| (idx, Some(state)))
            .chain(stream::once(async move { (idx, None) }))
            .boxed()
    });
    let mut events = stream::select_all(tagged);

    Box::pin(stream! {
        let mut found: BTreeMap<String, ExternalPrinter> = BTreeMap::new();
        let mut done = vec![false; total];
        let mut finish_sent = false;

        while let Some((idx, event)) = events.next().await {
            let Some(state) = event else {
                debug!(source = idx, "discovery source ended");
                done[idx] = true;
                if policy == FinishPolicy::AllSources && !finish_sent && done.iter().all(|d| *d) {
                    finish_sent = true;
                    yield DiscoveryState::Finished(found.values().cloned().collect());
                }
                continue;
            };

            match state {
                DiscoveryState::Idle => {
                    yield DiscoveryState::Idle;
                }
                DiscoveryState::Error(message) => {
                    warn!(source = idx, error = %message, "discovery source failed");
                    yield DiscoveryState::Error(message);
                    done[idx] = true;
                    if policy == FinishPolicy::AllSources && !finish_sent && done.iter().all(|d| *d) {
                        finish_sent = true;
                        yield DiscoveryState::Finished(found.values().cloned().collect());
                    }
                }
                DiscoveryState::Discovering(list) => {
                    absorb(&mut found, list);
                    debug!(source = idx, printers = found.len(), "discovery merged");
                    yield DiscoveryState::Discovering(found.values().cloned().collect());
                }
                DiscoveryState::Finished(list) => {
                    absorb(&mut found, list);
                    done[idx] = true;
                    let printers: Vec<_> = found.values().cloned().collect();
                    match policy {
                        FinishPolicy::PerSource => {
                            info!(source = idx, printers = printers.len(), "discovery source finished");
                            yield DiscoveryState::Finished(printers);
                        }
                        FinishPolicy::AllSources if !finish_sent && done.iter().all(|d| *d) => {
                            finish_sent = true;
                            info!(printers = printers.len(), "all discovery sources finished");
                            yield DiscoveryState::Finished(printers);
                        }
                        FinishPolicy::AllSources => {
                            debug!(source = idx, "discovery source finished, waiting for others");
                            yield DiscoveryState::Discovering(printers);
                        }
                    }
                }
            }
        }
    })
}

/// Last write for an address wins, whichever source wrote it.
fn absorb(found: &mut BTreeMap<String, ExternalPrinter>, list: Vec<ExternalPrinter>) {
    for printer in list {
        found.insert(printer.connection_address.clone(), printer);
    }
}

/// Runs discovery across a set of sources.
pub struct DiscoveryAggregator {
    sources: Vec<Arc<dyn DiscoverySource>>,
    policy: FinishPolicy,
    scan_timeout: Duration,
}

impl DiscoveryAggregator {
    pub fn new(policy: FinishPolicy) -> Self {
        Self {
            sources: Vec::new(),
            policy,
            scan_timeout: ScanConfig::default().timeout,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            sources: Vec::new(),
            policy: config.finish_policy,
            scan_timeout: config.scan_timeout(),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DiscoverySource>) -> Self {
        self.add_source(source);
        self
    }

    pub fn add_source(&mut self, source: Arc<dyn DiscoverySource>) {
        self.sources.push(source);
    }

    pub fn policy(&self) -> FinishPolicy {
        self.policy
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Scan parameters from configuration, every transport included.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            timeout: self.scan_timeout,
            connection_types: Vec::new(),
        }
    }

    /// Start every source with `config` and merge their results.
    pub fn discover(&self, config: &ScanConfig) -> BoxStream<'static, DiscoveryState> {
        info!(
            sources = ?self.source_names(),
            policy = ?self.policy,
            timeout_secs = config.timeout.as_secs(),
            "starting printer discovery"
        );
        let streams = self.sources.iter().map(|s| s.discover(config)).collect();
        merge_discovery(streams, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::printer;
    use futures::channel::mpsc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    type Feed = mpsc::UnboundedSender<DiscoveryState>;

    fn sources(n: usize) -> (Vec<Feed>, Vec<BoxStream<'static, DiscoveryState>>) {
        (0..n)
            .map(|_| {
                let (tx, rx) = mpsc::unbounded();
                (tx, rx.boxed())
            })
            .unzip()
    }

    fn models(state: &DiscoveryState) -> Vec<(String, String)> {
        state
            .printers()
            .iter()
            .map(|p| (p.connection_address.clone(), p.info.device_model.clone()))
            .collect()
    }

    fn pair(address: &str, model: &str) -> (String, String) {
        (address.to_owned(), model.to_owned())
    }

    #[tokio::test]
    async fn same_address_is_last_write_wins() {
        let (feeds, streams) = sources(2);
        let mut merged = merge_discovery(streams, FinishPolicy::PerSource);

        feeds[0]
            .unbounded_send(DiscoveryState::Discovering(vec![printer("X", "from-a")]))
            .unwrap();
        let first = merged.next().await.unwrap();
        assert_eq!(models(&first), vec![pair("X", "from-a")]);

        feeds[1]
            .unbounded_send(DiscoveryState::Discovering(vec![
                printer("X", "from-b"),
                printer("Y", "other"),
            ]))
            .unwrap();
        let second = merged.next().await.unwrap();
        assert!(matches!(second, DiscoveryState::Discovering(_)));
        assert_eq!(models(&second), vec![pair("X", "from-b"), pair("Y", "other")]);
    }

    #[tokio::test]
    async fn error_is_forwarded_without_ending_stream() {
        let (feeds, streams) = sources(2);
        let mut merged = merge_discovery(streams, FinishPolicy::PerSource);

        feeds[0]
            .unbounded_send(DiscoveryState::Error("bluetooth off".into()))
            .unwrap();
        assert_eq!(
            merged.next().await.unwrap(),
            DiscoveryState::Error("bluetooth off".into())
        );

        feeds[1]
            .unbounded_send(DiscoveryState::Discovering(vec![printer("Y", "m")]))
            .unwrap();
        assert_eq!(models(&merged.next().await.unwrap()), vec![pair("Y", "m")]);
    }

    #[tokio::test]
    async fn idle_passes_through() {
        let (feeds, streams) = sources(1);
        let mut merged = merge_discovery(streams, FinishPolicy::PerSource);
        feeds[0].unbounded_send(DiscoveryState::Idle).unwrap();
        assert_eq!(merged.next().await.unwrap(), DiscoveryState::Idle);
    }

    #[tokio::test]
    async fn per_source_finish_carries_accumulator() {
        let (feeds, streams) = sources(2);
        let mut merged = merge_discovery(streams, FinishPolicy::PerSource);

        feeds[0]
            .unbounded_send(DiscoveryState::Finished(vec![printer("X", "a")]))
            .unwrap();
        let first = merged.next().await.unwrap();
        assert!(matches!(first, DiscoveryState::Finished(_)));
        assert_eq!(models(&first), vec![pair("X", "a")]);

        feeds[1]
            .unbounded_send(DiscoveryState::Finished(vec![printer("Y", "b")]))
            .unwrap();
        let second = merged.next().await.unwrap();
        assert!(matches!(second, DiscoveryState::Finished(_)));
        assert_eq!(second.printers().len(), 2);
    }

    #[tokio::test]
    async fn all_sources_waits_for_every_finish() {
        let (feeds, streams) = sources(2);
        let mut merged = merge_discovery(streams, FinishPolicy::AllSources);

        feeds[0]
            .unbounded_send(DiscoveryState::Finished(vec![printer("X", "a")]))
            .unwrap();
        assert!(matches!(
            merged.next().await.unwrap(),
            DiscoveryState::Discovering(_)
        ));

        feeds[1]
            .unbounded_send(DiscoveryState::Finished(vec![printer("Y", "b")]))
            .unwrap();
        let last = merged.next().await.unwrap();
        assert!(matches!(last, DiscoveryState::Finished(_)));
        assert_eq!(models(&last), vec![pair("X", "a"), pair("Y", "b")]);
    }

    #[tokio::test]
    async fn all_sources_counts_errors_and_ended_streams() {
        let (mut feeds, streams) = sources(3);
        let mut merged = merge_discovery(streams, FinishPolicy::AllSources);

        feeds[0]
            .unbounded_send(DiscoveryState::Finished(vec![printer("X", "a")]))
            .unwrap();
        assert!(matches!(
            merged.next().await.unwrap(),
            DiscoveryState::Discovering(_)
        ));

        drop(feeds.remove(2));
        feeds[1]
            .unbounded_send(DiscoveryState::Error("usb denied".into()))
            .unwrap();
        assert_eq!(
            merged.next().await.unwrap(),
            DiscoveryState::Error("usb denied".into())
        );
        let finished = merged.next().await.unwrap();
        assert_eq!(models(&finished), vec![pair("X", "a")]);
        assert!(matches!(finished, DiscoveryState::Finished(_)));

        drop(feeds);
        assert!(merged.next().await.is_none());
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn never_ending(flag: Arc<AtomicBool>) -> BoxStream<'static, DiscoveryState> {
        let guard = DropFlag(flag);
        Box::pin(stream! {
            let _guard = guard;
            yield DiscoveryState::Discovering(vec![printer("X", "a")]);
            futures::future::pending::<()>().await;
        })
    }

    #[tokio::test]
    async fn dropping_merged_stream_releases_sources() {
        let released = Arc::new(AtomicBool::new(false));
        let other = Arc::new(AtomicBool::new(false));
        let mut merged = merge_discovery(
            vec![never_ending(released.clone()), never_ending(other.clone())],
            FinishPolicy::PerSource,
        );

        assert!(merged.next().await.is_some());
        assert!(!released.load(Ordering::SeqCst));

        drop(merged);
        assert!(released.load(Ordering::SeqCst));
        assert!(other.load(Ordering::SeqCst));
    }

    struct StaticSource {
        name: &'static str,
        states: Vec<DiscoveryState>,
        seen: Mutex<Option<ScanConfig>>,
    }

    impl DiscoverySource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        fn discover(&self, config: &ScanConfig) -> BoxStream<'static, DiscoveryState> {
            *self.seen.lock().unwrap() = Some(config.clone());
            stream::iter(self.states.clone()).boxed()
        }
    }

    #[tokio::test]
    async fn aggregator_runs_every_source() {
        let bluetooth = Arc::new(StaticSource {
            name: "bluetooth",
            states: vec![
                DiscoveryState::Discovering(vec![printer("AA:BB", "m1")]),
                DiscoveryState::Finished(vec![printer("AA:BB", "m1")]),
            ],
            seen: Mutex::new(None),
        });
        let lan = Arc::new(StaticSource {
            name: "lan",
            states: vec![DiscoveryState::Finished(vec![printer("10.0.0.7", "m2")])],
            seen: Mutex::new(None),
        });

        let aggregator = DiscoveryAggregator::from_config(&DiscoveryConfig {
            finish_policy: FinishPolicy::AllSources,
            scan_timeout_secs: 3,
        })
        .with_source(bluetooth.clone())
        .with_source(lan.clone());
        assert_eq!(aggregator.source_names(), vec!["bluetooth", "lan"]);

        let scan = aggregator.scan_config();
        let states: Vec<_> = aggregator.discover(&scan).collect().await;

        let finishes: Vec<_> = states
            .iter()
            .filter(|s| matches!(s, DiscoveryState::Finished(_)))
            .collect();
        assert_eq!(finishes.len(), 1);
        assert_eq!(states.last().unwrap().printers().len(), 2);
        assert_eq!(
            lan.seen.lock().unwrap().as_ref().unwrap().timeout,
            Duration::from_secs(3)
        );
    }

    #[tokio::test]
    async fn no_sources_yields_nothing() {
        let aggregator = DiscoveryAggregator::new(FinishPolicy::PerSource);
        let states: Vec<_> = aggregator
            .discover(&ScanConfig::default())
            .collect()
            .await;
        assert!(states.is_empty());
    }
}
