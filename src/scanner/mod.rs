//! Worker pool scheduler
//!
//! All candidates are loaded into one FIFO queue which is closed before any
//! worker starts. A fixed number of tokio tasks drain it; each sleeps for the
//! per-probe delay and then hands the candidate to the [`Walker`]. [`Scanner::run`]
//! returns once every task has finished.

use crate::candidates::{generate, load_wordlist, CandidateSource};
use crate::config::{resolve_base_url, ScanConfig};
use crate::output::{LogSink, ScanStats, ScanSummary};
use crate::probe::{HttpProbeClient, ProbeClient};
use crate::walker::{WalkSettings, Walker};
use crate::{FinderError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};

/// Fixed-size pool of probing workers
pub struct Scanner {
    config: ScanConfig,
    base_url: String,
    client: Arc<dyn ProbeClient>,
    sink: Arc<dyn LogSink>,
}

impl Scanner {
    /// Creates a scanner with a reqwest-backed probe client
    ///
    /// # Returns
    ///
    /// * `Ok(Scanner)` - Ready to run
    /// * `Err(FinderError)` - The endpoint could not be resolved or the HTTP
    ///   client could not be built
    pub fn new(config: ScanConfig, sink: Arc<dyn LogSink>) -> Result<Self> {
        let client = HttpProbeClient::new(&config.user_agent, config.timeout)?;
        Self::with_client(config, Arc::new(client), sink)
    }

    /// Creates a scanner that probes through `client`
    pub fn with_client(
        config: ScanConfig,
        client: Arc<dyn ProbeClient>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let base_url = resolve_base_url(&config)?;
        Ok(Self {
            config,
            base_url,
            client,
            sink,
        })
    }

    /// Base URL every candidate is first probed against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Expands the configured candidate source into bucket names
    ///
    /// Writes the run banner line to the sink.
    pub fn build_candidates(&self) -> Result<Vec<String>> {
        match &self.config.source {
            CandidateSource::Keywords(seeds) => {
                let names: Vec<String> = generate(seeds).into_iter().collect();
                self.sink.write_line(&format!(
                    "Generated {} bucket name permutations from keyword(s): {}",
                    names.len(),
                    seeds.join(", ")
                ));
                Ok(names)
            }
            CandidateSource::Wordlist(path) => {
                let names = load_wordlist(path)?;
                self.sink.write_line(&format!(
                    "Loaded {} bucket names from wordlist",
                    names.len()
                ));
                Ok(names)
            }
        }
    }

    /// Probes every candidate and waits for all workers to finish
    ///
    /// There is no partial cancellation: the call returns only after the
    /// queue has been drained.
    pub async fn run(&self, candidates: Vec<String>) -> Result<ScanSummary> {
        let total = candidates.len();
        let workers = self.config.workers.max(1).min(total.max(1));
        let delay = self.config.probe_delay();
        let verbose = self.config.verbose;
        let start = Instant::now();

        tracing::info!(
            candidates = total,
            workers,
            delay_ms = delay.as_millis() as u64,
            base_url = %self.base_url,
            "starting scan"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        for name in candidates {
            // The receiver is alive until the end of this function
            let _ = tx.send(name);
        }
        drop(tx);
        let queue = Arc::new(Mutex::new(rx));

        let stats = Arc::new(ScanStats::new());
        let walker = Arc::new(Walker::new(
            Arc::clone(&self.client),
            Arc::clone(&self.sink),
            Arc::clone(&stats),
            WalkSettings::from(&self.config),
        ));

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let walker = Arc::clone(&walker);
            let sink = Arc::clone(&self.sink);
            let base_url = self.base_url.clone();

            let handle = tokio::spawn(async move {
                loop {
                    // Lock only for the dequeue so other workers are not held up
                    let next = queue.lock().await.recv().await;
                    let Some(bucket) = next else {
                        break;
                    };

                    tokio::time::sleep(delay).await;

                    if verbose {
                        sink.write_line(&format!(
                            "[Worker {}] Checking bucket: {}",
                            worker, bucket
                        ));
                    }

                    walker.walk(&base_url, &bucket, worker).await;
                }
                tracing::debug!(worker, "queue drained, worker exiting");
            });
            handles.push(handle);
        }

        let mut failure = None;
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Worker task failed: {}", e);
                failure.get_or_insert_with(|| e.to_string());
            }
        }

        if let Some(message) = failure {
            return Err(FinderError::Worker(message));
        }

        let summary = stats.summary(total, start.elapsed());
        tracing::info!(
            probes = summary.probes,
            found = summary.found_buckets.len(),
            "scan complete in {:.1?}",
            summary.elapsed
        );
        Ok(summary)
    }
}

/// Runs a complete scan: builds candidates, probes them and returns the summary
///
/// This is the single entry point used by the command-line tool.
pub async fn run_scan(config: ScanConfig, sink: Arc<dyn LogSink>) -> Result<ScanSummary> {
    let scanner = Scanner::new(config, sink)?;
    let candidates = scanner.build_candidates()?;
    scanner.run(candidates).await
}
