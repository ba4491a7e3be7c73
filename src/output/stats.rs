//! Scan outcome counters
//!
//! Workers update a shared [`ScanStats`]; the scheduler turns it into a
//! [`ScanSummary`] once every worker has finished.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Countable scan events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    Probe,
    AccessDenied,
    MissingKey,
    NoSuchBucket,
    RedirectFollowed,
    RedirectLimitHit,
    ProviderError,
    Unrecognized,
    TransportError,
    ObjectPublic,
    ObjectPrivate,
    ObjectDownloaded,
    ObjectNotSaved,
}

/// Thread-safe counters shared by all workers
#[derive(Debug, Default)]
pub struct ScanStats {
    probes: AtomicU64,
    access_denied: AtomicU64,
    missing_key: AtomicU64,
    no_such_bucket: AtomicU64,
    redirects_followed: AtomicU64,
    redirect_limit_hits: AtomicU64,
    provider_errors: AtomicU64,
    unrecognized: AtomicU64,
    transport_errors: AtomicU64,
    objects_public: AtomicU64,
    objects_private: AtomicU64,
    objects_downloaded: AtomicU64,
    objects_not_saved: AtomicU64,
    found_buckets: Mutex<BTreeSet<String>>,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter for `event`
    pub fn record(&self, event: ScanEvent) {
        let counter = match event {
            ScanEvent::Probe => &self.probes,
            ScanEvent::AccessDenied => &self.access_denied,
            ScanEvent::MissingKey => &self.missing_key,
            ScanEvent::NoSuchBucket => &self.no_such_bucket,
            ScanEvent::RedirectFollowed => &self.redirects_followed,
            ScanEvent::RedirectLimitHit => &self.redirect_limit_hits,
            ScanEvent::ProviderError => &self.provider_errors,
            ScanEvent::Unrecognized => &self.unrecognized,
            ScanEvent::TransportError => &self.transport_errors,
            ScanEvent::ObjectPublic => &self.objects_public,
            ScanEvent::ObjectPrivate => &self.objects_private,
            ScanEvent::ObjectDownloaded => &self.objects_downloaded,
            ScanEvent::ObjectNotSaved => &self.objects_not_saved,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a listable bucket
    pub fn record_found(&self, bucket: &str) {
        self.found_buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(bucket.to_string());
    }

    /// Produces an immutable summary
    pub fn summary(&self, candidates: usize, elapsed: Duration) -> ScanSummary {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        ScanSummary {
            candidates,
            probes: load(&self.probes),
            found_buckets: self
                .found_buckets
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            access_denied: load(&self.access_denied),
            missing_key: load(&self.missing_key),
            no_such_bucket: load(&self.no_such_bucket),
            redirects_followed: load(&self.redirects_followed),
            redirect_limit_hits: load(&self.redirect_limit_hits),
            provider_errors: load(&self.provider_errors),
            unrecognized: load(&self.unrecognized),
            transport_errors: load(&self.transport_errors),
            objects_public: load(&self.objects_public),
            objects_private: load(&self.objects_private),
            objects_downloaded: load(&self.objects_downloaded),
            objects_not_saved: load(&self.objects_not_saved),
            elapsed,
        }
    }
}

/// Final statistics of a completed scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub candidates: usize,
    pub probes: u64,
    /// Names of every listable bucket
    pub found_buckets: BTreeSet<String>,
    pub access_denied: u64,
    pub missing_key: u64,
    pub no_such_bucket: u64,
    pub redirects_followed: u64,
    pub redirect_limit_hits: u64,
    pub provider_errors: u64,
    pub unrecognized: u64,
    pub transport_errors: u64,
    pub objects_public: u64,
    pub objects_private: u64,
    pub objects_downloaded: u64,
    pub objects_not_saved: u64,
    pub elapsed: Duration,
}

/// Prints a summary to stdout
pub fn print_summary(summary: &ScanSummary) {
    println!("\n=== Scan Summary ===");
    println!("  Candidates:          {}", summary.candidates);
    println!("  Probes sent:         {}", summary.probes);
    println!("  Buckets found:       {}", summary.found_buckets.len());
    println!("  Access denied:       {}", summary.access_denied);
    println!("  Redirects followed:  {}", summary.redirects_followed);
    if summary.redirect_limit_hits > 0 {
        println!("  Redirect limit hits: {}", summary.redirect_limit_hits);
    }
    println!("  Provider errors:     {}", summary.provider_errors);
    println!("  Transport errors:    {}", summary.transport_errors);
    println!(
        "  Objects:             {} public, {} private, {} downloaded, {} not saved",
        summary.objects_public,
        summary.objects_private,
        summary.objects_downloaded,
        summary.objects_not_saved
    );
    println!("  Elapsed:             {:.1?}", summary.elapsed);

    for bucket in &summary.found_buckets {
        println!("    * {}", bucket);
    }
}
