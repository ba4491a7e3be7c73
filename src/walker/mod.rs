//! Bucket walker
//!
//! Probes one candidate, applies the outcome policy to the classified
//! response and, for listable buckets, checks or downloads every object.
//! Cross-region redirects are followed against the new endpoint with the
//! same bucket name, up to a fixed depth.

mod download;

pub use download::{check_readable, download_object, local_path, ObjectOutcome};

use crate::classify::{classify, Classification, ObjectEntry, ProviderErrorCode};
use crate::config::ScanConfig;
use crate::output::{LogSink, ScanEvent, ScanStats};
use crate::probe::{ProbeClient, ProbeMethod};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Walker behaviour switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSettings {
    /// Download readable objects instead of only checking them
    pub download: bool,
    /// Emit worker prefixes and negative outcomes
    pub verbose: bool,
    /// Root directory for downloaded objects
    pub output_dir: PathBuf,
    /// Maximum number of redirects followed per candidate
    pub max_redirect_depth: u32,
}

impl From<&ScanConfig> for WalkSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            download: config.download,
            verbose: config.verbose,
            output_dir: config.output_dir.clone(),
            max_redirect_depth: config.max_redirect_depth,
        }
    }
}

/// Where the walker currently is for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkContext {
    /// Base URL of the endpoint being probed (scheme and host)
    pub host: String,
    pub bucket: String,
    /// Number of redirects followed so far
    pub depth: u32,
    pub worker: usize,
}

impl WalkContext {
    /// Returns true if the current host addresses the bucket virtual-host style
    ///
    /// Only hosts reached through a redirect are read this way. The
    /// configured endpoint is always addressed path-style, whatever its name.
    pub fn virtual_host(&self) -> bool {
        self.depth > 0 && host_encodes_bucket(&self.host, &self.bucket)
    }
}

/// What to do after a provider error
enum NextStep {
    Stop,
    Follow(String),
}

/// Probes candidates and reports findings
pub struct Walker {
    client: Arc<dyn ProbeClient>,
    sink: Arc<dyn LogSink>,
    stats: Arc<ScanStats>,
    settings: WalkSettings,
}

impl Walker {
    pub fn new(
        client: Arc<dyn ProbeClient>,
        sink: Arc<dyn LogSink>,
        stats: Arc<ScanStats>,
        settings: WalkSettings,
    ) -> Self {
        Self {
            client,
            sink,
            stats,
            settings,
        }
    }

    /// Walks one candidate starting at `host`
    ///
    /// Transport errors abandon the candidate; they are never retried.
    pub async fn walk(&self, host: &str, bucket: &str, worker: usize) {
        let mut ctx = WalkContext {
            host: host.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            depth: 0,
            worker,
        };

        loop {
            let url = listing_url(&ctx.host, &ctx.bucket, ctx.virtual_host());
            self.stats.record(ScanEvent::Probe);
            tracing::debug!(worker, bucket, depth = ctx.depth, %url, "probing bucket");

            let response = match self.client.fetch(&url, ProbeMethod::Get).await {
                Ok(response) => response,
                Err(e) => {
                    self.stats.record(ScanEvent::TransportError);
                    tracing::debug!(worker, bucket, "transport error: {}", e);
                    if ctx.depth > 0 {
                        self.emit(&ctx, ctx.depth, &format!("Error following redirect: {}", e));
                    } else if self.settings.verbose {
                        self.emit(
                            &ctx,
                            ctx.depth,
                            &format!("Error requesting page for {}: {}", ctx.bucket, e),
                        );
                    }
                    return;
                }
            };

            if response.body.is_empty() {
                return;
            }

            match classify(&response.body) {
                Classification::Listing { objects, .. } => {
                    self.report_listing(&ctx, &url, &objects).await;
                    return;
                }
                Classification::ProviderError {
                    code,
                    message,
                    endpoint,
                } => match self.apply_error_policy(&ctx, &code, &message, endpoint.as_deref()) {
                    NextStep::Stop => return,
                    NextStep::Follow(next_host) => {
                        ctx.host = next_host;
                        ctx.depth += 1;
                    }
                },
                Classification::Unrecognized => {
                    self.stats.record(ScanEvent::Unrecognized);
                    if self.settings.verbose {
                        self.emit(&ctx, ctx.depth, "No valid data returned");
                    }
                    return;
                }
            }
        }
    }

    async fn report_listing(&self, ctx: &WalkContext, url: &str, objects: &[ObjectEntry]) {
        self.stats.record_found(&ctx.bucket);
        tracing::info!(bucket = %ctx.bucket, objects = objects.len(), "bucket is listable");
        self.emit(
            ctx,
            ctx.depth,
            &format!(
                "Bucket Found: {} ( {} )",
                ctx.bucket,
                url.trim_end_matches('/')
            ),
        );

        for object in objects.iter().filter(|o| !o.is_directory_marker()) {
            self.handle_object(ctx, &object.key).await;
        }
    }

    fn apply_error_policy(
        &self,
        ctx: &WalkContext,
        code: &ProviderErrorCode,
        message: &str,
        endpoint: Option<&str>,
    ) -> NextStep {
        let bucket = &ctx.bucket;

        match code {
            ProviderErrorCode::NoSuchKey => {
                self.stats.record(ScanEvent::MissingKey);
                self.emit(
                    ctx,
                    ctx.depth,
                    &format!("The specified key does not exist: {}", bucket),
                );
            }
            ProviderErrorCode::AccessDenied => {
                self.stats.record(ScanEvent::AccessDenied);
                self.emit(
                    ctx,
                    ctx.depth,
                    &format!("Bucket found but access denied: {}", bucket),
                );
            }
            ProviderErrorCode::NoSuchBucket => {
                self.stats.record(ScanEvent::NoSuchBucket);
                if self.settings.verbose {
                    self.emit(ctx, ctx.depth, &format!("Bucket does not exist: {}", bucket));
                }
            }
            ProviderErrorCode::PermanentRedirect => match endpoint {
                Some(endpoint) if ctx.depth >= self.settings.max_redirect_depth => {
                    self.stats.record(ScanEvent::RedirectLimitHit);
                    tracing::warn!(
                        bucket = %bucket,
                        %endpoint,
                        depth = ctx.depth,
                        "redirect depth limit exceeded, abandoning"
                    );
                    self.emit(
                        ctx,
                        ctx.depth,
                        &format!(
                            "Redirect depth limit ({}) exceeded for {} at {}",
                            self.settings.max_redirect_depth, bucket, endpoint
                        ),
                    );
                }
                Some(endpoint) => {
                    self.stats.record(ScanEvent::RedirectFollowed);
                    self.emit(
                        ctx,
                        ctx.depth,
                        &format!("Bucket {} redirects to: {}", bucket, endpoint),
                    );
                    return NextStep::Follow(redirect_host(&ctx.host, endpoint));
                }
                None => {
                    self.stats.record(ScanEvent::ProviderError);
                    self.emit(
                        ctx,
                        ctx.depth,
                        &format!("Redirect found but can't find where to: {}", bucket),
                    );
                }
            },
            ProviderErrorCode::Other(code) => {
                self.stats.record(ScanEvent::ProviderError);
                self.emit(
                    ctx,
                    ctx.depth,
                    &format!("Unknown error for {}: {} - {}", bucket, code, message),
                );
            }
        }

        NextStep::Stop
    }

    async fn handle_object(&self, ctx: &WalkContext, key: &str) {
        let url = object_url(&ctx.host, &ctx.bucket, key, ctx.virtual_host());
        let client = self.client.as_ref();

        let outcome = if self.settings.download && !key.is_empty() {
            let destination = local_path(&self.settings.output_dir, &ctx.bucket, key);
            download_object(client, &url, destination).await
        } else {
            check_readable(client, &url).await
        };

        let line = match &outcome {
            ObjectOutcome::Downloaded(_) => {
                self.stats.record(ScanEvent::ObjectDownloaded);
                format!("<Downloaded> {}", url)
            }
            ObjectOutcome::Public => {
                self.stats.record(ScanEvent::ObjectPublic);
                format!("<Public> {}", url)
            }
            ObjectOutcome::Private => {
                self.stats.record(ScanEvent::ObjectPrivate);
                format!("<Private> {}", url)
            }
            ObjectOutcome::NotSaved { reason } => {
                self.stats.record(ScanEvent::ObjectNotSaved);
                format!("<Readable, not saved> {} ({})", url, reason)
            }
        };

        self.emit(ctx, ctx.depth + 1, &line);
    }

    /// Writes a finding line indented by `indent` tabs
    fn emit(&self, ctx: &WalkContext, indent: u32, message: &str) {
        let prefix = if self.settings.verbose {
            format!("[Worker {}] ", ctx.worker)
        } else {
            String::new()
        };

        self.sink.write_line(&format!(
            "{}{}{}",
            prefix,
            "\t".repeat(indent as usize),
            message
        ));
    }
}

/// Returns true if `host` addresses the bucket virtual-host style
///
/// `https://acme.s3-eu-west-1.amazonaws.com` encodes bucket `acme`;
/// `https://s3.amazonaws.com` does not.
pub fn host_encodes_bucket(host: &str, bucket: &str) -> bool {
    let hostname = Url::parse(host)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| host.to_string());

    hostname
        .strip_prefix(bucket)
        .map_or(false, |rest| rest.starts_with('.'))
}

/// URL that lists `bucket` on `host`
pub fn listing_url(host: &str, bucket: &str, virtual_host: bool) -> String {
    let host = host.trim_end_matches('/');
    if virtual_host {
        format!("{}/", host)
    } else {
        format!("{}/{}", host, bucket)
    }
}

/// URL of one object, with the key percent-encoded as a single path segment
pub fn object_url(host: &str, bucket: &str, key: &str, virtual_host: bool) -> String {
    if let Ok(mut url) = Url::parse(host) {
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            if !virtual_host {
                segments.push(bucket);
            }
            segments.push(key);
        }
        if !url.cannot_be_a_base() {
            return url.to_string();
        }
    }

    let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
    let host = host.trim_end_matches('/');
    if virtual_host {
        format!("{}/{}", host, encoded)
    } else {
        format!("{}/{}/{}", host, bucket, encoded)
    }
}

/// Base URL for a redirect `endpoint`, keeping the current scheme
///
/// Providers report endpoints as bare host names; the scheme of the host
/// that issued the redirect is reused.
pub fn redirect_host(current_host: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        return endpoint.to_string();
    }

    let scheme = Url::parse(current_host)
        .map(|u| u.scheme().to_string())
        .unwrap_or_else(|_| "https".to_string());

    format!("{}://{}", scheme, endpoint)
}
