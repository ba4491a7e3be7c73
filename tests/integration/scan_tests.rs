//! Integration tests for the scanner
//!
//! The HTTP path runs against wiremock servers standing in for the storage
//! provider. Whole-run properties use a deterministic in-memory provider.

use async_trait::async_trait;
use bucket_finder::config::ScanSection;
use bucket_finder::output::{ConsoleSink, LogSink, MemorySink};
use bucket_finder::probe::{ProbeClient, ProbeError, ProbeMethod, ProbeResponse};
use bucket_finder::{CandidateSource, ScanConfig, Scanner};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration probing `endpoint` with no probe delay
fn create_test_config(endpoint: &str) -> ScanConfig {
    let source = CandidateSource::Keywords(vec!["acme".to_string()]);
    let mut config = ScanConfig::from_section(
        source,
        ScanSection {
            endpoint: Some(endpoint.to_string()),
            rate_limit_ms: Some(0),
            timeout_secs: Some(5),
            ..ScanSection::default()
        },
    );
    config.workers = 2;
    config
}

fn xml_error(code: &str, extra: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Error><Code>{}</Code><Message>provider message</Message>{}</Error>",
        code, extra
    )
}

fn listing(bucket: &str, keys: &[&str]) -> String {
    let contents: String = keys
        .iter()
        .map(|key| {
            format!(
                "<Contents><Key>{}</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
                 <Size>5</Size></Contents>",
                key
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Name>{}</Name><IsTruncated>false</IsTruncated>{}</ListBucketResult>",
        bucket, contents
    )
}

/// Lists the buckets in `open`; every other name does not exist
struct FakeProvider {
    open: BTreeSet<String>,
}

impl FakeProvider {
    fn new(open: &[&str]) -> Self {
        Self {
            open: open.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ProbeClient for FakeProvider {
    async fn fetch(&self, url: &str, _method: ProbeMethod) -> Result<ProbeResponse, ProbeError> {
        let bucket = url.rsplit('/').next().unwrap_or_default();
        let body = if self.open.contains(bucket) {
            listing(bucket, &[])
        } else {
            xml_error("NoSuchBucket", "")
        };
        Ok(ProbeResponse {
            status: 200,
            body: body.into_bytes(),
        })
    }
}

#[tokio::test]
async fn test_listable_bucket_objects_checked() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/acme"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing("acme", &["public.txt", "images/", "secret.txt"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/acme/public.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/acme/secret.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(create_test_config(&base_url), sink.clone()).unwrap();
    let summary = scanner.run(vec!["acme".to_string()]).await.unwrap();

    assert_eq!(
        sink.lines(),
        vec![
            format!("Bucket Found: acme ( {}/acme )", base_url),
            format!("\t<Public> {}/acme/public.txt", base_url),
            format!("\t<Private> {}/acme/secret.txt", base_url),
        ]
    );
    assert!(summary.found_buckets.contains("acme"));
    assert_eq!(summary.objects_public, 1);
    assert_eq!(summary.objects_private, 1);
}

#[tokio::test]
async fn test_access_denied_and_unknown_codes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/acme-internal"))
        .respond_with(ResponseTemplate::new(403).set_body_string(xml_error("AccessDenied", "")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme-busy"))
        .respond_with(ResponseTemplate::new(503).set_body_string(xml_error("SlowDown", "")))
        .mount(&mock_server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(create_test_config(&base_url), sink.clone()).unwrap();
    let summary = scanner
        .run(vec!["acme-internal".to_string(), "acme-busy".to_string()])
        .await
        .unwrap();

    assert_eq!(
        sink.lines_containing("Bucket found but access denied: acme-internal")
            .len(),
        1
    );
    assert_eq!(
        sink.lines_containing("Unknown error for acme-busy: SlowDown - provider message")
            .len(),
        1
    );
    assert!(summary.found_buckets.is_empty());
    assert_eq!(summary.access_denied, 1);
    assert_eq!(summary.provider_errors, 1);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let endpoint = base_url.trim_start_matches("http://").to_string();

    // Every probe redirects back to the same server
    Mock::given(method("GET"))
        .and(path("/acme-loop"))
        .respond_with(ResponseTemplate::new(301).set_body_string(xml_error(
            "PermanentRedirect",
            &format!("<Endpoint>{}</Endpoint>", endpoint),
        )))
        .mount(&mock_server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(create_test_config(&base_url), sink.clone()).unwrap();
    let summary = scanner.run(vec!["acme-loop".to_string()]).await.unwrap();

    // One initial probe plus five followed redirects
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 6);

    let lines = sink.lines();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], format!("Bucket acme-loop redirects to: {}", endpoint));
    assert_eq!(lines[1], format!("\tBucket acme-loop redirects to: {}", endpoint));
    assert_eq!(
        lines[5],
        format!(
            "\t\t\t\t\tRedirect depth limit (5) exceeded for acme-loop at {}",
            endpoint
        )
    );
    assert_eq!(summary.redirects_followed, 5);
    assert_eq!(summary.redirect_limit_hits, 1);
}

#[tokio::test]
async fn test_download_mode_saves_objects() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/acme-backup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing("acme-backup", &["db/dump.sql", "locked.bin"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/acme-backup/db.*dump\.sql$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("CREATE TABLE t;"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme-backup/locked.bin"))
        .respond_with(ResponseTemplate::new(403).set_body_string(xml_error("AccessDenied", "")))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.download = true;
    config.output_dir = out_dir.path().to_path_buf();

    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(config, sink.clone()).unwrap();
    let summary = scanner.run(vec!["acme-backup".to_string()]).await.unwrap();

    let saved = out_dir.path().join("acme-backup").join("db").join("dump.sql");
    assert_eq!(std::fs::read_to_string(&saved).unwrap(), "CREATE TABLE t;");
    assert!(!out_dir.path().join("acme-backup").join("locked.bin").exists());

    assert_eq!(sink.lines_containing("<Downloaded>").len(), 1);
    assert_eq!(
        sink.lines_containing("<Private>"),
        vec![format!("\t<Private> {}/acme-backup/locked.bin", base_url)]
    );
    assert_eq!(summary.objects_downloaded, 1);
    assert_eq!(summary.objects_private, 1);
}

#[tokio::test]
async fn test_transport_errors_only_reported_when_verbose() {
    // Nothing listens on port 1
    let mut config = create_test_config("http://127.0.0.1:1");
    config.workers = 1;

    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(config.clone(), sink.clone()).unwrap();
    let summary = scanner.run(vec!["acme".to_string()]).await.unwrap();
    assert!(sink.lines().is_empty());
    assert_eq!(summary.transport_errors, 1);

    config.verbose = true;
    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::new(config, sink.clone()).unwrap();
    scanner.run(vec!["acme".to_string()]).await.unwrap();
    assert_eq!(
        sink.lines_containing("[Worker 0] Error requesting page for acme:")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_single_open_bucket_reported_once() {
    let config = create_test_config("https://s3.amazonaws.com");
    let sink = Arc::new(MemorySink::new());
    let scanner = Scanner::with_client(
        config,
        Arc::new(FakeProvider::new(&["acme-backup"])),
        sink.clone(),
    )
    .unwrap();

    let candidates = scanner.build_candidates().unwrap();
    assert!(candidates.contains(&"acme-backup".to_string()));

    let summary = scanner.run(candidates.clone()).await.unwrap();

    assert_eq!(
        sink.lines_containing("Bucket Found"),
        vec!["Bucket Found: acme-backup ( https://s3.amazonaws.com/acme-backup )".to_string()]
    );
    assert_eq!(summary.candidates, candidates.len());
    assert_eq!(summary.probes, candidates.len() as u64);
    assert_eq!(
        summary.found_buckets,
        BTreeSet::from(["acme-backup".to_string()])
    );
}

#[tokio::test]
async fn test_found_set_same_for_any_worker_count() {
    let open = ["acme", "acme-dev", "prod-acme", "acmebackup"];
    let mut found = Vec::new();

    for workers in [1, 20] {
        let mut config = create_test_config("https://s3.amazonaws.com");
        config.workers = workers;
        let scanner = Scanner::with_client(
            config,
            Arc::new(FakeProvider::new(&open)),
            Arc::new(MemorySink::new()),
        )
        .unwrap();
        let candidates = scanner.build_candidates().unwrap();
        found.push(scanner.run(candidates).await.unwrap().found_buckets);
    }

    assert_eq!(found[0], found[1]);
    assert!(!found[0].is_empty());
}

#[tokio::test]
async fn test_log_file_receives_findings() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("findings.log");

    let sink: Arc<dyn LogSink> = Arc::new(ConsoleSink::with_log_file(&log_path).unwrap().silent());
    let scanner = Scanner::with_client(
        create_test_config("https://s3.amazonaws.com"),
        Arc::new(FakeProvider::new(&["acme-logs"])),
        sink,
    )
    .unwrap();
    scanner.run(vec!["acme-logs".to_string()]).await.unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let line = content.lines().next().unwrap();
    // "YYYY/MM/DD HH:MM:SS " prefix
    assert_eq!(line.as_bytes()[4], b'/');
    assert_eq!(line.as_bytes()[19], b' ');
    assert!(line.ends_with("Bucket Found: acme-logs ( https://s3.amazonaws.com/acme-logs )"));
}

#[test]
fn test_probe_delay_defaults_to_one_second_per_pool() {
    let config = ScanConfig::new(CandidateSource::Keywords(vec!["acme".to_string()]));
    assert_eq!(config.probe_delay(), Duration::from_millis(100));
}
