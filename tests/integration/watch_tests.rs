//! Integration tests for the watcher
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetcher and full poll cycles end-to-end.

use stackwatch::config::{Config, FetchConfig, OutputConfig, TargetConfig, WatchConfig};
use stackwatch::crawler::{listing_url_builder, FetchOutcome, Fetcher, PageSource};
use stackwatch::notify::{Notifier, WatchEvent};
use stackwatch::output::DisplaySink;
use stackwatch::record::Record;
use stackwatch::storage::{SqliteStorage, Storage};
use stackwatch::watcher::{build_watcher, Shutdown};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<WatchEvent>>,
}

impl Notifier for Recorder {
    fn notify(&self, event: &WatchEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

impl Recorder {
    fn events(&self) -> Vec<WatchEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct RecordingDisplay {
    batches: Mutex<Vec<Vec<u64>>>,
}

impl DisplaySink for RecordingDisplay {
    fn display(&self, records: &[Record]) {
        self.batches
            .lock()
            .unwrap()
            .push(records.iter().map(Record::identifier).collect());
    }
}

/// Renders a listing page with one summary per identifier, in the given order
fn listing_html(ids: &[u64]) -> String {
    let summaries: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="s-post-summary">
                    <div class="s-post-summary--stats">
                        <div class="s-post-summary--stats-item"><span>{id}</span> votes</div>
                        <div class="s-post-summary--stats-item"><span>0</span> answers</div>
                        <div class="s-post-summary--stats-item"><span>10</span> views</div>
                    </div>
                    <div class="s-post-summary--content">
                        <h3 class="s-post-summary--content-title">
                            <a href="/questions/{id}/question-{id}">Question {id}</a>
                        </h3>
                        <div class="s-post-summary--content-excerpt">Body of {id}</div>
                        <a class="post-tag">python</a>
                        <span class="relativetime" title="2024-05-01 12:00:00Z">now</span>
                    </div>
                </div>"#
            )
        })
        .collect();

    format!("<html><body><div id=\"questions\">{}</div></body></html>", summaries)
}

/// Creates a test configuration pointed at a mock server
fn create_test_config(base_url: &str, dir: &Path, database: bool) -> Config {
    Config {
        target: TargetConfig {
            label: "python".to_string(),
            base_url: base_url.to_string(),
            page_size: 50,
        },
        watch: WatchConfig {
            interval_secs: 1,
            fetch_limit: 50,
            early_stop: false,
            skip_backlog: false,
            state_path: Some(
                dir.join("last_seen_id_python.txt")
                    .to_string_lossy()
                    .into_owned(),
            ),
        },
        fetch: FetchConfig {
            retries: 1,
            retry_delay_ms: 0,
            timeout_secs: 5,
            max_pages: 10,
            user_agent: "stackwatch-test/1.0".to_string(),
        },
        output: OutputConfig {
            database_path: database.then(|| {
                dir.join("questions.db").to_string_lossy().into_owned()
            }),
        },
    }
}

/// Mounts a listing page for the python tag
async fn mount_page(server: &MockServer, page: u32, ids: &[u64]) {
    Mock::given(method("GET"))
        .and(path("/questions/tagged/python"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(ids))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn fetcher_for(server: &MockServer, retries: u32, notifier: Arc<Recorder>) -> Fetcher {
    let config = create_test_config(&server.uri(), Path::new("."), false);
    let fetch = FetchConfig {
        retries,
        ..config.fetch.clone()
    };
    let url_builder = listing_url_builder(&config.target).unwrap();
    Fetcher::from_config(&fetch, url_builder, notifier).unwrap()
}

#[tokio::test]
async fn test_fetch_retries_exactly_the_configured_bound() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let fetcher = fetcher_for(&mock_server, 3, recorder.clone());

    let outcome = fetcher.fetch(1).await;

    assert!(matches!(outcome, FetchOutcome::Exhausted { attempts: 3, .. }));

    let events = recorder.events();
    let attempts: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            WatchEvent::FetchAttempt { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3]);
    assert!(matches!(
        events.last(),
        Some(WatchEvent::FetchExhausted { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn test_fetch_treats_not_found_as_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>gone</html>"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 2, Arc::new(Recorder::default()));

    match fetcher.fetch(1).await {
        FetchOutcome::Exhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("404"));
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_recovers_from_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, &[7]).await;

    let recorder = Arc::new(Recorder::default());
    let fetcher = fetcher_for(&mock_server, 3, recorder.clone());

    let outcome = fetcher.fetch(1).await;

    assert!(matches!(outcome, FetchOutcome::Page(ref body) if body.contains("/questions/7/")));
    assert!(!recorder
        .events()
        .iter()
        .any(|e| matches!(e, WatchEvent::FetchExhausted { .. })));
}

#[tokio::test]
async fn test_fetch_blank_body_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n\t "))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 3, Arc::new(Recorder::default()));

    assert_eq!(fetcher.fetch(1).await, FetchOutcome::Empty);
}

#[tokio::test]
async fn test_fetch_undecodable_body_is_not_retried() {
    let mock_server = MockServer::start().await;

    // Claims gzip but is not, so reading the body fails after a 200
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(b"definitely not gzip".to_vec()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let fetcher = fetcher_for(&mock_server, 3, recorder.clone());

    assert_eq!(fetcher.fetch(1).await, FetchOutcome::Empty);

    let events = recorder.events();
    let attempts = events
        .iter()
        .filter(|e| matches!(e, WatchEvent::FetchAttempt { .. }))
        .count();
    assert_eq!(attempts, 1);
    assert!(!events
        .iter()
        .any(|e| matches!(e, WatchEvent::FetchExhausted { .. })));
}

#[tokio::test]
async fn test_fetch_sends_listing_query_and_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/questions/tagged/python"))
        .and(query_param("sort", "newest"))
        .and(query_param("pageSize", "50"))
        .and(query_param("page", "4"))
        .and(header("user-agent", "stackwatch-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[1])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 1, Arc::new(Recorder::default()));

    assert!(matches!(fetcher.fetch(4).await, FetchOutcome::Page(_)));
}

#[tokio::test]
async fn test_watch_cycle_end_to_end() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, &[103, 102]).await;
    mount_page(&mock_server, 2, &[101]).await;
    mount_page(&mock_server, 3, &[]).await;

    let config = create_test_config(&mock_server.uri(), dir.path(), true);
    let display = Arc::new(RecordingDisplay::default());
    let recorder = Arc::new(Recorder::default());

    let mut watcher = build_watcher(&config, display.clone(), recorder.clone()).unwrap();

    let report = watcher.check_once().await.unwrap();
    let delivered: Vec<u64> = report.new_records.iter().map(Record::identifier).collect();
    assert_eq!(report.candidates, 3);
    assert_eq!(delivered, vec![101, 102, 103]);
    assert_eq!(report.new_records[0].title, "Question 101");
    assert_eq!(
        report.new_records[0].location,
        format!("{}/questions/101/question-101", mock_server.uri())
    );

    // Second cycle sees the same listing and delivers nothing
    let report = watcher.check_once().await.unwrap();
    assert!(report.new_records.is_empty());

    assert_eq!(*display.batches.lock().unwrap(), vec![vec![101, 102, 103]]);
    assert_eq!(
        fs::read_to_string(dir.path().join("last_seen_id_python.txt")).unwrap(),
        "103"
    );

    let events = recorder.events();
    assert!(events.contains(&WatchEvent::NewRecordsFound { count: 3 }));
    assert!(events.contains(&WatchEvent::ExtractionEmpty { page: 3 }));
    assert_eq!(events.last(), Some(&WatchEvent::NoNewRecords));

    drop(watcher);
    let storage = SqliteStorage::new(&dir.path().join("questions.db")).unwrap();
    assert_eq!(storage.count_records().unwrap(), 3);
    assert_eq!(storage.max_identifier("python").unwrap(), Some(103));
}

#[tokio::test]
async fn test_restart_does_not_redeliver() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, &[12, 11]).await;
    mount_page(&mock_server, 2, &[]).await;

    let config = create_test_config(&mock_server.uri(), dir.path(), false);

    let first = Arc::new(RecordingDisplay::default());
    let mut watcher =
        build_watcher(&config, first.clone(), Arc::new(Recorder::default())).unwrap();
    watcher.check_once().await.unwrap();
    drop(watcher);

    let second = Arc::new(RecordingDisplay::default());
    let mut restarted =
        build_watcher(&config, second.clone(), Arc::new(Recorder::default())).unwrap();
    let report = restarted.check_once().await.unwrap();

    assert_eq!(*first.batches.lock().unwrap(), vec![vec![11, 12]]);
    assert!(report.new_records.is_empty());
    assert!(second.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_early_stop_skips_already_seen_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, &[10, 9, 8, 7]).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[6, 5])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), dir.path(), false);
    config.watch.early_stop = true;
    fs::write(dir.path().join("last_seen_id_python.txt"), "8").unwrap();

    let display = Arc::new(RecordingDisplay::default());
    let mut watcher = build_watcher(&config, display.clone(), Arc::new(Recorder::default())).unwrap();

    let report = watcher.check_once().await.unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(*display.batches.lock().unwrap(), vec![vec![9, 10]]);
}

#[tokio::test]
async fn test_outage_reads_as_no_new_records() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), false);
    let recorder = Arc::new(Recorder::default());
    let mut watcher =
        build_watcher(&config, Arc::new(RecordingDisplay::default()), recorder.clone()).unwrap();

    let report = watcher.check_once().await.unwrap();

    assert_eq!(report.candidates, 0);
    let events = recorder.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, WatchEvent::FetchExhausted { attempts: 1, .. })));
    assert_eq!(events.last(), Some(&WatchEvent::NoNewRecords));
}

#[tokio::test]
async fn test_corrupt_state_file_restarts_tracking() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, &[2, 1]).await;
    mount_page(&mock_server, 2, &[]).await;
    fs::write(dir.path().join("last_seen_id_python.txt"), "abc").unwrap();

    let config = create_test_config(&mock_server.uri(), dir.path(), false);
    let recorder = Arc::new(Recorder::default());
    let display = Arc::new(RecordingDisplay::default());
    let mut watcher = build_watcher(&config, display.clone(), recorder.clone()).unwrap();

    assert_eq!(watcher.tracker().last_seen_id(), 0);
    watcher.check_once().await.unwrap();

    assert!(matches!(
        recorder.events().first(),
        Some(WatchEvent::StateLoadFailure { .. })
    ));
    assert_eq!(*display.batches.lock().unwrap(), vec![vec![1, 2]]);
    assert_eq!(
        fs::read_to_string(dir.path().join("last_seen_id_python.txt")).unwrap(),
        "2"
    );
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 1, &[5, 4]).await;
    mount_page(&mock_server, 2, &[]).await;

    let mut config = create_test_config(&mock_server.uri(), dir.path(), false);
    config.watch.interval_secs = 3600;

    let recorder = Arc::new(Recorder::default());
    let display = Arc::new(RecordingDisplay::default());
    let mut watcher = build_watcher(&config, display.clone(), recorder.clone()).unwrap();

    let shutdown = Shutdown::new();
    let remote = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        remote.trigger();
    });

    tokio::time::timeout(Duration::from_secs(10), watcher.run(&shutdown))
        .await
        .expect("watcher ignored shutdown")
        .unwrap();

    let events = recorder.events();
    assert!(matches!(
        events.first(),
        Some(WatchEvent::WatcherStarted { .. })
    ));
    assert_eq!(events.last(), Some(&WatchEvent::WatcherStopped { error: None }));
    assert_eq!(*display.batches.lock().unwrap(), vec![vec![4, 5]]);
}
