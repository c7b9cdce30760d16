use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use topic_harvest::config::{parse_config, BatchConfig, ExtractConfig, UserAgentConfig};
use topic_harvest::harvest::{
    harvest, BatchOptions, Coordinator, Fetcher, HttpFetcher, KeywordExtractor,
};
use topic_harvest::model::{FetchFailureKind, FetchResult, OutcomeStatus, RecordType, Target};
use topic_harvest::output::{summarize, write_reports, CSV_HEADER};
use topic_harvest::storage::{record_report, SqliteStorage, Storage};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PYTHON_PAGE: &str = r#"<html><head><title>r/Python</title></head><body>
    <h1>Learning Python Basics</h1>
    <h2>Hi</h2>
    <h3>Gardening tips</h3>
    <a href="/r/Python/comments/abc/first_post/">First post about decorators</a>
    <a href="/r/Python/comments/abc/first_post/">First post about decorators</a>
    <a href="/r/Python/comments/def/second/">Second post</a>
    <a href="/r/Python/wiki/">Wiki</a>
    </body></html>"#;

const EMPTY_PAGE: &str = "<html><head><title>Nothing here</title></head><body><p>quiet</p></body></html>";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Coordinator over the real HTTP fetcher with no politeness delay
fn coordinator(concurrency_limit: Option<usize>, timeout: Duration) -> Coordinator {
    let fetcher = Arc::new(
        HttpFetcher::new(&UserAgentConfig::default(), &BatchConfig::default())
            .expect("Failed to build HTTP client"),
    );
    let extractor = Arc::new(KeywordExtractor::new(&ExtractConfig::default()));
    let options = BatchOptions {
        concurrency_limit: concurrency_limit.and_then(NonZeroUsize::new),
        politeness_delay: Duration::ZERO,
        timeout,
    };
    Coordinator::new(fetcher, extractor, options)
}

fn target(server: &MockServer, route: &str) -> Target {
    Target::new(&format!("{}{}", server.uri(), route)).expect("Invalid mock URL")
}

#[tokio::test]
async fn test_fetch_success_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .respond_with(html(PYTHON_PAGE))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&UserAgentConfig::default(), &BatchConfig::default()).unwrap();
    let result = fetcher
        .fetch(&target(&mock_server, "/r/Python"), Duration::from_secs(5))
        .await;

    match result {
        FetchResult::Success {
            raw_content,
            status_code,
            ..
        } => {
            assert_eq!(status_code, 200);
            assert_eq!(raw_content, PYTHON_PAGE.as_bytes());
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_not_found_is_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&UserAgentConfig::default(), &BatchConfig::default()).unwrap();
    let result = fetcher
        .fetch(&target(&mock_server, "/r/missing"), Duration::from_secs(5))
        .await;

    match result {
        FetchResult::Failure(failure) => {
            assert_eq!(failure.kind, FetchFailureKind::HttpError(404));
            assert_eq!(failure.message, "Not Found");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_timeout_is_network_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/slow"))
        .respond_with(html(EMPTY_PAGE).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&UserAgentConfig::default(), &BatchConfig::default()).unwrap();
    let result = fetcher
        .fetch(&target(&mock_server, "/r/slow"), Duration::from_millis(200))
        .await;

    match result {
        FetchResult::Failure(failure) => {
            assert_eq!(failure.kind, FetchFailureKind::NetworkError);
            assert_eq!(failure.message, "Request timeout");
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_target_headers_are_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .and(header("accept-language", "en-US"))
        .and(header("x-harvest", "1"))
        .respond_with(html(PYTHON_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = target(&mock_server, "/r/Python")
        .with_header("Accept-Language", "en-US")
        .with_header("X-Harvest", "1");

    let report = coordinator(None, Duration::from_secs(5))
        .run(vec![target], CancellationToken::new())
        .await
        .unwrap();

    assert!(report.outcomes[0].is_success());
}

#[tokio::test]
async fn test_batch_extracts_records() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .respond_with(html(PYTHON_PAGE))
        .mount(&mock_server)
        .await;

    let report = coordinator(None, Duration::from_secs(5))
        .run(
            vec![target(&mock_server, "/r/Python")],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.page_title.as_deref(), Some("r/Python"));

    let topics: Vec<&str> = outcome
        .records
        .iter()
        .filter(|r| r.record_type == RecordType::Topic)
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(topics, vec!["Learning Python Basics"]);

    let discussions: Vec<(&str, Option<&str>)> = outcome
        .records
        .iter()
        .filter(|r| r.record_type == RecordType::Discussion)
        .map(|r| (r.title.as_str(), r.url.as_deref()))
        .collect();
    assert_eq!(
        discussions,
        vec![
            (
                "First post about decorators",
                Some("/r/Python/comments/abc/first_post/")
            ),
            ("Second post", Some("/r/Python/comments/def/second/")),
        ]
    );
}

#[tokio::test]
async fn test_mixed_batch_keeps_every_outcome_in_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .respond_with(html(PYTHON_PAGE).set_delay(Duration::from_millis(150)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/programming"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/learnpython"))
        .respond_with(html(EMPTY_PAGE))
        .mount(&mock_server)
        .await;

    let targets = vec![
        target(&mock_server, "/r/Python"),
        target(&mock_server, "/r/programming"),
        target(&mock_server, "/r/learnpython"),
    ];

    let report = coordinator(Some(2), Duration::from_secs(5))
        .run(targets, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(!report.incomplete);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);

    let names: Vec<&str> = report
        .outcomes
        .iter()
        .map(|o| o.target.name.as_str())
        .collect();
    assert_eq!(names, vec!["Python", "programming", "learnpython"]);

    match &report.outcomes[1].status {
        OutcomeStatus::FetchFailed(failure) => {
            assert_eq!(failure.kind, FetchFailureKind::HttpError(500))
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }
    assert!(report.outcomes[1].records.is_empty());

    // Zero records is still a success
    assert_eq!(report.outcomes[2].status, OutcomeStatus::Succeeded);
    assert!(report.outcomes[2].records.is_empty());
}

#[tokio::test]
async fn test_unreachable_target_does_not_abort_batch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(PYTHON_PAGE))
        .mount(&mock_server)
        .await;

    let targets = vec![
        target(&mock_server, "/r/Python"),
        Target::new("http://127.0.0.1:9/r/offline").unwrap(),
        target(&mock_server, "/r/coding"),
    ];

    let report = coordinator(None, Duration::from_secs(2))
        .run(targets, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failed_indices(), vec![1]);
}

#[tokio::test]
async fn test_cancelled_batch_is_incomplete() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(EMPTY_PAGE).set_delay(Duration::from_millis(200)))
        .mount(&mock_server)
        .await;

    let targets = vec![
        target(&mock_server, "/r/one"),
        target(&mock_server, "/r/two"),
        target(&mock_server, "/r/three"),
    ];

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = coordinator(Some(1), Duration::from_secs(5))
        .run(targets, cancel)
        .await
        .unwrap();

    assert!(report.incomplete);
    assert_eq!(report.total_targets, 3);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].target.name, "one");
}

#[tokio::test]
async fn test_harvest_from_config_writes_every_export() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .respond_with(html(PYTHON_PAGE))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/programming"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("topics.json");
    let csv_path = dir.path().join("topics.csv");
    let summary_path = dir.path().join("summary.md");
    let db_path = dir.path().join("harvest.db");

    let config = parse_config(&format!(
        r#"
[batch]
concurrency-limit = 2
politeness-delay = 0
timeout = 5000

[output]
json-path = "{json}"
csv-path = "{csv}"
summary-path = "{summary}"
database-path = "{db}"

[[target]]
url = "{base}/r/Python"

[[target]]
url = "{base}/r/programming"
name = "Programming"
"#,
        json = json_path.display(),
        csv = csv_path.display(),
        summary = summary_path.display(),
        db = db_path.display(),
        base = mock_server.uri(),
    ))
    .unwrap();

    let report = harvest(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.success_count(), 1);

    let written = write_reports(&report, &config.output).unwrap();
    assert_eq!(written, vec![json_path.clone(), csv_path.clone(), summary_path.clone()]);

    // CSV: header plus one row per record of the successful target
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let rows: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(rows[0], CSV_HEADER.join(","));
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("Python,topic,Learning Python Basics,,"));
    assert!(!csv.contains("Programming"));

    // JSON: one entry per outcome, failure reason kept
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[1]["source"], "Programming");
    assert_eq!(outcomes[1]["records"].as_array().unwrap().len(), 0);
    assert!(outcomes[1]["error"].as_str().unwrap().contains("429"));

    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("# Topic Harvest Summary"));

    // SQLite history
    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let run_id = record_report(&mut storage, "test-hash", &report).unwrap();
    let outcomes = storage.get_outcomes(run_id).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].record_count, 3);
    assert_eq!(storage.count_runs().unwrap(), 1);

    let summary = summarize(&report);
    assert_eq!(summary.total_records(), 3);
    assert_eq!(summary.records_of(RecordType::Discussion), 2);
}

#[tokio::test]
async fn test_retries_recover_flaky_target() {
    let mock_server = MockServer::start().await;
    // First request fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/Python"))
        .respond_with(html(PYTHON_PAGE))
        .mount(&mock_server)
        .await;

    let config = parse_config(&format!(
        r#"
[batch]
politeness-delay = 0
retries = 2

[output]

[[target]]
url = "{base}/r/Python"
"#,
        base = mock_server.uri(),
    ))
    .unwrap();

    let report = harvest(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcomes[0].is_success());
    assert_eq!(report.total_records(), 3);
}
