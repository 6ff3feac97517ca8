//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve pages and run the workers, the retry
//! scheduler and the coordinator against an in-memory article store.

use preview_pipeline::config::{HttpConfig, PipelineConfig};
use preview_pipeline::pipeline::{CycleOutcome, RetryScheduler, ScrapeWorker};
use preview_pipeline::queue::{ChannelQueue, Consumer, Producer, QueueError};
use preview_pipeline::storage::{ArticleStore, SqliteArticleStore};
use preview_pipeline::{HttpFetcher, Pipeline, PipelineError, ScrapeStatus};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OG_PAGE: &str = r#"<html><head>
    <meta property="og:title" content="Foo">
    <meta property="og:description" content="Bar">
    <meta property="og:image" content="http://x/i.png">
</head><body></body></html>"#;

fn test_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        queue_capacity: 10,
        worker_count: 2,
        task_timeout_secs: 5,
        scheduler_interval_secs: 300,
        max_retries: 3,
    }
}

fn test_fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::from_config(&HttpConfig::default()).expect("client should build"))
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_submitted_article_is_scraped() {
    let server = MockServer::start().await;
    mount_page(&server, "/og", 200, OG_PAGE).await;

    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let pipeline = Pipeline::start(&test_pipeline_config(), store.clone(), test_fetcher());

    let article = pipeline
        .submit(&format!("{}/og", server.uri()))
        .expect("submission should be accepted");
    assert_eq!(article.status, ScrapeStatus::Pending);

    // Shutdown drains every queued token before returning
    pipeline.shutdown().await;

    let loaded = store.find_by_id(article.id).unwrap();
    assert_eq!(loaded.status, ScrapeStatus::Success);
    assert_eq!(loaded.title.as_deref(), Some("Foo"));
    assert_eq!(loaded.description.as_deref(), Some("Bar"));
    assert_eq!(loaded.image_url.as_deref(), Some("http://x/i.png"));
    assert_eq!(loaded.retry_count, 0);
}

#[tokio::test]
async fn test_plain_title_page_has_empty_preview_fields() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/plain",
        200,
        "<html><head><title>Plain</title></head><body></body></html>",
    )
    .await;

    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let pipeline = Pipeline::start(&test_pipeline_config(), store.clone(), test_fetcher());

    let article = pipeline.submit(&format!("{}/plain", server.uri())).unwrap();
    pipeline.shutdown().await;

    let loaded = store.find_by_id(article.id).unwrap();
    assert_eq!(loaded.status, ScrapeStatus::Success);
    assert_eq!(loaded.title.as_deref(), Some("Plain"));
    assert_eq!(loaded.description.as_deref(), Some(""));
    assert_eq!(loaded.image_url.as_deref(), Some(""));
}

#[tokio::test]
async fn test_server_error_is_retried_until_ceiling() {
    let server = MockServer::start().await;
    mount_page(&server, "/broken", 500, "oops").await;

    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let (producer, consumer) = ChannelQueue::bounded(10);
    let worker = ScrapeWorker::new(store.clone(), test_fetcher(), Duration::from_secs(5));
    let scheduler = RetryScheduler::new(
        store.clone(),
        Arc::new(producer.clone()),
        Duration::from_secs(300),
        3,
    );

    let article = store
        .create_article(&format!("{}/broken", server.uri()))
        .unwrap();
    producer.produce(&article.id.to_string()).unwrap();

    for attempt in 1..=3u32 {
        let token = consumer.next().await.expect("token should be queued");
        assert_eq!(worker.process_token(&token).await, CycleOutcome::Failed);

        let loaded = store.find_by_id(article.id).unwrap();
        assert_eq!(loaded.status, ScrapeStatus::Failed);
        assert_eq!(loaded.retry_count, attempt);
        assert!(loaded.last_error.unwrap().contains("500"));

        let report = scheduler.check_and_requeue();
        if attempt < 3 {
            assert_eq!(report.requeued, 1);
        } else {
            // Retry ceiling reached: the article stays failed for good
            assert_eq!(report.found, 0);
        }
    }

    assert_eq!(scheduler.check_and_requeue().found, 0);
    assert_eq!(store.count_by_status().unwrap().failed, 1);
}

#[tokio::test]
async fn test_failed_article_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", 200, OG_PAGE).await;

    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let (producer, consumer) = ChannelQueue::bounded(10);
    let worker = ScrapeWorker::new(store.clone(), test_fetcher(), Duration::from_secs(5));
    let scheduler =
        RetryScheduler::new(store.clone(), Arc::new(producer.clone()), Duration::from_secs(300), 3);

    let article = store
        .create_article(&format!("{}/flaky", server.uri()))
        .unwrap();
    producer.produce(&article.id.to_string()).unwrap();

    let token = consumer.next().await.unwrap();
    assert_eq!(worker.process_token(&token).await, CycleOutcome::Failed);

    assert_eq!(scheduler.check_and_requeue().requeued, 1);
    let token = consumer.next().await.unwrap();
    assert_eq!(worker.process_token(&token).await, CycleOutcome::Scraped);

    let loaded = store.find_by_id(article.id).unwrap();
    assert_eq!(loaded.status, ScrapeStatus::Success);
    assert_eq!(loaded.title.as_deref(), Some("Foo"));
    // The counter records past failures and is not reset by a success
    assert_eq!(loaded.retry_count, 1);
}

#[tokio::test]
async fn test_queue_rejects_when_full() {
    let (producer, _consumer) = ChannelQueue::bounded(100);

    for i in 0..100 {
        producer.produce(&format!("token-{}", i)).unwrap();
    }

    let started = std::time::Instant::now();
    assert_eq!(producer.produce("one-too-many"), Err(QueueError::Full));
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_submit_on_full_queue_leaves_article_pending() {
    let server = MockServer::start().await;
    mount_page(&server, "/og", 200, OG_PAGE).await;

    let config = PipelineConfig {
        queue_capacity: 1,
        worker_count: 1,
        ..test_pipeline_config()
    };
    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let pipeline = Pipeline::start(&config, store.clone(), test_fetcher());

    // Single-threaded test runtime: workers cannot drain between these calls
    let first = pipeline.submit(&format!("{}/og", server.uri())).unwrap();
    let second = pipeline.submit(&format!("{}/og?again", server.uri()));
    assert!(matches!(
        second,
        Err(PipelineError::Queue(QueueError::Full))
    ));

    pipeline.shutdown().await;

    let counts = store.count_by_status().unwrap();
    assert_eq!(counts.success, 1);
    assert_eq!(counts.pending, 1);
    assert_eq!(
        store.find_by_id(first.id).unwrap().status,
        ScrapeStatus::Success
    );
}

#[tokio::test]
async fn test_submit_rejects_invalid_url() {
    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let pipeline = Pipeline::start(&test_pipeline_config(), store.clone(), test_fetcher());

    assert!(pipeline.submit("not a url").is_err());
    assert!(pipeline.submit("ftp://example.com/file").is_err());

    pipeline.shutdown().await;
    assert_eq!(store.count_by_status().unwrap().total(), 0);
}

#[tokio::test]
async fn test_unreachable_host_marks_failed() {
    // Grab a free port, then release it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let store = Arc::new(SqliteArticleStore::new_in_memory().unwrap());
    let pipeline = Pipeline::start(&test_pipeline_config(), store.clone(), test_fetcher());

    let article = pipeline
        .submit(&format!("http://127.0.0.1:{}/gone", port))
        .unwrap();
    pipeline.shutdown().await;

    let loaded = store.find_by_id(article.id).unwrap();
    assert_eq!(loaded.status, ScrapeStatus::Failed);
    assert_eq!(loaded.retry_count, 1);
    let error = loaded.last_error.unwrap();
    assert!(error.starts_with("Request to"), "unexpected error: {}", error);
}
