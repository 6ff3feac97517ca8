//! HTTP fetcher implementation
//!
//! This module handles the page requests made during a scrape cycle:
//! - Building the HTTP client with the configured user agent
//! - GET requests bounded by the caller's deadline
//! - Error classification (status, transport, timeout)

use crate::config::HttpConfig;
use crate::fetcher::metadata::extract_metadata;
use crate::fetcher::{FetchError, Fetcher, PageMetadata};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::time::Instant;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use preview_pipeline::config::HttpConfig;
/// use preview_pipeline::fetcher::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP and extracts their preview metadata
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from `config`
    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        build_http_client(config)
            .map(Self::new)
            .map_err(FetchError::Client)
    }

    /// Performs the GET and reads the body, without any deadline
    async fn get_page(&self, url: &str) -> Result<(url::Url, String), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok((final_url, body))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, deadline: Instant) -> Result<PageMetadata, FetchError> {
        let (final_url, body) = tokio::time::timeout_at(deadline, self.get_page(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })??;

        Ok(extract_metadata(&body, &final_url))
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::from_config(&HttpConfig::default()).unwrap()
    }

    fn deadline(secs: u64) -> Instant {
        Instant::now() + Duration::from_secs(secs)
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_open_graph_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(
                        r#"<html><head>
                        <meta property="og:title" content="Foo">
                        <meta property="og:description" content="Bar">
                        <meta property="og:image" content="http://x/i.png">
                        </head></html>"#,
                    )
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let metadata = fetcher()
            .fetch(&format!("{}/article", server.uri()), deadline(5))
            .await
            .unwrap();

        assert_eq!(metadata.title, "Foo");
        assert_eq!(metadata.description, "Bar");
        assert_eq!(metadata.image_url, "http://x/i.png");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = fetcher().fetch(&server.uri(), deadline(5)).await;
        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetcher().fetch(&server.uri(), deadline(5)).await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_respects_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<title>Slow</title>")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let result = fetcher()
            .fetch(&server.uri(), Instant::now() + Duration::from_millis(200))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Grab a free port, then release it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = fetcher()
            .fetch(&format!("http://127.0.0.1:{}/", port), deadline(5))
            .await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_relative_image_resolved_against_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/new/page", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<title>Moved</title><meta property="og:image" content="cover.png">"#,
            ))
            .mount(&server)
            .await;

        let metadata = fetcher()
            .fetch(&format!("{}/old", server.uri()), deadline(5))
            .await
            .unwrap();

        assert_eq!(metadata.title, "Moved");
        assert_eq!(metadata.image_url, format!("{}/new/cover.png", server.uri()));
    }
}
