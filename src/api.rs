//! REST client for the blog backend.
//!
//! Endpoints, relative to the configured base URL (which already contains
//! the `/api` prefix):
//!
//! - `GET    /blogs/{id}`
//! - `POST   /blogs`
//! - `PUT    /blogs/{id}`
//! - `DELETE /blogs/{id}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::{debug, warn};

use crate::blog_entry::{BlogEntry, NewBlogEntry};
use crate::error::ApiError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<BlogEntry, ApiError>;
    /// The response body is ignored; a 2xx status is success.
    async fn create(&self, entry: &NewBlogEntry) -> Result<(), ApiError>;
    async fn update(&self, entry: &BlogEntry) -> Result<(), ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpBlogApi {
    client: Client,
    base_url: Url,
}

#[derive(Debug)]
pub struct HttpBlogApiBuilder {
    base_url: String,
    timeout: Duration,
}

impl HttpBlogApiBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpBlogApi, ApiError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Configuration(format!("{}: {e}", self.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Configuration(format!(
                "{} cannot be used as a base URL",
                self.base_url
            )));
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(HttpBlogApi { client, base_url })
    }
}

impl HttpBlogApi {
    pub fn builder(base_url: impl Into<String>) -> HttpBlogApiBuilder {
        HttpBlogApiBuilder::new(base_url)
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/blogs` followed by `segments`, each percent-encoded as a single
    /// path segment.
    fn blogs_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("blogs").extend(segments);
        }
        url
    }

    fn entry_url(&self, id: &str) -> Url {
        self.blogs_url(&[id])
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "backend rejected request");
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl BlogApi for HttpBlogApi {
    async fn fetch(&self, id: &str) -> Result<BlogEntry, ApiError> {
        let url = self.entry_url(id);
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Self::check(response)
            .await?
            .json::<BlogEntry>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn create(&self, entry: &NewBlogEntry) -> Result<(), ApiError> {
        let url = self.blogs_url(&[]);
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(entry)
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, entry: &BlogEntry) -> Result<(), ApiError> {
        let url = self.entry_url(&entry.id);
        debug!(%url, "PUT");
        let response = self
            .client
            .put(url)
            .json(entry)
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.entry_url(id);
        debug!(%url, "DELETE");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}

/// A backend call requested by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Fetch(String),
    Create(NewBlogEntry),
    Update(BlogEntry),
    Delete(String),
}

/// Completion of a [`Request`], fed back to the screen that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Fetched(Result<BlogEntry, ApiError>),
    Created(Result<(), ApiError>),
    Updated(Result<(), ApiError>),
    Deleted(Result<(), ApiError>),
}

pub async fn perform(api: &dyn BlogApi, request: Request) -> Outcome {
    match request {
        Request::Fetch(id) => Outcome::Fetched(api.fetch(&id).await),
        Request::Create(entry) => Outcome::Created(api.create(&entry).await),
        Request::Update(entry) => Outcome::Updated(api.update(&entry).await),
        Request::Delete(id) => Outcome::Deleted(api.delete(&id).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers with a canned response and hands back
    /// the raw request text.
    struct MockBackend {
        listener: TcpListener,
        base_url: String,
    }

    impl MockBackend {
        async fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock backend");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}/api");
            Self { listener, base_url }
        }

        fn respond_once(self, status_code: u16, body: &'static str) -> JoinHandle<String> {
            tokio::spawn(async move {
                let (mut stream, _) = self.listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;

                let response = format!(
                    "HTTP/1.1 {status_code} STATUS\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
                request
            })
        }
    }

    /// Reads headers, then as many body bytes as `Content-Length` announces.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    fn body_of(request: &str) -> serde_json::Value {
        let body = request.split("\r\n\r\n").nth(1).unwrap_or("");
        serde_json::from_str(body).unwrap()
    }

    const ENTRY_42: &str = r#"{"id":"42","title":"T","content":"C","hashtags":["x"],"timeCreated":"2023-01-01T00:00:00.000Z","author":"bob"}"#;

    #[test]
    fn builder_trims_trailing_slash() {
        let api = HttpBlogApi::builder("http://localhost:8080/api/")
            .build()
            .unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(
            api.entry_url("9").as_str(),
            "http://localhost:8080/api/blogs/9"
        );
    }

    #[test]
    fn builder_rejects_unparseable_base_url() {
        let err = HttpBlogApi::builder("localhost:8080/api").build().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[tokio::test]
    async fn entry_ids_are_sent_as_one_encoded_segment() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(200, ENTRY_42);

        api.fetch("a?b#c%/d").await.unwrap();
        let request = handle.await.unwrap();

        assert!(
            request.starts_with("GET /api/blogs/a%3Fb%23c%25%2Fd HTTP/1.1"),
            "{request}"
        );
    }

    #[tokio::test]
    async fn fetch_gets_entry_by_id() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(200, ENTRY_42);

        let entry = api.fetch("42").await.unwrap();
        let request = handle.await.unwrap();

        assert!(request.starts_with("GET /api/blogs/42 HTTP/1.1"));
        assert_eq!(entry.title, "T");
        assert_eq!(entry.hashtags, vec!["x"]);
        assert_eq!(entry.author, "bob");
    }

    #[tokio::test]
    async fn fetch_reports_status_failures() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(404, r#"{"message":"not found"}"#);

        let err = api.fetch("missing").await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn create_posts_new_entry_body() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(200, ENTRY_42);

        let new_entry = NewBlogEntry {
            title: "T".into(),
            content: "C".into(),
            hashtags: vec!["a".into(), "b".into()],
        };
        api.create(&new_entry).await.unwrap();
        let request = handle.await.unwrap();

        assert!(request.starts_with("POST /api/blogs HTTP/1.1"));
        let body = body_of(&request);
        assert_eq!(body["hashtags"], serde_json::json!(["a", "b"]));
        assert!(body.get("id").is_none());
    }

    #[tokio::test]
    async fn create_accepts_empty_created_response() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(201, "");

        let new_entry = NewBlogEntry {
            title: "T".into(),
            content: "C".into(),
            hashtags: vec![],
        };
        let outcome = perform(&api, Request::Create(new_entry)).await;
        handle.await.unwrap();

        assert_eq!(outcome, Outcome::Created(Ok(())));
    }

    #[tokio::test]
    async fn create_surfaces_server_error() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(500, "");

        let new_entry = NewBlogEntry {
            title: "T".into(),
            content: "C".into(),
            hashtags: vec![],
        };
        let err = api.create(&new_entry).await.unwrap_err();
        handle.await.unwrap();

        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                body: String::new()
            }
        );
    }

    #[tokio::test]
    async fn update_puts_full_entry() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(200, ENTRY_42);

        let entry: BlogEntry = serde_json::from_str(ENTRY_42).unwrap();
        api.update(&entry).await.unwrap();
        let request = handle.await.unwrap();

        assert!(request.starts_with("PUT /api/blogs/42 HTTP/1.1"));
        let body = body_of(&request);
        assert_eq!(body["timeCreated"], "2023-01-01T00:00:00.000Z");
        assert_eq!(body["author"], "bob");
    }

    #[tokio::test]
    async fn delete_issues_delete_request() {
        let server = MockBackend::start().await;
        let api = HttpBlogApi::builder(&server.base_url).build().unwrap();
        let handle = server.respond_once(200, "");

        api.delete("42").await.unwrap();
        let request = handle.await.unwrap();

        assert!(request.starts_with("DELETE /api/blogs/42 HTTP/1.1"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let api = HttpBlogApi::builder(format!("http://127.0.0.1:{port}/api"))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let outcome = perform(&api, Request::Delete("1".into())).await;

        assert!(matches!(outcome, Outcome::Deleted(Err(ApiError::Connection(_)))));
    }
}
