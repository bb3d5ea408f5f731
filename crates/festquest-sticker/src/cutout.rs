//! HTTP client for the remove.bg background-removal API.

use std::time::Duration;

use async_trait::async_trait;
use festquest_core::cutout::{CutoutOutcome, CutoutService, Unavailable};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

/// Public remove.bg endpoint.
pub const DEFAULT_REMOVE_BG_URL: &str = "https://api.remove.bg/v1.0/removebg";

/// Settings for [`RemoveBgClient`].
#[derive(Debug, Clone)]
pub struct RemoveBgConfig {
    /// Full URL of the removal endpoint.
    pub endpoint: String,
    /// Value of the `X-Api-Key` header.
    pub api_key: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Attempts before giving up (at least one is always made).
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl RemoveBgConfig {
    /// Defaults for the public endpoint with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_REMOVE_BG_URL.to_owned(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(15),
            max_attempts: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Cutout service backed by remove.bg.
///
/// Transport failures, timeouts, 429 and 5xx answers are retried; any other
/// non-200 status gives up at once.
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    client: reqwest::Client,
    config: RemoveBgConfig,
}

enum Attempt {
    Done(CutoutOutcome),
    Retry(Unavailable),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl RemoveBgClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialised.
    pub fn new(config: RemoveBgConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn attempt(&self, photo: &[u8]) -> Attempt {
        let form = Form::new()
            .part("image_file", Part::bytes(photo.to_vec()).file_name("photo.jpg"))
            .text("size", "auto");

        let response = match self
            .client
            .post(&self.config.endpoint)
            .header("X-Api-Key", &self.config.api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Attempt::Retry(Unavailable::Timeout),
            Err(e) => return Attempt::Retry(Unavailable::Transport(e.to_string())),
        };

        let status = response.status();
        if status != StatusCode::OK {
            let reason = Unavailable::Status(status.as_u16());
            return if is_retryable(status) {
                Attempt::Retry(reason)
            } else {
                Attempt::Done(CutoutOutcome::Unavailable(reason))
            };
        }

        match response.bytes().await {
            Ok(body) => Attempt::Done(CutoutOutcome::Available(body.to_vec())),
            Err(e) if e.is_timeout() => Attempt::Retry(Unavailable::Timeout),
            Err(e) => Attempt::Retry(Unavailable::Transport(e.to_string())),
        }
    }
}

#[async_trait]
impl CutoutService for RemoveBgClient {
    async fn remove_background(&self, photo: &[u8]) -> CutoutOutcome {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt_no = 1;
        loop {
            let reason = match self.attempt(photo).await {
                Attempt::Done(CutoutOutcome::Available(bytes)) => {
                    debug!(attempt = attempt_no, bytes = bytes.len(), "background removed");
                    return CutoutOutcome::Available(bytes);
                }
                Attempt::Done(CutoutOutcome::Unavailable(reason)) => {
                    warn!(attempt = attempt_no, %reason, "background removal refused");
                    return CutoutOutcome::Unavailable(reason);
                }
                Attempt::Retry(reason) => reason,
            };
            if attempt_no >= attempts {
                warn!(attempts, %reason, "background removal gave up");
                return CutoutOutcome::Unavailable(reason);
            }
            warn!(attempt = attempt_no, %reason, "background removal failed; retrying");
            attempt_no += 1;
            tokio::time::sleep(self.config.backoff).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::post;

    use super::*;

    #[derive(Clone, Default)]
    struct Script {
        replies: Arc<Mutex<VecDeque<(u16, &'static [u8])>>>,
        calls: Arc<Mutex<Vec<(Option<String>, Option<String>, usize)>>>,
        delay: Option<Duration>,
    }

    async fn removebg(
        State(script): State<Script>,
        headers: HeaderMap,
        body: Bytes,
    ) -> (AxumStatus, Vec<u8>) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        script
            .calls
            .lock()
            .unwrap()
            .push((header("x-api-key"), header("content-type"), body.len()));
        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }
        let (status, reply) = script
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(reply(500, b"exhausted"));
        (AxumStatus::from_u16(status).unwrap(), reply.to_vec())
    }

    async fn serve(script: Script) -> SocketAddr {
        let app = Router::new()
            .route("/v1.0/removebg", post(removebg))
            .with_state(script);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn reply(status: u16, body: &'static [u8]) -> (u16, &'static [u8]) {
        (status, body)
    }

    fn scripted(replies: Vec<(u16, &'static [u8])>) -> Script {
        Script {
            replies: Arc::new(Mutex::new(replies.into())),
            ..Script::default()
        }
    }

    fn client(addr: SocketAddr, max_attempts: u32, timeout: Duration) -> RemoveBgClient {
        RemoveBgClient::new(RemoveBgConfig {
            endpoint: format!("http://{addr}/v1.0/removebg"),
            api_key: "test-key".to_owned(),
            timeout,
            max_attempts,
            backoff: Duration::from_millis(10),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_ok_response_returns_cutout_bytes() {
        // Arrange
        let script = scripted(vec![reply(200, b"cutout-png")]);
        let addr = serve(script.clone()).await;

        // Act
        let outcome = client(addr, 2, Duration::from_secs(5))
            .remove_background(b"jpeg-bytes")
            .await;

        // Assert
        assert_eq!(outcome, CutoutOutcome::Available(b"cutout-png".to_vec()));
        let calls = script.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (key, content_type, len) = &calls[0];
        assert_eq!(key.as_deref(), Some("test-key"));
        assert!(content_type.as_deref().unwrap().starts_with("multipart/form-data"));
        assert!(*len > b"jpeg-bytes".len());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let script = scripted(vec![reply(402, b"no credits"), reply(200, b"cutout")]);
        let addr = serve(script.clone()).await;

        let outcome = client(addr, 3, Duration::from_secs(5))
            .remove_background(b"photo")
            .await;

        assert_eq!(outcome, CutoutOutcome::Unavailable(Unavailable::Status(402)));
        assert_eq!(script.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried_until_success() {
        let script = scripted(vec![reply(503, b"busy"), reply(200, b"cutout")]);
        let addr = serve(script.clone()).await;

        let outcome = client(addr, 2, Duration::from_secs(5))
            .remove_background(b"photo")
            .await;

        assert_eq!(outcome, CutoutOutcome::Available(b"cutout".to_vec()));
        assert_eq!(script.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_attempt_budget() {
        let script = scripted(vec![reply(429, b""), reply(429, b""), reply(429, b"")]);
        let addr = serve(script.clone()).await;

        let outcome = client(addr, 2, Duration::from_secs(5))
            .remove_background(b"photo")
            .await;

        assert_eq!(outcome, CutoutOutcome::Unavailable(Unavailable::Status(429)));
        assert_eq!(script.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let script = Script {
            delay: Some(Duration::from_secs(2)),
            ..scripted(vec![reply(200, b"late")])
        };
        let addr = serve(script).await;

        let outcome = client(addr, 1, Duration::from_millis(200))
            .remove_background(b"photo")
            .await;

        assert_eq!(outcome, CutoutOutcome::Unavailable(Unavailable::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Arrange
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        // Act
        let outcome = client(addr, 2, Duration::from_secs(2))
            .remove_background(b"photo")
            .await;

        // Assert
        assert!(matches!(
            outcome,
            CutoutOutcome::Unavailable(Unavailable::Transport(_))
        ));
    }
}
