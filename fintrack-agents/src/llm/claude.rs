use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;

use super::{CompletionRequest, CompletionResponse, LlmClient};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    http: Client,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: impl AsRef<str>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl AsRef<str>, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        let mut key = HeaderValue::from_str(api_key.as_ref()).context("Invalid Claude API key")?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl LlmClient for ClaudeClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let endpoint = format!("{}/v1/messages", self.base_url);

        let response = self
            .http
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("POST {endpoint} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(anyhow!("Claude API returned {}: {}", status, message));
        }

        response
            .json::<CompletionResponse>()
            .await
            .with_context(|| format!("Failed to parse JSON response from {endpoint}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmMessage;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request with a canned response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 4096];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .to_lowercase()
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:").map(|v| v.trim().to_string()))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if received.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8(received).unwrap()
        });

        (format!("http://{}", addr), handle)
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "claude-test".to_string(),
            max_tokens: 256,
            messages: vec![LlmMessage::user("How is my goal doing?")],
            system: Some("You are a savings coach.".to_string()),
            temperature: None,
        }
    }

    #[tokio::test]
    async fn test_complete_posts_messages_request() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"content":[{"type":"text","text":"On track."}],"stop_reason":"end_turn"}"#,
        )
        .await;

        let client = ClaudeClient::with_base_url("sk-test", &format!("{}/", base_url)).unwrap();
        let response = client.complete(request()).await.unwrap();
        assert_eq!(response.text(), "On track.");

        let raw = server.await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        let head = head.to_lowercase();
        assert!(head.starts_with("post /v1/messages "));
        assert!(head.contains("x-api-key: sk-test"));
        assert!(head.contains("anthropic-version: 2023-06-01"));

        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["model"], "claude-test");
        assert_eq!(sent["max_tokens"], 256);
        assert_eq!(sent["system"], "You are a savings coach.");
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "How is my goal doing?");
        assert!(sent.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"Slow down"}}"#,
        )
        .await;

        let client = ClaudeClient::with_base_url("sk-test", &base_url).unwrap();
        let err = client.complete(request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Claude API returned 429 Too Many Requests: Slow down");

        server.await.unwrap();
    }
}
