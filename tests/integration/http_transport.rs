//! The reqwest transport against a loopback HTTP server.

use crescendo::catalog::parse_row;
use crescendo::error::{ReviewError, TransportError};
use crescendo::pacing::ManualClock;
use crescendo::review::{
    Backend, ChatCompletionRequest, ChatMessage, ClientSettings, CompletionTransport,
    HttpTransport, ReviewClient,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response per connection, in order, and hand back the raw
/// requests that arrived.
async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
        seen
    });
    (format!("http://{}/v1/chat/completions", addr), handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        status,
        body.len(),
        extra_headers,
        body
    )
}

fn completion(content: &str) -> String {
    serde_json::json!({
        "model": "deepseek-ai/deepseek-r1",
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

fn request() -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: "deepseek-ai/deepseek-r1".to_string(),
        temperature: 0.6,
        messages: vec![ChatMessage::user("写一篇乐评")],
        include_reasoning: None,
    }
}

#[tokio::test]
async fn posts_json_with_bearer_auth() {
    let (endpoint, server) = serve(vec![http_response("200 OK", "", &completion("好"))]).await;
    let transport =
        HttpTransport::new(endpoint.clone(), "test-key".into(), Duration::from_secs(5)).unwrap();
    assert_eq!(transport.endpoint(), endpoint);

    let response = transport.send(&request()).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.contains("好"));

    let seen = server.await.unwrap();
    let raw = seen[0].to_lowercase();
    assert!(raw.starts_with("post /v1/chat/completions"));
    assert!(raw.contains("authorization: bearer test-key"));
    assert!(raw.contains("content-type: application/json"));
    assert!(seen[0].contains("\"model\":\"deepseek-ai/deepseek-r1\""));
    assert!(seen[0].contains("写一篇乐评"));
}

#[tokio::test]
async fn surfaces_retry_after_header() {
    let (endpoint, server) = serve(vec![http_response(
        "429 Too Many Requests",
        "Retry-After: 3\r\n",
        "{}",
    )])
    .await;
    let transport = HttpTransport::new(endpoint, "k".into(), Duration::from_secs(5)).unwrap();
    let response = transport.send(&request()).await.unwrap();
    assert_eq!(response.status, 429);
    assert_eq!(response.retry_after_secs(), Some(3));
    server.await.unwrap();
}

#[tokio::test]
async fn client_retries_rate_limit_over_http() {
    let (endpoint, server) = serve(vec![
        http_response("429 Too Many Requests", "Retry-After: 3\r\n", "{}"),
        http_response(
            "200 OK",
            "",
            &completion("<think>先想想</think>\n\n一首跨越时代的经典。"),
        ),
    ])
    .await;
    let transport = HttpTransport::new(endpoint, "k".into(), Duration::from_secs(5)).unwrap();
    let clock = ManualClock::new();
    let mut client = ReviewClient::new(
        Backend::Remote(Box::new(transport)),
        ClientSettings::default(),
        Arc::new(clock.clone()),
    );
    let entry =
        parse_row("| 1 | Hey Jude | The Beatles | 1968-08-26 | Rock | 单曲 | 黑胶 | 9.5 |").unwrap();

    let review = client.generate_review(&entry).await.unwrap();
    assert_eq!(review.text, "一首跨越时代的经典。");
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(3)]);
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_retryable_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(
        format!("http://{}/v1/chat/completions", addr),
        "k".into(),
        Duration::from_secs(5),
    )
    .unwrap();
    let err = transport.send(&request()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(!matches!(err, TransportError::Build(_)));
    assert!(ReviewError::from(err).is_retryable());
}
