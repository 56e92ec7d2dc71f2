//! Integration tests for the resilient request executor.
//!
//! Retry behavior needs a server that can fail below the HTTP layer, which
//! wiremock cannot simulate, so these tests use a raw TCP listener that
//! drops connections before serving.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use markding::sync::{
    RateLimiter, RequestExecutor, RequestTemplate, Transport, TransportConfig, TransportError,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn executor(base_delay: Duration) -> RequestExecutor {
    let transport = Transport::new(&TransportConfig::default()).unwrap();
    let limiter = Arc::new(RateLimiter::new(10_000.0, 100));
    RequestExecutor::new(transport, limiter).with_base_delay(base_delay)
}

fn get_template(url: String) -> RequestTemplate {
    RequestTemplate::new(reqwest::Method::GET, url)
}

/// Grabs a port that nothing is listening on.
fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Serves connections, dropping the first `failures` before responding
/// with a canned 200. Returns the address and a connection counter.
async fn flaky_server(failures: usize) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        let mut remaining = failures;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            if remaining > 0 {
                remaining -= 1;
                drop(socket);
                continue;
            }
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"ok":true}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (addr, connections)
}

// =============================================================================
// Retry policy
// =============================================================================

#[tokio::test]
async fn test_exhaustion_after_exactly_four_attempts() {
    let executor = executor(Duration::from_millis(5));
    let template = get_template(refused_url());
    let cancel = CancellationToken::new();

    let result = executor.execute(&template, &cancel).await;
    match result {
        Err(TransportError::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 4);
            assert!(last.is_retryable());
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_two_failures_then_success() {
    let (addr, connections) = flaky_server(2).await;
    let executor = executor(Duration::from_millis(5));
    let template = get_template(format!("http://{}/", addr));
    let cancel = CancellationToken::new();

    let response = executor.execute(&template, &cancel).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    // Two dropped connections plus the served one, nothing more
    assert_eq!(connections.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_http_error_responses_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(Duration::from_millis(5));
    let template = get_template(format!("{}/", server.uri()));
    let cancel = CancellationToken::new();

    // The executor hands the response back untouched; status handling is
    // the client's job.
    let response = executor.execute(&template, &cancel).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_retryable_failure_returns_immediately() {
    let executor = executor(Duration::from_secs(60));
    let template = get_template("not a url".to_string());
    let cancel = CancellationToken::new();

    // A build failure would hang for minutes if it were retried with the
    // 60s base delay; completing quickly proves it was not.
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        executor.execute(&template, &cancel),
    )
    .await
    .expect("non-retryable failure should not back off");
    assert!(matches!(result, Err(TransportError::Invalid(_))));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancelled_token_prevents_request() {
    let server = MockServer::start().await;
    let executor = executor(Duration::from_millis(5));
    let template = get_template(format!("{}/", server.uri()));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = executor.execute(&template, &cancel).await;
    assert!(matches!(result, Err(TransportError::Cancelled)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancellation_interrupts_backoff_wait() {
    let executor = executor(Duration::from_secs(60));
    let template = get_template(refused_url());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    // First attempt fails fast, then the 60s backoff begins; cancellation
    // must cut it short.
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        executor.execute(&template, &cancel),
    )
    .await
    .expect("cancellation should interrupt the backoff");
    assert!(matches!(result, Err(TransportError::Cancelled)));
}
