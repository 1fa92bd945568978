//! Response classification of the webhook delivery client.

use std::time::Duration;

use fluxslack_core::{
    Block, ClientConfig, DeliveryClient, DeliveryError, Message, Notifier, NotifierConfig,
    SlackNotifier,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn message() -> Message {
    Message::new(vec![Block::text("*deployed*")])
}

fn client(url: &str) -> DeliveryClient {
    DeliveryClient::new(url, ClientConfig::default()).expect("client")
}

async fn server_responding(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/hook"))
        .respond_with(template)
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn hook_url(server: &MockServer) -> String {
    format!("{}/services/hook", server.uri())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_range_is_ok() {
    let server = server_responding(ResponseTemplate::new(204)).await;
    client(&hook_url(&server))
        .send(&message())
        .await
        .expect("2xx is success");
}

#[tokio::test]
async fn rate_limited_carries_retry_after() {
    let server =
        server_responding(ResponseTemplate::new(429).insert_header("Retry-After", "30")).await;

    let err = client(&hook_url(&server))
        .send(&message())
        .await
        .expect_err("429 must fail");

    assert!(err.is_rate_limited());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn rate_limited_without_retry_after_fails() {
    let server = server_responding(ResponseTemplate::new(429)).await;

    let err = client(&hook_url(&server))
        .send(&message())
        .await
        .expect_err("429 without Retry-After must fail");

    assert!(matches!(err, DeliveryError::RetryAfterUnusable { value: None }));
    assert_eq!(err.retry_after(), None);
}

#[tokio::test]
async fn rate_limited_with_garbage_retry_after_fails() {
    let server =
        server_responding(ResponseTemplate::new(429).insert_header("Retry-After", "later")).await;

    let err = client(&hook_url(&server))
        .send(&message())
        .await
        .expect_err("unparsable Retry-After must fail");

    match err {
        DeliveryError::RetryAfterUnusable { value } => assert_eq!(value.as_deref(), Some("later")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn server_error_is_delivery_failed() {
    let server =
        server_responding(ResponseTemplate::new(500).set_body_string("internal_error")).await;

    let err = client(&hook_url(&server))
        .send(&message())
        .await
        .expect_err("500 must fail");

    assert_eq!(err.status(), Some(500));
    match err {
        DeliveryError::DeliveryFailed { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal_error");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn client_error_is_delivery_failed() {
    let server = server_responding(ResponseTemplate::new(404).set_body_string("no_team")).await;

    let err = client(&hook_url(&server))
        .send(&message())
        .await
        .expect_err("404 must fail");

    assert!(matches!(err, DeliveryError::DeliveryFailed { status: 404, .. }));
}

#[tokio::test]
async fn truncated_error_body_keeps_status() {
    // Announces 100 body bytes, sends 5, then hangs up.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; 8192];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort",
            )
            .await
            .expect("write");
        let _ = socket.shutdown().await;
    });

    let err = client(&format!("http://{}/services/hook", addr))
        .send(&message())
        .await
        .expect_err("truncated 500 must fail");

    assert!(
        matches!(err, DeliveryError::ResponseBody { status: 500, .. }),
        "unexpected error: {:?}",
        err
    );
    assert_eq!(err.status(), Some(500));
    assert!(!err.is_transport());
    server.await.expect("server task");
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    // Grab a free port, then release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let err = client(&format!("http://127.0.0.1:{}/services/hook", port))
        .send(&message())
        .await
        .expect_err("connection refused must fail");

    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transport_error() {
    let server = server_responding(
        ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
    )
    .await;

    let client = DeliveryClient::new(
        &hook_url(&server),
        ClientConfig {
            timeout: Duration::from_millis(50),
            ..ClientConfig::default()
        },
    )
    .expect("client");

    let err = client.send(&message()).await.expect_err("timeout must fail");
    assert!(err.is_transport());
}

// ---------------------------------------------------------------------------
// End to end through the notifier
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notifier_posts_composed_message() {
    let server = server_responding(ResponseTemplate::new(200).set_body_string("ok")).await;
    let config = NotifierConfig::new(&hook_url(&server), "prod", "https://github.com/org/config")
        .with_channel("#deploys");
    let notifier = SlackNotifier::new(&config).expect("notifier");

    let event = serde_json::from_value(json!({
        "type": "sync",
        "serviceIDs": ["default:deployment/web"],
        "metadata": {"commits": [{"revision": "0123456789", "message": "bump"}]}
    }))
    .expect("decode");

    let message = notifier.compose(&event);
    notifier.send(&message).await.expect("delivered");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["channel"], "#deploys");
    assert!(body.get("username").is_none());
    assert_eq!(
        body["blocks"][0]["text"]["text"],
        "*<https://github.com/org/config|Synced 1 commits to prod>*"
    );
}
