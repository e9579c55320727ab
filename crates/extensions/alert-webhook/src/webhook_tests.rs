use super::*;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_config_defaults() {
    let config = WebhookAlertConfig::new("https://chat.example.com/hooks/ops");
    assert_eq!(config.timeout_seconds, 10);
    assert!(config.headers.is_empty());
}

#[test]
fn test_with_timeout_rounds_up_to_one_second() {
    let config = WebhookAlertConfig::new("http://localhost").with_timeout(Duration::from_millis(200));
    assert_eq!(config.timeout_seconds, 1);
}

#[test]
fn test_payload_shape() {
    let json = serde_json::to_value(AlertPayload { text: "boom" }).unwrap();
    assert_eq!(json, serde_json::json!({ "text": "boom" }));
}

#[tokio::test]
async fn test_alert_posts_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/ops"))
        .and(body_json(serde_json::json!({
            "text": "production: Error in execution of job NewsfeedTask: upstream returned 503"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink =
        WebhookAlertSink::new(WebhookAlertConfig::new(format!("{}/hooks/ops", server.uri()))).unwrap();
    assert_eq!(sink.name(), "webhook");

    sink.alert("production: Error in execution of job NewsfeedTask: upstream returned 503")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_alert_sends_custom_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-team", "ops"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let headers = HashMap::from([("x-team".to_string(), "ops".to_string())]);
    let config = WebhookAlertConfig::new(server.uri()).with_headers(headers);
    let sink = WebhookAlertSink::new(config).unwrap();

    assert!(sink.alert("hello").await.is_ok());
}

#[tokio::test]
async fn test_non_success_status_is_delivery_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("channel archived"))
        .mount(&server)
        .await;

    let sink = WebhookAlertSink::new(WebhookAlertConfig::new(server.uri())).unwrap();
    let err = sink.alert("boom").await.unwrap_err();

    match err {
        AlertError::Delivery(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("channel archived"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_error() {
    // port 9 (discard) is closed on test machines
    let sink = WebhookAlertSink::new(WebhookAlertConfig::new("http://127.0.0.1:9/hook")).unwrap();
    assert!(sink.alert("boom").await.is_err());
}
