//! Request pipeline behavior against a mock backend.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{Harness, envelope};
use mailcove_client::http::{ApiError, Query};
use mailcove_client::storage::{StoragePort, keys};

#[tokio::test]
async fn get_encodes_only_present_query_params() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/emails"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, json!([]), "ok")))
        .expect(1)
        .mount(&harness.server)
        .await;

    let query = Query::new().push("page", 1).push_opt("q", None::<&str>);
    let response = harness
        .app
        .client
        .get::<serde_json::Value>("/user/emails", &query)
        .await
        .expect("request succeeds");
    assert!(response.success);

    let requests = harness.server.received_requests().await.expect("recording");
    let url = &requests.first().expect("one request").url;
    assert_eq!(url.query(), Some("page=1"));
}

#[tokio::test]
async fn bearer_header_attached_when_credential_stored() {
    let harness = Harness::start().await;
    harness.storage.set(keys::AUTH_TOKEN, "tok-42");

    Mock::given(method("GET"))
        .and(path("/api/user/profile"))
        .and(header("authorization", "Bearer tok-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, json!({}), "")))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness
        .app
        .client
        .get::<serde_json::Value>("/user/profile", &Query::new())
        .await
        .expect("request succeeds");
}

#[tokio::test]
async fn caller_headers_merge_last_and_win() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/emails/send"))
        .and(header("x-api-key", "mk-1"))
        .and(header("content-type", "application/vnd.mailcove+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, json!({}), "")))
        .expect(1)
        .mount(&harness.server)
        .await;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert("x-api-key", "mk-1".parse().expect("valid header"));
    // Caller-supplied content-type overrides the synthesized JSON one.
    headers.insert(
        "content-type",
        "application/vnd.mailcove+json".parse().expect("valid header"),
    );
    harness
        .app
        .client
        .post_with_headers::<serde_json::Value, _>(
            "/v1/emails/send",
            &json!({"to": "x@example.com"}),
            headers,
        )
        .await
        .expect("request succeeds");
}

#[tokio::test]
async fn machine_api_carries_its_key_instead_of_the_bearer_credential() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/verification-codes"))
        .and(header("x-api-key", "mk-7"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, json!([]), "")))
        .expect(1)
        .mount(&harness.server)
        .await;

    let machine = mailcove_client::api::MachineApi::new(
        harness.app.client.clone(),
        secrecy::SecretString::from("mk-7"),
    );
    let response = machine
        .list_verification_codes(&Query::new().push("pageSize", 10))
        .await
        .expect("request succeeds");
    assert!(response.success);
}

#[tokio::test]
async fn unauthorized_clears_storage_and_fires_hook_once() {
    let harness = Harness::start().await;
    harness.seed_session("tok-dead");

    Mock::given(method("DELETE"))
        .and(path("/api/user/emails/9"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&harness.server)
        .await;

    let error = harness
        .app
        .client
        .delete::<serde_json::Value>("/user/emails/9")
        .await
        .expect_err("401 surfaces as error");

    assert!(matches!(error, ApiError::Unauthorized));
    assert_eq!(error.to_string(), "session expired, please log in again");
    // Both persisted keys are gone and the redirect fired exactly once.
    assert_eq!(harness.storage.get(keys::AUTH_TOKEN), None);
    assert_eq!(harness.storage.get(keys::AUTH_USER), None);
    assert_eq!(harness.navigator.paths(), vec!["/auth/login".to_string()]);
}

#[tokio::test]
async fn non_success_status_maps_to_transport_error() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/emails"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&harness.server)
        .await;

    let error = harness
        .app
        .client
        .get::<serde_json::Value>("/user/emails", &Query::new())
        .await
        .expect_err("503 surfaces as error");

    match error {
        ApiError::Transport { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "unavailable");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_maps_to_timeout_error() {
    let harness = Harness::start_with_timeout(Duration::from_millis(100)).await;

    Mock::given(method("GET"))
        .and(path("/api/user/emails"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(0, json!([]), ""))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&harness.server)
        .await;

    let error = harness
        .app
        .client
        .get::<serde_json::Value>("/user/emails", &Query::new())
        .await
        .expect_err("timeout surfaces as error");

    assert!(matches!(error, ApiError::Timeout));
    assert_eq!(
        error.to_string(),
        "request timed out, please try again later"
    );
}

#[tokio::test]
async fn malformed_envelope_maps_to_decode_error() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&harness.server)
        .await;

    let error = harness
        .app
        .client
        .get::<serde_json::Value>("/user/emails", &Query::new())
        .await
        .expect_err("bad body surfaces as error");

    assert!(matches!(error, ApiError::Decode(_)));
}

#[tokio::test]
async fn upload_sends_multipart_without_json_content_type() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/user/attachments"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            0,
            json!({"url": "/files/a.txt", "filename": "a.txt", "size": 5}),
            "",
        )))
        .expect(1)
        .mount(&harness.server)
        .await;

    let response = harness
        .app
        .client
        .upload::<serde_json::Value>(
            "/user/attachments",
            "a.txt",
            b"hello".to_vec(),
            &Query::new().push("kind", "attachment"),
        )
        .await
        .expect("upload succeeds");
    assert!(response.success);

    let requests = harness.server.received_requests().await.expect("recording");
    let content_type = requests
        .first()
        .expect("one request")
        .headers
        .get("content-type")
        .expect("content type present")
        .to_str()
        .expect("ascii header");
    assert!(content_type.starts_with("multipart/form-data"));
}
