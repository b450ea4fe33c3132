//! Execution tests against a local mock server: success shapes, error
//! mapping, and transport failures.

use std::time::Duration;

use httpmock::prelude::*;
use mailindex_client::{Client, Error};
use serde_json::json;

fn test_client(server: &MockServer) -> Client {
    Client::builder("ck", "cs")
        .base_url(server.base_url())
        .credentials("tok", "ts", "42")
        .build()
        .unwrap()
}

#[tokio::test]
async fn executes_a_dictionary_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/accounts/42")
                .header_exists("authorization");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"id": "42", "first_name": "Ada"}));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_account().unwrap();
    let account = client.execute(&request).await.unwrap();

    assert_eq!(account["id"], "42");
    assert_eq!(account["first_name"], "Ada");
    mock.assert_async().await;
}

#[tokio::test]
async fn executes_a_list_request_with_query_parameters() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/accounts/42/messages")
                .query_param("subject", "invoice")
                .query_param("limit", "10");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([{"subject": "invoice #1"}, {"subject": "invoice #2"}]));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_messages().unwrap().subject("invoice").limit(10);
    let messages = client.execute(request.request()).await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["subject"], "invoice #1");
    mock.assert_async().await;
}

#[tokio::test]
async fn executes_a_text_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/accounts/42/files/f1/content")
                .query_param("as_link", "1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!("https://files.example.com/f1"));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_file_content_url("f1").unwrap();
    let url = client.execute(&request).await.unwrap();

    assert_eq!(url, "https://files.example.com/f1");
}

#[tokio::test]
async fn wrong_top_level_shape_is_a_shape_mismatch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42/files/f1/content");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"success": true}));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_file_content_url("f1").unwrap();
    let error = client.execute(&request).await.unwrap_err();

    match error {
        Error::ShapeMismatch { expected, found } => {
            assert_eq!(expected, "string");
            assert_eq!(found, "object");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn object_for_declared_array_is_a_shape_mismatch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42/messages");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"messages": []}));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_messages().unwrap();
    let error = client.execute(request.request()).await.unwrap_err();

    assert!(matches!(
        error,
        Error::ShapeMismatch {
            expected: "array",
            found: "object"
        }
    ));
}

#[tokio::test]
async fn unauthorized_carries_the_server_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({"type": "error", "value": "Invalid credentials"}));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_account().unwrap();
    let error = client.execute(&request).await.unwrap_err();

    match error {
        Error::Authorization { message, .. } => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn business_errors_carry_the_server_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/accounts/42/sync");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"type": "error", "value": "no sources to sync"}));
        })
        .await;

    let client = test_client(&server);
    let request = client.force_sync().unwrap();
    let error = client.execute(&request).await.unwrap_err();

    match error {
        Error::Api { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "no sources to sync");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn error_body_on_success_status_is_still_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42/sync");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"type": "error", "value": "sync backend unavailable"}));
        })
        .await;

    let client = test_client(&server);
    let request = client.get_sync_status().unwrap();
    let error = client.execute(&request).await.unwrap_err();

    match error {
        Error::Api { status, message } => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(message, "sync backend unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_failures_map_to_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42");
            then.status(503);
        })
        .await;

    let client = test_client(&server);
    let request = client.get_account().unwrap();
    let error = client.execute(&request).await.unwrap_err();

    assert!(matches!(error, Error::Server { status } if status.as_u16() == 503));
}

#[tokio::test]
async fn undecodable_success_body_is_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>not json</html>");
        })
        .await;

    let client = test_client(&server);
    let request = client.get_account().unwrap();
    let error = client.execute(&request).await.unwrap_err();

    assert!(matches!(error, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn timeouts_surface_as_transport_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({}))
                .delay(Duration::from_millis(500));
        })
        .await;

    let client = Client::builder("ck", "cs")
        .base_url(server.base_url())
        .credentials("tok", "ts", "42")
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let request = client.get_account().unwrap();
    let error = client.execute(&request).await.unwrap_err();

    match error {
        Error::Transport(source) => assert!(source.is_timeout()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn form_parameters_are_posted_as_the_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/accounts/42/messages/m1/flags")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("flag_seen=1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"success": true}));
        })
        .await;

    let client = test_client(&server);
    let flags = mailindex_client::MessageFlags {
        seen: Some(true),
        ..mailindex_client::MessageFlags::new()
    };
    let request = client.update_message_flags("m1", flags).unwrap();
    let response = client.execute(&request).await.unwrap();

    assert_eq!(response["success"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_executions_share_one_session() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts/42/contacts");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"matches": [], "total": 0}));
        })
        .await;

    let client = test_client(&server);
    let first = client.get_contacts().unwrap();
    let second = client.get_contacts().unwrap();
    let (a, b) = tokio::join!(
        client.execute(first.request()),
        client.execute(second.request())
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(mock.hits_async().await, 2);
}
