//! Tests for the push command

use httpmock::prelude::*;
use serde_json::json;

use wxpush::commands::{push, PushArgs, PushOutcome};
use wxpush::{Config, Error};

fn config(base_url: String) -> Config {
    Config {
        app_id: "wx123".to_string(),
        secret: "s3cr3t".to_string(),
        api_base: base_url,
        ..Config::default()
    }
}

fn args() -> PushArgs {
    PushArgs {
        user_id: "U1".to_string(),
        template_id: "TPL1".to_string(),
        title: "Hello".to_string(),
        content: "World".to_string(),
        url: Some("https://example.com/detail".to_string()),
    }
}

#[tokio::test]
async fn test_push_end_to_end_request_shapes() {
    let server = MockServer::start_async().await;

    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/cgi-bin/stable_token")
            .json_body(json!({
                "appid": "wx123",
                "secret": "s3cr3t",
                "grant_type": "client_credential",
                "force_refresh": false
            }));
        then.status(200)
            .json_body(json!({ "access_token": "T1", "expires_in": 7200 }));
    });
    let send_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/cgi-bin/message/template/send")
            .query_param("access_token", "T1")
            .json_body(json!({
                "touser": "U1",
                "template_id": "TPL1",
                "url": "https://example.com/detail",
                "data": {
                    "title": { "value": "Hello" },
                    "content": { "value": "World" }
                }
            }));
        then.status(200).json_body(json!({ "errcode": 0, "errmsg": "ok" }));
    });

    let outcome = push::run(&config(server.base_url()), &args()).await.unwrap();

    assert!(outcome.is_delivered());
    token_mock.assert_calls(1);
    send_mock.assert_calls(1);
}

#[tokio::test]
async fn test_push_invalid_credential_is_rejection_not_error() {
    let server = MockServer::start_async().await;

    server.mock(|when, then| {
        when.method(POST).path("/cgi-bin/stable_token");
        then.status(200)
            .json_body(json!({ "access_token": "T1", "expires_in": 7200 }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/cgi-bin/message/template/send");
        then.status(200)
            .json_body(json!({ "errcode": 40001, "errmsg": "invalid credential" }));
    });

    let outcome = push::run(&config(server.base_url()), &args()).await.unwrap();

    match outcome {
        PushOutcome::Rejected(result) => {
            assert_eq!(result.code, 40001);
            assert_eq!(result.message, "invalid credential");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_push_unreachable_token_endpoint() {
    let err = push::run(&config("http://127.0.0.1:9".to_string()), &args())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_push_token_http_error_stops_before_send() {
    let server = MockServer::start_async().await;

    server.mock(|when, then| {
        when.method(POST).path("/cgi-bin/stable_token");
        then.status(503).body("unavailable");
    });
    let send_mock = server.mock(|when, then| {
        when.method(POST).path("/cgi-bin/message/template/send");
        then.status(200).json_body(json!({ "errcode": 0, "errmsg": "ok" }));
    });

    let err = push::run(&config(server.base_url()), &args()).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("503"));
    send_mock.assert_calls(0);
}
