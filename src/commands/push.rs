//! Push one template message
//!
//! Fetches an access token, then sends a single template message with it.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::wechat::{ApiResult, MessageRequest, WechatClient};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

pub const USAGE: &str = "Usage:
  wxpush --appID <AppID> --secret <Secret> --userID <UserID> \\
         --templateID <TemplateID> --title <Title> --content <Content>
Run with --help for all options.";

/// Validated parameters of a single push.
#[derive(Debug, Clone, Default)]
pub struct PushArgs {
    pub user_id: String,
    pub template_id: String,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
}

impl PushArgs {
    pub fn message_request(&self) -> MessageRequest {
        let request = MessageRequest::new(
            self.user_id.trim(),
            self.template_id.trim(),
            self.title.as_str(),
            self.content.as_str(),
        );
        match &self.url {
            Some(url) => request.with_redirect_url(url.trim()),
            None => request,
        }
    }
}

/// How the platform answered the send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered(ApiResult),
    Rejected(ApiResult),
}

impl From<ApiResult> for PushOutcome {
    fn from(result: ApiResult) -> Self {
        if result.is_success() {
            PushOutcome::Delivered(result)
        } else {
            PushOutcome::Rejected(result)
        }
    }
}

impl PushOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PushOutcome::Delivered(_))
    }

    pub fn result(&self) -> &ApiResult {
        match self {
            PushOutcome::Delivered(r) | PushOutcome::Rejected(r) => r,
        }
    }

    /// Console lines describing the platform's verdict.
    pub fn report(&self) -> String {
        let headline = match self {
            PushOutcome::Delivered(_) => "✓ Message sent",
            PushOutcome::Rejected(_) => "✗ Message rejected by WeChat",
        };
        let result = self.result();
        format!(
            "{}\n  errcode: {}\n  errmsg:  {}",
            headline, result.code, result.message
        )
    }
}

/// Process exit status: success only when the message was delivered.
pub fn exit_status<E>(result: &std::result::Result<PushOutcome, E>) -> u8 {
    match result {
        Ok(PushOutcome::Delivered(_)) => EXIT_SUCCESS,
        Ok(PushOutcome::Rejected(_)) | Err(_) => EXIT_FAILURE,
    }
}

/// Usage text worth printing after an error, if the error came from bad parameters.
pub fn usage_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::InvalidArgument(_) => Some(USAGE),
        _ => None,
    }
}

/// Check that every required value is present, naming each missing flag.
pub fn validate(config: &Config, args: &PushArgs) -> Result<()> {
    let required = [
        ("--appID", config.app_id.as_str()),
        ("--secret", config.secret.as_str()),
        ("--userID", args.user_id.as_str()),
        ("--templateID", args.template_id.as_str()),
        ("--title", args.title.as_str()),
        ("--content", args.content.as_str()),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(flag, _)| *flag)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )))
    }
}

/// Fetch a token and send the message. The send is skipped if the fetch fails.
pub async fn run(config: &Config, args: &PushArgs) -> Result<PushOutcome> {
    validate(config, args)?;

    let request = args.message_request();
    info!(
        user = %request.recipient_id,
        template = %request.template_id,
        "Sending template message"
    );

    let client = WechatClient::new(config)?;
    let token = client.fetch_token(&config.credentials()).await?;
    info!("Access token acquired");

    let result = client.send_message(token, &request).await?;
    if result.is_success() {
        info!(errcode = result.code, errmsg = %result.message, "Message delivered");
    } else {
        warn!(errcode = result.code, errmsg = %result.message, "Message rejected by WeChat");
    }

    Ok(PushOutcome::from(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wechat::client::{STABLE_TOKEN_PATH, TEMPLATE_SEND_PATH};
    use httpmock::prelude::*;
    use serde_json::json;

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
            url: None,
        }
    }

    #[test]
    fn validate_lists_every_missing_flag() {
        let config = Config::default();
        let args = PushArgs {
            title: "Hello".to_string(),
            ..PushArgs::default()
        };

        let err = validate(&config, &args).unwrap_err();
        let msg = err.to_string();

        assert!(matches!(err, Error::InvalidArgument(_)));
        for flag in ["--appID", "--secret", "--userID", "--templateID", "--content"] {
            assert!(msg.contains(flag), "{flag} missing from '{msg}'");
        }
        assert!(!msg.contains("--title"));
    }

    #[test]
    fn validate_treats_whitespace_as_missing() {
        let config = config("http://localhost".to_string());
        let args = PushArgs {
            content: "   ".to_string(),
            ..args()
        };

        assert!(validate(&config, &args).is_err());
    }

    #[test]
    fn exit_status_follows_outcome() {
        let delivered: Result<PushOutcome> = Ok(PushOutcome::Delivered(ApiResult {
            code: 0,
            message: "ok".to_string(),
        }));
        let rejected: Result<PushOutcome> = Ok(PushOutcome::Rejected(ApiResult {
            code: 40001,
            message: "invalid credential".to_string(),
        }));
        let failed: Result<PushOutcome> = Err(Error::Transport("refused".to_string()));

        assert_eq!(exit_status(&delivered), EXIT_SUCCESS);
        assert_eq!(exit_status(&rejected), EXIT_FAILURE);
        assert_eq!(exit_status(&failed), EXIT_FAILURE);
    }

    #[test]
    fn report_shows_code_and_message() {
        let rejected = PushOutcome::from(ApiResult {
            code: 43004,
            message: "require subscribe".to_string(),
        });

        let report = rejected.report();

        assert!(report.starts_with("✗"));
        assert!(report.contains("errcode: 43004"));
        assert!(report.contains("require subscribe"));

        let delivered = PushOutcome::from(ApiResult {
            code: 0,
            message: "ok".to_string(),
        });
        assert!(delivered.report().starts_with("✓ Message sent"));
    }

    #[test]
    fn usage_hint_only_for_invalid_arguments() {
        let invalid = Error::InvalidArgument("missing required parameters: --title".to_string());
        let usage = usage_hint(&invalid).unwrap();
        assert!(usage.contains("--appID"));
        assert!(usage.contains("--templateID"));

        assert!(usage_hint(&Error::EmptyToken).is_none());
        assert!(usage_hint(&Error::Transport("refused".to_string())).is_none());
    }

    #[test]
    fn message_request_applies_redirect_url() {
        let args = PushArgs {
            url: Some(" https://example.com ".to_string()),
            ..args()
        };

        let request = args.message_request();

        assert_eq!(request.redirect_url.as_deref(), Some("https://example.com"));
        assert_eq!(request.fields["title"], "Hello");
        assert_eq!(request.fields["content"], "World");
    }

    #[tokio::test]
    async fn run_delivers_message() {
        let server = MockServer::start_async().await;

        let token_mock = server.mock(|when, then| {
            when.method(POST).path(STABLE_TOKEN_PATH);
            then.status(200)
                .json_body(json!({ "access_token": "T1", "expires_in": 7200 }));
        });
        let send_mock = server.mock(|when, then| {
            when.method(POST)
                .path(TEMPLATE_SEND_PATH)
                .query_param("access_token", "T1");
            then.status(200).json_body(json!({ "errcode": 0, "errmsg": "ok" }));
        });

        let outcome = run(&config(server.base_url()), &args()).await.unwrap();

        assert!(outcome.is_delivered());
        assert_eq!(outcome.result().code, 0);
        token_mock.assert_calls(1);
        send_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn run_reports_rejection() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path(STABLE_TOKEN_PATH);
            then.status(200)
                .json_body(json!({ "access_token": "T1", "expires_in": 7200 }));
        });
        server.mock(|when, then| {
            when.method(POST).path(TEMPLATE_SEND_PATH);
            then.status(200)
                .json_body(json!({ "errcode": 43004, "errmsg": "require subscribe" }));
        });

        let outcome = run(&config(server.base_url()), &args()).await.unwrap();

        assert_eq!(
            outcome,
            PushOutcome::Rejected(ApiResult {
                code: 43004,
                message: "require subscribe".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn run_skips_send_when_token_fetch_fails() {
        let server = MockServer::start_async().await;

        let token_mock = server.mock(|when, then| {
            when.method(POST).path(STABLE_TOKEN_PATH);
            then.status(200).body("garbage");
        });
        let send_mock = server.mock(|when, then| {
            when.method(POST).path(TEMPLATE_SEND_PATH);
            then.status(200).json_body(json!({ "errcode": 0, "errmsg": "ok" }));
        });

        let err = run(&config(server.base_url()), &args()).await.unwrap_err();

        assert!(matches!(err, Error::Decode { .. }));
        token_mock.assert_calls(1);
        send_mock.assert_calls(0);
    }

    #[tokio::test]
    async fn run_empty_token_never_reaches_delivery() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path(STABLE_TOKEN_PATH);
            then.status(200)
                .json_body(json!({ "access_token": "", "expires_in": 7200 }));
        });
        let send_mock = server.mock(|when, then| {
            when.method(POST).path(TEMPLATE_SEND_PATH);
            then.status(200).json_body(json!({ "errcode": 0, "errmsg": "ok" }));
        });

        let err = run(&config(server.base_url()), &args()).await.unwrap_err();

        assert!(matches!(err, Error::EmptyToken));
        send_mock.assert_calls(0);
    }

    #[tokio::test]
    async fn run_validates_before_any_request() {
        let server = MockServer::start_async().await;

        let token_mock = server.mock(|when, then| {
            when.method(POST).path(STABLE_TOKEN_PATH);
            then.status(200)
                .json_body(json!({ "access_token": "T1", "expires_in": 7200 }));
        });

        let mut config = config(server.base_url());
        config.secret.clear();

        let err = run(&config, &args()).await.unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        token_mock.assert_calls(0);
    }
}
