//! Request and response records for the WeChat Official Account API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Grant type required by the stable token endpoint.
pub const GRANT_TYPE: &str = "client_credential";

pub const FIELD_TITLE: &str = "title";
pub const FIELD_CONTENT: &str = "content";

/// Application id and secret of an Official Account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub application_id: String,
    secret: String,
}

impl Credentials {
    pub fn new(application_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("application_id", &self.application_id)
            .field("secret", &"***")
            .finish()
    }
}

/// Short-lived token returned by the stable token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    /// Lifetime in seconds as reported by the platform. Not tracked.
    pub expires_in: i64,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in: i64) -> Self {
        Self {
            value: value.into(),
            expires_in,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &format_args!("<{} chars>", self.value.len()))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// A template message addressed to one follower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    /// OpenID of the recipient.
    pub recipient_id: String,
    pub template_id: String,
    /// Page opened when the message is tapped.
    pub redirect_url: Option<String>,
    /// Template placeholder name -> display text.
    pub fields: BTreeMap<String, String>,
}

impl MessageRequest {
    /// Request filling the `title` and `content` placeholders.
    pub fn new(
        recipient_id: impl Into<String>,
        template_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_TITLE.to_string(), title.into());
        fields.insert(FIELD_CONTENT.to_string(), content.into());

        Self {
            recipient_id: recipient_id.into(),
            template_id: template_id.into(),
            redirect_url: None,
            fields,
        }
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.redirect_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }
}

/// `errcode`/`errmsg` envelope returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult {
    #[serde(rename = "errcode")]
    pub code: i64,
    #[serde(rename = "errmsg")]
    pub message: String,
}

impl ApiResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Turn a non-zero result into [`Error::Platform`].
    pub fn into_result(self) -> Result<ApiResult> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Platform {
                code: self.code,
                message: self.message,
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    appid: &'a str,
    secret: &'a str,
    grant_type: &'static str,
    force_refresh: bool,
}

impl<'a> From<&'a Credentials> for TokenRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            appid: &credentials.application_id,
            secret: credentials.secret(),
            grant_type: GRANT_TYPE,
            // let the platform hand back its cached token
            force_refresh: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

impl From<AccessTokenResponse> for AccessToken {
    fn from(resp: AccessTokenResponse) -> Self {
        AccessToken::new(resp.access_token, resp.expires_in)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TemplateMessage<'a> {
    touser: &'a str,
    template_id: &'a str,
    url: &'a str,
    data: BTreeMap<&'a str, TemplateField<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TemplateField<'a> {
    value: &'a str,
}

impl<'a> From<&'a MessageRequest> for TemplateMessage<'a> {
    fn from(request: &'a MessageRequest) -> Self {
        Self {
            touser: &request.recipient_id,
            template_id: &request.template_id,
            url: request.redirect_url.as_deref().unwrap_or(""),
            data: request
                .fields
                .iter()
                .map(|(name, value)| (name.as_str(), TemplateField { value: value.as_str() }))
                .collect(),
        }
    }
}
