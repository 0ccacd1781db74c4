//! Error types for wxpush

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {reason} (body: {body})")]
    Decode { reason: String, body: String },

    #[error("WeChat API error {code}: {message}")]
    Platform { code: i64, message: String },

    #[error("Access token is empty")]
    EmptyToken,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Longest slice of a response body carried in an error message.
pub const MAX_BODY_EXCERPT: usize = 512;

/// First [`MAX_BODY_EXCERPT`] bytes of a body, cut on a char boundary.
pub(crate) fn body_excerpt(text: &str) -> String {
    if text.len() <= MAX_BODY_EXCERPT {
        return text.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… ({} bytes total)", &text[..end], text.len())
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(transport_detail(err))
    }
}

/// Render a reqwest error with its cause chain. The URL is stripped since
/// the delivery URL carries the access token.
pub(crate) fn transport_detail(err: reqwest::Error) -> String {
    use std::error::Error as _;

    let err = err.without_url();
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Build a decode error keeping (a bounded excerpt of) the raw body.
    pub fn decode(reason: impl std::fmt::Display, body: &str) -> Self {
        Error::Decode {
            reason: reason.to_string(),
            body: body_excerpt(body),
        }
    }

    /// True for errors reported by the platform itself rather than the transport.
    pub fn is_platform(&self) -> bool {
        matches!(self, Error::Platform { .. })
    }
}
