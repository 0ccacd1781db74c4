//! WeChat Official Account API client.
//!
//! Two calls, always made in order:
//! - `fetch_token`: app id + secret -> access token (stable token endpoint)
//! - `send_message`: access token + template message -> `errcode`/`errmsg`

pub mod client;
pub mod message;
pub mod token;
pub mod types;

pub use client::WechatClient;
pub use types::{AccessToken, ApiResult, Credentials, MessageRequest};
