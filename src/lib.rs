//! WeChat Template Message Push Library
//!
//! Sends a single template message to one follower of a WeChat Official Account:
//! - Exchanges app id and secret for an access token (stable token endpoint)
//! - Delivers a `title`/`content` template message with that token
//! - Reports the platform's `errcode`/`errmsg` verdict

pub mod commands;
pub mod config;
pub mod error;
pub mod wechat;

// Re-export common types
pub use config::Config;
pub use error::{Error, Result};
pub use wechat::{AccessToken, ApiResult, Credentials, MessageRequest, WechatClient};
