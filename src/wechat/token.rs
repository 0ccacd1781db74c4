//! Access token retrieval via the stable token endpoint.

use tracing::{debug, info};

use super::client::{WechatClient, STABLE_TOKEN_PATH};
use super::types::{AccessToken, AccessTokenResponse, ApiResult, Credentials, TokenRequest};
use crate::error::{Error, Result};

impl WechatClient {
    /// Exchange app id and secret for an access token.
    ///
    /// Issues exactly one request and never retries. An empty `access_token`
    /// in an otherwise well-formed reply is returned as-is; the send step
    /// rejects it.
    pub async fn fetch_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        info!(appid = %credentials.application_id, "Requesting access token");

        let request = TokenRequest::from(credentials);
        let text = self.post_json(STABLE_TOKEN_PATH, &[], &request).await?;

        let token = parse_token_response(&text)?;
        debug!(expires_in = token.expires_in, "Access token received");
        Ok(token)
    }
}

fn parse_token_response(text: &str) -> Result<AccessToken> {
    match serde_json::from_str::<AccessTokenResponse>(text) {
        Ok(resp) => Ok(resp.into()),
        Err(decode_err) => {
            // failures come back as an errcode envelope with HTTP 200
            if let Ok(envelope) = serde_json::from_str::<ApiResult>(text) {
                if !envelope.is_success() {
                    return Err(Error::Platform {
                        code: envelope.code,
                        message: envelope.message,
                    });
                }
            }
            Err(Error::decode(decode_err, text))
        }
    }
}
