//! Template message delivery.

use tracing::debug;

use super::client::{WechatClient, TEMPLATE_SEND_PATH};
use super::types::{AccessToken, ApiResult, MessageRequest, TemplateMessage};
use crate::error::{Error, Result};

impl WechatClient {
    /// Send one template message.
    ///
    /// A non-zero `errcode` is returned as `Ok`; only transport and decode
    /// failures are errors. An empty token fails before any request is made.
    pub async fn send_message(
        &self,
        token: AccessToken,
        request: &MessageRequest,
    ) -> Result<ApiResult> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }

        // serialized once: logged here, sent as-is
        let body = serde_json::to_string(&TemplateMessage::from(request))?;
        debug!(body = %body, "Template message payload");

        let text = self
            .post_body(
                TEMPLATE_SEND_PATH,
                &[("access_token", token.as_str())],
                body,
            )
            .await?;
        debug!(response = %text, "Template send response");

        serde_json::from_str::<ApiResult>(&text).map_err(|e| Error::decode(e, &text))
    }
}
