use async_trait::async_trait;
use serde_json::json;

use crate::config::XmppConfig;
use crate::error::AppResult;

/// Outbound chat delivery. The daemon never speaks XMPP itself; it hands
/// messages to the gateway over HTTP.
#[async_trait]
pub trait XmppSender: Send + Sync {
    /// Send `body` as a chat message to every address in `recipients`.
    async fn send_message(&self, recipients: &[String], body: &str) -> AppResult<()>;
}

/// `XmppSender` backed by the gateway's HTTP send endpoint.
pub struct GatewayClient {
    config: XmppConfig,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(config: XmppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl XmppSender for GatewayClient {
    async fn send_message(&self, recipients: &[String], body: &str) -> AppResult<()> {
        let mut request = self.client.post(&self.config.send_url).json(&json!({
            "to": recipients,
            "body": body,
        }));

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        response.error_for_status()?;

        tracing::debug!("Sent chat message to {} recipient(s)", recipients.len());
        Ok(())
    }
}
