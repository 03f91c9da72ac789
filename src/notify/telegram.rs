/// Telegram Bot API notification sink
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::{Result, ScannerError};
use crate::notify::NotificationSink;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

/// Sends alerts through `sendMessage`; failures are reported, never retried
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        config.ensure_present()?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(TelegramNotifier {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ScannerError::NotificationFailed(format!("Telegram request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Telegram response status: {}, body: {}", status, body);

        let parsed: Option<SendMessageResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(resp) if status.is_success() && resp.ok => {
                let preview: String = text.chars().take(50).collect();
                info!("✓ Telegram alert sent: {}...", preview);
                Ok(())
            }
            Some(resp) => Err(ScannerError::NotificationFailed(format!(
                "Telegram error ({}): {}",
                status,
                resp.description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(ScannerError::NotificationFailed(format!(
                "Telegram returned HTTP {} with unreadable body",
                status
            ))),
        }
    }
}
