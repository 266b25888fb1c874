use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{ApiResponse, BotUser, SendMessageRequest};
use crate::notify::{NotificationChannel, NotifyError};

/// Request timeout for Bot API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PARSE_MODE: &str = "MarkdownV2";

/// Sends messages to one chat through a bot.
pub struct TelegramChannel {
    client: reqwest::Client,
    token: String,
    chat_id: i64,
    base_url: String,
}

impl TelegramChannel {
    /// Create a channel against the public Bot API.
    pub fn new(token: String, chat_id: i64) -> Result<Self, NotifyError> {
        Self::with_base_url("https://api.telegram.org", token, chat_id)
    }

    /// Create a channel with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, token: String, chat_id: i64) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            token,
            chat_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Checks the token by calling `getMe`.
    pub async fn verify(&self) -> Result<BotUser, NotifyError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        let user: BotUser = read_result(response).await?;
        tracing::info!(
            "Telegram bot verified: {} ({})",
            user.username.as_deref().unwrap_or("unnamed"),
            user.id
        );
        Ok(user)
    }
}

/// Unwraps the Bot API envelope, turning `ok: false` and non-2xx answers into
/// [`NotifyError::Rejected`].
async fn read_result<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NotifyError> {
    let status = response.status();
    let body = response.text().await?;

    let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            let snippet: String = body.chars().take(200).collect();
            tracing::error!("Unexpected Telegram response ({}): {}", status, snippet);
            return Err(NotifyError::Rejected(format!("HTTP {}: {}", status, e)));
        }
    };

    if !status.is_success() || !envelope.ok {
        return Err(NotifyError::Rejected(envelope.error_message()));
    }

    envelope
        .result
        .ok_or_else(|| NotifyError::Rejected("response without result".to_string()))
}

impl NotificationChannel for TelegramChannel {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: self.chat_id,
            text,
            parse_mode: PARSE_MODE,
            disable_web_page_preview: false,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?;

        read_result::<serde_json::Value>(response).await?;
        Ok(())
    }
}
