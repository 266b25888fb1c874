use serde::{Deserialize, Serialize};

/// Envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn error_message(&self) -> String {
        match (&self.error_code, &self.description) {
            (Some(code), Some(desc)) => format!("{}: {}", code, desc),
            (None, Some(desc)) => desc.clone(),
            (Some(code), None) => format!("error code {}", code),
            (None, None) => "unknown error".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}

/// The subset of `getMe` we log.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}
