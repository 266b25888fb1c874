//! Response shape of the 2captcha `in.php` / `res.php` endpoints (`json=1`).

use serde::Deserialize;

/// Status `1` carries the task id (submit) or the solved token (poll).
/// Status `0` carries an error code in `request`, or `CAPCHA_NOT_READY`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwoCaptchaResponse {
    pub status: i64,
    pub request: String,
    #[serde(default)]
    pub error_text: Option<String>,
}

impl TwoCaptchaResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 1
    }

    pub fn is_not_ready(&self) -> bool {
        self.request == NOT_READY
    }

    /// Error code with the human readable text when the service sent one.
    pub fn error_message(&self) -> String {
        match &self.error_text {
            Some(text) if !text.is_empty() => format!("{} ({})", self.request, text),
            _ => self.request.clone(),
        }
    }
}

/// Misspelling is the service's own.
pub const NOT_READY: &str = "CAPCHA_NOT_READY";
