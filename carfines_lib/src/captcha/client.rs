//! 2captcha reCAPTCHA v2 solver.
//!
//! Solving is a two-step protocol: the challenge is submitted to `in.php`,
//! which answers with a task id, and `res.php` is then polled with that id
//! until a worker has produced the token.

use std::time::Duration;

use carfines_api::{CaptchaError, CaptchaSolver};
use tokio::time::{sleep, Instant};

use super::types::TwoCaptchaResponse;

/// Request timeout for each call to the service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing of the result polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Wait before the first poll; workers rarely finish sooner.
    pub initial_delay: Duration,
    pub poll_interval: Duration,
    /// Overall deadline, measured from submission.
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(20),
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Solver bound to one portal's site key and page URL.
pub struct TwoCaptchaSolver {
    client: reqwest::Client,
    api_key: String,
    site_key: String,
    page_url: String,
    base_url: String,
    polling: PollingConfig,
}

impl TwoCaptchaSolver {
    /// Create a solver against the production 2captcha API.
    pub fn new(api_key: String, site_key: String, page_url: String) -> Result<Self, CaptchaError> {
        Self::with_base_url("https://2captcha.com", api_key, site_key, page_url)
    }

    /// Create a solver with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        base_url: &str,
        api_key: String,
        site_key: String,
        page_url: String,
    ) -> Result<Self, CaptchaError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            site_key,
            page_url,
            base_url: base_url.trim_end_matches('/').to_string(),
            polling: PollingConfig::default(),
        })
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    async fn call(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<TwoCaptchaResponse, CaptchaError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(CaptchaError::Decode(format!("HTTP {}: {}", status, snippet)));
        }

        serde_json::from_str(&body).map_err(|e| {
            CaptchaError::Decode(format!("Failed to deserialize response: {} | body: {}", e, body))
        })
    }

    /// Submits the challenge and returns the task id.
    async fn submit(&self) -> Result<String, CaptchaError> {
        let resp = self
            .call(
                "in.php",
                &[
                    ("key", self.api_key.as_str()),
                    ("method", "userrecaptcha"),
                    ("googlekey", self.site_key.as_str()),
                    ("pageurl", self.page_url.as_str()),
                    ("json", "1"),
                ],
            )
            .await?;

        if !resp.is_ok() {
            return Err(CaptchaError::Rejected(resp.error_message()));
        }
        Ok(resp.request)
    }

    /// Returns `Ok(None)` while the task is still being worked on.
    async fn poll(&self, task_id: &str) -> Result<Option<String>, CaptchaError> {
        let resp = self
            .call(
                "res.php",
                &[
                    ("key", self.api_key.as_str()),
                    ("action", "get"),
                    ("id", task_id),
                    ("json", "1"),
                ],
            )
            .await?;

        if resp.is_ok() {
            Ok(Some(resp.request))
        } else if resp.is_not_ready() {
            Ok(None)
        } else {
            Err(CaptchaError::Rejected(resp.error_message()))
        }
    }
}

impl CaptchaSolver for TwoCaptchaSolver {
    async fn solve(&self) -> Result<String, CaptchaError> {
        let started = Instant::now();
        let task_id = self.submit().await?;
        tracing::debug!("captcha task {} submitted for {}", task_id, self.page_url);

        sleep(self.polling.initial_delay).await;
        loop {
            if let Some(token) = self.poll(&task_id).await? {
                tracing::info!(
                    "captcha task {} solved in {:.1}s",
                    task_id,
                    started.elapsed().as_secs_f64()
                );
                return Ok(token);
            }
            if started.elapsed() + self.polling.poll_interval > self.polling.timeout {
                tracing::warn!("captcha task {} timed out", task_id);
                return Err(CaptchaError::Timeout(self.polling.timeout));
            }
            sleep(self.polling.poll_interval).await;
        }
    }
}
