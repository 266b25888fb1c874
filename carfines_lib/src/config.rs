//! Run configuration, assembled once at startup and passed into constructors.

use crate::error::ConfigError;

pub const CAPTCHA_SOLVER_API_KEY: &str = "CAPTCHA_SOLVER_API_KEY";
pub const CAPTCHA_SOLVER_BASE_URL: &str = "CAPTCHA_SOLVER_BASE_URL";
pub const CAPTCHA_SOLVER_BA_SITE_KEY: &str = "CAPTCHA_SOLVER_BA_SITE_KEY";
pub const BA_BASE_URL: &str = "BA_BASE_URL";
pub const BA_API_URL: &str = "BA_API_URL";
pub const CAPTCHA_SOLVER_CABA_SITE_KEY: &str = "CAPTCHA_SOLVER_CABA_SITE_KEY";
pub const CABA_BASE_URL: &str = "CABA_BASE_URL";
pub const CABA_API_URL: &str = "CABA_API_URL";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";

/// Which portals the run should query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalSelection {
    pub capital_federal: bool,
    pub buenos_aires: bool,
}

impl Default for PortalSelection {
    fn default() -> Self {
        Self {
            capital_federal: true,
            buenos_aires: true,
        }
    }
}

/// Endpoints and CAPTCHA site key of one portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub captcha_site_key: String,
    /// Landing page; also the page URL reported to the CAPTCHA service.
    pub base_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
    /// Overrides the Bot API host. Used for testing.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub captcha_api_key: String,
    /// Overrides the CAPTCHA service host. Used for testing.
    pub captcha_base_url: Option<String>,
    /// `None` when the portal is disabled.
    pub capital_federal: Option<PortalConfig>,
    /// `None` when the portal is disabled.
    pub buenos_aires: Option<PortalConfig>,
    pub telegram: TelegramConfig,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env(selection: PortalSelection) -> Result<Self, ConfigError> {
        Self::from_lookup(selection, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as missing. Portal keys are only required for the
    /// portals in `selection`, and every missing key is reported at once.
    pub fn from_lookup<F>(selection: PortalSelection, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !selection.capital_federal && !selection.buenos_aires {
            return Err(ConfigError::NoPortalsEnabled);
        }

        let mut missing = Vec::new();
        let mut require = |key: &'static str| match lookup(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let captcha_api_key = require(CAPTCHA_SOLVER_API_KEY);
        let capital_federal = selection.capital_federal.then(|| PortalConfig {
            captcha_site_key: require(CAPTCHA_SOLVER_CABA_SITE_KEY),
            base_url: require(CABA_BASE_URL),
            api_url: require(CABA_API_URL),
        });
        let buenos_aires = selection.buenos_aires.then(|| PortalConfig {
            captcha_site_key: require(CAPTCHA_SOLVER_BA_SITE_KEY),
            base_url: require(BA_BASE_URL),
            api_url: require(BA_API_URL),
        });
        let bot_token = require(TELEGRAM_BOT_TOKEN);
        let raw_chat_id = require(TELEGRAM_CHAT_ID);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let chat_id = raw_chat_id
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                key: TELEGRAM_CHAT_ID,
                message: e.to_string(),
            })?;

        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            captcha_api_key,
            captcha_base_url: optional(CAPTCHA_SOLVER_BASE_URL),
            capital_federal,
            buenos_aires,
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                api_url: optional(TELEGRAM_API_URL),
            },
        })
    }
}
