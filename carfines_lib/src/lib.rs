//! Library layer for the traffic ticket notifier: CAPTCHA solving, report
//! formatting, Telegram delivery, and configuration.
//!
//! Wraps the `carfines_api` portal clients and turns their results into a
//! chunked chat report.

pub mod captcha;
pub mod config;
pub mod error;
pub mod notifier;
pub mod notify;
pub mod report;
pub mod telegram;
pub mod validation;

pub use carfines_api;
pub use carfines_api::types;
pub use carfines_api::{
    BuenosAiresClient, CapitalFederalClient, CaptchaError, CaptchaSolver, Portal, PortalError,
    TicketSource,
};

pub use captcha::{PollingConfig, TwoCaptchaSolver};
pub use config::{Config, PortalConfig, PortalSelection, TelegramConfig};
pub use error::ConfigError;
pub use notifier::{collect_report, notify};
pub use notify::{Dispatcher, NotificationChannel, NotifyError, MAX_MESSAGE_LENGTH};
pub use telegram::TelegramChannel;
pub use validation::normalize_plate;
