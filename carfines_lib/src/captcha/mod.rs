//! 2captcha client used to solve the portals' reCAPTCHA challenges.

pub mod client;
pub mod types;

pub use client::{PollingConfig, TwoCaptchaSolver};
