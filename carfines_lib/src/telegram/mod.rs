//! Telegram Bot API channel for delivering reports.

pub mod client;
pub mod types;

pub use client::TelegramChannel;
