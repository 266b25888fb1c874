//! Clients for the government portals that publish traffic tickets.
//!
//! Each portal has its own request sequence and payload shape; all of them
//! are normalized to [`types::Ticket`] behind the [`TicketSource`] contract.

mod captcha;
mod client;
mod errors;
mod portal;
pub mod portals;
pub mod types;
pub mod user_agent;
pub use self::captcha::CaptchaSolver;
pub use self::errors::{CaptchaError, PortalError};
pub use self::portal::{Portal, TicketSource};
pub use self::portals::{BuenosAiresClient, CapitalFederalClient};
