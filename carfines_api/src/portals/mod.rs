//! One client per supported portal. Their protocols share nothing beyond
//! the [`TicketSource`](crate::TicketSource) contract.

pub mod buenos_aires;
pub mod capital_federal;

pub use self::buenos_aires::BuenosAiresClient;
pub use self::capital_federal::{CapitalFederalClient, SessionTokens};
