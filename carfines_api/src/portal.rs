//! The uniform contract every portal client fulfils.

use std::future::Future;

use crate::{
    portals::{BuenosAiresClient, CapitalFederalClient},
    types::Ticket,
    CaptchaSolver, PortalError,
};

/// Something that can look up the outstanding tickets of a plate.
///
/// An empty vector means the portal reported no debt; it is never used to
/// signal a failure.
pub trait TicketSource: Send + Sync {
    /// Display name used in reports and logs.
    fn name(&self) -> &str;

    fn get_tickets(
        &self,
        plate: &str,
    ) -> impl Future<Output = Result<Vec<Ticket>, PortalError>> + Send;
}

/// The closed set of supported portals.
pub enum Portal<S> {
    BuenosAires(BuenosAiresClient<S>),
    CapitalFederal(CapitalFederalClient<S>),
}

impl<S: CaptchaSolver> TicketSource for Portal<S> {
    fn name(&self) -> &str {
        match self {
            Self::BuenosAires(client) => client.name(),
            Self::CapitalFederal(client) => client.name(),
        }
    }

    async fn get_tickets(&self, plate: &str) -> Result<Vec<Ticket>, PortalError> {
        match self {
            Self::BuenosAires(client) => client.get_tickets(plate).await,
            Self::CapitalFederal(client) => client.get_tickets(plate).await,
        }
    }
}

impl<S> From<BuenosAiresClient<S>> for Portal<S> {
    fn from(client: BuenosAiresClient<S>) -> Self {
        Self::BuenosAires(client)
    }
}

impl<S> From<CapitalFederalClient<S>> for Portal<S> {
    fn from(client: CapitalFederalClient<S>) -> Self {
        Self::CapitalFederal(client)
    }
}
