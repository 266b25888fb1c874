//! Error types for the portal clients.

use std::time::Duration;

/// Errors returned while acquiring a CAPTCHA token.
///
/// The portal clients never interpret these beyond reporting them; the
/// solver implementation decides which variant applies.
#[derive(thiserror::Error, Debug)]
pub enum CaptchaError {
    /// The solving service could not be reached.
    #[error("captcha service request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The solving service answered with an error code.
    #[error("captcha service rejected the request: {0}")]
    Rejected(String),
    /// No token arrived before the polling deadline.
    #[error("captcha not solved within {0:?}")]
    Timeout(Duration),
    /// The solving service answered with something we could not read.
    #[error("unexpected captcha service response: {0}")]
    Decode(String),
}

/// Errors that abort a single portal lookup.
///
/// Every step of a portal's protocol maps its failure to one of these, so
/// the caller can report the portal as failed and move on to the next one.
#[derive(thiserror::Error, Debug)]
pub enum PortalError {
    /// The CAPTCHA token could not be acquired.
    #[error("captcha acquisition failed: {0}")]
    Captcha(#[from] CaptchaError),
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The portal answered with a non-success status and a body snippet.
    #[error("request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A configured portal URL does not parse.
    #[error("invalid portal url: {0}")]
    InvalidUrl(String),
    /// A session token required by the query form is absent from the landing page.
    #[error("missing session field `{0}` in landing page")]
    MetadataMissing(&'static str),
    /// The response payload is not the document the portal is expected to send.
    #[error("failed to decode portal response: {0}")]
    Decode(String),
    /// One ticket carried a field that could not be converted.
    #[error("ticket {ticket}: {message}")]
    TicketField { ticket: String, message: String },
}

impl PortalError {
    pub(crate) fn ticket_field(ticket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TicketField {
            ticket: ticket.into(),
            message: message.into(),
        }
    }
}
