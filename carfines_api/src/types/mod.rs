mod ticket;
pub use self::ticket::{amount_to_cents, local_datetime_from_millis, Ticket};
pub(crate) use self::ticket::join_violations;

mod buenos_aires;
pub use self::buenos_aires::{BaTicket, BaTicketsResponse, BaViolation};

mod capital_federal;
pub use self::capital_federal::{AjaxCommand, CabaTicketBlob, CabaViolation};
