//! One lookup run: query every portal, build the report, deliver it.

use carfines_api::TicketSource;

use crate::notify::{Dispatcher, NotificationChannel, NotifyError};
use crate::report::{build_report, format_portal_block};

/// Queries `sources` one after another and renders the combined report.
///
/// A failing portal only affects its own block.
pub async fn collect_report<T: TicketSource>(plate: &str, sources: &[T]) -> String {
    let mut blocks = Vec::with_capacity(sources.len());

    for source in sources {
        tracing::info!("Querying {} for {}", source.name(), plate);
        let outcome = source.get_tickets(plate).await;
        match &outcome {
            Ok(tickets) => tracing::info!("{}: {} ticket(s) found", source.name(), tickets.len()),
            Err(e) => tracing::error!("{}: lookup failed: {}", source.name(), e),
        }
        blocks.push(format_portal_block(source.name(), plate, &outcome));
    }

    build_report(blocks)
}

/// Builds the report for `plate` and sends it through `dispatcher`.
pub async fn notify<T, C>(
    plate: &str,
    sources: &[T],
    dispatcher: &Dispatcher<C>,
) -> Result<(), NotifyError>
where
    T: TicketSource,
    C: NotificationChannel,
{
    let report = collect_report(plate, sources).await;
    let chunks = dispatcher.dispatch(&report).await?;
    tracing::info!("Report for {} delivered in {} message(s)", plate, chunks);
    Ok(())
}
