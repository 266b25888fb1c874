//! Plain-text report built from per-portal lookup results.
//!
//! The text is Spanish and uses `*` for bold; escaping for the transport
//! happens later, in [`crate::notify`].

use carfines_api::types::Ticket;
use carfines_api::PortalError;
use chrono::{NaiveDate, NaiveDateTime};

/// Renders cents as Argentine pesos: `123456` becomes `$1.234,56`.
pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let decimals = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}${},{:02}", sign, grouped, decimals)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_datetime(date: NaiveDateTime) -> String {
    format_date(date.date())
}

fn title(portal: &str, plate: &str) -> String {
    format!("Consulta de infracciones en {} ({}):", portal, plate)
}

fn ticket_line(ticket: &Ticket) -> String {
    let due = ticket
        .due_date
        .map(format_date)
        .unwrap_or_else(|| "sin fecha".to_string());
    format!(
        "• 💰 *{}* 🆔 {} 📕 {} 📅 {} ⏰ {}",
        format_money(ticket.amount_in_cents),
        ticket.ticket_number,
        ticket.description,
        format_datetime(ticket.date),
        due
    )
}

/// One portal's section of the report.
///
/// A failed lookup is stated as such instead of being shown as a clean record.
pub fn format_portal_block(
    portal: &str,
    plate: &str,
    outcome: &Result<Vec<Ticket>, PortalError>,
) -> String {
    let title = title(portal, plate);
    match outcome {
        Err(_) => format!("{} ⚠️ no se pudo completar la consulta", title),
        Ok(tickets) if tickets.is_empty() => format!("{} 🎉 sin multas", title),
        Ok(tickets) => {
            let total = tickets
                .iter()
                .fold(0i64, |acc, t| acc.saturating_add(t.amount_in_cents));
            let mut lines = Vec::with_capacity(tickets.len() + 1);
            lines.push(format!(
                "{} ❌ se encontraron *{}* multas por un total de *{}* 💰",
                title,
                tickets.len(),
                format_money(total)
            ));
            lines.extend(tickets.iter().map(ticket_line));
            lines.join("\n")
        }
    }
}

/// Joins portal blocks in the order given.
pub fn build_report<I, S>(blocks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    blocks
        .into_iter()
        .map(|b| b.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
