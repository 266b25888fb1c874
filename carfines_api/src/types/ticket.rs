//! The canonical ticket record shared by every portal.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Offset of the portals' local time (Argentina, UTC-03:00) in milliseconds.
const PORTAL_UTC_OFFSET_MS: i64 = -3 * 60 * 60 * 1000;

/// One outstanding infraction, normalized from whatever the portal sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Violation entries joined with `" / "`. Empty when the portal lists none.
    pub description: String,

    /// Amount owed in cents. Never negative.
    pub amount_in_cents: i64,

    /// Portal-assigned identifier, or `manual-check-<index>` for placeholders.
    pub ticket_number: String,

    /// When the infraction happened, in portal local time.
    pub date: NaiveDateTime,

    /// Payment due date, when the portal exposes one.
    pub due_date: Option<NaiveDate>,
}

/// Converts a decimal amount to cents with `round(amount * 100)`.
///
/// Halves round away from zero, so `12.345` (whose product is exactly
/// `1234.5` in binary floating point) becomes `1235`. Returns `None` for
/// negative, non-finite, or out-of-range amounts.
pub fn amount_to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let cents = (amount * 100.0).round();
    if cents > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

/// Converts an epoch-milliseconds timestamp to portal local time.
pub fn local_datetime_from_millis(millis: i64) -> Option<NaiveDateTime> {
    let shifted = millis.checked_add(PORTAL_UTC_OFFSET_MS)?;
    DateTime::from_timestamp_millis(shifted).map(|dt| dt.naive_utc())
}

/// Joins violation fragments the way every portal report expects.
pub(crate) fn join_violations<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_half_away_from_zero() {
        assert_eq!(amount_to_cents(12.345), Some(1235));
    }

    #[test]
    fn cents_recover_from_binary_underflow() {
        // 0.29 * 100 is 28.999999999999996 in f64.
        assert_eq!(amount_to_cents(0.29), Some(29));
        assert_eq!(amount_to_cents(19.99), Some(1999));
    }

    #[test]
    fn cents_of_whole_amounts() {
        assert_eq!(amount_to_cents(0.0), Some(0));
        assert_eq!(amount_to_cents(1.0), Some(100));
        assert_eq!(amount_to_cents(1500.5), Some(150050));
    }

    #[test]
    fn cents_reject_invalid_amounts() {
        assert_eq!(amount_to_cents(-1.0), None);
        assert_eq!(amount_to_cents(f64::NAN), None);
        assert_eq!(amount_to_cents(f64::INFINITY), None);
    }

    #[test]
    fn millis_are_shifted_to_portal_time() {
        // 2024-03-01T02:00:00Z is still Feb 29 in Buenos Aires.
        let dt = local_datetime_from_millis(1_709_258_400_000).unwrap();
        assert_eq!(dt.to_string(), "2024-02-29 23:00:00");
    }

    #[test]
    fn join_violations_uses_slash_separator() {
        assert_eq!(join_violations(["a"]), "a");
        assert_eq!(join_violations(["a", "b", "c"]), "a / b / c");
        assert_eq!(join_violations(Vec::<String>::new()), "");
    }
}
