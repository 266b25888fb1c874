//! Ciudad de Buenos Aires portal.
//!
//! Each lookup is a fresh submission of the portal's own query form. The
//! landing page is fetched first to collect the session tokens the form
//! would post, then the form is submitted together with a solved CAPTCHA.
//! The answer is an AJAX command envelope whose second command carries the
//! rendered results as an HTML fragment, and every ticket in that fragment
//! embeds its details as JSON in a `data-json` attribute.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use scraper::{Html, Selector};

use crate::{
    client::{build_http_client, fetch_text, truncate_body},
    portal::TicketSource,
    types::{amount_to_cents, join_violations, AjaxCommand, CabaTicketBlob, Ticket},
    CaptchaSolver, PortalError,
};

const FORM_ID: &str = "gcaba_infracciones_form";
/// Literal the server expects in `captcha_response` when reCAPTCHA is used.
const CAPTCHA_RESPONSE_MARKER: &str = "Google no captcha";

const TICKET_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const DUE_DATE_FORMAT: &str = "%d-%m-%Y";

const MANUAL_CHECK_DESCRIPTION: &str = "Desconocido - Verificación manual requerida";
const MANUAL_CHECK_AMOUNT_IN_CENTS: i64 = 100;

static CAPTCHA_SID: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[name="captcha_sid"]"#).expect("invalid selector: captcha_sid")
});

static CAPTCHA_TOKEN: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[name="captcha_token"]"#).expect("invalid selector: captcha_token")
});

static FORM_BUILD_ID: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"form#gcaba-infracciones-form input[name="form_build_id"]"#)
        .expect("invalid selector: form_build_id")
});

static NO_DEBT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#descarga_libre_deuda").expect("invalid selector: descarga_libre_deuda")
});

static TICKET_CHECKBOX: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[type="checkbox"][name="actas[]"]"#).expect("invalid selector: actas")
});

/// Session tokens scraped from the landing page form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub captcha_sid: String,
    pub captcha_token: String,
    pub form_build_id: String,
}

/// Client for the city infractions form.
pub struct CapitalFederalClient<S> {
    base_url: String,
    api_url: String,
    solver: S,
}

impl<S: CaptchaSolver> CapitalFederalClient<S> {
    /// `base_url` is the landing page holding the form, `api_url` the
    /// endpoint the form posts to.
    pub fn new(base_url: &str, api_url: &str, solver: S) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_url: api_url.to_string(),
            solver,
        }
    }
}

impl<S: CaptchaSolver> TicketSource for CapitalFederalClient<S> {
    fn name(&self) -> &str {
        "Capital Federal"
    }

    async fn get_tickets(&self, plate: &str) -> Result<Vec<Ticket>, PortalError> {
        let http = build_http_client(false)?;

        let landing = fetch_text(http.get(&self.base_url)).await?;
        let tokens = parse_session_tokens(&landing)?;
        tracing::debug!("Capital Federal session form_build_id={}", tokens.form_build_id);

        let captcha = self.solver.solve().await?;

        let form = submission_form(plate, &tokens, &captcha);
        let body = fetch_text(
            http.post(&self.api_url)
                .header("x-requested-with", "XMLHttpRequest")
                .form(&form),
        )
        .await?;

        let fragment = extract_results_fragment(&body)?;
        parse_tickets_fragment(&fragment)
    }
}

/// Extracts the three session tokens the query form needs.
pub fn parse_session_tokens(landing_html: &str) -> Result<SessionTokens, PortalError> {
    let doc = Html::parse_document(landing_html);
    let value_of = |selector: &Selector, field: &'static str| {
        doc.select(selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or(PortalError::MetadataMissing(field))
    };

    Ok(SessionTokens {
        captcha_sid: value_of(&CAPTCHA_SID, "captcha_sid")?,
        captcha_token: value_of(&CAPTCHA_TOKEN, "captcha_token")?,
        form_build_id: value_of(&FORM_BUILD_ID, "form_build_id")?,
    })
}

/// Form fields in the order the portal's own form posts them.
pub fn submission_form<'a>(
    plate: &'a str,
    tokens: &'a SessionTokens,
    captcha: &'a str,
) -> [(&'static str, &'a str); 10] {
    [
        ("tipo_consulta", "Dominio"),
        ("dominio", plate),
        ("tipo_doc", "DNI"),
        ("doc", ""),
        ("form_build_id", &tokens.form_build_id),
        ("captcha_sid", &tokens.captcha_sid),
        ("captcha_token", &tokens.captcha_token),
        ("captcha_response", CAPTCHA_RESPONSE_MARKER),
        ("g-recaptcha-response", captcha),
        ("form_id", FORM_ID),
    ]
}

/// Pulls the results HTML out of the AJAX envelope.
pub fn extract_results_fragment(body: &str) -> Result<String, PortalError> {
    let commands: Vec<AjaxCommand> = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            "Failed to parse Capital Federal envelope: {} | body: {}",
            e,
            truncate_body(body)
        );
        PortalError::Decode(e.to_string())
    })?;

    commands
        .get(1)
        .and_then(|command| command.data.as_ref())
        .and_then(|data| data.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            PortalError::Decode(format!(
                "expected results fragment in second command, got {} commands",
                commands.len()
            ))
        })
}

/// Maps the results fragment to tickets. The "libre deuda" download link
/// only appears when the plate owes nothing.
pub fn parse_tickets_fragment(fragment: &str) -> Result<Vec<Ticket>, PortalError> {
    let blobs: Vec<Option<String>> = {
        let doc = Html::parse_fragment(fragment);
        if doc.select(&NO_DEBT).next().is_some() {
            return Ok(Vec::new());
        }
        doc.select(&TICKET_CHECKBOX)
            .map(|input| input.value().attr("data-json").map(str::to_string))
            .collect()
    };

    blobs
        .into_iter()
        .enumerate()
        .map(|(index, blob)| match blob {
            Some(json) => map_blob(index, &json),
            // Tickets under review come without data and must be checked by hand.
            None => manual_check_ticket(index),
        })
        .collect()
}

fn map_blob(index: usize, json: &str) -> Result<Ticket, PortalError> {
    let blob: CabaTicketBlob = serde_json::from_str(json).map_err(|e| {
        PortalError::ticket_field(format!("#{}", index), format!("malformed data-json: {}", e))
    })?;

    let amount_in_cents = amount_to_cents(blob.monto_acta).ok_or_else(|| {
        PortalError::ticket_field(&blob.numero_acta, format!("invalid amount {}", blob.monto_acta))
    })?;
    let date = NaiveDateTime::parse_from_str(&blob.fecha_acta, TICKET_DATE_FORMAT).map_err(|e| {
        PortalError::ticket_field(
            &blob.numero_acta,
            format!("invalid date {:?}: {}", blob.fecha_acta, e),
        )
    })?;
    let due_date = match blob.fecha_vencimiento.as_deref() {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT).map_err(|e| {
            PortalError::ticket_field(&blob.numero_acta, format!("invalid due date {:?}: {}", raw, e))
        })?),
        None => None,
    };

    Ok(Ticket {
        description: join_violations(
            blob.infracciones
                .iter()
                .map(|v| format!("{} - {}", v.lugar, v.description)),
        ),
        amount_in_cents,
        ticket_number: blob.numero_acta,
        date,
        due_date,
    })
}

fn manual_check_ticket(index: usize) -> Result<Ticket, PortalError> {
    let ticket_number = format!("manual-check-{}", index);
    let far_future = NaiveDate::from_ymd_opt(9999, 12, 31)
        .ok_or_else(|| PortalError::ticket_field(&ticket_number, "far-future date out of range"))?;
    let date = far_future
        .and_hms_opt(23, 59, 0)
        .ok_or_else(|| PortalError::ticket_field(&ticket_number, "far-future time out of range"))?;

    Ok(Ticket {
        description: MANUAL_CHECK_DESCRIPTION.to_string(),
        amount_in_cents: MANUAL_CHECK_AMOUNT_IN_CENTS,
        ticket_number,
        date,
        due_date: Some(far_future),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"<html><body>
        <form id="search-form"><input type="hidden" name="form_build_id" value="form-wrong"></form>
        <form id="gcaba-infracciones-form" action="/infracciones">
          <input type="hidden" name="captcha_sid" value="812345">
          <input type="hidden" name="captcha_token" value="abc-token">
          <input type="hidden" name="form_build_id" value="form-XYZ">
        </form>
        </body></html>"#;

    #[test]
    fn session_tokens_are_scoped_to_the_query_form() {
        let tokens = parse_session_tokens(LANDING).unwrap();
        assert_eq!(tokens.captcha_sid, "812345");
        assert_eq!(tokens.captcha_token, "abc-token");
        assert_eq!(tokens.form_build_id, "form-XYZ");
    }

    #[test]
    fn each_missing_token_is_named() {
        let without_sid = LANDING.replace(r#"name="captcha_sid""#, r#"name="other""#);
        assert!(matches!(
            parse_session_tokens(&without_sid),
            Err(PortalError::MetadataMissing("captcha_sid"))
        ));

        let without_token = LANDING.replace(r#"name="captcha_token""#, r#"name="other""#);
        assert!(matches!(
            parse_session_tokens(&without_token),
            Err(PortalError::MetadataMissing("captcha_token"))
        ));

        let without_build = LANDING.replace(r#"value="form-XYZ""#, "");
        assert!(matches!(
            parse_session_tokens(&without_build),
            Err(PortalError::MetadataMissing("form_build_id"))
        ));
    }

    #[test]
    fn form_fields_follow_the_portal_order() {
        let tokens = SessionTokens {
            captcha_sid: "1".into(),
            captcha_token: "t".into(),
            form_build_id: "form-1".into(),
        };
        let form = submission_form("ABC123", &tokens, "solved");
        let keys: Vec<&str> = form.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "tipo_consulta",
                "dominio",
                "tipo_doc",
                "doc",
                "form_build_id",
                "captcha_sid",
                "captcha_token",
                "captcha_response",
                "g-recaptcha-response",
                "form_id",
            ]
        );
        assert_eq!(form[7].1, "Google no captcha");
        assert_eq!(form[8].1, "solved");
    }

    #[test]
    fn envelope_second_command_holds_fragment() {
        let body = r#"[{"command":"settings","settings":{}},{"command":"insert","data":"<div>ok</div>"}]"#;
        assert_eq!(extract_results_fragment(body).unwrap(), "<div>ok</div>");
    }

    #[test]
    fn envelope_without_fragment_is_a_decode_error() {
        let body = r#"[{"command":"settings"}]"#;
        assert!(matches!(
            extract_results_fragment(body),
            Err(PortalError::Decode(_))
        ));
        assert!(matches!(
            extract_results_fragment("<html>maintenance</html>"),
            Err(PortalError::Decode(_))
        ));
    }

    #[test]
    fn no_debt_marker_yields_no_tickets() {
        let fragment = r#"<div><a id="descarga_libre_deuda" class="btn" href="/libre-deuda">Descargar</a></div>"#;
        assert!(parse_tickets_fragment(fragment).unwrap().is_empty());
    }

    #[test]
    fn blob_is_mapped_to_ticket() {
        let fragment = r#"<table><tr><td>
            <input type="checkbox" name="actas[]" data-json="{&quot;numeroActa&quot;:&quot;Q12345&quot;,&quot;fechaActa&quot;:&quot;2024-07-02 09:15&quot;,&quot;montoActa&quot;:45000.75,&quot;fechaVencimiento&quot;:&quot;01-08-2024&quot;,&quot;infracciones&quot;:[{&quot;desc&quot;:&quot;Estacionamiento prohibido&quot;,&quot;lugar&quot;:&quot;AV. CORRIENTES 1234&quot;},{&quot;desc&quot;:&quot;Falta de VTV&quot;,&quot;lugar&quot;:&quot;AV. CORRIENTES 1234&quot;}]}">
            </td></tr></table>"#;
        let tickets = parse_tickets_fragment(fragment).unwrap();
        assert_eq!(tickets.len(), 1);
        let ticket = &tickets[0];
        assert_eq!(ticket.ticket_number, "Q12345");
        assert_eq!(ticket.amount_in_cents, 4_500_075);
        assert_eq!(ticket.date.to_string(), "2024-07-02 09:15:00");
        assert_eq!(ticket.due_date.unwrap().to_string(), "2024-08-01");
        assert_eq!(
            ticket.description,
            "AV. CORRIENTES 1234 - Estacionamiento prohibido / AV. CORRIENTES 1234 - Falta de VTV"
        );
    }

    #[test]
    fn missing_blob_becomes_manual_check() {
        let fragment = r#"<form>
            <input type="checkbox" name="actas[]" data-json="{&quot;numeroActa&quot;:&quot;Q1&quot;,&quot;fechaActa&quot;:&quot;2024-07-02 09:15&quot;,&quot;montoActa&quot;:10,&quot;fechaVencimiento&quot;:&quot;01-08-2024&quot;,&quot;infracciones&quot;:[]}">
            <input type="checkbox" name="actas[]" value="pendiente">
            </form>"#;
        let tickets = parse_tickets_fragment(fragment).unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].description, "");

        let manual = &tickets[1];
        assert_eq!(manual.ticket_number, "manual-check-1");
        assert_eq!(manual.amount_in_cents, 100);
        assert_eq!(manual.description, MANUAL_CHECK_DESCRIPTION);
        assert_eq!(manual.date.to_string(), "9999-12-31 23:59:00");
        assert_eq!(manual.due_date.unwrap().to_string(), "9999-12-31");
    }

    #[test]
    fn other_checkboxes_are_ignored() {
        let fragment = r#"<input type="checkbox" name="acepto" value="1">"#;
        assert!(parse_tickets_fragment(fragment).unwrap().is_empty());
    }

    #[test]
    fn string_amount_is_a_field_error() {
        let fragment = r#"<input type="checkbox" name="actas[]" data-json="{&quot;numeroActa&quot;:&quot;Q9&quot;,&quot;fechaActa&quot;:&quot;2024-07-02 09:15&quot;,&quot;montoActa&quot;:&quot;10&quot;}">"#;
        assert!(matches!(
            parse_tickets_fragment(fragment),
            Err(PortalError::TicketField { .. })
        ));
    }

    #[test]
    fn bad_date_names_the_ticket() {
        let fragment = r#"<input type="checkbox" name="actas[]" data-json="{&quot;numeroActa&quot;:&quot;Q7&quot;,&quot;fechaActa&quot;:&quot;02/07/2024&quot;,&quot;montoActa&quot;:10}">"#;
        match parse_tickets_fragment(fragment) {
            Err(PortalError::TicketField { ticket, .. }) => assert_eq!(ticket, "Q7"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
