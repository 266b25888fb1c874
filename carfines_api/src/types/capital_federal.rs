//! Wire schema of the Ciudad de Buenos Aires infractions form.

use serde::Deserialize;

/// One command of the AJAX envelope the form submission answers with.
///
/// The portal sends a two-element array; the second command carries the
/// rendered results fragment in `data`.
#[derive(Debug, Deserialize)]
pub struct AjaxCommand {
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Per-ticket JSON blob embedded in the `data-json` attribute of each
/// ticket checkbox.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabaTicketBlob {
    pub numero_acta: String,

    /// `YYYY-MM-DD HH:MM`
    pub fecha_acta: String,

    /// Decimal amount of pesos. Sent as a JSON number.
    pub monto_acta: f64,

    /// `DD-MM-YYYY`
    #[serde(default)]
    pub fecha_vencimiento: Option<String>,

    #[serde(default)]
    pub infracciones: Vec<CabaViolation>,
}

#[derive(Debug, Deserialize)]
pub struct CabaViolation {
    #[serde(rename = "desc", alias = "descripcion")]
    pub description: String,

    pub lugar: String,
}
