//! Wire schema of the Buenos Aires province infractions API.

use serde::Deserialize;

/// Top-level document returned by the infractions query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaTicketsResponse {
    /// Number of tickets the portal says the plate has.
    pub total_infracciones: u64,

    /// Raw ticket entries, decoded into [`BaTicket`] only once the count
    /// says there is debt. The portal omits the array when the count is zero.
    #[serde(default)]
    pub infracciones: Vec<serde_json::Value>,
}

/// One ticket ("acta") entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaTicket {
    pub nro_acta: String,

    /// Total owed, as a decimal amount of pesos.
    pub importe_total: f64,

    #[serde(default)]
    pub infracciones: Vec<BaViolation>,

    /// Epoch milliseconds.
    pub fecha_infraccion: i64,

    /// Epoch milliseconds.
    pub fecha_vencimiento: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BaViolation {
    pub descripcion: String,
}
