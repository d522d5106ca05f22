//! Normalization of the authority's CFDI query listings.
//!
//! Listing responses arrive under `ListadoCfdi` or `Respuesta`, as an array
//! or as a single object, with keys in either capitalization convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::field::{get_field, one_or_many, text};

/// One entry of a CFDI query listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CfdiSummary {
    pub uuid: Option<String>,
    pub rfc_emisor: Option<String>,
    pub nombre_emisor: Option<String>,
    pub rfc_receptor: Option<String>,
    pub nombre_receptor: Option<String>,
    pub fecha_emision: Option<String>,
    pub fecha_certificacion: Option<String>,
    pub total: Option<String>,
    pub subtotal: Option<String>,
    pub descuento: Option<String>,
    pub moneda: Option<String>,
    pub tipo_cambio: Option<String>,
    pub tipo_comprobante: Option<String>,
    pub metodo_pago: Option<String>,
    pub forma_pago: Option<String>,
    /// `EstadoComprobante`, falling back to `Estado`. Kept as given: the
    /// authority reports it as a number or as text depending on the service.
    pub estado: Option<String>,
    pub efecto: Option<String>,
    pub uso_cfdi: Option<String>,
    pub serie: Option<String>,
    pub folio: Option<String>,
    /// Storage locator of the XML: `UrlXml`, `BlobPath` or `blobpath`.
    pub blobpath: Option<String>,
}

/// Map a query response into summaries, in listing order.
///
/// Returns an empty list when neither `ListadoCfdi` nor `Respuesta` holds
/// anything. Entries that are not objects are skipped.
pub fn normalize_listing(response: &Value) -> Vec<CfdiSummary> {
    let list = get_field(Some(response), "ListadoCfdi")
        .filter(|v| has_entries(v))
        .or_else(|| get_field(Some(response), "Respuesta"));
    let entries = one_or_many(list);

    debug!(entries = entries.len(), "normalizing CFDI listing");

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                warn!(index, "skipping non-object entry in CFDI listing");
                return None;
            }
            Some(summary(entry))
        })
        .collect()
}

fn has_entries(value: &Value) -> bool {
    match value {
        Value::Array(list) => !list.is_empty(),
        Value::Null => false,
        _ => true,
    }
}

fn summary(entry: &Value) -> CfdiSummary {
    let e = Some(entry);
    let field = |name: &str| text(get_field(e, name));

    CfdiSummary {
        uuid: field("Uuid"),
        rfc_emisor: field("RfcEmisor"),
        nombre_emisor: field("NombreEmisor"),
        rfc_receptor: field("RfcReceptor"),
        nombre_receptor: field("NombreReceptor"),
        fecha_emision: field("FechaEmision"),
        fecha_certificacion: field("FechaCertificacion"),
        total: field("Total"),
        subtotal: field("Subtotal"),
        descuento: field("Descuento"),
        moneda: field("Moneda"),
        tipo_cambio: field("TipoCambio"),
        tipo_comprobante: field("TipoComprobante"),
        metodo_pago: field("MetodoPago"),
        forma_pago: field("FormaPago"),
        estado: estado(entry),
        efecto: field("EfectoComprobante"),
        uso_cfdi: field("UsoCfdi"),
        serie: field("Serie"),
        folio: field("Folio"),
        blobpath: field("UrlXml")
            .or_else(|| field("BlobPath"))
            .or_else(|| entry.get("blobpath").and_then(|v| text(Some(v)))),
    }
}

/// Status keeps zero and `false`, which the generic coercion drops.
fn estado(entry: &Value) -> Option<String> {
    let raw = entry
        .get("EstadoComprobante")
        .or_else(|| entry.get("Estado"))?;
    match raw {
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => text(Some(other)),
    }
}
