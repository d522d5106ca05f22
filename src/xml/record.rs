//! Retrieved markup into the flat record used for reporting and storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::field::{field_text, get_field, is_present, items};
use crate::core::{CfdiError, MONEDA_NACIONAL};

use super::tree::xml_to_value;

/// Normalized summary of a retrieved CFDI.
///
/// Every scalar is a string, empty when the document lacks it. Serializes
/// with the field names downstream consumers expect (`UUID`, `blobpath`,
/// `global`, the rest PascalCase).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfdiRecord {
    /// Fiscal folio from `Complemento/TimbreFiscalDigital/@UUID`.
    #[serde(rename = "UUID")]
    pub uuid: String,
    pub fecha: String,
    pub tipo_de_comprobante: String,
    pub serie: String,
    pub folio: String,
    /// Caller-supplied storage locator.
    #[serde(rename = "blobpath")]
    pub blob_path: String,
    /// Caller-supplied status flag, 1 when not given.
    pub estado: i64,
    pub emisor: EmisorRecord,
    pub receptor: ReceptorRecord,
    pub conceptos: Vec<ConceptoRecord>,
    pub impuestos: ImpuestosRecord,
    pub totales: TotalesRecord,
    /// Whether the document carries `InformacionGlobal`.
    #[serde(rename = "global")]
    pub global: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmisorRecord {
    pub rfc: String,
    pub nombre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceptorRecord {
    pub rfc: String,
    pub nombre: String,
    /// As found in the document, underscores included.
    #[serde(rename = "UsoCFDI")]
    pub uso_cfdi: String,
}

/// A line item reduced to the fields reports use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConceptoRecord {
    pub cantidad: String,
    pub clave_prod_serv: String,
    pub clave_unidad: String,
    pub unidad: String,
    pub descripcion: String,
    pub valor_unitario: String,
    pub importe: String,
    pub objeto_imp: String,
}

/// Document tax totals, `"0.00"` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImpuestosRecord {
    pub total_impuestos_trasladados: String,
    pub total_impuestos_retenidos: String,
}

impl Default for ImpuestosRecord {
    fn default() -> Self {
        Self {
            total_impuestos_trasladados: ZERO.to_string(),
            total_impuestos_retenidos: ZERO.to_string(),
        }
    }
}

/// Document amounts and payment terms. `Moneda` defaults to MXN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TotalesRecord {
    pub sub_total: String,
    pub moneda: String,
    pub total: String,
    pub forma_pago: String,
    pub metodo_pago: String,
}

const ZERO: &str = "0.00";

/// Parse retrieved CFDI markup into a [`CfdiRecord`].
///
/// `blob_path` is stored as given; `estado` defaults to 1. Malformed markup
/// fails with [`CfdiError::Parse`] wrapping the reader's message.
pub fn from_cfdi_xml(
    xml: &str,
    blob_path: &str,
    estado: Option<i64>,
) -> Result<CfdiRecord, CfdiError> {
    let tree = xml_to_value(xml)?;
    let record = CfdiRecord::from_value(&tree, blob_path, estado);
    debug!(
        uuid = %record.uuid,
        conceptos = record.conceptos.len(),
        "parsed CFDI record"
    );
    Ok(record)
}

impl CfdiRecord {
    /// Build a record from an already converted tree (see
    /// [`xml_to_value`](super::xml_to_value)). Single line items are
    /// accepted in place of a one-element list.
    pub fn from_value(root: &Value, blob_path: &str, estado: Option<i64>) -> Self {
        let c = Some(root);
        let s = |obj: Option<&Value>, name: &str| field_text(obj, name).unwrap_or_default();

        let timbre = get_field(get_field(c, "Complemento"), "TimbreFiscalDigital");
        let emisor = get_field(c, "Emisor");
        let receptor = get_field(c, "Receptor");
        let impuestos = get_field(c, "Impuestos");

        CfdiRecord {
            uuid: s(timbre, "UUID"),
            fecha: s(c, "Fecha"),
            tipo_de_comprobante: s(c, "TipoDeComprobante"),
            serie: s(c, "Serie"),
            folio: s(c, "Folio"),
            blob_path: blob_path.to_string(),
            estado: estado.unwrap_or(1),
            emisor: EmisorRecord {
                rfc: s(emisor, "Rfc"),
                nombre: s(emisor, "Nombre"),
            },
            receptor: ReceptorRecord {
                rfc: s(receptor, "Rfc"),
                nombre: s(receptor, "Nombre"),
                uso_cfdi: s(receptor, "UsoCFDI"),
            },
            conceptos: items(get_field(c, "Conceptos"), "Concepto")
                .into_iter()
                .map(|con| {
                    let con = Some(con);
                    ConceptoRecord {
                        cantidad: s(con, "Cantidad"),
                        clave_prod_serv: s(con, "ClaveProdServ"),
                        clave_unidad: s(con, "ClaveUnidad"),
                        unidad: s(con, "Unidad"),
                        descripcion: s(con, "Descripcion"),
                        valor_unitario: s(con, "ValorUnitario"),
                        importe: s(con, "Importe"),
                        objeto_imp: s(con, "ObjetoImp"),
                    }
                })
                .collect(),
            impuestos: ImpuestosRecord {
                total_impuestos_trasladados: field_text(impuestos, "TotalImpuestosTrasladados")
                    .unwrap_or_else(|| ZERO.to_string()),
                total_impuestos_retenidos: field_text(impuestos, "TotalImpuestosRetenidos")
                    .unwrap_or_else(|| ZERO.to_string()),
            },
            totales: TotalesRecord {
                sub_total: s(c, "SubTotal"),
                moneda: field_text(c, "Moneda").unwrap_or_else(|| MONEDA_NACIONAL.to_string()),
                total: s(c, "Total"),
                forma_pago: s(c, "FormaPago"),
                metodo_pago: s(c, "MetodoPago"),
            },
            global: is_present(get_field(c, "InformacionGlobal")),
        }
    }
}
