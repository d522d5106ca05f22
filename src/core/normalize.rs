//! Construction boundary: loosely shaped JSON into the typed model.
//!
//! Runs once per document. Dual-case lookup, scalar coercion and singleton
//! handling all happen here so the chain, the validator and the serializer
//! only ever see a [`Comprobante`].

use serde_json::Value;

use super::error::CfdiError;
use super::field::{
    field_text, get_field, is_present, items, one_or_many, required_field_text, text,
};
use super::types::*;

impl Comprobante {
    /// Normalize a JSON document (PascalCase or camelCase keys, optionally
    /// wrapped in `comprobante`) into a [`Comprobante`].
    ///
    /// Only a non-object root is rejected; missing fields become empty or
    /// `None` and are left for [`validate_cfdi`](super::validate_cfdi) to report.
    pub fn from_json(raw: &Value) -> Result<Self, CfdiError> {
        let c = unwrap_root(raw).ok_or_else(|| {
            CfdiError::Input("the invoice structure is missing or is not an object".into())
        })?;
        let c = Some(c);

        Ok(Comprobante {
            serie: field_text(c, "Serie"),
            folio: field_text(c, "Folio"),
            fecha: required(c, "Fecha"),
            sello: field_text(c, "Sello"),
            forma_pago: field_text(c, "FormaPago"),
            no_certificado: field_text(c, "NoCertificado"),
            certificado: field_text(c, "Certificado"),
            condiciones_de_pago: field_text(c, "CondicionesDePago"),
            sub_total: required(c, "SubTotal"),
            descuento: field_text(c, "Descuento"),
            moneda: required(c, "Moneda"),
            tipo_cambio: field_text(c, "TipoCambio"),
            total: required(c, "Total"),
            tipo_de_comprobante: required(c, "TipoDeComprobante"),
            exportacion: required(c, "Exportacion"),
            metodo_pago: field_text(c, "MetodoPago"),
            lugar_expedicion: required(c, "LugarExpedicion"),
            confirmacion: field_text(c, "Confirmacion"),
            informacion_global: node(c, "InformacionGlobal").map(informacion_global),
            cfdi_relacionados: node(c, "CfdiRelacionados").map(cfdi_relacionados),
            emisor: node(c, "Emisor").map(emisor),
            receptor: node(c, "Receptor").map(receptor),
            conceptos: items(get_field(c, "Conceptos"), "Concepto")
                .into_iter()
                .map(concepto)
                .collect(),
            impuestos: node(c, "Impuestos").map(impuestos),
        })
    }

    /// Parse a JSON string and normalize it with [`Comprobante::from_json`].
    pub fn from_json_str(json: &str) -> Result<Self, CfdiError> {
        let raw: Value = serde_json::from_str(json)
            .map_err(|e| CfdiError::Input(format!("invalid JSON: {e}")))?;
        Self::from_json(&raw)
    }
}

/// The comprobante object itself, looking through a `comprobante` wrapper.
pub(crate) fn unwrap_root(raw: &Value) -> Option<&Value> {
    let inner = get_field(Some(raw), "Comprobante").filter(|v| v.is_object());
    inner.or(Some(raw)).filter(|v| v.is_object())
}

/// Value of an always-emitted position. Numbers count even when zero.
fn required(obj: Option<&Value>, name: &str) -> String {
    required_field_text(obj, name).unwrap_or_default()
}

fn node<'a>(obj: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    get_field(obj, name).filter(|v| is_present(Some(*v)))
}

fn informacion_global(ig: &Value) -> InformacionGlobal {
    let ig = Some(ig);
    InformacionGlobal {
        periodicidad: required(ig, "Periodicidad"),
        meses: required(ig, "Meses"),
        anio: required(ig, "Año"),
    }
}

fn cfdi_relacionados(rel: &Value) -> CfdiRelacionados {
    let rel = Some(rel);
    CfdiRelacionados {
        tipo_relacion: required(rel, "TipoRelacion"),
        uuids: one_or_many(get_field(rel, "CfdiRelacionado"))
            .into_iter()
            .map(|item| match item {
                Value::Object(_) => required(Some(item), "UUID"),
                scalar => text(Some(scalar)).unwrap_or_default(),
            })
            .collect(),
    }
}

fn emisor(em: &Value) -> Emisor {
    let em = Some(em);
    Emisor {
        rfc: required(em, "Rfc"),
        nombre: required(em, "Nombre"),
        regimen_fiscal: required(em, "RegimenFiscal"),
        fac_atr_adquirente: field_text(em, "FacAtrAdquirente"),
    }
}

fn receptor(re: &Value) -> Receptor {
    let re = Some(re);
    Receptor {
        rfc: required(re, "Rfc"),
        nombre: required(re, "Nombre"),
        domicilio_fiscal_receptor: required(re, "DomicilioFiscalReceptor"),
        residencia_fiscal: field_text(re, "ResidenciaFiscal"),
        num_reg_id_trib: field_text(re, "NumRegIdTrib"),
        regimen_fiscal_receptor: required(re, "RegimenFiscalReceptor"),
        uso_cfdi: required(re, "UsoCFDI"),
    }
}

fn concepto(con: &Value) -> Concepto {
    let con = Some(con);
    Concepto {
        clave_prod_serv: required(con, "ClaveProdServ"),
        no_identificacion: field_text(con, "NoIdentificacion"),
        cantidad: required(con, "Cantidad"),
        clave_unidad: required(con, "ClaveUnidad"),
        unidad: field_text(con, "Unidad"),
        descripcion: required(con, "Descripcion"),
        valor_unitario: required(con, "ValorUnitario"),
        importe: required(con, "Importe"),
        descuento: field_text(con, "Descuento"),
        objeto_imp: required(con, "ObjetoImp"),
        impuestos: node(con, "Impuestos").map(concepto_impuestos),
        cuenta_predial: one_or_many(get_field(con, "CuentaPredial"))
            .into_iter()
            .filter_map(|p| match p {
                Value::Object(_) => field_text(Some(p), "Numero"),
                scalar => text(Some(scalar)),
            })
            .collect(),
    }
}

fn concepto_impuestos(imp: &Value) -> ConceptoImpuestos {
    let imp = Some(imp);
    ConceptoImpuestos {
        traslados: node(imp, "Traslados").map(|t| {
            items(Some(t), "Traslado")
                .into_iter()
                .map(|t| {
                    let t = Some(t);
                    Traslado {
                        base: required(t, "Base"),
                        impuesto: required(t, "Impuesto"),
                        tipo_factor: TipoFactor::new(required(t, "TipoFactor")),
                        tasa_o_cuota: required_field_text(t, "TasaOCuota"),
                        importe: required_field_text(t, "Importe"),
                    }
                })
                .collect()
        }),
        retenciones: node(imp, "Retenciones").map(|r| {
            items(Some(r), "Retencion")
                .into_iter()
                .map(|r| {
                    let r = Some(r);
                    Retencion {
                        base: required(r, "Base"),
                        impuesto: required(r, "Impuesto"),
                        tipo_factor: TipoFactor::new(required(r, "TipoFactor")),
                        tasa_o_cuota: required(r, "TasaOCuota"),
                        importe: required(r, "Importe"),
                    }
                })
                .collect()
        }),
    }
}

fn impuestos(imp: &Value) -> Impuestos {
    let imp = Some(imp);
    Impuestos {
        total_impuestos_retenidos: field_text(imp, "TotalImpuestosRetenidos"),
        total_impuestos_trasladados: field_text(imp, "TotalImpuestosTrasladados"),
        retenciones: node(imp, "Retenciones").map(|r| {
            items(Some(r), "Retencion")
                .into_iter()
                .map(|r| RetencionGlobal {
                    impuesto: required(Some(r), "Impuesto"),
                    importe: required(Some(r), "Importe"),
                })
                .collect()
        }),
        traslados: node(imp, "Traslados").map(|t| {
            items(Some(t), "Traslado")
                .into_iter()
                .map(|t| {
                    let t = Some(t);
                    TrasladoGlobal {
                        base: required(t, "Base"),
                        impuesto: required(t, "Impuesto"),
                        tipo_factor: TipoFactor::new(required(t, "TipoFactor")),
                        tasa_o_cuota: required(t, "TasaOCuota"),
                        importe: required(t, "Importe"),
                    }
                })
                .collect()
        }),
    }
}
