#![cfg(feature = "core")]

use cfdi::core::*;
use chrono::NaiveDate;
use serde_json::json;

fn emisor() -> Emisor {
    Emisor::new("EKU9003173C9", "ESCUELA KEMPER URGATE", "601")
}

fn receptor() -> Receptor {
    Receptor::new(
        "URE180429TM6",
        "UNIVERSIDAD ROBOTICA ESPAÑOLA",
        "86991",
        "601",
        "G03",
    )
}

fn concepto() -> Concepto {
    ConceptoBuilder::new("84111506", "1", "ACT", "Servicio de facturacion", "100.00", "100.00")
        .build()
}

fn builder() -> ComprobanteBuilder {
    ComprobanteBuilder::new("2024-06-15T10:30:00")
        .forma_pago("01")
        .metodo_pago("PUE")
        .lugar_expedicion("64000")
        .sub_total("100.00")
        .total("100.00")
        .emisor(emisor())
        .receptor(receptor())
        .add_concepto(concepto())
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

#[test]
fn builder_defaults() {
    let c = builder().build().unwrap();
    assert_eq!(c.moneda, "MXN");
    assert_eq!(c.tipo_de_comprobante, "I");
    assert_eq!(c.exportacion, "01");
    assert_eq!(c.conceptos[0].objeto_imp, "01");
    assert_eq!(c.sello, None);
    assert_eq!(c.no_certificado, None);
    assert_eq!(c.impuestos, None);
}

#[test]
fn builder_trims_and_collapses_blanks() {
    let c = builder()
        .serie("  ")
        .folio(" 123 ")
        .condiciones_de_pago("")
        .sub_total(" 100.00 ")
        .build()
        .unwrap();
    assert_eq!(c.serie, None);
    assert_eq!(c.folio.as_deref(), Some("123"));
    assert_eq!(c.condiciones_de_pago, None);
    assert_eq!(c.sub_total, "100.00");
}

#[test]
fn builder_reports_every_defect() {
    let err = ComprobanteBuilder::new("2024-06-15T10:30:00").build().unwrap_err();
    let CfdiError::Validation(msg) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(msg.contains("Comprobante.LugarExpedicion"));
    assert!(msg.contains("Comprobante.FormaPago"));
    assert!(msg.contains("Emisor"));
    assert!(msg.contains("Receptor"));
    assert!(msg.contains("Conceptos"));
}

#[test]
fn build_unchecked_skips_validation() {
    let c = ComprobanteBuilder::new("2024-06-15T10:30:00")
        .build_unchecked()
        .unwrap();
    assert!(c.emisor.is_none());
    assert!(!validate_cfdi(&c).is_valid());
}

#[test]
fn builder_rejects_oversized_folio() {
    let err = builder().folio("F".repeat(41)).build_unchecked().unwrap_err();
    assert!(matches!(err, CfdiError::Builder(_)));
}

#[test]
fn fecha_from_datetime() {
    let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
        .unwrap()
        .and_hms_opt(8, 3, 9)
        .unwrap();
    let c = builder().fecha_datetime(dt).build().unwrap();
    assert_eq!(c.fecha, "2024-01-05T08:03:09");
}

#[test]
fn concepto_builder_collects_taxes() {
    let c = ConceptoBuilder::new("50211503", "1", "H87", "Cigarros", "100.00", "100.00")
        .objeto_imp("02")
        .traslado(Traslado::tasa("100.00", "002", "0.160000", "16.00"))
        .retencion(Retencion::new("100.00", "001", "TASA", "0.100000", "10.00"))
        .cuenta_predial("")
        .cuenta_predial("123456")
        .build();
    let imp = c.impuestos.as_ref().unwrap();
    assert_eq!(imp.entry_count(), 2);
    assert_eq!(imp.retenciones.as_ref().unwrap()[0].tipo_factor.as_str(), "Tasa");
    assert_eq!(c.cuenta_predial, vec!["123456".to_string()]);
}

#[test]
fn tax_entries_mark_the_line_as_taxed() {
    let base = || ConceptoBuilder::new("84111506", "1", "ACT", "Servicio", "100.00", "100.00");

    assert_eq!(base().build().objeto_imp, "01");
    assert_eq!(
        base()
            .traslado(Traslado::tasa("100.00", "002", "0.160000", "16.00"))
            .build()
            .objeto_imp,
        "02"
    );
    assert_eq!(
        base()
            .retencion(Retencion::new("100.00", "001", "Tasa", "0.100000", "10.00"))
            .build()
            .objeto_imp,
        "02"
    );

    // Explicit codes other than 01 are kept
    assert_eq!(
        base()
            .objeto_imp("03")
            .traslado(Traslado::exento("100.00", "002"))
            .build()
            .objeto_imp,
        "03"
    );

    // An empty tax node does not count as an entry
    assert_eq!(
        base().impuestos(ConceptoImpuestos::default()).build().objeto_imp,
        "01"
    );

    // A line built this way passes the structural rules
    let c = builder()
        .add_concepto(
            base()
                .traslado(Traslado::tasa("100.00", "002", "0.160000", "16.00"))
                .build(),
        )
        .build_unchecked()
        .unwrap();
    assert!(c.conceptos[1].is_objeto_de_impuesto());
    assert!(validate_cfdi(&c).is_valid());
}

#[test]
fn global_tax_setters_create_the_node() {
    let c = builder()
        .total_impuestos_retenidos("10.00")
        .add_retencion_global(RetencionGlobal::new("001", "10.00"))
        .build_unchecked()
        .unwrap();
    let imp = c.impuestos.unwrap();
    assert_eq!(imp.total_impuestos_retenidos.as_deref(), Some("10.00"));
    assert_eq!(imp.retenciones.unwrap().len(), 1);
    assert_eq!(imp.traslados, None);
}

#[test]
fn publico_general_receptor() {
    let r = Receptor::new("XAXX010101000", "PUBLICO EN GENERAL", "64000", "616", "S01");
    assert!(r.is_publico_general());
    assert!(!receptor().is_publico_general());
    assert_eq!(RFC_PUBLICO_GENERAL, "XAXX010101000");
}

#[test]
fn foreign_receptor() {
    let r = receptor().extranjero("USA", "123456789");
    assert_eq!(r.residencia_fiscal.as_deref(), Some("USA"));
    assert_eq!(r.num_reg_id_trib.as_deref(), Some("123456789"));
}

// ---------------------------------------------------------------------------
// JSON normalization
// ---------------------------------------------------------------------------

#[test]
fn from_json_reads_both_conventions() {
    let pascal = json!({
        "Serie": "A",
        "Fecha": "2024-06-15T10:30:00",
        "FormaPago": "01",
        "SubTotal": "100.00",
        "Moneda": "MXN",
        "Total": 116,
        "TipoDeComprobante": "I",
        "Exportacion": "01",
        "MetodoPago": "PUE",
        "LugarExpedicion": "64000",
        "Emisor": { "Rfc": "EKU9003173C9", "Nombre": "ESCUELA KEMPER URGATE", "RegimenFiscal": "601" },
        "Receptor": {
            "Rfc": "URE180429TM6", "Nombre": "UNIVERSIDAD ROBOTICA ESPAÑOLA",
            "DomicilioFiscalReceptor": "86991", "RegimenFiscalReceptor": "601", "UsoCFDI": "G03"
        },
        "Conceptos": [{
            "ClaveProdServ": "50211503", "Cantidad": 1, "ClaveUnidad": "H87",
            "Descripcion": "Cigarros", "ValorUnitario": "100.00", "Importe": "100.00",
            "ObjetoImp": "02",
            "Impuestos": { "Traslados": { "Traslado": {
                "Base": "100.00", "Impuesto": "002", "TipoFactor": "tasa",
                "TasaOCuota": "0.160000", "Importe": "16.00"
            } } },
            "CuentaPredial": { "Numero": "CP-1" }
        }]
    });
    let camel = json!({ "comprobante": {
        "serie": "A",
        "fecha": "2024-06-15T10:30:00",
        "formaPago": "01",
        "subTotal": "100.00",
        "moneda": "MXN",
        "total": "116",
        "tipoDeComprobante": "I",
        "exportacion": "01",
        "metodoPago": "PUE",
        "lugarExpedicion": "64000",
        "emisor": { "rfc": "EKU9003173C9", "nombre": "ESCUELA KEMPER URGATE", "regimenFiscal": "601" },
        "receptor": {
            "rfc": "URE180429TM6", "nombre": "UNIVERSIDAD ROBOTICA ESPAÑOLA",
            "domicilioFiscalReceptor": "86991", "regimenFiscalReceptor": "601", "usoCFDI": "G03"
        },
        "conceptos": { "concepto": [{
            "claveProdServ": "50211503", "cantidad": "1", "claveUnidad": "H87",
            "descripcion": "Cigarros", "valorUnitario": "100.00", "importe": "100.00",
            "objetoImp": "02",
            "impuestos": { "traslados": [{
                "base": "100.00", "impuesto": "002", "tipoFactor": "TASA",
                "tasaOCuota": "0.160000", "importe": "16.00"
            }] },
            "cuentaPredial": ["CP-1"]
        }] }
    } });

    let a = Comprobante::from_json(&pascal).unwrap();
    let b = Comprobante::from_json(&camel).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.total, "116");
    assert_eq!(a.conceptos[0].cuenta_predial, vec!["CP-1".to_string()]);
    let traslado = &a.conceptos[0].impuestos.as_ref().unwrap().traslados.as_ref().unwrap()[0];
    assert_eq!(traslado.tipo_factor, TipoFactor::tasa());
    assert_eq!(original_chain(&a, "1"), original_chain(&b, "1"));
}

#[test]
fn from_json_collapses_falsy_values() {
    let c = Comprobante::from_json(&json!({
        "Serie": "",
        "Folio": 0,
        "Descuento": null,
        "Confirmacion": false,
        "TipoCambio": "  ",
        "InformacionGlobal": null
    }))
    .unwrap();
    assert_eq!(c.serie, None);
    assert_eq!(c.folio, None);
    assert_eq!(c.descuento, None);
    assert_eq!(c.confirmacion, None);
    assert_eq!(c.tipo_cambio, None);
    assert_eq!(c.informacion_global, None);
}

#[test]
fn from_json_related_uuids() {
    let c = Comprobante::from_json(&json!({
        "CfdiRelacionados": {
            "TipoRelacion": "04",
            "CfdiRelacionado": [{ "UUID": "AAA" }, { "uuid": "BBB" }]
        }
    }))
    .unwrap();
    let rel = c.cfdi_relacionados.unwrap();
    assert_eq!(rel.tipo_relacion, "04");
    assert_eq!(rel.uuids, vec!["AAA".to_string(), "BBB".to_string()]);
}

#[test]
fn from_json_str_rejects_garbage() {
    assert!(matches!(
        Comprobante::from_json_str("[1, 2]"),
        Err(CfdiError::Input(_))
    ));
    assert!(matches!(
        Comprobante::from_json_str("not json"),
        Err(CfdiError::Input(_))
    ));
}

#[test]
fn model_serializes_pascal_case() {
    let c = builder().build().unwrap();
    let value = serde_json::to_value(&c).unwrap();
    assert_eq!(value["Receptor"]["UsoCFDI"], "G03");
    assert_eq!(value["LugarExpedicion"], "64000");
    let back: Comprobante = serde_json::from_value(value).unwrap();
    assert_eq!(back, c);
}

// ---------------------------------------------------------------------------
// Field accessor
// ---------------------------------------------------------------------------

#[test]
fn field_accessor_public_api() {
    use cfdi::core::field::{get_field, set_field};

    let doc = json!({ "rfc": "EKU9003173C9", "Nombre": "ACME" });
    assert_eq!(get_field(Some(&doc), "Rfc"), Some(&json!("EKU9003173C9")));
    assert_eq!(get_field(Some(&doc), "Nombre"), Some(&json!("ACME")));
    assert_eq!(get_field(Some(&doc), "RegimenFiscal"), None);

    let mut obj = doc.as_object().cloned().unwrap();
    set_field(&mut obj, "Nombre", json!("OTRA"));
    set_field(&mut obj, "Rfc", json!("URE180429TM6"));
    assert_eq!(obj["Nombre"], "OTRA");
    assert_eq!(obj["rfc"], "URE180429TM6");
    assert!(!obj.contains_key("Rfc"));
}

// ---------------------------------------------------------------------------
// Query listings
// ---------------------------------------------------------------------------

#[test]
fn listing_normalization() {
    let response = json!({
        "ListadoCfdi": [
            {
                "Uuid": "5FB2822E-396D-4725-8521-CDC4BDD20CCF",
                "RfcEmisor": "EKU9003173C9",
                "NombreEmisor": "ESCUELA KEMPER URGATE",
                "rfcReceptor": "URE180429TM6",
                "FechaEmision": "2024-06-15T10:30:00",
                "Total": "116.00",
                "Subtotal": "100.00",
                "Moneda": "MXN",
                "TipoComprobante": "I",
                "Estado": "Vigente",
                "EfectoComprobante": "I",
                "UsoCfdi": "G03",
                "BlobPath": "cfdi/5FB2822E.xml"
            }
        ]
    });
    let list = normalize_listing(&response);
    assert_eq!(list.len(), 1);
    let s = &list[0];
    assert_eq!(s.rfc_receptor.as_deref(), Some("URE180429TM6"));
    assert_eq!(s.subtotal.as_deref(), Some("100.00"));
    assert_eq!(s.estado.as_deref(), Some("Vigente"));
    assert_eq!(s.blobpath.as_deref(), Some("cfdi/5FB2822E.xml"));
    assert_eq!(s.folio, None);

    let out = serde_json::to_value(s).unwrap();
    assert_eq!(out["rfcEmisor"], "EKU9003173C9");
    assert_eq!(out["usoCfdi"], "G03");
}
