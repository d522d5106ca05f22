#![cfg(feature = "core")]

use cfdi::core::*;

const SERIAL: &str = "30001000000500003416";

fn factura() -> Comprobante {
    ComprobanteBuilder::new("2024-06-15T10:30:00")
        .serie("A")
        .folio("123")
        .forma_pago("01")
        .metodo_pago("PUE")
        .lugar_expedicion("64000")
        .sub_total("100.00")
        .total("116.00")
        .emisor(Emisor::new("EKU9003173C9", "ESCUELA KEMPER URGATE", "601"))
        .receptor(Receptor::new(
            "URE180429TM6",
            "UNIVERSIDAD ROBOTICA ESPAÑOLA",
            "86991",
            "601",
            "G03",
        ))
        .add_concepto(
            ConceptoBuilder::new("50211503", "1", "H87", "Cigarros", "100.00", "100.00")
                .unidad("Pieza")
                .objeto_imp("02")
                .traslado(Traslado::tasa("100.00", "002", "0.160000", "16.00"))
                .build(),
        )
        .total_impuestos_trasladados("16.00")
        .add_traslado_global(TrasladoGlobal::new(
            "100.00", "002", "Tasa", "0.160000", "16.00",
        ))
        .build()
        .unwrap()
}

#[test]
fn reference_chain() {
    let chain = original_chain(&factura(), SERIAL);
    assert_eq!(
        chain,
        "||4.0|A|123|2024-06-15T10:30:00|01|30001000000500003416|100.00|MXN|116.00|I|01|PUE|64000|\
         EKU9003173C9|ESCUELA KEMPER URGATE|601|\
         URE180429TM6|UNIVERSIDAD ROBOTICA ESPAÑOLA|86991|601|G03|\
         50211503|1|H87|Pieza|Cigarros|100.00|100.00|02|100.00|002|Tasa|0.160000|16.00|\
         100.00|002|Tasa|0.160000|16.00|16.00||"
    );
}

#[test]
fn reference_chain_snapshot() {
    insta::assert_snapshot!(
        original_chain(&factura(), SERIAL),
        @"||4.0|A|123|2024-06-15T10:30:00|01|30001000000500003416|100.00|MXN|116.00|I|01|PUE|64000|EKU9003173C9|ESCUELA KEMPER URGATE|601|URE180429TM6|UNIVERSIDAD ROBOTICA ESPAÑOLA|86991|601|G03|50211503|1|H87|Pieza|Cigarros|100.00|100.00|02|100.00|002|Tasa|0.160000|16.00|100.00|002|Tasa|0.160000|16.00|16.00||"
    );
}

#[test]
fn optional_root_fields_take_their_positions() {
    let mut c = factura();
    c.serie = None;
    c.folio = None;
    c.condiciones_de_pago = Some("CONTADO".into());
    c.descuento = Some("0.00".into());
    c.moneda = "USD".into();
    c.tipo_cambio = Some("17.25".into());
    c.confirmacion = Some("ECVH1".into());
    let chain = original_chain(&c, SERIAL);
    assert!(chain.starts_with(
        "||4.0|2024-06-15T10:30:00|01|30001000000500003416|CONTADO|100.00|0.00|USD|17.25|116.00|I|01|PUE|64000|ECVH1|EKU9003173C9|"
    ));
}

#[test]
fn informacion_global_and_related_uuids() {
    let mut c = factura();
    c.receptor = Some(Receptor::new(
        RFC_PUBLICO_GENERAL,
        "PUBLICO EN GENERAL",
        "64000",
        "616",
        "S01",
    ));
    c.informacion_global = Some(InformacionGlobal::new("01", "06", "2024"));
    c.cfdi_relacionados = Some(
        CfdiRelacionados::new("04")
            .add_uuid("5FB2822E-396D-4725-8521-CDC4BDD20CCF")
            .add_uuid("A39DA66B-52CA-49E3-879B-5C05185B0EF7"),
    );
    let chain = original_chain(&c, SERIAL);
    assert!(chain.contains(
        "|64000|01|06|2024|04|5FB2822E-396D-4725-8521-CDC4BDD20CCF|A39DA66B-52CA-49E3-879B-5C05185B0EF7|EKU9003173C9|"
    ));
    assert!(chain.contains("|XAXX010101000|PUBLICO EN GENERAL|64000|616|S01|"));
}

#[test]
fn issuer_and_foreign_recipient_optionals() {
    let mut c = factura();
    c.emisor = Some(c.emisor.unwrap().fac_atr_adquirente("0123456789"));
    c.receptor = Some(
        Receptor::new("XEXX010101000", "ACME INC", "64000", "616", "S01")
            .extranjero("USA", "123456789"),
    );
    let chain = original_chain(&c, SERIAL);
    assert!(chain.contains("|ESCUELA KEMPER URGATE|601|0123456789|"));
    assert!(chain.contains("|XEXX010101000|ACME INC|64000|USA|123456789|616|S01|"));
}

#[test]
fn uso_cfdi_underscore_is_stripped() {
    let mut c = factura();
    c.receptor.as_mut().unwrap().uso_cfdi = "S_01".into();
    let chain = original_chain(&c, SERIAL);
    assert!(chain.contains("|601|S01|50211503|"));
    assert!(!chain.contains("S_01"));
}

#[test]
fn factor_casing_is_normalized() {
    let mut c = factura();
    c.conceptos[0].impuestos = Some(ConceptoImpuestos {
        traslados: Some(vec![Traslado::new(
            "100.00",
            "002",
            "TASA",
            Some("0.160000".into()),
            Some("16.00".into()),
        )]),
        retenciones: Some(vec![Retencion::new(
            "100.00", "001", "tasa", "0.100000", "10.00",
        )]),
    });
    let chain = original_chain(&c, SERIAL);
    assert!(chain.contains(
        "|02|100.00|002|Tasa|0.160000|16.00|100.00|001|Tasa|0.100000|10.00|100.00|002|"
    ));
}

#[test]
fn exento_omits_rate_and_amount_but_retencion_never_does() {
    let mut c = factura();
    c.conceptos[0].impuestos = Some(ConceptoImpuestos {
        traslados: Some(vec![Traslado::exento("100.00", "002")]),
        retenciones: Some(vec![Retencion::new(
            "100.00", "001", "Exento", "0.000000", "0.00",
        )]),
    });
    let chain = original_chain(&c, SERIAL);
    assert!(chain.contains(
        "|02|100.00|002|Exento|100.00|001|Exento|0.000000|0.00|100.00|002|Tasa|"
    ));
}

#[test]
fn cuenta_predial_follows_taxes() {
    let mut c = factura();
    c.conceptos[0].cuenta_predial = vec!["15956011002".into(), "15956011003".into()];
    let chain = original_chain(&c, SERIAL);
    assert!(chain.contains("|0.160000|16.00|15956011002|15956011003|100.00|002|"));
}

#[test]
fn global_retenciones_precede_traslados_with_totals() {
    let mut c = factura();
    c.impuestos = Some(Impuestos {
        total_impuestos_retenidos: Some("10.00".into()),
        total_impuestos_trasladados: Some("16.00".into()),
        retenciones: Some(vec![RetencionGlobal::new("001", "10.00")]),
        traslados: Some(vec![TrasladoGlobal::new(
            "100.00", "002", "TASA", "0.160000", "16.00",
        )]),
    });
    let chain = original_chain(&c, SERIAL);
    assert!(chain.ends_with("|001|10.00|10.00|100.00|002|Tasa|0.160000|16.00|16.00||"));
}

#[test]
fn global_total_without_list_is_not_in_chain() {
    let mut c = factura();
    c.impuestos = Some(Impuestos {
        total_impuestos_retenidos: Some("10.00".into()),
        ..Default::default()
    });
    let chain = original_chain(&c, SERIAL);
    assert!(chain.ends_with("|02|100.00|002|Tasa|0.160000|16.00||"));
}

#[test]
fn multiple_conceptos_keep_order() {
    let mut c = factura();
    for clave in ["01010101", "84111506"] {
        c.conceptos.push(
            ConceptoBuilder::new(clave, "2", "E48", "Servicio", "5.00", "10.00")
                .no_identificacion("SKU-1")
                .descuento("1.00")
                .build(),
        );
    }
    let chain = original_chain(&c, SERIAL);
    let first = chain.find("|50211503|").unwrap();
    let second = chain.find("|01010101|SKU-1|2|E48|Servicio|5.00|10.00|1.00|01|").unwrap();
    let third = chain.find("|84111506|SKU-1|").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn canonicalization_is_idempotent() {
    let c = factura();
    let a = original_chain(&c, SERIAL);
    let b = original_chain(&c, SERIAL);
    assert_eq!(a, b);
    assert_eq!(c, factura());
}

#[test]
fn invalid_documents_still_canonicalize() {
    let chain = original_chain(&Comprobante::default(), "");
    assert!(chain.starts_with("||4.0|"));
    assert!(chain.ends_with("||"));
}
