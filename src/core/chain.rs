use super::layout::layout;
use super::types::Comprobante;

/// Build the CFDI 4.0 original chain (cadena original) of a comprobante.
///
/// `no_certificado` is the certificate serial in its decoded plain-text form
/// (e.g. `30001000000500003416`); it always occupies its position, after
/// `FormaPago`. The result is `||` + pipe-separated segments + `||`.
///
/// Optional fields are skipped entirely when absent, required ones keep
/// their position even when blank. Run [`validate_cfdi`](super::validate_cfdi)
/// first: nothing here checks the document.
///
/// ```
/// use cfdi::core::*;
///
/// let c = Comprobante {
///     fecha: "2024-06-15T10:30:00".into(),
///     moneda: "MXN".into(),
///     ..Default::default()
/// };
/// let chain = original_chain(&c, "30001000000500003416");
/// assert!(chain.starts_with("||4.0|2024-06-15T10:30:00|30001000000500003416|"));
/// assert!(chain.ends_with("||"));
/// ```
pub fn original_chain(c: &Comprobante, no_certificado: &str) -> String {
    let root = layout(c, no_certificado);
    let mut segments = Vec::new();
    root.chain_segments(&mut segments);
    format!("||{}||", segments.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::*;

    fn minimal() -> Comprobante {
        Comprobante {
            fecha: "2024-01-01T00:00:00".into(),
            sub_total: "10.00".into(),
            moneda: "MXN".into(),
            total: "10.00".into(),
            tipo_de_comprobante: "I".into(),
            exportacion: "01".into(),
            lugar_expedicion: "64000".into(),
            emisor: Some(Emisor::new("EKU9003173C9", "ESCUELA KEMPER URGATE", "601")),
            receptor: Some(Receptor::new(
                "URE180429TM6",
                "UNIVERSIDAD ROBOTICA ESPAÑOLA",
                "86991",
                "601",
                "S_01",
            )),
            ..Default::default()
        }
    }

    #[test]
    fn chain_of_minimal_document() {
        assert_eq!(
            original_chain(&minimal(), "30001000000500003416"),
            "||4.0|2024-01-01T00:00:00|30001000000500003416|10.00|MXN|10.00|I|01|64000|\
             EKU9003173C9|ESCUELA KEMPER URGATE|601|\
             URE180429TM6|UNIVERSIDAD ROBOTICA ESPAÑOLA|86991|601|S01||"
        );
    }

    #[test]
    fn exento_traslado_skips_rate_and_amount() {
        let mut c = minimal();
        c.conceptos.push(Concepto {
            clave_prod_serv: "01010101".into(),
            cantidad: "1".into(),
            clave_unidad: "ACT".into(),
            descripcion: "Libro".into(),
            valor_unitario: "10.00".into(),
            importe: "10.00".into(),
            objeto_imp: "02".into(),
            impuestos: Some(ConceptoImpuestos {
                traslados: Some(vec![Traslado::new(
                    "10.00",
                    "002",
                    "EXENTO",
                    Some("0.000000".into()),
                    Some("0.00".into()),
                )]),
                retenciones: None,
            }),
            ..Default::default()
        });
        let chain = original_chain(&c, "1");
        assert!(chain.ends_with("|01010101|1|ACT|Libro|10.00|10.00|02|10.00|002|Exento||"));
    }

    #[test]
    fn chain_is_pure() {
        let c = minimal();
        assert_eq!(original_chain(&c, "9"), original_chain(&c, "9"));
    }
}
