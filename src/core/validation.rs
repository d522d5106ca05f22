use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use rust_decimal::Decimal;

use super::catalogs;
use super::error::ValidationError;
use super::types::*;

/// Timestamp layout of `@Fecha`.
pub const FECHA_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static RFC_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-ZÑ&]{3,4}\d{6}[A-Z0-9]{3}$").ok());

/// Outcome of a validation pass. Defects are data: a report with errors is
/// an expected result, never an `Err`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Every defect found, in traversal order.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable defect messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Structural validation of a comprobante.
///
/// Checks required attributes and the conditional-required nodes of
/// CFDI 4.0. Every rule runs; the report holds all defects, not just the
/// first. Tax arithmetic is not checked.
pub fn validate_cfdi(c: &Comprobante) -> ValidationReport {
    let mut errors = Vec::new();

    for (name, value) in [
        ("Fecha", c.fecha.as_str()),
        ("TipoDeComprobante", c.tipo_de_comprobante.as_str()),
        ("LugarExpedicion", c.lugar_expedicion.as_str()),
        ("Moneda", c.moneda.as_str()),
        ("SubTotal", c.sub_total.as_str()),
        ("Total", c.total.as_str()),
        ("Exportacion", c.exportacion.as_str()),
        ("MetodoPago", c.metodo_pago.as_deref().unwrap_or_default()),
        ("FormaPago", c.forma_pago.as_deref().unwrap_or_default()),
    ] {
        require("Comprobante", name, value, &mut errors);
    }

    match &c.emisor {
        None => errors.push(ValidationError::new(
            "Emisor",
            "the Emisor node is required",
        )),
        Some(emisor) => {
            require("Emisor", "Rfc", &emisor.rfc, &mut errors);
            require("Emisor", "Nombre", &emisor.nombre, &mut errors);
            require("Emisor", "RegimenFiscal", &emisor.regimen_fiscal, &mut errors);
        }
    }

    match &c.receptor {
        None => errors.push(ValidationError::new(
            "Receptor",
            "the Receptor node is required",
        )),
        Some(receptor) => {
            require("Receptor", "Rfc", &receptor.rfc, &mut errors);
            require("Receptor", "Nombre", &receptor.nombre, &mut errors);
            require(
                "Receptor",
                "DomicilioFiscalReceptor",
                &receptor.domicilio_fiscal_receptor,
                &mut errors,
            );
            require(
                "Receptor",
                "RegimenFiscalReceptor",
                &receptor.regimen_fiscal_receptor,
                &mut errors,
            );
            require("Receptor", "UsoCFDI", &receptor.uso_cfdi, &mut errors);
        }
    }

    // Global invoices to the generic public must state their period
    if c.receptor.as_ref().is_some_and(Receptor::is_publico_general) {
        match &c.informacion_global {
            None => errors.push(ValidationError::new(
                "InformacionGlobal",
                format!(
                    "the InformacionGlobal node is required for the generic public RFC ({RFC_PUBLICO_GENERAL})"
                ),
            )),
            Some(ig) => {
                require("InformacionGlobal", "Periodicidad", &ig.periodicidad, &mut errors);
                require("InformacionGlobal", "Meses", &ig.meses, &mut errors);
                require("InformacionGlobal", "Año", &ig.anio, &mut errors);
            }
        }
    }

    if c.conceptos.is_empty() {
        errors.push(ValidationError::new(
            "Conceptos",
            "at least one Concepto is required",
        ));
    }
    for (i, concepto) in c.conceptos.iter().enumerate() {
        validate_concepto(concepto, i, &mut errors);
    }

    if let Some(impuestos) = &c.impuestos {
        if impuestos.total_impuestos_trasladados.is_some() && impuestos.traslados.is_none() {
            errors.push(ValidationError::new(
                "Impuestos.Traslados",
                "the Traslados node is required when TotalImpuestosTrasladados is present",
            ));
        }
        if impuestos.total_impuestos_retenidos.is_some() && impuestos.retenciones.is_none() {
            errors.push(ValidationError::new(
                "Impuestos.Retenciones",
                "the Retenciones node is required when TotalImpuestosRetenidos is present",
            ));
        }
    }

    ValidationReport { errors }
}

fn validate_concepto(concepto: &Concepto, index: usize, errors: &mut Vec<ValidationError>) {
    let node = format!("Conceptos[{index}]");

    for (name, value) in [
        ("ClaveProdServ", &concepto.clave_prod_serv),
        ("Cantidad", &concepto.cantidad),
        ("ClaveUnidad", &concepto.clave_unidad),
        ("Descripcion", &concepto.descripcion),
        ("ValorUnitario", &concepto.valor_unitario),
        ("Importe", &concepto.importe),
        ("ObjetoImp", &concepto.objeto_imp),
    ] {
        require(&node, name, value, errors);
    }

    if concepto.is_objeto_de_impuesto()
        && concepto
            .impuestos
            .as_ref()
            .is_none_or(|imp| imp.entry_count() == 0)
    {
        errors.push(ValidationError::new(
            format!("{node}.Impuestos"),
            "ObjetoImp \"02\" requires an Impuestos node with at least one Traslado or Retencion",
        ));
    }
}

fn require(node: &str, name: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::required(node, name));
    }
}

/// Whether `rfc` has the shape of a Mexican RFC (12 characters for legal
/// entities, 13 for individuals). Case and surrounding whitespace are ignored.
pub fn is_valid_rfc(rfc: &str) -> bool {
    let rfc = rfc.trim().to_uppercase();
    RFC_PATTERN.as_ref().is_some_and(|re| re.is_match(&rfc))
}

/// [`validate_cfdi`] plus format and catalog checks.
///
/// Adds RFC shape, the exchange-rate requirement for foreign currencies,
/// the `Fecha` layout, decimal syntax of every amount and SAT catalog
/// membership of the coded attributes. Blank values are left to the
/// structural rules so a missing attribute is reported once.
pub fn validate_extended(c: &Comprobante) -> ValidationReport {
    let mut report = validate_cfdi(c);
    let errors = &mut report.errors;

    if !c.fecha.is_empty() && NaiveDateTime::parse_from_str(&c.fecha, FECHA_FORMAT).is_err() {
        errors.push(ValidationError::new(
            "Comprobante.Fecha",
            format!("'{}' is not a YYYY-MM-DDTHH:MM:SS timestamp", c.fecha),
        ));
    }

    if !c.moneda.is_empty()
        && c.moneda != MONEDA_NACIONAL
        && c.moneda != MONEDA_SIN_OPERACION
        && c.tipo_cambio.is_none()
    {
        errors.push(ValidationError::new(
            "Comprobante.TipoCambio",
            format!("TipoCambio is required for currency {}", c.moneda),
        ));
    }

    decimal("Comprobante", "SubTotal", &c.sub_total, errors);
    decimal("Comprobante", "Total", &c.total, errors);
    if let Some(descuento) = &c.descuento {
        decimal("Comprobante", "Descuento", descuento, errors);
    }
    if let Some(tipo_cambio) = &c.tipo_cambio {
        decimal("Comprobante", "TipoCambio", tipo_cambio, errors);
    }

    catalog(
        "Comprobante",
        "TipoDeComprobante",
        &c.tipo_de_comprobante,
        catalogs::is_known_tipo_de_comprobante,
        errors,
    );
    catalog(
        "Comprobante",
        "Exportacion",
        &c.exportacion,
        catalogs::is_known_exportacion,
        errors,
    );
    if let Some(metodo) = &c.metodo_pago {
        catalog("Comprobante", "MetodoPago", metodo, catalogs::is_known_metodo_pago, errors);
    }
    if let Some(forma) = &c.forma_pago {
        catalog("Comprobante", "FormaPago", forma, catalogs::is_known_forma_pago, errors);
    }

    if let Some(ig) = &c.informacion_global {
        catalog(
            "InformacionGlobal",
            "Periodicidad",
            &ig.periodicidad,
            catalogs::is_known_periodicidad,
            errors,
        );
        catalog("InformacionGlobal", "Meses", &ig.meses, catalogs::is_known_mes, errors);
        if !ig.anio.is_empty() && !(ig.anio.len() == 4 && ig.anio.parse::<u16>().is_ok()) {
            errors.push(ValidationError::new(
                "InformacionGlobal.Año",
                format!("'{}' is not a four-digit year", ig.anio),
            ));
        }
    }

    if let Some(emisor) = &c.emisor {
        rfc("Emisor", &emisor.rfc, errors);
        catalog(
            "Emisor",
            "RegimenFiscal",
            &emisor.regimen_fiscal,
            catalogs::is_known_regimen_fiscal,
            errors,
        );
    }
    if let Some(receptor) = &c.receptor {
        rfc("Receptor", &receptor.rfc, errors);
        catalog(
            "Receptor",
            "RegimenFiscalReceptor",
            &receptor.regimen_fiscal_receptor,
            catalogs::is_known_regimen_fiscal,
            errors,
        );
        catalog("Receptor", "UsoCFDI", &receptor.uso_cfdi, catalogs::is_known_uso_cfdi, errors);
    }

    for (i, concepto) in c.conceptos.iter().enumerate() {
        let node = format!("Conceptos[{i}]");
        decimal(&node, "Cantidad", &concepto.cantidad, errors);
        decimal(&node, "ValorUnitario", &concepto.valor_unitario, errors);
        decimal(&node, "Importe", &concepto.importe, errors);
        if let Some(descuento) = &concepto.descuento {
            decimal(&node, "Descuento", descuento, errors);
        }
        catalog(&node, "ObjetoImp", &concepto.objeto_imp, catalogs::is_known_objeto_imp, errors);

        let Some(impuestos) = &concepto.impuestos else {
            continue;
        };
        for (j, t) in impuestos.traslados.iter().flatten().enumerate() {
            let node = format!("{node}.Traslados[{j}]");
            decimal(&node, "Base", &t.base, errors);
            catalog(&node, "Impuesto", &t.impuesto, catalogs::is_known_impuesto, errors);
            if let Some(importe) = &t.importe {
                decimal(&node, "Importe", importe, errors);
            }
        }
        for (j, r) in impuestos.retenciones.iter().flatten().enumerate() {
            let node = format!("{node}.Retenciones[{j}]");
            decimal(&node, "Base", &r.base, errors);
            catalog(&node, "Impuesto", &r.impuesto, catalogs::is_known_impuesto, errors);
            decimal(&node, "Importe", &r.importe, errors);
        }
    }

    if let Some(impuestos) = &c.impuestos {
        if let Some(total) = &impuestos.total_impuestos_trasladados {
            decimal("Impuestos", "TotalImpuestosTrasladados", total, errors);
        }
        if let Some(total) = &impuestos.total_impuestos_retenidos {
            decimal("Impuestos", "TotalImpuestosRetenidos", total, errors);
        }
    }

    report
}

fn rfc(node: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if !value.is_empty() && !is_valid_rfc(value) {
        errors.push(ValidationError::new(
            format!("{node}.Rfc"),
            format!("'{value}' is not a valid RFC"),
        ));
    }
}

fn decimal(node: &str, name: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if !value.is_empty() && Decimal::from_str(value).is_err() {
        errors.push(ValidationError::new(
            format!("{node}.{name}"),
            format!("'{value}' is not a decimal number"),
        ));
    }
}

fn catalog(
    node: &str,
    name: &str,
    value: &str,
    known: fn(&str) -> bool,
    errors: &mut Vec<ValidationError>,
) {
    if !value.is_empty() && !known(value) {
        errors.push(ValidationError::new(
            format!("{node}.{name}"),
            format!("'{value}' is not in the SAT catalog for {name}"),
        ));
    }
}
