use chrono::NaiveDateTime;

use super::error::CfdiError;
use super::types::*;
use super::validation::{self, FECHA_FORMAT};

/// Builder for constructing valid comprobantes.
///
/// ```
/// use cfdi::core::*;
///
/// let comprobante = ComprobanteBuilder::new("2024-06-15T10:30:00")
///     .serie("A")
///     .folio("123")
///     .forma_pago("01")
///     .metodo_pago("PUE")
///     .lugar_expedicion("64000")
///     .sub_total("100.00")
///     .total("116.00")
///     .emisor(Emisor::new("EKU9003173C9", "ESCUELA KEMPER URGATE", "601"))
///     .receptor(Receptor::new("URE180429TM6", "UNIVERSIDAD ROBOTICA ESPAÑOLA", "86991", "601", "G03"))
///     .add_concepto(
///         ConceptoBuilder::new("50211503", "1", "H87", "Cigarros", "100.00", "100.00")
///             .unidad("Pieza")
///             .objeto_imp("02")
///             .traslado(Traslado::tasa("100.00", "002", "0.160000", "16.00"))
///             .build(),
///     )
///     .total_impuestos_trasladados("16.00")
///     .add_traslado_global(TrasladoGlobal::new("100.00", "002", "Tasa", "0.160000", "16.00"))
///     .build();
/// assert!(comprobante.is_ok());
/// ```
pub struct ComprobanteBuilder {
    serie: Option<String>,
    folio: Option<String>,
    fecha: String,
    forma_pago: Option<String>,
    condiciones_de_pago: Option<String>,
    sub_total: String,
    descuento: Option<String>,
    moneda: String,
    tipo_cambio: Option<String>,
    total: String,
    tipo_de_comprobante: String,
    exportacion: String,
    metodo_pago: Option<String>,
    lugar_expedicion: String,
    confirmacion: Option<String>,
    informacion_global: Option<InformacionGlobal>,
    cfdi_relacionados: Option<CfdiRelacionados>,
    emisor: Option<Emisor>,
    receptor: Option<Receptor>,
    conceptos: Vec<Concepto>,
    impuestos: Option<Impuestos>,
}

impl ComprobanteBuilder {
    /// Start a comprobante issued at `fecha` (`YYYY-MM-DDTHH:MM:SS`).
    /// Defaults: `Moneda` MXN, `TipoDeComprobante` I, `Exportacion` 01.
    pub fn new(fecha: impl Into<String>) -> Self {
        Self {
            serie: None,
            folio: None,
            fecha: trimmed(fecha),
            forma_pago: None,
            condiciones_de_pago: None,
            sub_total: String::new(),
            descuento: None,
            moneda: MONEDA_NACIONAL.to_string(),
            tipo_cambio: None,
            total: String::new(),
            tipo_de_comprobante: "I".to_string(),
            exportacion: "01".to_string(),
            metodo_pago: None,
            lugar_expedicion: String::new(),
            confirmacion: None,
            informacion_global: None,
            cfdi_relacionados: None,
            emisor: None,
            receptor: None,
            conceptos: Vec::new(),
            impuestos: None,
        }
    }

    pub fn fecha_datetime(mut self, fecha: NaiveDateTime) -> Self {
        self.fecha = fecha.format(FECHA_FORMAT).to_string();
        self
    }

    pub fn serie(mut self, serie: impl Into<String>) -> Self {
        self.serie = non_empty(serie);
        self
    }

    pub fn folio(mut self, folio: impl Into<String>) -> Self {
        self.folio = non_empty(folio);
        self
    }

    pub fn forma_pago(mut self, code: impl Into<String>) -> Self {
        self.forma_pago = non_empty(code);
        self
    }

    pub fn condiciones_de_pago(mut self, conditions: impl Into<String>) -> Self {
        self.condiciones_de_pago = non_empty(conditions);
        self
    }

    pub fn sub_total(mut self, amount: impl Into<String>) -> Self {
        self.sub_total = trimmed(amount);
        self
    }

    pub fn descuento(mut self, amount: impl Into<String>) -> Self {
        self.descuento = non_empty(amount);
        self
    }

    pub fn moneda(mut self, code: impl Into<String>) -> Self {
        self.moneda = trimmed(code);
        self
    }

    pub fn tipo_cambio(mut self, rate: impl Into<String>) -> Self {
        self.tipo_cambio = non_empty(rate);
        self
    }

    pub fn total(mut self, amount: impl Into<String>) -> Self {
        self.total = trimmed(amount);
        self
    }

    pub fn tipo_de_comprobante(mut self, code: impl Into<String>) -> Self {
        self.tipo_de_comprobante = trimmed(code);
        self
    }

    pub fn exportacion(mut self, code: impl Into<String>) -> Self {
        self.exportacion = trimmed(code);
        self
    }

    pub fn metodo_pago(mut self, code: impl Into<String>) -> Self {
        self.metodo_pago = non_empty(code);
        self
    }

    pub fn lugar_expedicion(mut self, postal_code: impl Into<String>) -> Self {
        self.lugar_expedicion = trimmed(postal_code);
        self
    }

    pub fn confirmacion(mut self, code: impl Into<String>) -> Self {
        self.confirmacion = non_empty(code);
        self
    }

    pub fn informacion_global(mut self, info: InformacionGlobal) -> Self {
        self.informacion_global = Some(info);
        self
    }

    pub fn cfdi_relacionados(mut self, related: CfdiRelacionados) -> Self {
        self.cfdi_relacionados = Some(related);
        self
    }

    pub fn emisor(mut self, emisor: Emisor) -> Self {
        self.emisor = Some(emisor);
        self
    }

    pub fn receptor(mut self, receptor: Receptor) -> Self {
        self.receptor = Some(receptor);
        self
    }

    pub fn add_concepto(mut self, concepto: Concepto) -> Self {
        self.conceptos.push(concepto);
        self
    }

    /// Replace the document-level tax totals wholesale.
    pub fn impuestos(mut self, impuestos: Impuestos) -> Self {
        self.impuestos = Some(impuestos);
        self
    }

    pub fn total_impuestos_trasladados(mut self, amount: impl Into<String>) -> Self {
        self.impuestos_mut().total_impuestos_trasladados = non_empty(amount);
        self
    }

    pub fn total_impuestos_retenidos(mut self, amount: impl Into<String>) -> Self {
        self.impuestos_mut().total_impuestos_retenidos = non_empty(amount);
        self
    }

    pub fn add_traslado_global(mut self, traslado: TrasladoGlobal) -> Self {
        self.impuestos_mut()
            .traslados
            .get_or_insert_with(Vec::new)
            .push(traslado);
        self
    }

    pub fn add_retencion_global(mut self, retencion: RetencionGlobal) -> Self {
        self.impuestos_mut()
            .retenciones
            .get_or_insert_with(Vec::new)
            .push(retencion);
        self
    }

    fn impuestos_mut(&mut self) -> &mut Impuestos {
        self.impuestos.get_or_insert_with(Impuestos::default)
    }

    /// Build the comprobante and run structural validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Comprobante, CfdiError> {
        let comprobante = self.build_unchecked()?;

        let report = validation::validate_cfdi(&comprobante);
        if !report.is_valid() {
            return Err(CfdiError::Validation(report.messages().join("; ")));
        }

        Ok(comprobante)
    }

    /// Build without validation, for drafts or importing external data.
    pub fn build_unchecked(self) -> Result<Comprobante, CfdiError> {
        // Input limits to prevent abuse
        if self.conceptos.len() > 10_000 {
            return Err(CfdiError::Builder(
                "a comprobante cannot have more than 10,000 conceptos".into(),
            ));
        }
        if self.folio.as_ref().is_some_and(|f| f.chars().count() > 40) {
            return Err(CfdiError::Builder(
                "Folio cannot exceed 40 characters".into(),
            ));
        }

        Ok(Comprobante {
            serie: self.serie,
            folio: self.folio,
            fecha: self.fecha,
            sello: None,
            forma_pago: self.forma_pago,
            no_certificado: None,
            certificado: None,
            condiciones_de_pago: self.condiciones_de_pago,
            sub_total: self.sub_total,
            descuento: self.descuento,
            moneda: self.moneda,
            tipo_cambio: self.tipo_cambio,
            total: self.total,
            tipo_de_comprobante: self.tipo_de_comprobante,
            exportacion: self.exportacion,
            metodo_pago: self.metodo_pago,
            lugar_expedicion: self.lugar_expedicion,
            confirmacion: self.confirmacion,
            informacion_global: self.informacion_global,
            cfdi_relacionados: self.cfdi_relacionados,
            emisor: self.emisor,
            receptor: self.receptor,
            conceptos: self.conceptos,
            impuestos: self.impuestos,
        })
    }
}

/// Builder for Concepto (one invoice line).
pub struct ConceptoBuilder {
    clave_prod_serv: String,
    no_identificacion: Option<String>,
    cantidad: String,
    clave_unidad: String,
    unidad: Option<String>,
    descripcion: String,
    valor_unitario: String,
    importe: String,
    descuento: Option<String>,
    objeto_imp: String,
    impuestos: Option<ConceptoImpuestos>,
    cuenta_predial: Vec<String>,
}

impl ConceptoBuilder {
    /// `ObjetoImp` defaults to `01` (not taxed). Adding a tax entry moves a
    /// line still at `01` to `02`; [`objeto_imp`](Self::objeto_imp) sets any
    /// other code explicitly.
    pub fn new(
        clave_prod_serv: impl Into<String>,
        cantidad: impl Into<String>,
        clave_unidad: impl Into<String>,
        descripcion: impl Into<String>,
        valor_unitario: impl Into<String>,
        importe: impl Into<String>,
    ) -> Self {
        Self {
            clave_prod_serv: trimmed(clave_prod_serv),
            no_identificacion: None,
            cantidad: trimmed(cantidad),
            clave_unidad: trimmed(clave_unidad),
            unidad: None,
            descripcion: trimmed(descripcion),
            valor_unitario: trimmed(valor_unitario),
            importe: trimmed(importe),
            descuento: None,
            objeto_imp: "01".to_string(),
            impuestos: None,
            cuenta_predial: Vec::new(),
        }
    }

    pub fn no_identificacion(mut self, sku: impl Into<String>) -> Self {
        self.no_identificacion = non_empty(sku);
        self
    }

    pub fn unidad(mut self, unidad: impl Into<String>) -> Self {
        self.unidad = non_empty(unidad);
        self
    }

    pub fn descuento(mut self, amount: impl Into<String>) -> Self {
        self.descuento = non_empty(amount);
        self
    }

    pub fn objeto_imp(mut self, code: impl Into<String>) -> Self {
        self.objeto_imp = trimmed(code);
        self
    }

    pub fn traslado(mut self, traslado: Traslado) -> Self {
        self.impuestos
            .get_or_insert_with(ConceptoImpuestos::default)
            .traslados
            .get_or_insert_with(Vec::new)
            .push(traslado);
        self.taxed()
    }

    pub fn retencion(mut self, retencion: Retencion) -> Self {
        self.impuestos
            .get_or_insert_with(ConceptoImpuestos::default)
            .retenciones
            .get_or_insert_with(Vec::new)
            .push(retencion);
        self.taxed()
    }

    /// Replace the line's tax node wholesale, including empty sequences.
    pub fn impuestos(mut self, impuestos: ConceptoImpuestos) -> Self {
        let has_entries = impuestos.entry_count() > 0;
        self.impuestos = Some(impuestos);
        if has_entries {
            self.taxed()
        } else {
            self
        }
    }

    fn taxed(mut self) -> Self {
        if self.objeto_imp == "01" {
            self.objeto_imp = OBJETO_IMP_SI.to_string();
        }
        self
    }

    pub fn cuenta_predial(mut self, numero: impl Into<String>) -> Self {
        if let Some(numero) = non_empty(numero) {
            self.cuenta_predial.push(numero);
        }
        self
    }

    pub fn build(self) -> Concepto {
        Concepto {
            clave_prod_serv: self.clave_prod_serv,
            no_identificacion: self.no_identificacion,
            cantidad: self.cantidad,
            clave_unidad: self.clave_unidad,
            unidad: self.unidad,
            descripcion: self.descripcion,
            valor_unitario: self.valor_unitario,
            importe: self.importe,
            descuento: self.descuento,
            objeto_imp: self.objeto_imp,
            impuestos: self.impuestos,
            cuenta_predial: self.cuenta_predial,
        }
    }
}
