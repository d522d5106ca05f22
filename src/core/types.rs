use serde::{Deserialize, Serialize};

/// Protocol version written as the first chain field and as `@Version`.
pub const CFDI_VERSION: &str = "4.0";

/// Generic-public recipient RFC (público en general). A recipient with this
/// RFC requires an `InformacionGlobal` node.
pub const RFC_PUBLICO_GENERAL: &str = "XAXX010101000";

/// Home currency. Any other currency except `XXX` needs `TipoCambio`.
pub const MONEDA_NACIONAL: &str = "MXN";

/// Currency code for documents without a monetary transaction.
pub const MONEDA_SIN_OPERACION: &str = "XXX";

/// `cfdi:Comprobante`: the invoice root.
///
/// Required scalars are plain strings and are empty when absent; optional
/// scalars are `None` when absent. Nothing in here is ever a native number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Comprobante {
    /// `@Serie`
    pub serie: Option<String>,
    /// `@Folio`
    pub folio: Option<String>,
    /// `@Fecha`: issue timestamp, `YYYY-MM-DDTHH:MM:SS`.
    pub fecha: String,
    /// `@Sello`: base64 signature, written by the sealer.
    pub sello: Option<String>,
    /// `@FormaPago` (c_FormaPago).
    pub forma_pago: Option<String>,
    /// `@NoCertificado`: certificate serial in hex form, written by the sealer.
    pub no_certificado: Option<String>,
    /// `@Certificado`: base64 DER certificate, written by the sealer.
    pub certificado: Option<String>,
    /// `@CondicionesDePago`
    pub condiciones_de_pago: Option<String>,
    /// `@SubTotal`
    pub sub_total: String,
    /// `@Descuento`
    pub descuento: Option<String>,
    /// `@Moneda` (c_Moneda).
    pub moneda: String,
    /// `@TipoCambio`: required when `moneda` is not the home currency.
    pub tipo_cambio: Option<String>,
    /// `@Total`
    pub total: String,
    /// `@TipoDeComprobante` (c_TipoDeComprobante: I, E, T, N, P).
    pub tipo_de_comprobante: String,
    /// `@Exportacion` (c_Exportacion).
    pub exportacion: String,
    /// `@MetodoPago` (c_MetodoPago: PUE, PPD).
    pub metodo_pago: Option<String>,
    /// `@LugarExpedicion`: postal code of the place of issue.
    pub lugar_expedicion: String,
    /// `@Confirmacion`
    pub confirmacion: Option<String>,
    /// `cfdi:InformacionGlobal`
    pub informacion_global: Option<InformacionGlobal>,
    /// `cfdi:CfdiRelacionados`
    pub cfdi_relacionados: Option<CfdiRelacionados>,
    /// `cfdi:Emisor`
    pub emisor: Option<Emisor>,
    /// `cfdi:Receptor`
    pub receptor: Option<Receptor>,
    /// `cfdi:Conceptos/cfdi:Concepto`, in document order.
    pub conceptos: Vec<Concepto>,
    /// `cfdi:Impuestos` (document totals).
    pub impuestos: Option<Impuestos>,
}

/// `cfdi:InformacionGlobal`: periodicity of a global invoice to the
/// generic public.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InformacionGlobal {
    /// `@Periodicidad` (c_Periodicidad).
    pub periodicidad: String,
    /// `@Meses` (c_Meses).
    pub meses: String,
    /// `@Año`
    #[serde(rename = "Año")]
    pub anio: String,
}

impl InformacionGlobal {
    pub fn new(
        periodicidad: impl Into<String>,
        meses: impl Into<String>,
        anio: impl Into<String>,
    ) -> Self {
        Self {
            periodicidad: trimmed(periodicidad),
            meses: trimmed(meses),
            anio: trimmed(anio),
        }
    }
}

/// `cfdi:CfdiRelacionados`: relation type plus the related UUIDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CfdiRelacionados {
    /// `@TipoRelacion` (c_TipoRelacion).
    pub tipo_relacion: String,
    /// `cfdi:CfdiRelacionado/@UUID`, in document order.
    #[serde(rename = "CfdiRelacionado")]
    pub uuids: Vec<String>,
}

impl CfdiRelacionados {
    pub fn new(tipo_relacion: impl Into<String>) -> Self {
        Self {
            tipo_relacion: trimmed(tipo_relacion),
            uuids: Vec::new(),
        }
    }

    pub fn add_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuids.push(trimmed(uuid));
        self
    }
}

/// `cfdi:Emisor`: the issuer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Emisor {
    /// `@Rfc`
    pub rfc: String,
    /// `@Nombre`
    pub nombre: String,
    /// `@RegimenFiscal` (c_RegimenFiscal).
    pub regimen_fiscal: String,
    /// `@FacAtrAdquirente`
    pub fac_atr_adquirente: Option<String>,
}

impl Emisor {
    pub fn new(
        rfc: impl Into<String>,
        nombre: impl Into<String>,
        regimen_fiscal: impl Into<String>,
    ) -> Self {
        Self {
            rfc: trimmed(rfc),
            nombre: trimmed(nombre),
            regimen_fiscal: trimmed(regimen_fiscal),
            fac_atr_adquirente: None,
        }
    }

    pub fn fac_atr_adquirente(mut self, code: impl Into<String>) -> Self {
        self.fac_atr_adquirente = non_empty(code);
        self
    }
}

/// `cfdi:Receptor`: the recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Receptor {
    /// `@Rfc`
    pub rfc: String,
    /// `@Nombre`
    pub nombre: String,
    /// `@DomicilioFiscalReceptor`: postal code of the fiscal domicile.
    pub domicilio_fiscal_receptor: String,
    /// `@ResidenciaFiscal` (foreign residents only).
    pub residencia_fiscal: Option<String>,
    /// `@NumRegIdTrib` (foreign tax id).
    pub num_reg_id_trib: Option<String>,
    /// `@RegimenFiscalReceptor` (c_RegimenFiscal).
    pub regimen_fiscal_receptor: String,
    /// `@UsoCFDI` (c_UsoCFDI). Stored as given; underscores are stripped
    /// when the chain and the markup are produced.
    #[serde(rename = "UsoCFDI")]
    pub uso_cfdi: String,
}

impl Receptor {
    pub fn new(
        rfc: impl Into<String>,
        nombre: impl Into<String>,
        domicilio_fiscal_receptor: impl Into<String>,
        regimen_fiscal_receptor: impl Into<String>,
        uso_cfdi: impl Into<String>,
    ) -> Self {
        Self {
            rfc: trimmed(rfc),
            nombre: trimmed(nombre),
            domicilio_fiscal_receptor: trimmed(domicilio_fiscal_receptor),
            residencia_fiscal: None,
            num_reg_id_trib: None,
            regimen_fiscal_receptor: trimmed(regimen_fiscal_receptor),
            uso_cfdi: trimmed(uso_cfdi),
        }
    }

    /// Foreign residence (country code) and foreign tax id.
    pub fn extranjero(
        mut self,
        residencia_fiscal: impl Into<String>,
        num_reg_id_trib: impl Into<String>,
    ) -> Self {
        self.residencia_fiscal = non_empty(residencia_fiscal);
        self.num_reg_id_trib = non_empty(num_reg_id_trib);
        self
    }

    /// Whether the recipient is the generic public (`XAXX010101000`).
    pub fn is_publico_general(&self) -> bool {
        self.rfc == RFC_PUBLICO_GENERAL
    }
}

/// `cfdi:Concepto`: one invoice line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Concepto {
    /// `@ClaveProdServ` (c_ClaveProdServ).
    pub clave_prod_serv: String,
    /// `@NoIdentificacion`: internal SKU.
    pub no_identificacion: Option<String>,
    /// `@Cantidad`
    pub cantidad: String,
    /// `@ClaveUnidad` (c_ClaveUnidad).
    pub clave_unidad: String,
    /// `@Unidad`: unit name.
    pub unidad: Option<String>,
    /// `@Descripcion`
    pub descripcion: String,
    /// `@ValorUnitario`
    pub valor_unitario: String,
    /// `@Importe`
    pub importe: String,
    /// `@Descuento`
    pub descuento: Option<String>,
    /// `@ObjetoImp` (c_ObjetoImp): 01 not taxed, 02 taxed, 03 taxed without breakdown.
    pub objeto_imp: String,
    /// `cfdi:Impuestos`
    pub impuestos: Option<ConceptoImpuestos>,
    /// `cfdi:CuentaPredial/@Numero`, in document order.
    pub cuenta_predial: Vec<String>,
}

impl Concepto {
    /// Whether the line declares itself as taxed with breakdown (`ObjetoImp` 02).
    pub fn is_objeto_de_impuesto(&self) -> bool {
        self.objeto_imp == OBJETO_IMP_SI
    }
}

/// `ObjetoImp` value that demands a tax breakdown.
pub const OBJETO_IMP_SI: &str = "02";

/// `cfdi:Concepto/cfdi:Impuestos`. Either sequence may be present but empty;
/// the container is emitted whenever the model holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConceptoImpuestos {
    /// `cfdi:Traslados/cfdi:Traslado`
    pub traslados: Option<Vec<Traslado>>,
    /// `cfdi:Retenciones/cfdi:Retencion`
    pub retenciones: Option<Vec<Retencion>>,
}

impl ConceptoImpuestos {
    /// Number of tax entries across both sequences.
    pub fn entry_count(&self) -> usize {
        self.traslados.as_ref().map_or(0, Vec::len) + self.retenciones.as_ref().map_or(0, Vec::len)
    }
}

/// `@TipoFactor` with its casing normalized: the first character upper-case,
/// the rest lower-case, so `TASA` and `tasa` both become `Tasa`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TipoFactor(String);

impl TipoFactor {
    pub const TASA: &'static str = "Tasa";
    pub const CUOTA: &'static str = "Cuota";
    pub const EXENTO: &'static str = "Exento";

    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(capitalize(raw.as_ref().trim()))
    }

    pub fn tasa() -> Self {
        Self(Self::TASA.to_string())
    }

    pub fn cuota() -> Self {
        Self(Self::CUOTA.to_string())
    }

    pub fn exento() -> Self {
        Self(Self::EXENTO.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_exento(&self) -> bool {
        self.0 == Self::EXENTO
    }
}

impl From<String> for TipoFactor {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for TipoFactor {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<TipoFactor> for String {
    fn from(factor: TipoFactor) -> Self {
        factor.0
    }
}

impl std::fmt::Display for TipoFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `cfdi:Traslado` at line level: a charged tax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Traslado {
    /// `@Base`
    pub base: String,
    /// `@Impuesto` (c_Impuesto: 001 ISR, 002 IVA, 003 IEPS).
    pub impuesto: String,
    /// `@TipoFactor`
    pub tipo_factor: TipoFactor,
    /// `@TasaOCuota`: absent for `Exento`.
    pub tasa_o_cuota: Option<String>,
    /// `@Importe`: absent for `Exento`.
    pub importe: Option<String>,
}

impl Traslado {
    pub fn new(
        base: impl Into<String>,
        impuesto: impl Into<String>,
        tipo_factor: impl Into<TipoFactor>,
        tasa_o_cuota: Option<String>,
        importe: Option<String>,
    ) -> Self {
        Self {
            base: trimmed(base),
            impuesto: trimmed(impuesto),
            tipo_factor: tipo_factor.into(),
            tasa_o_cuota: tasa_o_cuota.and_then(non_empty),
            importe: importe.and_then(non_empty),
        }
    }

    pub fn tasa(
        base: impl Into<String>,
        impuesto: impl Into<String>,
        tasa: impl Into<String>,
        importe: impl Into<String>,
    ) -> Self {
        Self::new(
            base,
            impuesto,
            TipoFactor::tasa(),
            Some(tasa.into()),
            Some(importe.into()),
        )
    }

    pub fn cuota(
        base: impl Into<String>,
        impuesto: impl Into<String>,
        cuota: impl Into<String>,
        importe: impl Into<String>,
    ) -> Self {
        Self::new(
            base,
            impuesto,
            TipoFactor::cuota(),
            Some(cuota.into()),
            Some(importe.into()),
        )
    }

    pub fn exento(base: impl Into<String>, impuesto: impl Into<String>) -> Self {
        Self::new(base, impuesto, TipoFactor::exento(), None, None)
    }
}

/// `cfdi:Retencion` at line level: a withheld tax. No exemption variant:
/// every attribute is always emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Retencion {
    /// `@Base`
    pub base: String,
    /// `@Impuesto`
    pub impuesto: String,
    /// `@TipoFactor`
    pub tipo_factor: TipoFactor,
    /// `@TasaOCuota`
    pub tasa_o_cuota: String,
    /// `@Importe`
    pub importe: String,
}

impl Retencion {
    pub fn new(
        base: impl Into<String>,
        impuesto: impl Into<String>,
        tipo_factor: impl Into<TipoFactor>,
        tasa_o_cuota: impl Into<String>,
        importe: impl Into<String>,
    ) -> Self {
        Self {
            base: trimmed(base),
            impuesto: trimmed(impuesto),
            tipo_factor: tipo_factor.into(),
            tasa_o_cuota: trimmed(tasa_o_cuota),
            importe: trimmed(importe),
        }
    }
}

/// `cfdi:Impuestos` at document level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Impuestos {
    /// `@TotalImpuestosRetenidos`
    pub total_impuestos_retenidos: Option<String>,
    /// `@TotalImpuestosTrasladados`
    pub total_impuestos_trasladados: Option<String>,
    /// `cfdi:Retenciones/cfdi:Retencion`
    pub retenciones: Option<Vec<RetencionGlobal>>,
    /// `cfdi:Traslados/cfdi:Traslado`
    pub traslados: Option<Vec<TrasladoGlobal>>,
}

/// `cfdi:Impuestos/cfdi:Retenciones/cfdi:Retencion`: per-tax withheld total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RetencionGlobal {
    /// `@Impuesto`
    pub impuesto: String,
    /// `@Importe`
    pub importe: String,
}

impl RetencionGlobal {
    pub fn new(impuesto: impl Into<String>, importe: impl Into<String>) -> Self {
        Self {
            impuesto: trimmed(impuesto),
            importe: trimmed(importe),
        }
    }
}

/// `cfdi:Impuestos/cfdi:Traslados/cfdi:Traslado`: per-rate charged total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TrasladoGlobal {
    /// `@Base`
    pub base: String,
    /// `@Impuesto`
    pub impuesto: String,
    /// `@TipoFactor`
    pub tipo_factor: TipoFactor,
    /// `@TasaOCuota`
    pub tasa_o_cuota: String,
    /// `@Importe`
    pub importe: String,
}

impl TrasladoGlobal {
    pub fn new(
        base: impl Into<String>,
        impuesto: impl Into<String>,
        tipo_factor: impl Into<TipoFactor>,
        tasa_o_cuota: impl Into<String>,
        importe: impl Into<String>,
    ) -> Self {
        Self {
            base: trimmed(base),
            impuesto: trimmed(impuesto),
            tipo_factor: tipo_factor.into(),
            tasa_o_cuota: trimmed(tasa_o_cuota),
            importe: trimmed(importe),
        }
    }
}

/// Lower-case everything, then upper-case the first character.
pub(crate) fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn trimmed(s: impl Into<String>) -> String {
    let s = s.into();
    let t = s.trim();
    if t.len() == s.len() { s } else { t.to_string() }
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_empty(s: impl Into<String>) -> Option<String> {
    let s = trimmed(s);
    if s.is_empty() { None } else { Some(s) }
}
