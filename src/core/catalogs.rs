//! SAT catalog lookups (Anexo 20, CFDI 4.0) used by extended validation.
//!
//! Only the small, stable catalogs are carried here. Product/service and
//! unit keys (c_ClaveProdServ, c_ClaveUnidad) have tens of thousands of
//! entries and are left to the authority's own validation.

/// c_TipoDeComprobante: I ingreso, E egreso, T traslado, N nómina, P pago.
pub fn is_known_tipo_de_comprobante(code: &str) -> bool {
    TIPOS_DE_COMPROBANTE.binary_search(&code).is_ok()
}

/// c_Exportacion.
pub fn is_known_exportacion(code: &str) -> bool {
    EXPORTACION.binary_search(&code).is_ok()
}

/// c_MetodoPago.
pub fn is_known_metodo_pago(code: &str) -> bool {
    METODOS_DE_PAGO.binary_search(&code).is_ok()
}

/// c_FormaPago.
pub fn is_known_forma_pago(code: &str) -> bool {
    FORMAS_DE_PAGO.binary_search(&code).is_ok()
}

/// c_ObjetoImp.
pub fn is_known_objeto_imp(code: &str) -> bool {
    OBJETOS_IMP.binary_search(&code).is_ok()
}

/// c_Impuesto: 001 ISR, 002 IVA, 003 IEPS.
pub fn is_known_impuesto(code: &str) -> bool {
    IMPUESTOS.binary_search(&code).is_ok()
}

/// c_RegimenFiscal.
pub fn is_known_regimen_fiscal(code: &str) -> bool {
    REGIMENES_FISCALES.binary_search(&code).is_ok()
}

/// c_UsoCFDI. Accepts the historical `S_01` spelling by dropping the first
/// underscore, as the chain does.
pub fn is_known_uso_cfdi(code: &str) -> bool {
    let code = code.replacen('_', "", 1);
    USOS_CFDI.binary_search(&code.as_str()).is_ok()
}

/// c_Periodicidad.
pub fn is_known_periodicidad(code: &str) -> bool {
    PERIODICIDADES.binary_search(&code).is_ok()
}

/// c_Meses: 01-12 plus the bimonthly periods 13-18.
pub fn is_known_mes(code: &str) -> bool {
    code.len() == 2 && matches!(code.parse::<u8>(), Ok(1..=18))
}

// All lists sorted for binary search.

static TIPOS_DE_COMPROBANTE: &[&str] = &["E", "I", "N", "P", "T"];

static EXPORTACION: &[&str] = &[
    "01", // No aplica
    "02", // Definitiva con clave A1
    "03", // Temporal
    "04", // Definitiva con clave distinta a A1
];

static METODOS_DE_PAGO: &[&str] = &[
    "PPD", // Pago en parcialidades o diferido
    "PUE", // Pago en una sola exhibición
];

static FORMAS_DE_PAGO: &[&str] = &[
    "01", // Efectivo
    "02", // Cheque nominativo
    "03", // Transferencia electrónica de fondos
    "04", // Tarjeta de crédito
    "05", // Monedero electrónico
    "06", // Dinero electrónico
    "08", // Vales de despensa
    "12", // Dación en pago
    "13", // Pago por subrogación
    "14", // Pago por consignación
    "15", // Condonación
    "17", // Compensación
    "23", // Novación
    "24", // Confusión
    "25", // Remisión de deuda
    "26", // Prescripción o caducidad
    "27", // A satisfacción del acreedor
    "28", // Tarjeta de débito
    "29", // Tarjeta de servicios
    "30", // Aplicación de anticipos
    "31", // Intermediario pagos
    "99", // Por definir
];

static OBJETOS_IMP: &[&str] = &[
    "01", // No objeto de impuesto
    "02", // Sí objeto de impuesto
    "03", // Sí objeto del impuesto y no obligado al desglose
    "04", // Sí objeto del impuesto y no causa impuesto
    "05", // Sí objeto del impuesto, IVA crédito PODEBI
];

static IMPUESTOS: &[&str] = &["001", "002", "003"];

static REGIMENES_FISCALES: &[&str] = &[
    "601", // General de Ley Personas Morales
    "603", // Personas Morales con Fines no Lucrativos
    "605", // Sueldos y Salarios
    "606", // Arrendamiento
    "607", // Enajenación o Adquisición de Bienes
    "608", // Demás ingresos
    "610", // Residentes en el Extranjero
    "611", // Ingresos por Dividendos
    "612", // Actividades Empresariales y Profesionales
    "614", // Ingresos por intereses
    "615", // Obtención de premios
    "616", // Sin obligaciones fiscales
    "620", // Sociedades Cooperativas de Producción
    "621", // Incorporación Fiscal
    "622", // Actividades Agrícolas, Ganaderas, Silvícolas y Pesqueras
    "623", // Opcional para Grupos de Sociedades
    "624", // Coordinados
    "625", // Plataformas Tecnológicas
    "626", // Régimen Simplificado de Confianza
];

static USOS_CFDI: &[&str] = &[
    "CN01", // Nómina
    "CP01", // Pagos
    "D01",  // Honorarios médicos
    "D02",  // Gastos médicos por incapacidad
    "D03",  // Gastos funerales
    "D04",  // Donativos
    "D05",  // Intereses hipotecarios
    "D06",  // Aportaciones voluntarias al SAR
    "D07",  // Primas de seguros de gastos médicos
    "D08",  // Transportación escolar
    "D09",  // Depósitos en cuentas para el ahorro
    "D10",  // Servicios educativos
    "G01",  // Adquisición de mercancías
    "G02",  // Devoluciones, descuentos o bonificaciones
    "G03",  // Gastos en general
    "I01",  // Construcciones
    "I02",  // Mobiliario y equipo de oficina
    "I03",  // Equipo de transporte
    "I04",  // Equipo de cómputo
    "I05",  // Dados, troqueles, moldes
    "I06",  // Comunicaciones telefónicas
    "I07",  // Comunicaciones satelitales
    "I08",  // Otra maquinaria y equipo
    "S01",  // Sin efectos fiscales
];

static PERIODICIDADES: &[&str] = &[
    "01", // Diario
    "02", // Semanal
    "03", // Quincenal
    "04", // Mensual
    "05", // Bimestral
];
