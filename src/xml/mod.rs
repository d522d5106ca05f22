//! CFDI 4.0 markup: serialization, generic tree conversion and parsing of
//! retrieved documents into a normalized record.
//!
//! # Example
//!
//! ```no_run
//! use cfdi::core::*;
//! use cfdi::xml;
//!
//! let comprobante: Comprobante = todo!(); // build via ComprobanteBuilder
//! let markup = xml::to_cfdi_xml(&comprobante).unwrap();
//! let record = xml::from_cfdi_xml(&markup, "facturas/A-123.xml", None).unwrap();
//! ```

mod record;
mod tree;
mod write;
pub(crate) mod xml_utils;

pub use record::{
    CfdiRecord, ConceptoRecord, EmisorRecord, ImpuestosRecord, ReceptorRecord, TotalesRecord,
    from_cfdi_xml,
};
pub use tree::xml_to_value;
pub use write::to_cfdi_xml;

/// CFDI 4.0 namespace URI.
pub const CFDI_NS: &str = "http://www.sat.gob.mx/cfd/4";

/// XML Schema instance namespace URI.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// `xsi:schemaLocation` of a CFDI 4.0 document.
pub const SCHEMA_LOCATION: &str =
    "http://www.sat.gob.mx/cfd/4 http://www.sat.gob.mx/sitio_internet/cfd/4/cfdv40.xsd";

/// Prefix bound to [`CFDI_NS`] in emitted markup.
pub const CFDI_PREFIX: &str = "cfdi";
