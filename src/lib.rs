//! # cfdi
//!
//! Core of the Mexican CFDI 4.0 electronic invoice lifecycle: the
//! `Comprobante` document model, the original chain (cadena original) that
//! is signed, the `cfdi:` XML markup, structural validation, sealing and
//! parsing retrieved documents into a flat record.
//!
//! Every numeric-looking value (amounts, rates, quantities) is kept as a
//! trimmed string. The chain and the signature are computed over the exact
//! text, so nothing is ever re-formatted.
//!
//! ## Quick Start
//!
//! ```rust
//! use cfdi::core::*;
//!
//! let comprobante = ComprobanteBuilder::new("2024-06-15T10:30:00")
//!     .forma_pago("01")
//!     .metodo_pago("PUE")
//!     .lugar_expedicion("64000")
//!     .sub_total("100.00")
//!     .total("100.00")
//!     .emisor(Emisor::new("EKU9003173C9", "ESCUELA KEMPER URGATE", "601"))
//!     .receptor(Receptor::new("URE180429TM6", "UNIVERSIDAD ROBOTICA ESPAÑOLA", "86991", "601", "G03"))
//!     .add_concepto(
//!         ConceptoBuilder::new("84111506", "1", "ACT", "Servicio de facturacion", "100.00", "100.00")
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let chain = original_chain(&comprobante, "30001000000500003416");
//! assert!(chain.starts_with("||4.0|2024-06-15T10:30:00|01|30001000000500003416|"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Document model, builders, validation, original chain |
//! | `xml` | `cfdi:Comprobante` serialization and record parsing |
//! | `seal` | Signer capability and sealing |
//! | `all` | Everything |
//!
//! `core`, `xml` and `seal` are enabled by default.

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "seal")]
pub mod seal;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
