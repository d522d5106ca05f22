//! Core CFDI 4.0 types, normalization, validation and the original chain.
//!
//! This module holds the document model for a Mexican electronic invoice
//! (comprobante fiscal digital por internet) and everything that works on it
//! without touching markup or cryptography.

mod builder;
pub mod catalogs;
mod chain;
mod error;
pub mod field;
pub(crate) mod layout;
mod listing;
mod normalize;
mod types;
mod validation;

pub use builder::*;
pub use chain::*;
pub use error::*;
pub use listing::*;
pub use types::*;
pub use validation::*;
