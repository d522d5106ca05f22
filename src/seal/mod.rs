//! Sealing (sellado) of a comprobante.
//!
//! The sealer builds the original chain with the certificate's plain-text
//! serial, has an external [`Signer`] sign it with SHA-256 and returns a new
//! comprobante carrying `Sello`, `Certificado` and `NoCertificado`. Key
//! loading and RSA live behind the [`Signer`] trait.
//!
//! ```no_run
//! use cfdi::core::*;
//! use cfdi::seal::{seal, Signer};
//!
//! fn sign_and_render(c: &Comprobante, signer: &dyn Signer) -> Result<String, CfdiError> {
//!     let report = validate_cfdi(c);
//!     if !report.is_valid() {
//!         return Err(CfdiError::Validation(report.messages().join("; ")));
//!     }
//!     let sealed = seal(c, signer)?;
//!     cfdi::xml::to_cfdi_xml(&sealed.comprobante)
//! }
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::field::{get_field, set_field};
use crate::core::{CfdiError, Comprobante, original_chain};

/// Error type signers report; wrapped into [`CfdiError::Seal`].
pub type SignerError = Box<dyn std::error::Error + Send + Sync>;

/// Digest the signer must apply before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256, the only algorithm CFDI 4.0 accepts.
    Sha256,
}

impl DigestAlgorithm {
    /// Conventional name, as signing libraries spell it.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA256",
        }
    }

    /// Digest of `data`, for signers that sign pre-hashed input.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// A certificate and private key pair (CSD) able to sign.
pub trait Signer {
    /// Certificate serial number as a hexadecimal string.
    fn certificate_serial_hex(&self) -> Result<String, SignerError>;

    /// Raw DER bytes of the certificate.
    fn certificate_der(&self) -> Result<Vec<u8>, SignerError>;

    /// Raw signature over `data` (PKCS#1 v1.5 with `algorithm` for SAT keys).
    fn sign(&self, data: &[u8], algorithm: DigestAlgorithm) -> Result<Vec<u8>, SignerError>;
}

/// Output of [`seal`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sealed {
    /// The chain that was signed.
    pub cadena_original: String,
    /// Base64 signature, as written to `Sello`.
    pub sello: String,
    /// Base64 DER certificate, as written to `Certificado`.
    pub certificado: String,
    /// Hex serial, as written to `NoCertificado`.
    pub no_certificado: String,
    /// Plain-text serial used inside the chain.
    pub no_certificado_string: String,
    /// Copy of the input with the three sealing fields set.
    pub comprobante: Comprobante,
}

/// Seal a comprobante. The input is never modified.
///
/// Every signer call happens before any field is written, so a failing
/// signer yields [`CfdiError::Seal`] and no sealed document at all.
pub fn seal<S: Signer + ?Sized>(c: &Comprobante, signer: &S) -> Result<Sealed, CfdiError> {
    let no_certificado = signer
        .certificate_serial_hex()
        .map_err(|e| CfdiError::Seal(format!("cannot read the certificate serial: {e}")))?
        .trim()
        .to_string();
    let no_certificado_string = decode_serial(&no_certificado)?;

    let der = signer
        .certificate_der()
        .map_err(|e| CfdiError::Seal(format!("cannot read the certificate: {e}")))?;
    if der.is_empty() {
        return Err(CfdiError::Seal("the certificate is empty".into()));
    }
    let certificado = STANDARD.encode(&der);

    let cadena_original = original_chain(c, &no_certificado_string);
    let signature = signer
        .sign(cadena_original.as_bytes(), DigestAlgorithm::Sha256)
        .map_err(|e| CfdiError::Seal(format!("signing failed: {e}")))?;
    let sello = STANDARD.encode(&signature);

    debug!(
        serial = %no_certificado_string,
        chain_len = cadena_original.len(),
        "sealed comprobante"
    );

    let comprobante = Comprobante {
        no_certificado: Some(no_certificado.clone()),
        certificado: Some(certificado.clone()),
        sello: Some(sello.clone()),
        ..c.clone()
    };

    Ok(Sealed {
        cadena_original,
        sello,
        certificado,
        no_certificado,
        no_certificado_string,
        comprobante,
    })
}

/// Seal loosely shaped JSON input.
///
/// The input is normalized with [`Comprobante::from_json`] and sealed with
/// [`seal`]. The returned value is a copy of `raw` with `NoCertificado`,
/// `Certificado` and `Sello` written in whichever casing the document
/// already uses for each field, camelCase when the field is new.
pub fn seal_json<S: Signer + ?Sized>(
    raw: &Value,
    signer: &S,
) -> Result<(Sealed, Value), CfdiError> {
    let c = Comprobante::from_json(raw)?;
    let sealed = seal(&c, signer)?;

    let mut out = raw.clone();
    let target = root_mut(&mut out)
        .ok_or_else(|| CfdiError::Input("the invoice structure is not an object".into()))?;
    set_field(
        target,
        "NoCertificado",
        Value::String(sealed.no_certificado.clone()),
    );
    set_field(
        target,
        "Certificado",
        Value::String(sealed.certificado.clone()),
    );
    set_field(target, "Sello", Value::String(sealed.sello.clone()));

    Ok((sealed, out))
}

/// The comprobante object inside `raw`, looking through a wrapper.
fn root_mut(raw: &mut Value) -> Option<&mut serde_json::Map<String, Value>> {
    let wrapped = get_field(Some(&*raw), "Comprobante").is_some_and(Value::is_object);
    if !wrapped {
        return raw.as_object_mut();
    }
    let obj = raw.as_object_mut()?;
    let key = if obj.contains_key("Comprobante") {
        "Comprobante"
    } else {
        "comprobante"
    };
    obj.get_mut(key)?.as_object_mut()
}

/// Decode a hex certificate serial into its plain-text form.
///
/// SAT serials are ASCII digits, so `3330303031...` decodes to `30001...`.
pub fn decode_serial(hex_serial: &str) -> Result<String, CfdiError> {
    let bytes = hex::decode(hex_serial.trim())
        .map_err(|e| CfdiError::Seal(format!("invalid certificate serial '{hex_serial}': {e}")))?;
    let serial = String::from_utf8(bytes)
        .map_err(|_| CfdiError::Seal(format!("certificate serial '{hex_serial}' is not text")))?;
    if serial.is_empty() {
        return Err(CfdiError::Seal("the certificate serial is empty".into()));
    }
    Ok(serial)
}
