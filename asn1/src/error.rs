//! Error types for ASN.1 parsing and encoding.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that can occur during ASN.1 parsing and encoding operations.
#[derive(Debug, Error)]
pub enum Error {
    // Boolean errors
    #[error("invalid boolean")]
    InvalidBoolean,

    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: value out of range for i64")]
    IntegerOutOfRangeI64,
    #[error("INTEGER: value out of range for u64")]
    IntegerOutOfRangeU64,
    #[error("INTEGER: negative value where unsigned expected")]
    IntegerNegative,
    #[error("parse int error: {0}")]
    ParseInt(ParseIntError),

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: invalid leading arcs {0}.{1}")]
    ObjectIdentifierInvalidArcs(u64, u64),

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),

    // String type errors
    #[error("UTF8String: invalid UTF-8")]
    Utf8StringInvalidUtf8,
    #[error("PrintableString: invalid encoding")]
    PrintableStringInvalidEncoding,
    #[error("IA5String: invalid encoding")]
    Ia5StringInvalidEncoding,

    // Time errors
    #[error("UTCTime: invalid format")]
    UtcTimeInvalidFormat,
    #[error("GeneralizedTime: invalid format")]
    GeneralizedTimeInvalidFormat,

    // Context-specific errors
    #[error("invalid context-specific value: {slot}, {msg}")]
    InvalidContextSpecific { slot: u8, msg: &'static str },

    // DER errors
    #[error("invalid DER encoding: {0}")]
    FailedToDecodeDer(#[source] der::error::Error),

    // Element errors
    #[error("element: cannot encode {0}")]
    ElementCannotEncode(&'static str),
}
