//! SEC1 (RFC 5915) error types

use thiserror::Error;

/// Errors that can occur when parsing or encoding SEC1 structures.
#[derive(Debug, Error)]
pub enum Error {
    /// ASN.1 parsing error
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    /// Expected a SEQUENCE element but got something else
    #[error("expected SEQUENCE")]
    ExpectedSequence,

    /// Expected an INTEGER element but got something else
    #[error("expected INTEGER for {0}")]
    ExpectedInteger(&'static str),

    /// Expected an OCTET STRING element but got something else
    #[error("expected OCTET STRING for privateKey")]
    ExpectedOctetString,

    /// The sequence has the wrong number of elements
    #[error("expected 2 to 4 elements, got {0}")]
    InvalidElementCount(usize),

    /// Invalid version number (must be 1 for ecPrivkeyVer1)
    #[error("invalid version: expected 1 (ecPrivkeyVer1), got {0}")]
    InvalidVersion(i64),

    /// Version integer value is out of range for i64
    #[error("version integer out of range")]
    VersionOutOfRange,

    /// `[0] parameters` is not a named curve OID
    #[error("expected OBJECT IDENTIFIER for [0] parameters")]
    ExpectedNamedCurve,

    /// `[1] publicKey` is not a BIT STRING
    #[error("expected BIT STRING for [1] publicKey")]
    ExpectedBitString,

    /// A trailing element that is neither `[0]` nor `[1]`
    #[error("unexpected element after privateKey")]
    UnexpectedElement,
}

pub type Result<T> = std::result::Result<T, Error>;
