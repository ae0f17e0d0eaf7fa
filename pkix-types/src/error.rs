//! Error types for PKIX types

use thiserror::Error;

/// Result type for PKIX types operations
pub type Result<T> = std::result::Result<T, Error>;

/// PKIX types error types
#[derive(Debug, Error)]
pub enum Error {
    // AlgorithmIdentifier errors
    #[error("AlgorithmIdentifier: expected SEQUENCE")]
    AlgorithmIdentifierExpectedSequence,
    #[error("AlgorithmIdentifier: expected OBJECT IDENTIFIER for algorithm")]
    AlgorithmIdentifierExpectedOid,
    #[error("AlgorithmIdentifier: empty sequence")]
    AlgorithmIdentifierEmpty,
    #[error("AlgorithmIdentifier: expected at most 2 elements, got {0}")]
    AlgorithmIdentifierInvalidElementCount(usize),

    // SubjectPublicKeyInfo errors
    #[error("SubjectPublicKeyInfo: expected SEQUENCE")]
    SubjectPublicKeyInfoExpectedSequence,
    #[error("SubjectPublicKeyInfo: expected BIT STRING for subject public key")]
    SubjectPublicKeyInfoExpectedBitString,
    #[error("SubjectPublicKeyInfo: expected 2 elements, got {0}")]
    SubjectPublicKeyInfoInvalidElementCount(usize),

    // NamedCurve errors
    #[error("unsupported elliptic curve: {0}")]
    UnsupportedCurve(String),
    #[error("EC parameters: expected a named curve OBJECT IDENTIFIER")]
    CurveExpectedOid,

    /// ASN.1 encoding/decoding error
    #[error("ASN.1 error: {0}")]
    ASN1Error(#[from] asn1::error::Error),
}
