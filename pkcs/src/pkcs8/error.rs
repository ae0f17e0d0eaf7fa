use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid version: {0}")]
    InvalidVersion(i64),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected OCTET STRING for {field}")]
    ExpectedOctetString { field: &'static str },

    #[error("expected INTEGER for version")]
    ExpectedVersionInteger,

    #[error("version out of range for i64")]
    VersionOutOfRange,

    #[error("unexpected element after privateKey")]
    UnexpectedElement,

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("PKIX types error: {0}")]
    PkixTypes(#[from] pkix_types::Error),
}
