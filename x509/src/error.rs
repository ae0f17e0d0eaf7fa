use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),
    #[error("invalid TBS certificate: {0}")]
    InvalidTBSCertificate(String),
    #[error("invalid version: {0}")]
    InvalidVersion(String),
    #[error("invalid certificate serial number: {0}")]
    InvalidCertificateSerialNumber(String),
    #[error("invalid validity: {0}")]
    InvalidValidity(String),
    #[error("invalid ASN.1: {0}")]
    InvalidASN1(#[from] asn1::error::Error),
    #[error("PKIX types error: {0}")]
    PKIXTypesError(#[from] pkix_types::Error),
}
