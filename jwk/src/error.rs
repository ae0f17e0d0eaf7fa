use pkix_types::NamedCurve;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("can't decode input as PEM: {0}")]
    PemDecode(#[from] pem::error::Error),

    #[error("DER block does not encode a recognised cryptographic object")]
    UnrecognizedDer,

    #[error("JWK does not support {0}")]
    UnsupportedAlgorithm(String),

    #[error("need a private key; got a public")]
    ExpectedPrivateGotPublic,

    #[error("need a private key; got a certificate")]
    ExpectedPrivateGotCertificate,

    #[error("unknown key type {0:?}")]
    UnknownKeyType(String),

    #[error("unknown algorithm {0:?}; must start 'RS'")]
    AlgorithmMismatch(String),

    #[error("unknown curve {0}")]
    UnknownCurve(String),

    #[error("RSA keys must have precisely 2 prime factors, got {0}")]
    UnsupportedPrimeCount(usize),

    #[error("expected precisely one PEM block, got {0}")]
    BlockCountMismatch(usize),

    #[error("error in key {index}: {source}")]
    PartialBatchFailure {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWK member {member:?} is not base64url: {source}")]
    Base64 {
        member: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("JWK is missing member {0:?}")]
    MissingMember(&'static str),

    #[error("RSA public exponent is wider than 64 bits")]
    InvalidExponent,

    #[error("RSA primes do not admit CRT values")]
    InvalidRsaPrimes,

    #[error("invalid {0} private key")]
    InvalidEcPrivateKey(NamedCurve),

    #[error("EC private key does not name its curve")]
    MissingCurve,

    #[error("invalid {0} point")]
    InvalidEcPoint(NamedCurve),

    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] pkcs::pkcs1::Error),

    #[error("PKCS#8 error: {0}")]
    Pkcs8(#[from] pkcs::pkcs8::Error),

    #[error("SEC1 error: {0}")]
    Sec1(#[from] pkcs::sec1::Error),

    #[error(transparent)]
    PkixTypes(#[from] pkix_types::Error),

    #[error("X.509 error: {0}")]
    X509(#[from] x509::error::Error),
}

impl Error {
    /// Attach the position of the failing element of a batch.
    pub(crate) fn at(self, index: usize) -> Self {
        Error::PartialBatchFailure {
            index,
            source: Box::new(self),
        }
    }
}
