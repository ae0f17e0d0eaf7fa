//! PKIX (Public Key Infrastructure using X.509) Common Types
//!
//! This crate provides the type definitions shared by X.509 certificates
//! (RFC 5280) and the PKCS key containers:
//! - `AlgorithmIdentifier` (RFC 5280 Section 4.1.1.2)
//! - `SubjectPublicKeyInfo` (RFC 5280 Section 4.1.2.7)
//! - `NamedCurve` (RFC 5480 Section 2.1.1.1)

pub mod algorithm;
pub mod curve;
pub mod error;
pub mod oid_name;
pub mod subject_public_key_info;

pub use algorithm::{AlgorithmIdentifier, AlgorithmParameters};
pub use curve::NamedCurve;
pub use error::{Error, Result};
pub use oid_name::OidName;
pub use subject_public_key_info::SubjectPublicKeyInfo;
