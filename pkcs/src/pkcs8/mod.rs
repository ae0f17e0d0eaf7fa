//! PKCS#8: Private-Key Information Syntax Specification
//!
//! This module implements [RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958) (Asymmetric Key Packages)
//! which obsoletes RFC 5208 (PKCS#8 v1.2).
//!
//! Provides a generic format for storing private keys with algorithm identification.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use pkix_types::{AlgorithmIdentifier, AlgorithmParameters};
pub use types::{OneAsymmetricKey, PrivateKeyInfo, Version};
