//! Key container structures.
//!
//! - [`pkcs1`]: RSA public and private keys (RFC 8017)
//! - [`pkcs8`]: algorithm-tagged private keys (RFC 5958)
//! - [`sec1`]: EC private keys (RFC 5915)

pub mod pkcs1;
pub mod pkcs8;
pub mod sec1;
