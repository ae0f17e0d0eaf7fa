//! # jwk
//!
//! Conversion between PEM-armoured keys and JSON Web Keys.
//!
//! A PEM block is decoded to DER, the DER is recognised as one of six
//! containers (X.509 `SubjectPublicKeyInfo`, PKCS#1 public and private keys,
//! an X.509 certificate, PKCS#8 and SEC1 private keys) and the key inside is
//! lifted into [`Key`]. From there it is projected to a [`Jwk`] or collected
//! into a [`Jwks`].
//!
//! The reverse direction always normalises: public keys are rendered as
//! `PUBLIC KEY` blocks holding a `SubjectPublicKeyInfo`, private keys as
//! `PRIVATE KEY` blocks holding PKCS#8.
//!
//! Only RSA and ECDSA over P-224, P-256, P-384 and P-521 are supported.
//! Ed25519, X25519, Ed448 and X448 keys are recognised and rejected with
//! [`Error::UnsupportedAlgorithm`].
//!
//! ## Polarity
//!
//! The `private` flag of the PEM and JWK entry points selects which half
//! of a key is wanted. With `private = false` any input is accepted and
//! reduced to its public part. With `private = true` public keys and
//! certificates are rejected.

pub mod error;
pub mod jwk;
pub mod jwks;
pub mod key;
pub mod recognize;
pub mod render;

#[cfg(test)]
mod fixtures;

use indexmap::IndexMap;
use kagi::decoder::Decoder;
use pem::{Pem, ToPem};

pub use crate::error::{Error, Result};
pub use crate::jwk::Jwk;
pub use crate::jwks::Jwks;
pub use crate::key::{
    CrtValues, EcdsaPrivateKey, EcdsaPublicKey, Key, PrivateKeyLike, PublicKeyLike, RsaPrivateKey,
    RsaPublicKey,
};

/// Decode a PEM document holding exactly one key, in either polarity.
pub fn pem_to_key(text: &str) -> Result<Key> {
    let pems = pem::parse_all(text)?;
    let [pem] = pems.as_slice() else {
        return Err(Error::BlockCountMismatch(pems.len()));
    };
    let der: Vec<u8> = pem.decode()?;
    recognize::recognize(&der)
}

/// Decode every key of a PEM document, in either polarity.
pub fn pem_to_keys(text: &str) -> Result<Vec<Key>> {
    pem::parse_all(text)?
        .iter()
        .enumerate()
        .map(|(index, pem)| {
            let der: Vec<u8> = pem.decode().map_err(|e| Error::from(e).at(index))?;
            recognize::recognize(&der).map_err(|e| e.at(index))
        })
        .collect()
}

/// Convert a PEM document holding exactly one key to JWK JSON.
pub fn pem_to_jwk(text: &str, private: bool) -> Result<String> {
    let pems = pem::parse_all(text)?;
    let [pem] = pems.as_slice() else {
        return Err(Error::BlockCountMismatch(pems.len()));
    };
    let key = block_key(pem, private)?;
    Jwk::from_key(&key, None)?.to_json()
}

/// Convert every block of a PEM document to a JWKS, in block order.
pub fn pem_to_jwks(text: &str, private: bool) -> Result<String> {
    let keys = pem::parse_all(text)?
        .iter()
        .enumerate()
        .map(|(index, pem)| block_key(pem, private).map_err(|e| e.at(index)))
        .collect::<Result<Vec<_>>>()?;
    Jwks::from_keys(keys.iter().map(|key| (key, None)))?.to_json()
}

/// Convert one JWK to a single PEM block.
pub fn jwk_to_pem(json: &str, private: bool) -> Result<String> {
    let key: Key = Jwk::from_json(json)?.decode()?;
    let pem = select_polarity(key, private)?.to_pem()?;
    Ok(pem::render(&[pem]))
}

/// Convert a JWKS to PEM, one block per key in array order.
pub fn jwks_to_pem(json: &str, private: bool) -> Result<String> {
    let pems = Jwks::from_json(json)?
        .to_keys()?
        .into_values()
        .enumerate()
        .map(|(index, key)| {
            select_polarity(key, private)
                .and_then(|key| key.to_pem())
                .map_err(|e| e.at(index))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(pem::render(&pems))
}

/// The public half of `key`.
pub fn key_public_part(key: &Key) -> Key {
    key.public_part()
}

pub fn key_to_jwk(key: &Key, kid: Option<String>) -> Result<String> {
    Jwk::from_key(key, kid)?.to_json()
}

pub fn keys_to_jwks(keys: &[Key]) -> Result<String> {
    Jwks::from_keys(keys.iter().map(|key| (key, None)))?.to_json()
}

pub fn jwk_to_key(json: &str) -> Result<Key> {
    Jwk::from_json(json)?.decode()
}

/// Decode a JWKS into keys indexed by `kid`, see [`Jwks::to_keys`].
pub fn jwks_to_keys(json: &str) -> Result<IndexMap<String, Key>> {
    Jwks::from_json(json)?.to_keys()
}

fn block_key(pem: &Pem, private: bool) -> Result<Key> {
    let der: Vec<u8> = pem.decode()?;
    if private {
        recognize::recognize_private(&der)
    } else {
        recognize::recognize_public(&der)
    }
}

fn select_polarity(key: Key, private: bool) -> Result<Key> {
    match (private, key.is_private()) {
        (true, true) => Ok(key),
        (true, false) => Err(Error::ExpectedPrivateGotPublic),
        (false, _) => Ok(key.into_public_part()),
    }
}
