//! JSON Web Key codec.
//!
//! [`Jwk`] is the JSON projection of one [`Key`] plus its optional `kid`.
//! Members are serialized in declaration order and absent members are
//! omitted, so the JSON text of a key is deterministic.
//!
//! Two conventions differ from common JOSE usage:
//!
//! * `alg` for RSA keys is `"RS"` followed by the modulus length in bits,
//!   e.g. `"RS2048"`.
//! * `e` is written with a table-driven width (see [`exponent_width`])
//!   instead of its minimal big-endian form.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use num_bigint::BigUint;
use pkix_types::NamedCurve;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key::{EcdsaPrivateKey, EcdsaPublicKey, Key, PrivateKeyLike, RsaPrivateKey, RsaPublicKey};

/// Width of the scratch buffer an exponent is decoded through.
const EXPONENT_SCRATCH_WIDTH: usize = u64::BITS as usize / 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default)]
    pub kty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

impl Jwk {
    /// Project `key` into its JWK members. An empty `kid` is dropped.
    pub fn from_key(key: &Key, kid: Option<String>) -> Result<Self> {
        let mut jwk = match key {
            Key::RsaPublic(key) => rsa_public_members(key),
            Key::RsaPrivate(key) => rsa_private_members(key)?,
            Key::EcdsaPublic(key) => ec_public_members(key),
            Key::EcdsaPrivate(key) => Jwk {
                d: Some(encode_uint(key.d())),
                ..ec_public_members(key.public_key())
            },
        };
        jwk.kid = kid.filter(|kid| !kid.is_empty());
        Ok(jwk)
    }

    /// Parse one JWK object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The key identifier, treating an empty string as absent.
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref().filter(|kid| !kid.is_empty())
    }
}

impl DecodableFrom<Jwk> for Key {}

impl Decoder<Jwk, Key> for Jwk {
    type Error = Error;

    fn decode(&self) -> Result<Key> {
        match self.kty.as_str() {
            "RSA" => self.decode_rsa(),
            "EC" => self.decode_ec(),
            // Octet key pairs: Ed25519, X25519, Ed448, X448.
            "OKP" => Err(Error::UnsupportedAlgorithm(
                self.crv.clone().unwrap_or_else(|| self.kty.clone()),
            )),
            other => Err(Error::UnknownKeyType(other.to_string())),
        }
    }
}

impl EncodableTo<Key> for Jwk {}

impl Encoder<Key, Jwk> for Key {
    type Error = Error;

    fn encode(&self) -> Result<Jwk> {
        Jwk::from_key(self, None)
    }
}

impl Jwk {
    fn decode_rsa(&self) -> Result<Key> {
        let alg = self.alg.as_deref().unwrap_or_default();
        if !alg.starts_with("RS") {
            return Err(Error::AlgorithmMismatch(alg.to_string()));
        }
        let n = decode_uint(&self.n, "n")?;
        let e = decode_exponent(&decode_member(&self.e, "e")?)?;
        let public = RsaPublicKey::new(n, e);
        if self.d.is_none() {
            return Ok(Key::RsaPublic(public));
        }

        // dp, dq and qi are recomputed rather than trusted.
        let private = RsaPrivateKey::new(
            public,
            decode_uint(&self.d, "d")?,
            decode_uint(&self.p, "p")?,
            decode_uint(&self.q, "q")?,
        )?;
        Ok(Key::RsaPrivate(private))
    }

    fn decode_ec(&self) -> Result<Key> {
        let crv = self.crv.as_deref().ok_or(Error::MissingMember("crv"))?;
        let curve: NamedCurve = crv
            .parse()
            .map_err(|_| Error::UnknownCurve(crv.to_string()))?;
        let public = EcdsaPublicKey::new(curve, decode_uint(&self.x, "x")?, decode_uint(&self.y, "y")?);
        match &self.d {
            None => Ok(Key::EcdsaPublic(public)),
            Some(_) => Ok(Key::EcdsaPrivate(EcdsaPrivateKey::new(
                public,
                decode_uint(&self.d, "d")?,
            ))),
        }
    }
}

fn rsa_public_members(key: &RsaPublicKey) -> Jwk {
    Jwk {
        kty: "RSA".to_string(),
        alg: Some(format!("RS{}", key.bits())),
        n: Some(encode_uint(key.n())),
        e: Some(URL_SAFE_NO_PAD.encode(encode_exponent(key.e()))),
        ..Default::default()
    }
}

fn rsa_private_members(key: &RsaPrivateKey) -> Result<Jwk> {
    let [p, q] = key.primes() else {
        return Err(Error::UnsupportedPrimeCount(key.primes().len()));
    };
    let crt = key.crt_values()?;
    Ok(Jwk {
        d: Some(encode_uint(key.d())),
        p: Some(encode_uint(p)),
        q: Some(encode_uint(q)),
        dp: Some(encode_uint(&crt.dp)),
        dq: Some(encode_uint(&crt.dq)),
        qi: Some(encode_uint(&crt.qinv)),
        ..rsa_public_members(key.public_key())
    })
}

fn ec_public_members(key: &EcdsaPublicKey) -> Jwk {
    Jwk {
        kty: "EC".to_string(),
        crv: Some(key.curve().jwk_name().to_string()),
        x: Some(encode_uint(key.x())),
        y: Some(encode_uint(key.y())),
        ..Default::default()
    }
}

/// Byte width of the `e` member for the public exponent `e`.
///
/// The common exponents get the width of their minimal encoding; anything
/// else is written at the platform integer width.
pub fn exponent_width(e: u64) -> usize {
    match e {
        3 | 5 | 17 => 1,
        257 | 65537 => 3,
        _ => usize::BITS as usize / 8,
    }
}

/// Big-endian `e`, left-padded or truncated to [`exponent_width`] bytes.
pub fn encode_exponent(e: u64) -> Vec<u8> {
    let bytes = e.to_be_bytes();
    let width = exponent_width(e).min(bytes.len());
    bytes[bytes.len() - width..].to_vec()
}

/// Read a big-endian exponent of at most eight bytes.
///
/// Writers that lay `e` out little-endian agree with this reading only for
/// 3, 5, 17 and 65537. Any other exponent from such a writer reads back as
/// a different value, e.g. `AQEA` (257 little-endian) decodes to 65792.
/// Members wider than eight bytes fail with [`Error::InvalidExponent`]
/// instead of being truncated.
pub fn decode_exponent(bytes: &[u8]) -> Result<u64> {
    if bytes.len() > EXPONENT_SCRATCH_WIDTH {
        return Err(Error::InvalidExponent);
    }
    let mut scratch = [0u8; EXPONENT_SCRATCH_WIDTH];
    scratch[EXPONENT_SCRATCH_WIDTH - bytes.len()..].copy_from_slice(bytes);
    Ok(u64::from_be_bytes(scratch))
}

fn encode_uint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

fn decode_member(value: &Option<String>, member: &'static str) -> Result<Vec<u8>> {
    let value = value.as_deref().ok_or(Error::MissingMember(member))?;
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|source| Error::Base64 { member, source })
}

fn decode_uint(value: &Option<String>, member: &'static str) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(&decode_member(value, member)?))
}
