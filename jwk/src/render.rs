//! DER rendering of keys.
//!
//! Public keys always become X.509 `SubjectPublicKeyInfo` and private keys
//! always become PKCS#8 v1, whatever container they were read from. EC
//! private keys embed a SEC1 structure without curve parameters and with
//! the public point, and both the scalar and the coordinates are padded to
//! the curve's field width.

use asn1::{ASN1Object, BitString, Element, Integer, OctetString};
use der::Der;
use kagi::encoder::Encoder;
use num_bigint::BigUint;
use pem::{Label, Pem, ToPem};
use pkcs::pkcs1::{self, RSAPublicKey};
use pkcs::pkcs8::OneAsymmetricKey;
use pkcs::sec1::{self, ECPrivateKey};
use pkix_types::{AlgorithmIdentifier, SubjectPublicKeyInfo};

use crate::error::{Error, Result};
use crate::key::{EcdsaPrivateKey, EcdsaPublicKey, Key, PrivateKeyLike, RsaPrivateKey, RsaPublicKey};

/// `SubjectPublicKeyInfo` DER of the public part of `key`.
pub fn public_key_der(key: &Key) -> Result<Vec<u8>> {
    let spki = match key {
        Key::RsaPublic(key) => rsa_spki(key)?,
        Key::RsaPrivate(key) => rsa_spki(key.public_key())?,
        Key::EcdsaPublic(key) => ec_spki(key)?,
        Key::EcdsaPrivate(key) => ec_spki(key.public_key())?,
    };
    let element: Element = spki.encode()?;
    to_der(element)
}

/// PKCS#8 DER of a private key.
pub fn private_key_der(key: &Key) -> Result<Vec<u8>> {
    let pkcs8 = match key {
        Key::RsaPublic(_) | Key::EcdsaPublic(_) => return Err(Error::ExpectedPrivateGotPublic),
        Key::RsaPrivate(key) => rsa_pkcs8(key)?,
        Key::EcdsaPrivate(key) => ec_pkcs8(key)?,
    };
    let element: Element = pkcs8.encode()?;
    to_der(element)
}

impl ToPem for Key {
    type Error = Error;

    fn pem_label(&self) -> Label {
        if self.is_private() {
            Label::PrivateKey
        } else {
            Label::PublicKey
        }
    }

    fn to_pem(&self) -> Result<Pem> {
        let der = if self.is_private() {
            private_key_der(self)?
        } else {
            public_key_der(self)?
        };
        Ok(Pem::from_bytes(self.pem_label(), &der))
    }
}

pub(crate) fn to_der(element: Element) -> Result<Vec<u8>> {
    let der: Der = ASN1Object::new(vec![element]).encode()?;
    let bytes: Vec<u8> = der.encode()?;
    Ok(bytes)
}

fn rsa_spki(key: &RsaPublicKey) -> Result<SubjectPublicKeyInfo> {
    let rsa_key = RSAPublicKey {
        modulus: Integer::from(key.n()),
        public_exponent: Integer::from(key.e()),
    };
    let element: Element = rsa_key.encode()?;
    Ok(SubjectPublicKeyInfo::new(
        AlgorithmIdentifier::rsa_encryption()?,
        BitString::from(to_der(element)?),
    ))
}

fn ec_spki(key: &EcdsaPublicKey) -> Result<SubjectPublicKeyInfo> {
    Ok(SubjectPublicKeyInfo::new(
        AlgorithmIdentifier::ec_public_key(key.curve())?,
        BitString::from(ec_point(key)?),
    ))
}

fn rsa_pkcs8(key: &RsaPrivateKey) -> Result<OneAsymmetricKey> {
    let [p, q] = key.primes() else {
        return Err(Error::UnsupportedPrimeCount(key.primes().len()));
    };
    let crt = key.crt_values()?;
    let public = key.public_key();
    let rsa_key = pkcs1::RSAPrivateKey {
        version: pkcs1::Version::TwoPrime,
        modulus: Integer::from(public.n()),
        public_exponent: Integer::from(public.e()),
        private_exponent: Integer::from(key.d()),
        prime1: Integer::from(p),
        prime2: Integer::from(q),
        exponent1: Integer::from(crt.dp),
        exponent2: Integer::from(crt.dq),
        coefficient: Integer::from(crt.qinv),
        other_prime_infos: Vec::new(),
    };
    let element: Element = rsa_key.encode()?;
    Ok(OneAsymmetricKey::new(
        AlgorithmIdentifier::rsa_encryption()?,
        OctetString::from(to_der(element)?),
    ))
}

fn ec_pkcs8(key: &EcdsaPrivateKey) -> Result<OneAsymmetricKey> {
    let public = key.public_key();
    let curve = public.curve();
    let scalar = left_pad(key.d(), curve.field_size()).ok_or(Error::InvalidEcPoint(curve))?;
    let ec_key = ECPrivateKey {
        version: sec1::Version::V1,
        private_key: OctetString::from(scalar),
        parameters: None,
        public_key: Some(BitString::from(ec_point(public)?)),
    };
    let element: Element = ec_key.encode()?;
    Ok(OneAsymmetricKey::new(
        AlgorithmIdentifier::ec_public_key(curve)?,
        OctetString::from(to_der(element)?),
    ))
}

/// Uncompressed point `04 || X || Y`.
fn ec_point(key: &EcdsaPublicKey) -> Result<Vec<u8>> {
    let curve = key.curve();
    let size = curve.field_size();
    let x = left_pad(key.x(), size).ok_or(Error::InvalidEcPoint(curve))?;
    let y = left_pad(key.y(), size).ok_or(Error::InvalidEcPoint(curve))?;
    Ok([vec![0x04], x, y].concat())
}

/// Big-endian bytes of `value` left-padded with zeros to `width`, or `None`
/// when the value does not fit.
pub(crate) fn left_pad(value: &BigUint, width: usize) -> Option<Vec<u8>> {
    let bytes = value.to_bytes_be();
    let padding = width.checked_sub(bytes.len())?;
    Some([vec![0; padding], bytes].concat())
}
