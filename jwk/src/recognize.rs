//! DER object recognition.
//!
//! A DER block carries no label of its own, so its container is found by
//! trying each known structure in a fixed order. Some structures are
//! prefixes of others, and the first structural match wins:
//!
//! 1. X.509 `SubjectPublicKeyInfo`
//! 2. PKCS#1 `RSAPublicKey`
//! 3. X.509 `Certificate`
//! 4. PKCS#1 `RSAPrivateKey`
//! 5. PKCS#8 `OneAsymmetricKey`
//! 6. SEC1 `ECPrivateKey`

use asn1::{ASN1Object, BitString, Element, ObjectIdentifier, OctetString};
use der::Der;
use kagi::decoder::{DecodableFrom, Decoder};
use num_bigint::BigUint;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use pkcs::pkcs1::{RSAPrivateKey, RSAPublicKey};
use pkcs::pkcs8::OneAsymmetricKey;
use pkcs::sec1::ECPrivateKey;
use pkix_types::{AlgorithmIdentifier, NamedCurve, OidName, SubjectPublicKeyInfo};
use tracing::{debug, trace};
use x509::Certificate;

use crate::error::{Error, Result};
use crate::key::{CrtValues, EcdsaPrivateKey, EcdsaPublicKey, Key, RsaPrivateKey, RsaPublicKey};
use crate::render::left_pad;

/// A DER block identified as one of the supported containers.
#[derive(Debug, Clone)]
pub enum DerObject {
    SubjectPublicKeyInfo(SubjectPublicKeyInfo),
    Pkcs1PublicKey(RSAPublicKey),
    Certificate(Box<Certificate>),
    Pkcs1PrivateKey(RSAPrivateKey),
    Pkcs8PrivateKey(OneAsymmetricKey),
    Sec1PrivateKey(ECPrivateKey),
}

impl DerObject {
    pub fn format(&self) -> &'static str {
        match self {
            DerObject::SubjectPublicKeyInfo(_) => "SubjectPublicKeyInfo",
            DerObject::Pkcs1PublicKey(_) => "PKCS#1 public key",
            DerObject::Certificate(_) => "certificate",
            DerObject::Pkcs1PrivateKey(_) => "PKCS#1 private key",
            DerObject::Pkcs8PrivateKey(_) => "PKCS#8 private key",
            DerObject::Sec1PrivateKey(_) => "SEC1 private key",
        }
    }

    /// Extract the key. Certificates yield their subject public key.
    pub fn into_key(self) -> Result<Key> {
        match self {
            DerObject::SubjectPublicKeyInfo(spki) => key_from_spki(&spki),
            DerObject::Pkcs1PublicKey(key) => Ok(Key::RsaPublic(rsa_public_key(&key)?)),
            DerObject::Certificate(cert) => {
                let validity = cert.tbs_certificate().validity();
                debug!(
                    not_before = %validity.not_before(),
                    not_after = %validity.not_after(),
                    "extracting certificate subject public key"
                );
                key_from_spki(cert.subject_public_key_info())
            }
            DerObject::Pkcs1PrivateKey(key) => Ok(Key::RsaPrivate(rsa_private_key(&key)?)),
            DerObject::Pkcs8PrivateKey(key) => key_from_pkcs8(&key),
            DerObject::Sec1PrivateKey(key) => {
                let oid = key.parameters.as_ref().ok_or(Error::MissingCurve)?;
                let curve = curve_from_oid(oid)?;
                Ok(Key::EcdsaPrivate(ec_private_key(
                    curve,
                    &key.private_key,
                    key.public_key.as_ref(),
                )?))
            }
        }
    }
}

impl DecodableFrom<Element> for DerObject {}

impl Decoder<Element, DerObject> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DerObject> {
        match self.decode() {
            Ok(spki) => return Ok(DerObject::SubjectPublicKeyInfo(spki)),
            Err(e) => trace!(error = %e, "not a SubjectPublicKeyInfo"),
        }
        match self.decode() {
            Ok(key) => return Ok(DerObject::Pkcs1PublicKey(key)),
            Err(e) => trace!(error = %e, "not a PKCS#1 public key"),
        }
        match self.decode() {
            Ok(cert) => return Ok(DerObject::Certificate(Box::new(cert))),
            Err(e) => trace!(error = %e, "not a certificate"),
        }
        match self.decode() {
            Ok(key) => return Ok(DerObject::Pkcs1PrivateKey(key)),
            Err(e) => trace!(error = %e, "not a PKCS#1 private key"),
        }
        match self.decode() {
            Ok(key) => return Ok(DerObject::Pkcs8PrivateKey(key)),
            Err(e) => trace!(error = %e, "not a PKCS#8 private key"),
        }
        match self.decode() {
            Ok(key) => return Ok(DerObject::Sec1PrivateKey(key)),
            Err(e) => trace!(error = %e, "not a SEC1 private key"),
        }
        Err(Error::UnrecognizedDer)
    }
}

/// Identify the container encoded by `der`.
pub fn identify(der: &[u8]) -> Result<DerObject> {
    let element = decode_element(der).map_err(|e| {
        debug!(error = %e, "DER block does not parse");
        Error::UnrecognizedDer
    })?;
    let object: DerObject = element.decode()?;
    debug!(format = object.format(), "recognised DER block");
    Ok(object)
}

/// Recognise any supported container and return the key it holds, public or
/// private.
pub fn recognize(der: &[u8]) -> Result<Key> {
    identify(der)?.into_key()
}

/// Recognise any supported container and return its public key. Private
/// keys are reduced to their public part.
pub fn recognize_public(der: &[u8]) -> Result<Key> {
    Ok(recognize(der)?.into_public_part())
}

/// Recognise a private key container. Public keys and certificates are
/// rejected.
pub fn recognize_private(der: &[u8]) -> Result<Key> {
    match identify(der)? {
        DerObject::SubjectPublicKeyInfo(_) | DerObject::Pkcs1PublicKey(_) => {
            Err(Error::ExpectedPrivateGotPublic)
        }
        DerObject::Certificate(_) => Err(Error::ExpectedPrivateGotCertificate),
        object => object.into_key(),
    }
}

/// Parse `bytes` as DER holding exactly one element.
pub(crate) fn decode_element(bytes: &[u8]) -> Result<Element> {
    let der: Der = bytes.decode()?;
    let object: ASN1Object = der.decode()?;
    match object.elements() {
        [element] => Ok(element.clone()),
        _ => Err(Error::UnrecognizedDer),
    }
}

fn key_from_spki(spki: &SubjectPublicKeyInfo) -> Result<Key> {
    let algorithm = spki.algorithm();
    match algorithm.algorithm().to_string().as_str() {
        AlgorithmIdentifier::OID_RSA_ENCRYPTION => {
            let key: RSAPublicKey = decode_element(spki.subject_public_key().as_bytes())?.decode()?;
            Ok(Key::RsaPublic(rsa_public_key(&key)?))
        }
        AlgorithmIdentifier::OID_EC_PUBLIC_KEY => {
            let curve = algorithm_curve(algorithm)?;
            Ok(Key::EcdsaPublic(ec_public_key(
                curve,
                spki.subject_public_key(),
            )?))
        }
        _ => Err(unsupported(algorithm)),
    }
}

fn key_from_pkcs8(key: &OneAsymmetricKey) -> Result<Key> {
    let algorithm = &key.private_key_algorithm;
    match algorithm.algorithm().to_string().as_str() {
        AlgorithmIdentifier::OID_RSA_ENCRYPTION => {
            let inner: RSAPrivateKey = decode_element(key.private_key.as_bytes())?.decode()?;
            Ok(Key::RsaPrivate(rsa_private_key(&inner)?))
        }
        AlgorithmIdentifier::OID_EC_PUBLIC_KEY => {
            let curve = algorithm_curve(algorithm)?;
            let inner: ECPrivateKey = decode_element(key.private_key.as_bytes())?.decode()?;
            let public_key = inner.public_key.as_ref().or(key.public_key.as_ref());
            Ok(Key::EcdsaPrivate(ec_private_key(
                curve,
                &inner.private_key,
                public_key,
            )?))
        }
        _ => Err(unsupported(algorithm)),
    }
}

fn unsupported(algorithm: &AlgorithmIdentifier) -> Error {
    let name = algorithm
        .oid_name()
        .map(str::to_string)
        .unwrap_or_else(|| algorithm.algorithm().to_string());
    Error::UnsupportedAlgorithm(name)
}

fn rsa_public_key(key: &RSAPublicKey) -> Result<RsaPublicKey> {
    Ok(RsaPublicKey::new(
        BigUint::try_from(&key.modulus)?,
        u64::try_from(&key.public_exponent)?,
    ))
}

fn rsa_private_key(key: &RSAPrivateKey) -> Result<RsaPrivateKey> {
    let public = rsa_public_key(&key.public_key())?;
    let d = BigUint::try_from(&key.private_exponent)?;
    let primes = [&key.prime1, &key.prime2]
        .into_iter()
        .chain(key.other_prime_infos.iter().map(|info| &info.prime))
        .map(BigUint::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let precomputed = if key.other_prime_infos.is_empty() {
        Some(CrtValues {
            dp: BigUint::try_from(&key.exponent1)?,
            dq: BigUint::try_from(&key.exponent2)?,
            qinv: BigUint::try_from(&key.coefficient)?,
        })
    } else {
        None
    };
    Ok(RsaPrivateKey::from_parts(public, d, primes, precomputed))
}

fn algorithm_curve(algorithm: &AlgorithmIdentifier) -> Result<NamedCurve> {
    match algorithm.named_curve() {
        Ok(curve) => Ok(curve),
        Err(pkix_types::Error::UnsupportedCurve(oid)) => Err(Error::UnknownCurve(oid)),
        Err(_) => Err(Error::MissingCurve),
    }
}

fn curve_from_oid(oid: &ObjectIdentifier) -> Result<NamedCurve> {
    NamedCurve::try_from(oid).map_err(|_| Error::UnknownCurve(oid.to_string()))
}

/// Split an uncompressed point `04 || X || Y`.
fn ec_public_key(curve: NamedCurve, point: &BitString) -> Result<EcdsaPublicKey> {
    let size = curve.field_size();
    match point.as_bytes().split_first() {
        Some((0x04, coordinates)) if coordinates.len() == 2 * size => {
            let (x, y) = coordinates.split_at(size);
            Ok(EcdsaPublicKey::new(
                curve,
                BigUint::from_bytes_be(x),
                BigUint::from_bytes_be(y),
            ))
        }
        _ => Err(Error::InvalidEcPoint(curve)),
    }
}

/// An EC private key. The public point is optional in SEC1 and is derived
/// from the scalar when absent.
fn ec_private_key(
    curve: NamedCurve,
    private_key: &OctetString,
    point: Option<&BitString>,
) -> Result<EcdsaPrivateKey> {
    let d = BigUint::from_bytes_be(private_key.as_bytes());
    let public = match point {
        Some(point) => ec_public_key(curve, point)?,
        None => ec_public_key(curve, &derive_point(curve, &d)?)?,
    };
    Ok(EcdsaPrivateKey::new(public, d))
}

/// Uncompressed `d * G` on `curve`.
fn derive_point(curve: NamedCurve, d: &BigUint) -> Result<BitString> {
    let scalar = left_pad(d, curve.field_size()).ok_or(Error::InvalidEcPrivateKey(curve))?;
    let point = match curve {
        NamedCurve::P224 => p224::SecretKey::from_slice(&scalar)
            .map(|key| key.public_key().to_encoded_point(false).as_bytes().to_vec()),
        NamedCurve::P256 => p256::SecretKey::from_slice(&scalar)
            .map(|key| key.public_key().to_encoded_point(false).as_bytes().to_vec()),
        NamedCurve::P384 => p384::SecretKey::from_slice(&scalar)
            .map(|key| key.public_key().to_encoded_point(false).as_bytes().to_vec()),
        NamedCurve::P521 => p521::SecretKey::from_slice(&scalar)
            .map(|key| key.public_key().to_encoded_point(false).as_bytes().to_vec()),
    }
    .map_err(|_| Error::InvalidEcPrivateKey(curve))?;
    debug!(%curve, "derived EC public point from private scalar");
    Ok(BitString::from(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::key::PrivateKeyLike;
    use base64::{Engine, engine::general_purpose::STANDARD};
    use rstest::rstest;

    fn der_of(pem_str: &str) -> Vec<u8> {
        let pems = pem::parse_all(pem_str).unwrap();
        pems[0].decode().unwrap()
    }

    #[rstest]
    #[case::spki_rsa(RSA_1024_PUBLIC_KEY, "SubjectPublicKeyInfo")]
    #[case::spki_ec(EC_P256_PUBLIC_KEY, "SubjectPublicKeyInfo")]
    #[case::pkcs1_public(RSA_1024_PKCS1_PUBLIC_KEY, "PKCS#1 public key")]
    #[case::certificate(EC_P256_CERTIFICATE, "certificate")]
    #[case::pkcs1_private(RSA_1024_PKCS1_PRIVATE_KEY, "PKCS#1 private key")]
    #[case::pkcs8_rsa(RSA_1024_PRIVATE_KEY, "PKCS#8 private key")]
    #[case::pkcs8_ec(EC_P256_PRIVATE_KEY, "PKCS#8 private key")]
    #[case::pkcs8_ed25519(ED25519_PRIVATE_KEY, "PKCS#8 private key")]
    #[case::sec1(EC_P256_SEC1_PRIVATE_KEY, "SEC1 private key")]
    fn test_identify(#[case] pem_str: &str, #[case] format: &str) {
        let object = identify(&der_of(pem_str)).unwrap();
        assert_eq!(object.format(), format);
    }

    #[rstest]
    #[case::pkcs1_and_pkcs8(RSA_1024_PKCS1_PRIVATE_KEY, RSA_1024_PRIVATE_KEY)]
    #[case::sec1_and_pkcs8(EC_P256_SEC1_PRIVATE_KEY, EC_P256_PRIVATE_KEY)]
    fn test_recognize_private_formats_agree(#[case] first: &str, #[case] second: &str) {
        let first = recognize_private(&der_of(first)).unwrap();
        let second = recognize_private(&der_of(second)).unwrap();
        assert!(first.is_private());
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::sec1(EC_P256_SEC1_NO_POINT_PRIVATE_KEY)]
    #[case::pkcs8(EC_P256_PKCS8_NO_POINT_PRIVATE_KEY)]
    fn test_recognize_private_derives_missing_point(#[case] pem_str: &str) {
        let derived = recognize_private(&der_of(pem_str)).unwrap();
        assert_eq!(derived, recognize_private(&der_of(EC_P256_SEC1_PRIVATE_KEY)).unwrap());
    }

    #[test]
    fn test_recognize_zero_scalar_without_point() {
        // SEC1 over P-256 with d = 0 and no public point
        let der = [
            0x30, 0x12, 0x02, 0x01, 0x01, 0x04, 0x01, 0x00, 0xa0, 0x0a, 0x06, 0x08, 0x2a, 0x86,
            0x48, 0xce, 0x3d, 0x03, 0x01, 0x07,
        ];
        assert!(matches!(
            recognize(&der),
            Err(Error::InvalidEcPrivateKey(NamedCurve::P256))
        ));
    }

    #[rstest]
    #[case::spki(RSA_1024_PUBLIC_KEY, RSA_1024_PUBLIC_KEY)]
    #[case::pkcs1_public(RSA_1024_PKCS1_PUBLIC_KEY, RSA_1024_PUBLIC_KEY)]
    #[case::pkcs1_private(RSA_1024_PKCS1_PRIVATE_KEY, RSA_1024_PUBLIC_KEY)]
    #[case::pkcs8_rsa(RSA_1024_PRIVATE_KEY, RSA_1024_PUBLIC_KEY)]
    #[case::certificate(EC_P256_CERTIFICATE, EC_P256_PUBLIC_KEY)]
    #[case::pkcs8_ec(EC_P256_PRIVATE_KEY, EC_P256_PUBLIC_KEY)]
    #[case::sec1(EC_P256_SEC1_PRIVATE_KEY, EC_P256_PUBLIC_KEY)]
    fn test_recognize_public(#[case] pem_str: &str, #[case] expected: &str) {
        let key = recognize_public(&der_of(pem_str)).unwrap();
        assert!(!key.is_private());
        assert_eq!(key, recognize(&der_of(expected)).unwrap());
    }

    #[rstest]
    #[case::spki(RSA_1024_PUBLIC_KEY)]
    #[case::pkcs1_public(RSA_1024_PKCS1_PUBLIC_KEY)]
    #[case::ec(EC_P256_PUBLIC_KEY)]
    fn test_recognize_private_rejects_public(#[case] pem_str: &str) {
        let result = recognize_private(&der_of(pem_str));
        assert!(matches!(result, Err(Error::ExpectedPrivateGotPublic)));
    }

    #[test]
    fn test_recognize_private_rejects_certificate() {
        let result = recognize_private(&der_of(EC_P256_CERTIFICATE));
        assert!(matches!(result, Err(Error::ExpectedPrivateGotCertificate)));
    }

    #[rstest]
    #[case::ed25519_public(ED25519_PUBLIC_KEY, "Ed25519")]
    #[case::ed25519_private(ED25519_PRIVATE_KEY, "Ed25519")]
    #[case::x25519_public(X25519_PUBLIC_KEY, "X25519")]
    fn test_recognize_unsupported_algorithm(#[case] pem_str: &str, #[case] name: &str) {
        match recognize(&der_of(pem_str)) {
            Err(Error::UnsupportedAlgorithm(actual)) => assert_eq!(actual, name),
            other => panic!("expected UnsupportedAlgorithm, got {other:?}"),
        }
    }

    #[rstest]
    #[case::garbage(vec![0x00, 0x01, 0x02])]
    #[case::empty(vec![])]
    #[case::sequence_of_integer(vec![0x30, 0x03, 0x02, 0x01, 0x00])]
    #[case::two_elements(vec![0x05, 0x00, 0x05, 0x00])]
    fn test_recognize_unrecognized(#[case] der: Vec<u8>) {
        assert!(matches!(recognize(&der), Err(Error::UnrecognizedDer)));
    }

    #[test]
    fn test_recognize_unknown_curve() {
        // SPKI for id-ecPublicKey over secp256k1 (1.3.132.0.10)
        let mut der = vec![
            0x30, 0x56, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06,
            0x05, 0x2b, 0x81, 0x04, 0x00, 0x0a, 0x03, 0x42, 0x00, 0x04,
        ];
        der.extend([0x11; 64]);
        match recognize(&der) {
            Err(Error::UnknownCurve(oid)) => assert_eq!(oid, "1.3.132.0.10"),
            other => panic!("expected UnknownCurve, got {other:?}"),
        }
    }

    #[test]
    fn test_recognize_rsa_values() {
        let Key::RsaPrivate(key) = recognize(&der_of(RSA_512_E3_PRIVATE_KEY)).unwrap() else {
            panic!("expected an RSA private key");
        };
        assert_eq!(key.public_key().e(), 3);
        assert_eq!(key.public_key().bits(), 512);
        assert_eq!(key.primes().len(), 2);
        let recomputed =
            CrtValues::compute(key.d(), &key.primes()[0], &key.primes()[1]).unwrap();
        assert_eq!(key.crt_values().unwrap(), recomputed);
    }

    #[test]
    fn test_recognize_ec_values() {
        let Key::EcdsaPublic(key) = recognize(&der_of(EC_P384_PUBLIC_KEY)).unwrap() else {
            panic!("expected an EC public key");
        };
        assert_eq!(key.curve(), NamedCurve::P384);
        let x = STANDARD
            .decode("UK6vRsOWTIIzhup9LGDbkdz3pnD6TLEs6NYrrxQjfh+sagYfs8LAD7R4NiKqbjQj")
            .unwrap();
        assert_eq!(key.x(), &BigUint::from_bytes_be(&x));
    }
}
