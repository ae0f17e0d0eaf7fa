//! AlgorithmIdentifier type
//!
//! Defined in [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2)

use asn1::{Element, ObjectIdentifier};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};

use crate::OidName;
use crate::curve::NamedCurve;
use crate::error::{Error, Result};

/// Parameters field in AlgorithmIdentifier
///
/// Wrapped in Option:
/// - None: Field not present (OPTIONAL field omitted, e.g. Ed25519)
/// - Some(AlgorithmParameters::Null): Explicit NULL value (RSA)
/// - Some(AlgorithmParameters::Other(element)): Any other ASN.1 element (the EC curve OID)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParameters {
    /// Explicit NULL (05 00)
    Null,
    /// Any other ASN.1 element
    Other(Element),
}

/// Algorithm Identifier
///
/// [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2):
/// ```asn1
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    /// Algorithm OID
    pub algorithm: ObjectIdentifier,
    /// Optional parameters
    pub parameters: Option<AlgorithmParameters>,
}

impl AlgorithmIdentifier {
    // Key algorithm OIDs (RFC 3279, RFC 5480, RFC 8410)
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";
    pub const OID_EC_PUBLIC_KEY: &'static str = "1.2.840.10045.2.1";
    pub const OID_X25519: &'static str = "1.3.101.110";
    pub const OID_X448: &'static str = "1.3.101.111";
    pub const OID_ED25519: &'static str = "1.3.101.112";
    pub const OID_ED448: &'static str = "1.3.101.113";

    // Signature algorithm OIDs seen in certificates
    pub const OID_SHA256_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.11";
    pub const OID_ECDSA_WITH_SHA256: &'static str = "1.2.840.10045.4.3.2";

    /// Create a new AlgorithmIdentifier with algorithm OID only
    pub fn new(algorithm: ObjectIdentifier) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    /// Create a new AlgorithmIdentifier with parameters
    pub fn new_with_params(algorithm: ObjectIdentifier, parameters: AlgorithmParameters) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }

    /// `rsaEncryption` with NULL parameters, as used in SPKI and PKCS#8.
    pub fn rsa_encryption() -> Result<Self> {
        Ok(Self::new_with_params(
            Self::OID_RSA_ENCRYPTION.parse()?,
            AlgorithmParameters::Null,
        ))
    }

    /// `id-ecPublicKey` carrying the named curve OID.
    pub fn ec_public_key(curve: NamedCurve) -> Result<Self> {
        Ok(Self::new_with_params(
            Self::OID_EC_PUBLIC_KEY.parse()?,
            AlgorithmParameters::Other(Element::ObjectIdentifier(curve.oid()?)),
        ))
    }

    /// Get the algorithm OID
    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    /// Get the parameters
    pub fn parameters(&self) -> &Option<AlgorithmParameters> {
        &self.parameters
    }

    /// Interpret the parameters as an EC named curve.
    pub fn named_curve(&self) -> Result<NamedCurve> {
        match &self.parameters {
            Some(AlgorithmParameters::Other(Element::ObjectIdentifier(oid))) => {
                NamedCurve::try_from(oid)
            }
            _ => Err(Error::CurveExpectedOid),
        }
    }
}

impl OidName for AlgorithmIdentifier {
    fn oid_name(&self) -> Option<&'static str> {
        match self.algorithm.to_string().as_str() {
            AlgorithmIdentifier::OID_RSA_ENCRYPTION => Some("rsaEncryption"),
            AlgorithmIdentifier::OID_EC_PUBLIC_KEY => Some("ecPublicKey"),
            AlgorithmIdentifier::OID_X25519 => Some("X25519"),
            AlgorithmIdentifier::OID_X448 => Some("X448"),
            AlgorithmIdentifier::OID_ED25519 => Some("Ed25519"),
            AlgorithmIdentifier::OID_ED448 => Some("Ed448"),
            AlgorithmIdentifier::OID_SHA256_WITH_RSA_ENCRYPTION => Some("sha256WithRSAEncryption"),
            AlgorithmIdentifier::OID_ECDSA_WITH_SHA256 => Some("ecdsa-with-SHA256"),
            _ => None,
        }
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let Element::Sequence(elements) = self else {
            return Err(Error::AlgorithmIdentifierExpectedSequence);
        };
        if elements.len() > 2 {
            return Err(Error::AlgorithmIdentifierInvalidElementCount(
                elements.len(),
            ));
        }

        let algorithm = match elements.first() {
            Some(Element::ObjectIdentifier(oid)) => oid.clone(),
            Some(_) => return Err(Error::AlgorithmIdentifierExpectedOid),
            None => return Err(Error::AlgorithmIdentifierEmpty),
        };

        let parameters = match elements.get(1) {
            Some(Element::Null) => Some(AlgorithmParameters::Null),
            Some(other) => Some(AlgorithmParameters::Other(other.clone())),
            None => None,
        };

        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
        })
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let params_elem = self.parameters.as_ref().map(|params| match params {
            AlgorithmParameters::Null => Element::Null,
            AlgorithmParameters::Other(element) => element.clone(),
        });

        let elements: Vec<_> = std::iter::once(Element::ObjectIdentifier(self.algorithm.clone()))
            .chain(params_elem)
            .collect();

        Ok(Element::Sequence(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case::ecdsa_sha256("1.2.840.10045.4.3.2")]
    #[case::ed25519("1.3.101.112")]
    fn test_algorithm_identifier_decode_without_params(#[case] oid_str: &str) {
        let oid = ObjectIdentifier::from_str(oid_str).unwrap();
        let elem = Element::Sequence(vec![Element::ObjectIdentifier(oid.clone())]);

        let alg_id: AlgorithmIdentifier = elem.decode().unwrap();
        assert_eq!(alg_id.algorithm(), &oid);
        assert!(alg_id.parameters().is_none());
    }

    #[rstest]
    #[case::rsa_encryption("1.2.840.113549.1.1.1")]
    #[case::sha256_with_rsa("1.2.840.113549.1.1.11")]
    fn test_algorithm_identifier_decode_with_null(#[case] oid_str: &str) {
        let oid = ObjectIdentifier::from_str(oid_str).unwrap();
        let elem = Element::Sequence(vec![Element::ObjectIdentifier(oid.clone()), Element::Null]);

        let alg_id: AlgorithmIdentifier = elem.decode().unwrap();
        assert_eq!(alg_id.algorithm(), &oid);
        assert!(matches!(
            alg_id.parameters(),
            Some(AlgorithmParameters::Null)
        ));
    }

    #[rstest]
    #[case::p256("1.2.840.10045.3.1.7", NamedCurve::P256)]
    #[case::p384("1.3.132.0.34", NamedCurve::P384)]
    fn test_algorithm_identifier_named_curve(#[case] curve_oid: &str, #[case] expected: NamedCurve) {
        let elem = Element::Sequence(vec![
            Element::ObjectIdentifier(AlgorithmIdentifier::OID_EC_PUBLIC_KEY.parse().unwrap()),
            Element::ObjectIdentifier(curve_oid.parse().unwrap()),
        ]);

        let alg_id: AlgorithmIdentifier = elem.decode().unwrap();
        assert_eq!(alg_id.oid_name(), Some("ecPublicKey"));
        assert_eq!(alg_id.named_curve().unwrap(), expected);
    }

    #[test]
    fn test_algorithm_identifier_named_curve_missing() {
        let alg_id = AlgorithmIdentifier::rsa_encryption().unwrap();
        assert!(matches!(alg_id.named_curve(), Err(Error::CurveExpectedOid)));
    }

    #[rstest]
    #[case::not_a_sequence(Element::Null)]
    #[case::empty(Element::Sequence(vec![]))]
    #[case::not_an_oid(Element::Sequence(vec![Element::Null]))]
    #[case::too_many(Element::Sequence(vec![
        Element::ObjectIdentifier("1.2.840.113549.1.1.1".parse().unwrap()),
        Element::Null,
        Element::Null,
    ]))]
    fn test_algorithm_identifier_decode_with_error(#[case] elem: Element) {
        let result: Result<AlgorithmIdentifier> = elem.decode();
        assert!(result.is_err());
    }

    #[rstest]
    #[case::rsa(AlgorithmIdentifier::rsa_encryption().unwrap())]
    #[case::ec_p521(AlgorithmIdentifier::ec_public_key(NamedCurve::P521).unwrap())]
    #[case::ed25519(AlgorithmIdentifier::new(AlgorithmIdentifier::OID_ED25519.parse().unwrap()))]
    fn test_algorithm_identifier_roundtrip(#[case] alg_id: AlgorithmIdentifier) {
        let encoded = alg_id.encode().unwrap();
        let decoded: AlgorithmIdentifier = encoded.decode().unwrap();

        assert_eq!(alg_id, decoded);
    }
}
