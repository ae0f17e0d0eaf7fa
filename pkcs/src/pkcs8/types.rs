use asn1::{BitString, Element, Integer, OctetString};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use pkix_types::AlgorithmIdentifier;

use super::Result;
use super::error::Error;

/*
RFC 5958 - Asymmetric Key Packages

OneAsymmetricKey ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
    privateKey                PrivateKey,
    attributes            [0] Attributes OPTIONAL,
    ...,
    [[2: publicKey        [1] PublicKey OPTIONAL ]],
    ...
}

PrivateKeyInfo ::= OneAsymmetricKey

Version ::= INTEGER { v1(0), v2(1) } (v1, ..., v2)

PrivateKey ::= OCTET STRING

PublicKey ::= BIT STRING
*/

/// PKCS#8 OneAsymmetricKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// Version 1 (no public key)
    V1 = 0,
    /// Version 2 (with public key)
    V2 = 1,
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::V1),
            1 => Ok(Version::V2),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as i64)
    }
}

/// PKCS#8 private key (RFC 5958 OneAsymmetricKey)
///
/// The `privateKey` octets hold an algorithm specific structure: a PKCS#1
/// `RSAPrivateKey` for `rsaEncryption`, a SEC1 `ECPrivateKey` for
/// `id-ecPublicKey`. Attributes are accepted on input and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneAsymmetricKey {
    pub version: Version,
    pub private_key_algorithm: AlgorithmIdentifier,
    pub private_key: OctetString,
    pub public_key: Option<BitString>,
}

/// RFC 5208 name for the version 1 structure.
pub type PrivateKeyInfo = OneAsymmetricKey;

impl OneAsymmetricKey {
    /// A version 1 key without attributes or public key.
    pub fn new(private_key_algorithm: AlgorithmIdentifier, private_key: OctetString) -> Self {
        Self {
            version: Version::V1,
            private_key_algorithm,
            private_key,
            public_key: None,
        }
    }
}

impl DecodableFrom<Element> for OneAsymmetricKey {}

impl Decoder<Element, OneAsymmetricKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<OneAsymmetricKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };
        let [version, algorithm, private_key, rest @ ..] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                expected: "at least 3",
                actual: elements.len(),
            });
        };

        let version = match version {
            Element::Integer(int) => {
                let value: i64 = int.try_into().map_err(|_| Error::VersionOutOfRange)?;
                Version::try_from(value)?
            }
            _ => return Err(Error::ExpectedVersionInteger),
        };
        let private_key_algorithm: AlgorithmIdentifier = algorithm.decode()?;
        let Element::OctetString(private_key) = private_key else {
            return Err(Error::ExpectedOctetString {
                field: "privateKey",
            });
        };

        let mut public_key = None;
        for element in rest {
            match element {
                Element::ContextSpecific { slot: 0, .. } => {}
                Element::ContextSpecific {
                    slot: 1,
                    constructed: false,
                    element,
                } => {
                    // IMPLICIT: parsed DER leaves the raw BIT STRING contents.
                    public_key = match element.as_ref() {
                        Element::OctetString(raw) => Some(BitString::try_from(raw.as_bytes())?),
                        Element::BitString(bits) => Some(bits.clone()),
                        _ => return Err(Error::UnexpectedElement),
                    };
                }
                _ => return Err(Error::UnexpectedElement),
            }
        }

        Ok(OneAsymmetricKey {
            version,
            private_key_algorithm,
            private_key: private_key.clone(),
            public_key,
        })
    }
}

impl EncodableTo<OneAsymmetricKey> for Element {}

impl Encoder<OneAsymmetricKey, Element> for OneAsymmetricKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![
            Element::Integer(Integer::from(self.version)),
            self.private_key_algorithm.encode()?,
            Element::OctetString(self.private_key.clone()),
        ];
        if let Some(public_key) = &self.public_key {
            elements.push(Element::ContextSpecific {
                slot: 1,
                constructed: false,
                element: Box::new(Element::BitString(public_key.clone())),
            });
        }
        Ok(Element::Sequence(elements))
    }
}
