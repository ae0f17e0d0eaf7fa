//! SEC1 (RFC 5915) ECPrivateKey structure

use asn1::{BitString, Element, Integer, ObjectIdentifier, OctetString};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};

use super::error::{Error, Result};

/*
RFC 5915 - Elliptic Curve Private Key Structure

ECPrivateKey ::= SEQUENCE {
    version        INTEGER { ecPrivkeyVer1(1) } (ecPrivkeyVer1),
    privateKey     OCTET STRING,
    parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
    publicKey  [1] BIT STRING OPTIONAL
}
*/

/// SEC1 ECPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// ecPrivkeyVer1 (value 1)
    V1 = 1,
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as i64)
    }
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Version::V1),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        match self {
            Element::Integer(int) => {
                let value: i64 = int.try_into().map_err(|_| Error::VersionOutOfRange)?;
                Version::try_from(value)
            }
            _ => Err(Error::ExpectedInteger("version")),
        }
    }
}

/// SEC1 EC Private Key structure (RFC 5915)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ECPrivateKey {
    /// Version (always V1)
    pub version: Version,
    /// Private scalar as a big-endian octet string
    pub private_key: OctetString,
    /// Named curve OID, absent when the enclosing PKCS#8 structure carries it
    pub parameters: Option<ObjectIdentifier>,
    /// Uncompressed public point
    pub public_key: Option<BitString>,
}

impl DecodableFrom<Element> for ECPrivateKey {}

impl Decoder<Element, ECPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ECPrivateKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };
        if !(2..=4).contains(&elements.len()) {
            return Err(Error::InvalidElementCount(elements.len()));
        }

        let version: Version = elements[0].decode()?;
        let Element::OctetString(private_key) = &elements[1] else {
            return Err(Error::ExpectedOctetString);
        };

        let mut parameters = None;
        let mut public_key = None;
        for element in &elements[2..] {
            match element {
                Element::ContextSpecific { slot: 0, element, .. } if parameters.is_none() => {
                    let Element::ObjectIdentifier(oid) = element.as_ref() else {
                        return Err(Error::ExpectedNamedCurve);
                    };
                    parameters = Some(oid.clone());
                }
                Element::ContextSpecific { slot: 1, element, .. } if public_key.is_none() => {
                    let Element::BitString(point) = element.as_ref() else {
                        return Err(Error::ExpectedBitString);
                    };
                    public_key = Some(point.clone());
                }
                _ => return Err(Error::UnexpectedElement),
            }
        }

        Ok(ECPrivateKey {
            version,
            private_key: private_key.clone(),
            parameters,
            public_key,
        })
    }
}

impl EncodableTo<ECPrivateKey> for Element {}

impl Encoder<ECPrivateKey, Element> for ECPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![
            Element::Integer(Integer::from(self.version)),
            Element::OctetString(self.private_key.clone()),
        ];
        if let Some(oid) = &self.parameters {
            elements.push(Element::explicit(0, Element::ObjectIdentifier(oid.clone())));
        }
        if let Some(point) = &self.public_key {
            elements.push(Element::explicit(1, Element::BitString(point.clone())));
        }
        Ok(Element::Sequence(elements))
    }
}
