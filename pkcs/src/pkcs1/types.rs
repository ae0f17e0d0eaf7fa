use asn1::{Element, Integer};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};

use super::error::{Error, Result};

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}

Version ::= INTEGER { two-prime(0), multi(1) }
    (CONSTRAINED BY {-- version must be multi if otherPrimeInfos present --})

OtherPrimeInfos ::= SEQUENCE SIZE(1..MAX) OF OtherPrimeInfo

OtherPrimeInfo ::= SEQUENCE {
    prime             INTEGER,  -- ri
    exponent          INTEGER,  -- di
    coefficient       INTEGER   -- ti
}
*/

/// PKCS#1 RSAPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    TwoPrime = 0,
    Multi = 1,
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
            0 => Ok(Version::TwoPrime),
            1 => Ok(Version::Multi),
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
            _ => Err(Error::ExpectedInteger { field: "version" }),
        }
    }
}

fn integer(element: &Element, field: &'static str) -> Result<Integer> {
    match element {
        Element::Integer(int) => Ok(int.clone()),
        _ => Err(Error::ExpectedInteger { field }),
    }
}

/// PKCS#1 RSA Private Key structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPrivateKey {
    pub version: Version,
    pub modulus: Integer,          // n
    pub public_exponent: Integer,  // e
    pub private_exponent: Integer, // d
    pub prime1: Integer,           // p
    pub prime2: Integer,           // q
    pub exponent1: Integer,        // d mod (p-1)
    pub exponent2: Integer,        // d mod (q-1)
    pub coefficient: Integer,      // (inverse of q) mod p
    pub other_prime_infos: Vec<OtherPrimeInfo>,
}

impl RSAPrivateKey {
    /// Number of prime factors of the modulus.
    pub fn prime_count(&self) -> usize {
        2 + self.other_prime_infos.len()
    }

    /// The public half of this key.
    pub fn public_key(&self) -> RSAPublicKey {
        RSAPublicKey {
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
        }
    }
}

impl DecodableFrom<Element> for RSAPrivateKey {}

impl Decoder<Element, RSAPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("RSAPrivateKey"));
        };
        if !(9..=10).contains(&elements.len()) {
            return Err(Error::InvalidElementCount {
                expected: "9 or 10",
                actual: elements.len(),
            });
        }

        let version: Version = elements[0].decode()?;
        let other_prime_infos = match (version, elements.get(9)) {
            (Version::Multi, Some(Element::Sequence(infos))) => infos
                .iter()
                .map(|info| info.decode())
                .collect::<Result<Vec<OtherPrimeInfo>>>()?,
            (Version::Multi, Some(_)) => {
                return Err(Error::ExpectedSequence("OtherPrimeInfos"));
            }
            (Version::TwoPrime, None) | (Version::Multi, None) => Vec::new(),
            (Version::TwoPrime, Some(_)) => {
                return Err(Error::InvalidElementCount {
                    expected: "9 for a two-prime key",
                    actual: elements.len(),
                });
            }
        };

        Ok(RSAPrivateKey {
            version,
            modulus: integer(&elements[1], "modulus")?,
            public_exponent: integer(&elements[2], "publicExponent")?,
            private_exponent: integer(&elements[3], "privateExponent")?,
            prime1: integer(&elements[4], "prime1")?,
            prime2: integer(&elements[5], "prime2")?,
            exponent1: integer(&elements[6], "exponent1")?,
            exponent2: integer(&elements[7], "exponent2")?,
            coefficient: integer(&elements[8], "coefficient")?,
            other_prime_infos,
        })
    }
}

impl EncodableTo<RSAPrivateKey> for Element {}

impl Encoder<RSAPrivateKey, Element> for RSAPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![
            Element::Integer(Integer::from(self.version)),
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
            Element::Integer(self.private_exponent.clone()),
            Element::Integer(self.prime1.clone()),
            Element::Integer(self.prime2.clone()),
            Element::Integer(self.exponent1.clone()),
            Element::Integer(self.exponent2.clone()),
            Element::Integer(self.coefficient.clone()),
        ];
        if !self.other_prime_infos.is_empty() {
            let infos = self
                .other_prime_infos
                .iter()
                .map(|info| info.encode())
                .collect::<Result<Vec<Element>>>()?;
            elements.push(Element::Sequence(infos));
        }
        Ok(Element::Sequence(elements))
    }
}

/// One additional prime of a multi-prime RSA key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherPrimeInfo {
    pub prime: Integer,       // ri
    pub exponent: Integer,    // di
    pub coefficient: Integer, // ti
}

impl DecodableFrom<Element> for OtherPrimeInfo {}

impl Decoder<Element, OtherPrimeInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<OtherPrimeInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("OtherPrimeInfo"));
        };
        let [prime, exponent, coefficient] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                expected: "3",
                actual: elements.len(),
            });
        };
        Ok(OtherPrimeInfo {
            prime: integer(prime, "prime")?,
            exponent: integer(exponent, "exponent")?,
            coefficient: integer(coefficient, "coefficient")?,
        })
    }
}

impl EncodableTo<OtherPrimeInfo> for Element {}

impl Encoder<OtherPrimeInfo, Element> for OtherPrimeInfo {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(self.prime.clone()),
            Element::Integer(self.exponent.clone()),
            Element::Integer(self.coefficient.clone()),
        ]))
    }
}

/*
RFC 8017 - RSA Public Key

RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e
}
*/

/// PKCS#1 RSA Public Key structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKey {
    pub modulus: Integer,         // n
    pub public_exponent: Integer, // e
}

impl DecodableFrom<Element> for RSAPublicKey {}

impl Decoder<Element, RSAPublicKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("RSAPublicKey"));
        };
        let [modulus, public_exponent] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                expected: "2",
                actual: elements.len(),
            });
        };
        Ok(RSAPublicKey {
            modulus: integer(modulus, "modulus")?,
            public_exponent: integer(public_exponent, "publicExponent")?,
        })
    }
}

impl EncodableTo<RSAPublicKey> for Element {}

impl Encoder<RSAPublicKey, Element> for RSAPublicKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
        ]))
    }
}
