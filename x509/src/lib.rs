//! X.509 certificate decoding.
//!
//! Only the parts of a certificate needed to get at its public key are
//! modelled. Issuer and subject names are kept as raw ASN.1 elements and the
//! optional unique identifiers and extensions are skipped.

use asn1::{ASN1Object, BitString, Element, Integer};
use chrono::NaiveDateTime;
use kagi::decoder::{DecodableFrom, Decoder};
use pkix_types::{AlgorithmIdentifier, SubjectPublicKeyInfo};

use crate::error::{Error, Result};

pub mod error;

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1

Certificate  ::=  SEQUENCE  {
    tbsCertificate       TBSCertificate,
    signatureAlgorithm   AlgorithmIdentifier,
    signatureValue       BIT STRING
}
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    tbs_certificate: TBSCertificate,
    signature_algorithm: AlgorithmIdentifier,
    signature_value: BitString,
}

impl Certificate {
    pub fn tbs_certificate(&self) -> &TBSCertificate {
        &self.tbs_certificate
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }

    /// The public key the certificate binds to its subject.
    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfo {
        &self.tbs_certificate.subject_public_key_info
    }
}

impl DecodableFrom<ASN1Object> for Certificate {}

impl Decoder<ASN1Object, Certificate> for ASN1Object {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        match self.elements() {
            [element] => element.decode(),
            elements => Err(Error::InvalidCertificate(format!(
                "expected exactly one top-level element, got {}",
                elements.len()
            ))),
        }
    }
}

impl DecodableFrom<Element> for Certificate {}

impl Decoder<Element, Certificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidCertificate(
                "expected Sequence for Certificate".to_string(),
            ));
        };
        let [tbs, signature_algorithm, signature_value] = elements.as_slice() else {
            return Err(Error::InvalidCertificate(format!(
                "expected 3 elements in sequence, got {}",
                elements.len()
            )));
        };

        let tbs_certificate: TBSCertificate = tbs.decode()?;
        let signature_algorithm: AlgorithmIdentifier = signature_algorithm.decode()?;
        let Element::BitString(signature_value) = signature_value else {
            return Err(Error::InvalidCertificate(
                "expected BitString for signatureValue".to_string(),
            ));
        };

        Ok(Certificate {
            tbs_certificate,
            signature_algorithm,
            signature_value: signature_value.clone(),
        })
    }
}

/*
TBSCertificate  ::=  SEQUENCE  {
     version         [0]  EXPLICIT Version DEFAULT v1,
     serialNumber         CertificateSerialNumber,
     signature            AlgorithmIdentifier,
     issuer               Name,
     validity             Validity,
     subject              Name,
     subjectPublicKeyInfo SubjectPublicKeyInfo,
     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
     extensions      [3]  EXPLICIT Extensions OPTIONAL
}
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TBSCertificate {
    version: Version,
    serial_number: Integer,
    signature: AlgorithmIdentifier,
    issuer: Element,
    validity: Validity,
    subject: Element,
    subject_public_key_info: SubjectPublicKeyInfo,
}

impl TBSCertificate {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn serial_number(&self) -> &Integer {
        &self.serial_number
    }

    pub fn signature(&self) -> &AlgorithmIdentifier {
        &self.signature
    }

    pub fn issuer(&self) -> &Element {
        &self.issuer
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn subject(&self) -> &Element {
        &self.subject
    }

    pub fn subject_public_key_info(&self) -> &SubjectPublicKeyInfo {
        &self.subject_public_key_info
    }
}

impl DecodableFrom<Element> for TBSCertificate {}

impl Decoder<Element, TBSCertificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<TBSCertificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidTBSCertificate(
                "expected Sequence for TBSCertificate".to_string(),
            ));
        };
        let (version, rest): (Version, &[Element]) = match elements.as_slice() {
            [Element::ContextSpecific { slot: 0, element, .. }, rest @ ..] => {
                (element.as_ref().decode()?, rest)
            }
            rest => (Version::V1, rest),
        };
        let mut iter = rest.iter();

        let mut next = |field: &str| {
            iter.next()
                .ok_or_else(|| Error::InvalidTBSCertificate(format!("missing {field}")))
        };

        let serial_number = match next("serialNumber")? {
            Element::Integer(i) => i.clone(),
            _ => {
                return Err(Error::InvalidCertificateSerialNumber(
                    "expected Integer for CertificateSerialNumber".to_string(),
                ));
            }
        };
        let signature: AlgorithmIdentifier = next("signature")?.decode()?;
        let issuer = next("issuer")?.clone();
        let validity: Validity = next("validity")?.decode()?;
        let subject = next("subject")?.clone();
        let subject_public_key_info: SubjectPublicKeyInfo =
            next("subjectPublicKeyInfo")?.decode()?;

        Ok(TBSCertificate {
            version,
            serial_number,
            signature,
            issuer,
            validity,
            subject,
            subject_public_key_info,
        })
    }
}

/*
Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Version {
    V1 = 0,
    V2 = 1,
    V3 = 2,
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        let Element::Integer(i) = self else {
            return Err(Error::InvalidVersion(
                "expected Integer for Version".to_string(),
            ));
        };
        match i.to_u64() {
            Some(0) => Ok(Version::V1),
            Some(1) => Ok(Version::V2),
            Some(2) => Ok(Version::V3),
            _ => Err(Error::InvalidVersion(format!("unknown version value: {i}"))),
        }
    }
}

/*
Validity ::= SEQUENCE {
    notBefore      Time,
    notAfter       Time
}

Time ::= CHOICE {
    utcTime        UTCTime,
    generalTime    GeneralizedTime
}
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    not_before: NaiveDateTime,
    not_after: NaiveDateTime,
}

impl Validity {
    pub fn not_before(&self) -> NaiveDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> NaiveDateTime {
        self.not_after
    }
}

impl DecodableFrom<Element> for Validity {}

impl Decoder<Element, Validity> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Validity> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidValidity(
                "expected sequence for Validity".to_string(),
            ));
        };
        let [not_before, not_after] = elements.as_slice() else {
            return Err(Error::InvalidValidity(
                "expected 2 elements in sequence".to_string(),
            ));
        };
        let time = |element: &Element, field: &str| match element {
            Element::UTCTime(dt) | Element::GeneralizedTime(dt) => Ok(*dt),
            _ => Err(Error::InvalidValidity(format!("invalid {field} time"))),
        };
        Ok(Validity {
            not_before: time(not_before, "notBefore")?,
            not_after: time(not_after, "notAfter")?,
        })
    }
}
