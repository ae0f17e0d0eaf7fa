use std::{fmt::Display, str::FromStr};

use chrono::NaiveDateTime;
use der::{Der, PrimitiveTag, TAG_CONSTRUCTED, Tag, Tlv};
use error::Error;
use num_bigint::{BigInt, BigUint, Sign};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use num_traits::ToPrimitive;

pub mod error;

#[derive(Debug, Clone)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;
    fn decode(&self) -> Result<ASN1Object, Error> {
        let elements = self
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der, Self::Error> {
        let tlvs = self
            .elements
            .iter()
            .map(|element| element.encode())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Der::new(tlvs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    PrintableString(String),
    IA5String(String),
    UTCTime(NaiveDateTime),
    GeneralizedTime(NaiveDateTime),
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    Unimplemented(Tlv),
}

impl Element {
    /// Wraps `element` in an EXPLICIT context-specific tag.
    pub fn explicit(slot: u8, element: Element) -> Self {
        Element::ContextSpecific {
            slot,
            constructed: true,
            element: Box::new(element),
        }
    }
}

fn children(tlv: &Tlv) -> Result<Vec<Element>, Error> {
    tlv.tlvs()
        .unwrap_or_default()
        .iter()
        .map(Element::try_from)
        .collect()
}

fn string_data(tlv: &Tlv, err: Error) -> Result<String, Error> {
    String::from_utf8(tlv.data().unwrap_or_default().to_vec()).map_err(|_| err)
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.tag() {
            Tag::Primitive(primitive_tag, _) => match primitive_tag {
                PrimitiveTag::Boolean => match tlv.data() {
                    Some([0x00]) => Ok(Element::Boolean(false)),
                    Some([0xff]) => Ok(Element::Boolean(true)),
                    _ => Err(Error::InvalidBoolean),
                },
                PrimitiveTag::Integer => match tlv.data() {
                    Some(data) if !data.is_empty() => Ok(Element::Integer(Integer::from(data))),
                    _ => Err(Error::IntegerNoData),
                },
                PrimitiveTag::BitString => {
                    let data = tlv.data().ok_or(Error::BitStringNoData)?;
                    Ok(Element::BitString(BitString::try_from(data)?))
                }
                PrimitiveTag::OctetString => Ok(Element::OctetString(OctetString::from(
                    tlv.data().unwrap_or_default(),
                ))),
                PrimitiveTag::Null => Ok(Element::Null),
                PrimitiveTag::ObjectIdentifier => {
                    let data = tlv.data().ok_or(Error::ObjectIdentifierNoData)?;
                    Ok(Element::ObjectIdentifier(ObjectIdentifier::try_from(data)?))
                }
                PrimitiveTag::UTF8String => Ok(Element::UTF8String(string_data(
                    tlv,
                    Error::Utf8StringInvalidUtf8,
                )?)),
                PrimitiveTag::Sequence => Ok(Element::Sequence(children(tlv)?)),
                PrimitiveTag::Set => Ok(Element::Set(children(tlv)?)),
                PrimitiveTag::PrintableString => Ok(Element::PrintableString(string_data(
                    tlv,
                    Error::PrintableStringInvalidEncoding,
                )?)),
                PrimitiveTag::IA5String => Ok(Element::IA5String(string_data(
                    tlv,
                    Error::Ia5StringInvalidEncoding,
                )?)),
                PrimitiveTag::UTCTime => {
                    let data = tlv.data().ok_or(Error::UtcTimeInvalidFormat)?;
                    Ok(Element::UTCTime(parse_utc_time(data)?))
                }
                PrimitiveTag::GeneralizedTime => {
                    let data = tlv.data().ok_or(Error::GeneralizedTimeInvalidFormat)?;
                    Ok(Element::GeneralizedTime(parse_generalized_time(data)?))
                }
                PrimitiveTag::Unimplemented(_) => Ok(Element::Unimplemented(tlv.clone())),
            },
            Tag::ContextSpecific { slot, constructed } => {
                if *constructed {
                    // EXPLICIT tagging wraps exactly one element.
                    match tlv.tlvs() {
                        Some([inner]) => Ok(Element::explicit(*slot, Element::try_from(inner)?)),
                        _ => Err(Error::InvalidContextSpecific {
                            slot: *slot,
                            msg: "context-specific constructed must have exactly one sub-tlv",
                        }),
                    }
                } else {
                    // IMPLICIT tagging: the upper layer interprets the raw content.
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: false,
                        element: Box::new(Element::OctetString(OctetString::from(
                            tlv.data().unwrap_or_default(),
                        ))),
                    })
                }
            }
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::BitString(bs) => write!(f, "BitString({} bits)", bs.bit_len()),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::UTF8String(s) => write!(f, "UTF8String({})", s),
            Element::Sequence(seq) => write!(f, "Sequence({} elements)", seq.len()),
            Element::Set(set) => write!(f, "Set({} elements)", set.len()),
            Element::PrintableString(s) => write!(f, "PrintableString({})", s),
            Element::IA5String(s) => write!(f, "IA5String({})", s),
            Element::UTCTime(dt) => write!(f, "UTCTime({})", dt),
            Element::GeneralizedTime(dt) => write!(f, "GeneralizedTime({})", dt),
            Element::ContextSpecific { slot, element, .. } => {
                write!(f, "[{}] {}", slot, element)
            }
            Element::Unimplemented(tlv) => write!(f, "Unimplemented({:?})", tlv.tag()),
        }
    }
}

fn primitive(tag: PrimitiveTag) -> Tag {
    Tag::Primitive(tag, u8::from(&tag))
}

fn constructed(tag: PrimitiveTag) -> Tag {
    Tag::Primitive(tag, u8::from(&tag) | TAG_CONSTRUCTED)
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self, Self::Error> {
        let tlv = match element {
            Element::Boolean(b) => Tlv::new_primitive(
                primitive(PrimitiveTag::Boolean),
                vec![if *b { 0xff } else { 0x00 }],
            ),
            Element::Integer(i) => Tlv::new_primitive(
                primitive(PrimitiveTag::Integer),
                i.as_bigint().to_signed_bytes_be(),
            ),
            Element::BitString(bs) => {
                Tlv::new_primitive(primitive(PrimitiveTag::BitString), Vec::from(bs.clone()))
            }
            Element::OctetString(os) => Tlv::new_primitive(
                primitive(PrimitiveTag::OctetString),
                os.as_bytes().to_vec(),
            ),
            Element::Null => Tlv::new_primitive(primitive(PrimitiveTag::Null), vec![]),
            Element::ObjectIdentifier(oid) => Tlv::new_primitive(
                primitive(PrimitiveTag::ObjectIdentifier),
                Vec::try_from(oid)?,
            ),
            Element::UTF8String(s) => Tlv::new_primitive(
                primitive(PrimitiveTag::UTF8String),
                s.as_bytes().to_vec(),
            ),
            Element::Sequence(elements) => Tlv::new_constructed(
                constructed(PrimitiveTag::Sequence),
                elements
                    .iter()
                    .map(Tlv::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Element::Set(elements) => Tlv::new_constructed(
                constructed(PrimitiveTag::Set),
                elements
                    .iter()
                    .map(Tlv::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Element::PrintableString(s) => Tlv::new_primitive(
                primitive(PrimitiveTag::PrintableString),
                s.as_bytes().to_vec(),
            ),
            Element::IA5String(s) => Tlv::new_primitive(
                primitive(PrimitiveTag::IA5String),
                s.as_bytes().to_vec(),
            ),
            Element::UTCTime(dt) => Tlv::new_primitive(
                primitive(PrimitiveTag::UTCTime),
                dt.format("%y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::GeneralizedTime(dt) => Tlv::new_primitive(
                primitive(PrimitiveTag::GeneralizedTime),
                dt.format("%Y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                };
                let inner = Tlv::try_from(element.as_ref())?;
                if *constructed {
                    Tlv::new_constructed(tag, vec![inner])
                } else {
                    let data = inner.data().ok_or(Error::ElementCannotEncode(
                        "IMPLICIT tagging of a constructed element",
                    ))?;
                    Tlv::new_primitive(tag, data.to_vec())
                }
            }
            Element::Unimplemented(_) => {
                return Err(Error::ElementCannotEncode("unimplemented element"));
            }
        };
        Ok(tlv)
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        Tlv::try_from(self)
    }
}

// ASN1 integer is possible to be a positive and negative value.
// This can be arbitrary sized values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    /// Returns a reference to the inner BigInt
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    /// Returns the magnitude when the value is not negative.
    pub fn to_biguint(&self) -> Option<BigUint> {
        self.inner.to_biguint()
    }

    /// Converts the Integer to i64 if it fits in the range
    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    /// Converts the Integer to u64 if it fits in the range
    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<BigUint> for Integer {
    fn from(value: BigUint) -> Self {
        Integer {
            inner: BigInt::from_biguint(Sign::Plus, value),
        }
    }
}

impl From<&BigUint> for Integer {
    fn from(value: &BigUint) -> Self {
        Integer::from(value.clone())
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_i64().ok_or(Error::IntegerOutOfRangeI64)
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_u64().ok_or(Error::IntegerOutOfRangeU64)
    }
}

impl TryFrom<&Integer> for BigUint {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_biguint().ok_or(Error::IntegerNegative)
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let (first, rest) = value.split_first().ok_or(Error::ObjectIdentifierNoData)?;

        let mut values = Vec::new();
        let first = *first as u64;
        if first < 80 {
            values.push(first / 40);
            values.push(first % 40);
        } else {
            values.push(2);
            values.push(first - 80);
        }

        let mut val = 0u64;
        let mut pending = false;
        for v in rest.iter() {
            val = (val << 7) | (*v as u64 & 0x7f);
            pending = *v & 0x80 != 0;
            if !pending {
                // If the continuation bit is not set, we have reached the end of this value
                values.push(val);
                val = 0;
            }
        }
        if pending {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        Ok(ObjectIdentifier { inner: values })
    }
}

impl TryFrom<&ObjectIdentifier> for Vec<u8> {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self, Self::Error> {
        let [first, second, rest @ ..] = oid.inner.as_slice() else {
            return Err(Error::ObjectIdentifierTooFewComponents);
        };
        if *first > 2 || (*first < 2 && *second >= 40) || first * 40 + second > 0xff {
            return Err(Error::ObjectIdentifierInvalidArcs(*first, *second));
        }

        let mut result = vec![(first * 40 + second) as u8];
        for v in rest {
            let mut encoded = vec![(*v & 0x7f) as u8];
            let mut value = *v >> 7;
            while value > 0 {
                encoded.push((value & 0x7f) as u8 | 0x80);
                value >>= 7;
            }
            result.extend(encoded.iter().rev());
        }

        Ok(result)
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('.')
            .map(|s| s.parse::<u64>().map_err(Error::ParseInt))
            .collect::<Result<Vec<u64>, Error>>()?;
        if values.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner: values })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    /// Creates a new BitString with the specified number of unused bits and data
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    /// Returns a reference to the underlying byte data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the total number of bits (excluding unused bits)
    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }
}

impl From<Vec<u8>> for BitString {
    /// A byte-aligned bit string, as used for key material.
    fn from(data: Vec<u8>) -> Self {
        BitString { unused: 0, data }
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let (unused, data) = value.split_first().ok_or(Error::BitStringNoData)?;
        if *unused > 7 {
            return Err(Error::BitStringUnusedBitsOutOfRange(*unused));
        }
        Ok(BitString {
            unused: *unused,
            data: data.to_vec(),
        })
    }
}

impl From<BitString> for Vec<u8> {
    fn from(value: BitString) -> Self {
        let mut result = Vec::with_capacity(value.data.len() + 1);
        result.push(value.unused);
        result.extend(value.data);
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    /// Returns the inner bytes as a slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Consumes self and returns the inner bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }
}

impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self, Self::Error> {
        let der: Der = value.as_bytes().decode().map_err(Error::FailedToDecodeDer)?;
        der.decode()
    }
}

impl TryFrom<&ASN1Object> for OctetString {
    type Error = Error;

    fn try_from(value: &ASN1Object) -> Result<Self, Self::Error> {
        let der: Der = value.encode()?;
        let bytes: Vec<u8> = der.encode().map_err(Error::FailedToDecodeDer)?;
        Ok(OctetString::from(bytes))
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.inner {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

fn parse_utc_time(data: &[u8]) -> Result<NaiveDateTime, Error> {
    let s = std::str::from_utf8(data).map_err(|_| Error::UtcTimeInvalidFormat)?;
    NaiveDateTime::parse_from_str(s, "%y%m%d%H%M%SZ").map_err(|_| Error::UtcTimeInvalidFormat)
}

fn parse_generalized_time(data: &[u8]) -> Result<NaiveDateTime, Error> {
    let s = std::str::from_utf8(data).map_err(|_| Error::GeneralizedTimeInvalidFormat)?;
    NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%SZ")
        .map_err(|_| Error::GeneralizedTimeInvalidFormat)
}
