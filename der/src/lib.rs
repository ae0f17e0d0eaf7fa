use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use nom::{IResult, Parser};

pub mod error;

use error::Error;

pub const TAG_CONSTRUCTED: u8 = 0x20;
pub const TAG_CLASS_MASK: u8 = 0xc0;
pub const TAG_CLASS_UNIVERSAL: u8 = 0x00;
pub const TAG_CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
pub const TAG_NUMBER_MASK: u8 = 0x1f;

/// A sequence of top-level TLVs decoded from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }

    /// Parses every TLV in `input`. The whole buffer must be consumed.
    pub fn parse(input: &[u8]) -> Result<Der, Error> {
        let mut elements = Vec::new();
        let mut input = input;
        while !input.is_empty() {
            let (rest, tlv) = Tlv::parse(input)?;
            input = rest;
            elements.push(tlv);
        }
        Ok(Der { elements })
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Der {}

impl<'a> Decoder<&'a [u8], Der> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        Der::parse(self)
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        Der::parse(self)
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::new();
        for tlv in &self.elements {
            tlv.write_to(&mut out);
        }
        Ok(out)
    }
}

/// Universal class tag numbers understood by the ASN.1 layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    IA5String,
    UTCTime,
    GeneralizedTime,
    Unimplemented(u8),
}

impl From<u8> for PrimitiveTag {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x0c => Self::UTF8String,
            0x10 => Self::Sequence,
            0x11 => Self::Set,
            0x13 => Self::PrintableString,
            0x16 => Self::IA5String,
            0x17 => Self::UTCTime,
            0x18 => Self::GeneralizedTime,
            _ => Self::Unimplemented(value),
        }
    }
}

impl From<&PrimitiveTag> for u8 {
    fn from(value: &PrimitiveTag) -> Self {
        match value {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::UTF8String => 0x0c,
            PrimitiveTag::Sequence => 0x10,
            PrimitiveTag::Set => 0x11,
            PrimitiveTag::PrintableString => 0x13,
            PrimitiveTag::IA5String => 0x16,
            PrimitiveTag::UTCTime => 0x17,
            PrimitiveTag::GeneralizedTime => 0x18,
            PrimitiveTag::Unimplemented(n) => *n,
        }
    }
}

/// An identifier octet.
///
/// `Primitive` covers the universal class (and, as `Unimplemented`, the
/// application and private classes) and keeps the raw identifier byte so
/// the constructed bit survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
}

impl Tag {
    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            Tag::ContextSpecific { constructed, .. } => *constructed,
        }
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        let constructed = value & TAG_CONSTRUCTED == TAG_CONSTRUCTED;
        match value & TAG_CLASS_MASK {
            TAG_CLASS_UNIVERSAL => {
                Tag::Primitive(PrimitiveTag::from(value & TAG_NUMBER_MASK), value)
            }
            TAG_CLASS_CONTEXT_SPECIFIC => Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed,
            },
            _ => Tag::Primitive(PrimitiveTag::Unimplemented(value), value),
        }
    }
}

impl From<&Tag> for u8 {
    fn from(value: &Tag) -> Self {
        match value {
            Tag::Primitive(_, raw) => *raw,
            Tag::ContextSpecific { slot, constructed } => {
                let mut b = TAG_CLASS_CONTEXT_SPECIFIC | (slot & TAG_NUMBER_MASK);
                if *constructed {
                    b |= TAG_CONSTRUCTED;
                }
                b
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Content octets of a primitive TLV.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    /// Children of a constructed TLV.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    fn parse(input: &[u8]) -> IResult<&[u8], Tlv> {
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, data) = nom::bytes::complete::take(length).parse(input)?;

        if tag.is_constructed() {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (rest, v) = Self::parse(data)?;
                data = rest;
                tlvs.push(v);
            }
            return Ok((input, Tlv::new_constructed(tag, tlvs)));
        }

        Ok((input, Tlv::new_primitive(tag, data.to_vec())))
    }

    fn content(&self) -> Vec<u8> {
        match &self.value {
            Value::Data(data) => data.clone(),
            Value::Tlv(tlvs) => {
                let mut out = Vec::new();
                for tlv in tlvs {
                    tlv.write_to(&mut out);
                }
                out
            }
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let content = self.content();
        out.push(u8::from(&self.tag));
        write_length(content.len(), out);
        out.extend_from_slice(&content);
    }
}

impl EncodableTo<Tlv> for Vec<u8> {}

impl Encoder<Tlv, Vec<u8>> for Tlv {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        Ok(out)
    }
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    Ok((input, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (rest, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let length = n & 0x7f;
        if length == 0 || length as usize > size_of::<usize>() {
            // 0x80 is the BER indefinite form, which DER forbids.
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::LengthValue,
            )));
        }
        let (rest, bs) = nom::bytes::complete::take(length).parse(rest)?;
        let n = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
        return Ok((rest, n));
    }
    // short form: 0-127
    Ok((rest, n as usize))
}

fn write_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}
