//! # kagi
//!
//! Core traits for encoding and decoding in the kagi key codec.
//!
//! This crate defines the `Decoder` and `Encoder` traits that every layer of
//! the workspace implements, so that a key travels through one uniform
//! conversion chain no matter which wire format it started in.
//!
//! ## Overview
//!
//! Decoding a PEM file into a key flows like this:
//! ```text
//! PEM → Vec<u8> → Der → ASN1Object → Element → PKCS/X.509 structure → Key
//! ```
//!
//! Each step uses the `Decoder` trait to convert from one type to the next,
//! and the `Encoder` trait to convert in the reverse direction.
//!
//! ## Type Safety
//!
//! The traits use marker traits (`DecodableFrom` and `EncodableTo`) so that
//! only the conversions a crate explicitly declares can be called.
//!
//! ## Example
//!
//! ```ignore
//! use kagi::decoder::Decoder;
//! use der::Der;
//! use asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x00];
//! let der: Der = bytes.decode()?;
//! let asn1: ASN1Object = der.decode()?;
//! ```
//!
//! Encoding works in the reverse direction:
//!
//! ```ignore
//! use kagi::encoder::Encoder;
//! use der::Der;
//! use asn1::ASN1Object;
//!
//! let asn1 = ASN1Object::new(vec![]);
//! let der: Der = asn1.encode()?;
//! let bytes: Vec<u8> = der.encode()?;
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
