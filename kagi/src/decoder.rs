//! Decoder trait for type-safe conversions.
//!
//! The `Decoder` trait converts a source type `T` into a destination type
//! `D`. It is used throughout kagi to move key material from one
//! representation to the next.
//!
//! # Design Pattern
//!
//! The decoder uses a two-trait pattern:
//!
//! 1. `Decoder<T, D>` - Performs the actual conversion
//! 2. `DecodableFrom<T>` - Marker trait constraining valid conversions
//!
//! # Implementation Guide
//!
//! ```no_run
//! use kagi::decoder::{Decoder, DecodableFrom};
//!
//! struct Source(Vec<u8>);
//! struct Dest(usize);
//!
//! #[derive(Debug)]
//! struct MyError;
//!
//! impl DecodableFrom<Source> for Dest {}
//!
//! impl Decoder<Source, Dest> for Source {
//!     type Error = MyError;
//!
//!     fn decode(&self) -> Result<Dest, Self::Error> {
//!         Ok(Dest(self.0.len()))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented by the source type so that call sites read as
/// `let key: RSAPublicKey = element.decode()?;`.
///
/// # Type Parameters
///
/// * `T` - The source type (usually `Self`)
/// * `D` - The destination type that can be decoded from `T`
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if `self` is not a valid encoding of `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// It has no methods. Implement it for every destination type that a
/// `Decoder` produces:
///
/// ```no_run
/// use kagi::decoder::DecodableFrom;
///
/// struct Source;
/// struct Dest;
///
/// impl DecodableFrom<Source> for Dest {}
/// ```
pub trait DecodableFrom<T> {}
