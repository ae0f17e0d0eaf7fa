//! Encoder trait, the mirror image of [`crate::decoder::Decoder`].

/// Encoder trait for converting `self` (of type `T`) into type `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be produced from type `T`.
pub trait EncodableTo<T> {}
