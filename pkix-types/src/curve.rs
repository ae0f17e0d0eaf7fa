//! Elliptic Curve Parameters
//!
//! Defined in [RFC 5480 Section 2.1.1](https://datatracker.ietf.org/doc/html/rfc5480#section-2.1.1)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use asn1::ObjectIdentifier;

use crate::OidName;
use crate::error::{Error, Result};

/// NIST prime curves usable in a JWK `crv` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCurve {
    /// secp224r1, OID 1.3.132.0.33
    P224,
    /// secp256r1 (prime256v1), OID 1.2.840.10045.3.1.7
    P256,
    /// secp384r1, OID 1.3.132.0.34
    P384,
    /// secp521r1, OID 1.3.132.0.35
    P521,
}

impl NamedCurve {
    pub const OID_SECP224R1: &'static str = "1.3.132.0.33";
    pub const OID_SECP256R1: &'static str = "1.2.840.10045.3.1.7";
    pub const OID_SECP384R1: &'static str = "1.3.132.0.34";
    pub const OID_SECP521R1: &'static str = "1.3.132.0.35";

    /// Get the OID string for this named curve.
    ///
    /// # Example
    ///
    /// ```
    /// use pkix_types::NamedCurve;
    ///
    /// assert_eq!(NamedCurve::P256.oid_str(), "1.2.840.10045.3.1.7");
    /// ```
    pub const fn oid_str(&self) -> &'static str {
        match self {
            Self::P224 => Self::OID_SECP224R1,
            Self::P256 => Self::OID_SECP256R1,
            Self::P384 => Self::OID_SECP384R1,
            Self::P521 => Self::OID_SECP521R1,
        }
    }

    pub fn oid(&self) -> Result<ObjectIdentifier> {
        Ok(self.oid_str().parse()?)
    }

    /// The JOSE curve name (RFC 7518 Section 6.2.1.1).
    pub const fn jwk_name(&self) -> &'static str {
        match self {
            Self::P224 => "P-224",
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Size in bits of the underlying prime field.
    pub const fn bits(&self) -> usize {
        match self {
            Self::P224 => 224,
            Self::P256 => 256,
            Self::P384 => 384,
            Self::P521 => 521,
        }
    }

    /// Octet length of a field element, which is the padded width of the
    /// coordinates and of the private scalar.
    pub const fn field_size(&self) -> usize {
        self.bits().div_ceil(8)
    }
}

impl Display for NamedCurve {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.jwk_name())
    }
}

impl FromStr for NamedCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P-224" => Ok(Self::P224),
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            _ => Err(Error::UnsupportedCurve(s.to_string())),
        }
    }
}

impl TryFrom<&ObjectIdentifier> for NamedCurve {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self> {
        match oid.to_string().as_str() {
            Self::OID_SECP224R1 => Ok(Self::P224),
            Self::OID_SECP256R1 => Ok(Self::P256),
            Self::OID_SECP384R1 => Ok(Self::P384),
            Self::OID_SECP521R1 => Ok(Self::P521),
            other => Err(Error::UnsupportedCurve(other.to_string())),
        }
    }
}

impl OidName for NamedCurve {
    fn oid_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::P224 => "secp224r1",
            Self::P256 => "secp256r1",
            Self::P384 => "secp384r1",
            Self::P521 => "secp521r1",
        };
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NamedCurve::P224, "P-224", 28)]
    #[case(NamedCurve::P256, "P-256", 32)]
    #[case(NamedCurve::P384, "P-384", 48)]
    #[case(NamedCurve::P521, "P-521", 66)]
    fn test_named_curve_names_and_sizes(
        #[case] curve: NamedCurve,
        #[case] name: &str,
        #[case] field_size: usize,
    ) {
        assert_eq!(curve.field_size(), field_size);
        assert_eq!(curve.to_string(), name);
        assert_eq!(NamedCurve::from_str(name).unwrap(), curve);

        let oid = curve.oid().unwrap();
        assert_eq!(NamedCurve::try_from(&oid).unwrap(), curve);
    }

    #[rstest]
    #[case("P-192")]
    #[case("secp256k1")]
    #[case("")]
    fn test_named_curve_from_unknown_name(#[case] name: &str) {
        assert!(matches!(
            NamedCurve::from_str(name),
            Err(Error::UnsupportedCurve(n)) if n == name
        ));
    }

    #[test]
    fn test_named_curve_from_unknown_oid() {
        // secp256k1
        let oid: ObjectIdentifier = "1.3.132.0.10".parse().unwrap();
        assert!(matches!(
            NamedCurve::try_from(&oid),
            Err(Error::UnsupportedCurve(_))
        ));
    }
}
