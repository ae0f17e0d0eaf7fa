//! Typed key model.
//!
//! [`Key`] is a closed union over the two supported families in their public
//! and private forms. It knows nothing about wire formats; the recogniser,
//! the renderer and the JWK codec all convert to and from it.

use num_bigint::BigUint;
use num_traits::One;
use pkix_types::NamedCurve;

use crate::error::{Error, Result};

/// Implemented by the public half of every key family.
pub trait PublicKeyLike: Clone + Into<Key> {}

/// Implemented by the private half of every key family.
pub trait PrivateKeyLike {
    type Public: PublicKeyLike;

    /// The public key this private key belongs to.
    fn public_key(&self) -> &Self::Public;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    n: BigUint,
    e: u64,
}

impl RsaPublicKey {
    pub fn new(n: BigUint, e: u64) -> Self {
        Self { n, e }
    }

    /// Modulus.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Public exponent.
    pub fn e(&self) -> u64 {
        self.e
    }

    /// Modulus length in bits.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }
}

impl PublicKeyLike for RsaPublicKey {}

/// CRT values of a two-prime RSA key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrtValues {
    /// d mod (p - 1)
    pub dp: BigUint,
    /// d mod (q - 1)
    pub dq: BigUint,
    /// q^-1 mod p
    pub qinv: BigUint,
}

impl CrtValues {
    pub fn compute(d: &BigUint, p: &BigUint, q: &BigUint) -> Result<Self> {
        let one = BigUint::one();
        if *p <= one || *q <= one {
            return Err(Error::InvalidRsaPrimes);
        }
        let qinv = q.modinv(p).ok_or(Error::InvalidRsaPrimes)?;
        Ok(Self {
            dp: d % (p - &one),
            dq: d % (q - &one),
            qinv,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    public: RsaPublicKey,
    d: BigUint,
    primes: Vec<BigUint>,
    precomputed: Option<CrtValues>,
}

impl RsaPrivateKey {
    /// A two-prime key. The CRT values are derived from `d`, `p` and `q`.
    pub fn new(public: RsaPublicKey, d: BigUint, p: BigUint, q: BigUint) -> Result<Self> {
        let precomputed = CrtValues::compute(&d, &p, &q)?;
        Ok(Self {
            public,
            d,
            primes: vec![p, q],
            precomputed: Some(precomputed),
        })
    }

    /// Assemble a key whose CRT values, if any, were read from an encoding.
    pub fn from_parts(
        public: RsaPublicKey,
        d: BigUint,
        primes: Vec<BigUint>,
        precomputed: Option<CrtValues>,
    ) -> Self {
        Self {
            public,
            d,
            primes,
            precomputed,
        }
    }

    /// Private exponent.
    pub fn d(&self) -> &BigUint {
        &self.d
    }

    /// Prime factors of the modulus, `p` first.
    pub fn primes(&self) -> &[BigUint] {
        &self.primes
    }

    /// The stored CRT values, computed from `d`, `p` and `q` when the key
    /// was built without them.
    pub fn crt_values(&self) -> Result<CrtValues> {
        let [p, q] = self.primes.as_slice() else {
            return Err(Error::UnsupportedPrimeCount(self.primes.len()));
        };
        match &self.precomputed {
            Some(precomputed) => Ok(precomputed.clone()),
            None => CrtValues::compute(&self.d, p, q),
        }
    }
}

impl PrivateKeyLike for RsaPrivateKey {
    type Public = RsaPublicKey;

    fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaPublicKey {
    curve: NamedCurve,
    x: BigUint,
    y: BigUint,
}

impl EcdsaPublicKey {
    pub fn new(curve: NamedCurve, x: BigUint, y: BigUint) -> Self {
        Self { curve, x, y }
    }

    pub fn curve(&self) -> NamedCurve {
        self.curve
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }
}

impl PublicKeyLike for EcdsaPublicKey {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaPrivateKey {
    public: EcdsaPublicKey,
    d: BigUint,
}

impl EcdsaPrivateKey {
    pub fn new(public: EcdsaPublicKey, d: BigUint) -> Self {
        Self { public, d }
    }

    /// Private scalar.
    pub fn d(&self) -> &BigUint {
        &self.d
    }
}

impl PrivateKeyLike for EcdsaPrivateKey {
    type Public = EcdsaPublicKey;

    fn public_key(&self) -> &EcdsaPublicKey {
        &self.public
    }
}

/// A key of one of the supported families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    RsaPublic(RsaPublicKey),
    RsaPrivate(RsaPrivateKey),
    EcdsaPublic(EcdsaPublicKey),
    EcdsaPrivate(EcdsaPrivateKey),
}

impl Key {
    pub fn is_private(&self) -> bool {
        match self {
            Key::RsaPublic(_) | Key::EcdsaPublic(_) => false,
            Key::RsaPrivate(_) | Key::EcdsaPrivate(_) => true,
        }
    }

    /// The public key, which is `self` for public keys.
    pub fn public_part(&self) -> Key {
        match self {
            Key::RsaPublic(_) | Key::EcdsaPublic(_) => self.clone(),
            Key::RsaPrivate(key) => public_of(key),
            Key::EcdsaPrivate(key) => public_of(key),
        }
    }

    pub fn into_public_part(self) -> Key {
        match self {
            Key::RsaPublic(_) | Key::EcdsaPublic(_) => self,
            Key::RsaPrivate(key) => public_of(&key),
            Key::EcdsaPrivate(key) => public_of(&key),
        }
    }

    /// JWK `kty` of the family.
    pub fn kty(&self) -> &'static str {
        match self {
            Key::RsaPublic(_) | Key::RsaPrivate(_) => "RSA",
            Key::EcdsaPublic(_) | Key::EcdsaPrivate(_) => "EC",
        }
    }
}

fn public_of<K: PrivateKeyLike>(key: &K) -> Key {
    key.public_key().clone().into()
}

impl From<RsaPublicKey> for Key {
    fn from(key: RsaPublicKey) -> Self {
        Key::RsaPublic(key)
    }
}

impl From<RsaPrivateKey> for Key {
    fn from(key: RsaPrivateKey) -> Self {
        Key::RsaPrivate(key)
    }
}

impl From<EcdsaPublicKey> for Key {
    fn from(key: EcdsaPublicKey) -> Self {
        Key::EcdsaPublic(key)
    }
}

impl From<EcdsaPrivateKey> for Key {
    fn from(key: EcdsaPrivateKey) -> Self {
        Key::EcdsaPrivate(key)
    }
}
