//! JSON Web Key Set codec.

use indexmap::IndexMap;
use kagi::decoder::Decoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::jwk::Jwk;
use crate::key::Key;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Deserialize)]
struct RawJwks {
    keys: Vec<serde_json::Value>,
}

impl Jwks {
    /// Encode `keys` in order. A failing key is reported with its index.
    pub fn from_keys<'a, I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a Key, Option<String>)>,
    {
        let keys = keys
            .into_iter()
            .enumerate()
            .map(|(index, (key, kid))| Jwk::from_key(key, kid).map_err(|e| e.at(index)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    /// Parse a `{"keys": [...]}` document. A malformed member of `keys`
    /// is reported with its index.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawJwks = serde_json::from_str(json)?;
        let keys = raw
            .keys
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<Jwk>(value).map_err(|e| Error::from(e).at(index))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode every key, keyed by its `kid`.
    ///
    /// Keys without a `kid` are numbered `"0"`, `"1"`, ... in the order they
    /// appear. The numbering does not look at explicit ids, so an explicit
    /// `"0"` and an assigned `"0"` collide and the later key wins. The map
    /// iterates in array order.
    pub fn to_keys(&self) -> Result<IndexMap<String, Key>> {
        let mut keys = IndexMap::with_capacity(self.keys.len());
        let mut ordinal = 0usize;
        for (index, jwk) in self.keys.iter().enumerate() {
            let key: Key = jwk.decode().map_err(|e| e.at(index))?;
            let kid = match jwk.kid() {
                Some(kid) => kid.to_string(),
                None => {
                    let kid = ordinal.to_string();
                    ordinal += 1;
                    debug!(kid = kid.as_str(), "assigned key id");
                    kid
                }
            };
            keys.insert(kid, key);
        }
        Ok(keys)
    }
}
