use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use cid::multibase::Base;
use multihash::Multihash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::identity::IdentityError;

/// Content hash of a node's canonical bytes.
///
/// On the wire a digest is an opaque byte string, normally a
/// self-describing multihash (`code || length || digest`). It is
/// kept opaque here so that foreign blocks carrying odd hashes
/// still decode; interpretation only happens when a content
/// identifier is derived from it.
///
/// The display form is base58btc without a multibase prefix,
///  which for sha2-256 digests is the familiar `Qm...` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(Vec<u8>);

impl Deref for Digest {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Digest(bytes)
    }
}

impl From<&[u8]> for Digest {
    fn from(bytes: &[u8]) -> Self {
        Digest(bytes.to_vec())
    }
}

impl From<Multihash<64>> for Digest {
    fn from(mh: Multihash<64>) -> Self {
        Digest(mh.to_bytes())
    }
}

impl Digest {
    /// Raw digest bytes, exactly as they appear on the wire
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Interpret the digest as a multihash
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidDigest`] if the bytes are not a
    /// well formed multihash of at most 64 digest bytes.
    pub fn multihash(&self) -> Result<Multihash<64>, IdentityError> {
        Multihash::<64>::from_bytes(&self.0)
            .map_err(|e| IdentityError::InvalidDigest(e.to_string()))
    }

    /// Base58btc display form (no multibase prefix)
    pub fn to_b58(&self) -> String {
        Base::Base58Btc.encode(&self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl FromStr for Digest {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = Base::Base58Btc
            .decode(s)
            .map_err(|e| IdentityError::InvalidDigest(format!("{}: {}", s, e)))?;
        Ok(Digest(bytes))
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_b58())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Digest::from_str(&s).map_err(serde::de::Error::custom)
    }
}
