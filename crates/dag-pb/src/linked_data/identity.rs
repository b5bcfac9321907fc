//! Content identity
//!
//! Nodes are addressed by a multihash of their canonical bytes. The
//! hash primitive is chosen by its multicodec name and executed on the
//! blocking pool, so hashing is the single suspension point when a node
//! is built. Turning a digest into a [`Cid`] is pure and synchronous.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use super::digest::Digest;
use super::Cid;

/// Multicodec code for `dag-pb`
pub const DAG_PB_CODEC: u64 = 0x70;

/// Errors that can occur while hashing or deriving identifiers
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("hash failure: {0}")]
    HashFailure(String),
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

/// Digest algorithms a node can be hashed with.
///
/// Algorithms are selected by their multicodec table name, which is
///  also the form used when an algorithm is written to config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    #[default]
    Sha2_256,
    Sha2_512,
    Blake3,
}

impl HashAlgorithm {
    /// Multicodec name of the algorithm
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha2_256 => "sha2-256",
            HashAlgorithm::Sha2_512 => "sha2-512",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Multihash code written in front of the digest
    pub fn code(&self) -> u64 {
        match self {
            HashAlgorithm::Sha2_256 => 0x12,
            HashAlgorithm::Sha2_512 => 0x13,
            HashAlgorithm::Blake3 => 0x1e,
        }
    }

    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha2_256 => sha2::Sha256::digest(bytes).to_vec(),
            HashAlgorithm::Sha2_512 => sha2::Sha512::digest(bytes).to_vec(),
            HashAlgorithm::Blake3 => blake3::hash(bytes).as_bytes().to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha2-256" => Ok(HashAlgorithm::Sha2_256),
            "sha2-512" => Ok(HashAlgorithm::Sha2_512),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(IdentityError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(value: HashAlgorithm) -> Self {
        value.name().to_string()
    }
}

/// Hash `bytes` with `algorithm`, producing a multihash digest.
///
/// The primitive runs on tokio's blocking pool. A panic or
///  cancellation of that task surfaces as [`IdentityError::HashFailure`]
///  and is not retried.
pub async fn hash(algorithm: HashAlgorithm, bytes: Bytes) -> Result<Digest, IdentityError> {
    tracing::trace!("hashing {} bytes with {}", bytes.len(), algorithm);
    let raw = tokio::task::spawn_blocking(move || algorithm.digest(&bytes))
        .await
        .map_err(|e| IdentityError::HashFailure(e.to_string()))?;
    let mh = Multihash::<64>::wrap(algorithm.code(), &raw)
        .map_err(|e| IdentityError::HashFailure(e.to_string()))?;
    Ok(Digest::from(mh))
}

/// Hash `bytes` with the algorithm registered under `name`
pub async fn hash_by_name(name: &str, bytes: Bytes) -> Result<Digest, IdentityError> {
    let algorithm = HashAlgorithm::from_str(name)?;
    hash(algorithm, bytes).await
}

/// Wrap a digest into a content identifier.
///
/// sha2-256 digests become CIDv0 (the bare `Qm...` form); anything else
///  becomes a CIDv1 tagged with the `dag-pb` codec.
pub fn to_content_id(digest: &Digest) -> Result<Cid, IdentityError> {
    let mh = digest.multihash()?;
    if mh.code() == HashAlgorithm::Sha2_256.code() && mh.size() == 32 {
        Cid::new_v0(mh).map_err(|e| IdentityError::InvalidDigest(e.to_string()))
    } else {
        Ok(Cid::new_v1(DAG_PB_CODEC, mh))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sha2::Digest as _;

    #[tokio::test]
    async fn test_sha2_256_is_default() {
        let digest = hash(HashAlgorithm::default(), Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let mh = digest.multihash().unwrap();
        assert_eq!(mh.code(), 0x12);
        assert_eq!(mh.size(), 32);
        assert_eq!(mh.digest(), sha2::Sha256::digest(b"hello").as_slice());
    }

    #[tokio::test]
    async fn test_hash_by_name() {
        let digest = hash_by_name("blake3", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let mh = digest.multihash().unwrap();
        assert_eq!(mh.code(), 0x1e);
        assert_eq!(mh.digest(), blake3::hash(b"hello").as_bytes());

        let digest = hash_by_name("sha2-512", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(digest.multihash().unwrap().size(), 64);
    }

    #[tokio::test]
    async fn test_unsupported_algorithm() {
        let result = hash_by_name("md5", Bytes::new()).await;
        assert!(matches!(
            result,
            Err(IdentityError::UnsupportedAlgorithm(name)) if name == "md5"
        ));
    }

    #[tokio::test]
    async fn test_content_id_versions() {
        let digest = hash(HashAlgorithm::Sha2_256, Bytes::from_static(b"x"))
            .await
            .unwrap();
        let cid = to_content_id(&digest).unwrap();
        assert_eq!(cid.version(), cid::Version::V0);
        assert_eq!(cid.to_string(), digest.to_string());

        let digest = hash(HashAlgorithm::Blake3, Bytes::from_static(b"x"))
            .await
            .unwrap();
        let cid = to_content_id(&digest).unwrap();
        assert_eq!(cid.version(), cid::Version::V1);
        assert_eq!(cid.codec(), DAG_PB_CODEC);
        assert_eq!(cid.hash().to_bytes(), digest.bytes());
    }

    #[test]
    fn test_content_id_rejects_opaque_digest() {
        let digest = Digest::from(vec![0x01]);
        assert!(to_content_id(&digest).is_err());
    }

    #[test]
    fn test_algorithm_serde_by_name() {
        let json = serde_json::to_string(&HashAlgorithm::Blake3).unwrap();
        assert_eq!(json, "\"blake3\"");
        let parsed: HashAlgorithm = serde_json::from_str("\"sha2-512\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Sha2_512);
        assert!(serde_json::from_str::<HashAlgorithm>("\"sha1\"").is_err());
    }
}
