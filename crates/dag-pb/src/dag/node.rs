use std::fmt;

use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::link::Link;
use crate::linked_data::{to_content_id, Cid, Digest, HashAlgorithm, IdentityError};

/**
 * Nodes
 * =====
 * A node is opaque data plus an ordered list of links to other
 *  nodes, together with the exact bytes it was hashed from and
 *  the resulting digest.
 * Only the [`Builder`](super::Builder) produces nodes, which is
 *  what keeps `serialized` and `digest` in step with `data` and
 *  `links`. There is nothing to mutate: every field is private and
 *  read through a getter, and "changing" a node means asking the
 *  builder for a new one.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    data: Bytes,
    // always in canonical order
    links: Vec<Link>,
    serialized: Bytes,
    digest: Digest,
    algorithm: HashAlgorithm,
    size: u64,
}

impl Node {
    /// Assemble a node from its parts. Callers must pass the canonical
    ///  encoding of `data` + `links` and its digest under `algorithm`.
    pub(crate) fn from_parts(
        data: Bytes,
        links: Vec<Link>,
        serialized: Bytes,
        digest: Digest,
        algorithm: HashAlgorithm,
    ) -> Self {
        debug_assert_eq!(
            super::codec::encode(&data, &links).as_slice(),
            serialized.as_ref(),
            "serialized bytes do not match data and links"
        );

        let size = links
            .iter()
            .fold(serialized.len() as u64, |acc, l| acc.saturating_add(l.size()));

        Self {
            data,
            links,
            serialized,
            digest,
            algorithm,
            size,
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The canonical bytes this node was hashed from
    pub fn serialized(&self) -> &Bytes {
        &self.serialized
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Algorithm the digest was computed with
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Encoded length plus the cumulative size of every linked subtree
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content identifier for this node
    pub fn cid(&self) -> Result<Cid, IdentityError> {
        to_content_id(&self.digest)
    }

    /// Project this node into a link suitable for embedding in a parent:
    ///  empty name, this node's cumulative size and digest.
    pub fn to_link(&self) -> Link {
        Link::new("", self.size, self.digest.clone())
    }
}

impl From<&Node> for Link {
    fn from(node: &Node) -> Self {
        node.to_link()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAGNode <{} - data: \"{}\", links: {}, size: {}>",
            self.digest,
            String::from_utf8_lossy(&self.data),
            self.links.len(),
            self.size
        )
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("data", &self.data[..])?;
        state.serialize_field("links", &self.links)?;
        state.serialize_field("hash", &self.digest)?;
        state.serialize_field("size", &self.size)?;
        state.end()
    }
}
