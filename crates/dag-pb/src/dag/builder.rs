use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::codec::{self, DecodeError};
use super::link::{sort_links, Link};
use super::node::Node;
use crate::linked_data::{hash, Digest, HashAlgorithm, IdentityError};

#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("invalid link: {0}")]
    InvalidLink(String),
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// The shapes a caller may describe a new link in
#[derive(Debug, Clone)]
pub enum LinkInput {
    /// An already constructed link, used as is
    Link(Link),
    /// A named reference to a node, sized and hashed from the node
    Node { name: String, node: Node },
    /// A named reference given by digest and cumulative size
    Raw {
        name: String,
        digest: Digest,
        size: u64,
    },
}

impl LinkInput {
    fn into_link(self) -> Result<Link, BuilderError> {
        let link = match self {
            LinkInput::Link(link) => link,
            LinkInput::Node { name, node } => Link::new(name, node.size(), node.digest().clone()),
            LinkInput::Raw { name, digest, size } => Link::new(name, size, digest),
        };
        // a link without a target digest cannot be followed
        if link.digest().is_empty() {
            return Err(BuilderError::InvalidLink(format!(
                "link \"{}\" has an empty digest",
                link.name()
            )));
        }
        Ok(link)
    }
}

impl From<Link> for LinkInput {
    fn from(link: Link) -> Self {
        LinkInput::Link(link)
    }
}

impl From<(String, Node)> for LinkInput {
    fn from((name, node): (String, Node)) -> Self {
        LinkInput::Node { name, node }
    }
}

impl From<(&str, &Node)> for LinkInput {
    fn from((name, node): (&str, &Node)) -> Self {
        LinkInput::Node {
            name: name.to_string(),
            node: node.clone(),
        }
    }
}

impl From<(String, Digest, u64)> for LinkInput {
    fn from((name, digest, size): (String, Digest, u64)) -> Self {
        LinkInput::Raw { name, digest, size }
    }
}

/// Which links [`Builder::remove_link`] drops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSelector {
    /// Every link with exactly this name
    Name(String),
    /// Every link pointing at this digest
    Digest(Digest),
}

impl LinkSelector {
    fn matches(&self, link: &Link) -> bool {
        match self {
            LinkSelector::Name(name) => link.name() == name,
            LinkSelector::Digest(digest) => link.digest() == digest,
        }
    }
}

impl From<&str> for LinkSelector {
    fn from(name: &str) -> Self {
        LinkSelector::Name(name.to_string())
    }
}

impl From<String> for LinkSelector {
    fn from(name: String) -> Self {
        LinkSelector::Name(name)
    }
}

impl From<Digest> for LinkSelector {
    fn from(digest: Digest) -> Self {
        LinkSelector::Digest(digest)
    }
}

impl From<&Digest> for LinkSelector {
    fn from(digest: &Digest) -> Self {
        LinkSelector::Digest(digest.clone())
    }
}

/// Produces nodes.
///
/// Every operation returns a new [`Node`] and leaves its inputs alone.
///  All of them end in the same place: links are put in canonical
///  order, `(data, links)` is encoded, and the encoding is hashed with
///  the builder's algorithm. That path is the only way to get a node.
///
/// A builder carries no state beyond its algorithm, so it is `Copy`
///  and can be shared freely between tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Builder {
    algorithm: HashAlgorithm,
}

impl Builder {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Create a builder from a multicodec hash name, e.g. `"sha2-256"`
    pub fn from_algorithm_name(name: &str) -> Result<Self, BuilderError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Create a node from data and links in any order
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidLink`] if a link has no target
    ///  digest, or [`BuilderError::Identity`] if hashing fails.
    pub async fn create<I, L>(&self, data: impl Into<Bytes>, links: I) -> Result<Node, BuilderError>
    where
        I: IntoIterator<Item = L>,
        L: Into<LinkInput>,
    {
        let links = links
            .into_iter()
            .map(|l| l.into().into_link())
            .collect::<Result<Vec<_>, _>>()?;
        self.build(data.into(), links).await
    }

    /// A new node with the links of `node` plus `link`
    pub async fn add_link(
        &self,
        node: &Node,
        link: impl Into<LinkInput>,
    ) -> Result<Node, BuilderError> {
        let mut links = node.links().to_vec();
        links.push(link.into().into_link()?);
        self.build(node.data().clone(), links).await
    }

    /// A new node without the links of `node` that match `selector`
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidSelector`] when selecting by an
    ///  empty digest, which can never name a link's target.
    pub async fn remove_link(
        &self,
        node: &Node,
        selector: impl Into<LinkSelector>,
    ) -> Result<Node, BuilderError> {
        let selector = selector.into();
        if matches!(&selector, LinkSelector::Digest(d) if d.is_empty()) {
            return Err(BuilderError::InvalidSelector(
                "digest selector is empty".to_string(),
            ));
        }

        let links = node
            .links()
            .iter()
            .filter(|l| !selector.matches(l))
            .cloned()
            .collect();
        self.build(node.data().clone(), links).await
    }

    /// Re-derive `node` from its data and links
    pub async fn clone_node(&self, node: &Node) -> Result<Node, BuilderError> {
        self.build(node.data().clone(), node.links().to_vec()).await
    }

    /// Project `node` into a link: empty name, the node's size and digest
    pub fn to_link(node: &Node) -> Link {
        node.to_link()
    }

    /// Decode wire bytes and build a node from what they describe.
    ///
    /// Links are re-sorted, so the resulting node's serialized form
    ///  may differ from `bytes` if they were not canonical.
    pub async fn deserialize(&self, bytes: &[u8]) -> Result<Node, BuilderError> {
        let decoded = codec::decode(bytes)?;
        self.create(decoded.data, decoded.links).await
    }

    async fn build(&self, data: Bytes, mut links: Vec<Link>) -> Result<Node, BuilderError> {
        sort_links(&mut links);
        let serialized = Bytes::from(codec::encode(&data, &links));
        let digest = hash(self.algorithm, serialized.clone()).await?;

        tracing::debug!(
            "built node {} ({} links, {} data bytes, {} encoded bytes)",
            digest,
            links.len(),
            data.len(),
            serialized.len()
        );

        Ok(Node::from_parts(
            data,
            links,
            serialized,
            digest,
            self.algorithm,
        ))
    }
}
