//! Path resolution within a single dag-pb block
//!
//! The resolver works on the raw bytes of one node at a time and never
//!  fetches anything. A path that runs past one of the node's links
//!  stops at that link: the caller gets a [`LinkBoundary`] naming the
//!  target digest plus the part of the path that is left, fetches the
//!  target block itself, and calls [`resolve`] again with the remainder.
//!
//! Paths are `/`-separated. Leading and trailing slashes are ignored.
//!
//! | path                  | value                              | remainder |
//! |-----------------------|------------------------------------|-----------|
//! | `links`               | every link, in canonical order     | `""`      |
//! | `links/<i>`           | digest of link `i`                 | `""`      |
//! | `links/<i>/<rest>`    | boundary at link `i`               | `<rest>`  |
//! | `data`                | the node's data                    | `""`      |
//!
//! Anything else is [`ResolverError::PathNotFound`].

use bytes::Bytes;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::dag::{codec, DecodeError, Link};
use crate::linked_data::Digest;

/// Multicodec name of the format this resolver understands
pub const MULTICODEC: &str = "dag-pb";

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("path not found: {0}")]
    PathNotFound(String),
}

/// Marker returned when a path continues into another node.
///
/// Serializes as an IPLD link object, `{"/": "<digest>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkBoundary {
    #[serde(rename = "/")]
    digest: Digest,
}

impl LinkBoundary {
    pub fn new(digest: Digest) -> Self {
        Self { digest }
    }

    /// Digest of the block to fetch next
    pub fn digest(&self) -> &Digest {
        &self.digest
    }
}

/// What a path resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// The node's links: name, digest and cumulative size of each
    Links(Vec<Link>),
    /// A single link target
    Digest(Digest),
    /// The node's data bytes
    Data(Bytes),
    /// Resolution has to continue in another block
    Boundary(LinkBoundary),
}

impl Value {
    pub fn as_links(&self) -> Option<&[Link]> {
        match self {
            Value::Links(links) => Some(links),
            _ => None,
        }
    }

    pub fn as_digest(&self) -> Option<&Digest> {
        match self {
            Value::Digest(digest) => Some(digest),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Bytes> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_boundary(&self) -> Option<&LinkBoundary> {
        match self {
            Value::Boundary(boundary) => Some(boundary),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Links(links) => links.serialize(serializer),
            Value::Digest(digest) => digest.serialize(serializer),
            Value::Data(data) => {
                let mut seq = serializer.serialize_seq(Some(data.len()))?;
                for byte in data.iter() {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Value::Boundary(boundary) => boundary.serialize(serializer),
        }
    }
}

/// Outcome of [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub value: Value,
    /// Path still to be resolved against the boundary's target,
    ///  empty when the value is final
    pub remainder_path: String,
}

impl Resolution {
    fn complete(value: Value) -> Self {
        Self {
            value,
            remainder_path: String::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remainder_path.is_empty()
    }
}

/// One immediately reachable path of a node, as listed by [`tree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub value: Value,
}

/// Resolve `path` against the node encoded in `raw`
pub fn resolve(raw: &[u8], path: &str) -> Result<Resolution, ResolverError> {
    let node = codec::decode(raw)?;
    let not_found = || ResolverError::PathNotFound(path.to_string());

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["links"] => Ok(Resolution::complete(Value::Links(node.links))),
        ["links", index, rest @ ..] => {
            let link = parse_index(index)
                .and_then(|i| node.links.get(i))
                .ok_or_else(not_found)?;

            if rest.is_empty() {
                return Ok(Resolution::complete(Value::Digest(link.digest().clone())));
            }

            let remainder_path = rest.join("/");
            tracing::debug!(
                "path {} stops at link {} ({}), remainder {}",
                path,
                index,
                link.digest(),
                remainder_path
            );
            Ok(Resolution {
                value: Value::Boundary(LinkBoundary::new(link.digest().clone())),
                remainder_path,
            })
        }
        ["data"] => Ok(Resolution::complete(Value::Data(node.data))),
        _ => {
            tracing::trace!("no match for path {}", path);
            Err(not_found())
        }
    }
}

/// List the paths directly reachable from the node encoded in `raw`:
///  one entry per link, named after the link, then `data` if the node
///  carries any. Does not recurse.
pub fn tree(raw: &[u8]) -> Result<Vec<TreeEntry>, ResolverError> {
    let node = codec::decode(raw)?;

    let mut entries: Vec<TreeEntry> = node
        .links
        .iter()
        .map(|link| TreeEntry {
            path: link.name().to_string(),
            value: Value::Digest(link.digest().clone()),
        })
        .collect();

    if !node.data.is_empty() {
        entries.push(TreeEntry {
            path: "data".to_string(),
            value: Value::Data(node.data),
        });
    }

    Ok(entries)
}

// only plain decimal digits, no sign
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
