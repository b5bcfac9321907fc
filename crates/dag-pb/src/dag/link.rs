use std::fmt;

use serde::{Deserialize, Serialize};

use crate::linked_data::Digest;

/// An edge from one node to another.
///
/// A link names its target, records the target's digest, and carries
///  the cumulative size of the whole subtree behind it, so a parent's
///  size can be computed without fetching any children.
/// Names are not unique within a node.
///
/// Links are plain values: fields are private and there are no setters,
///  a different link is a new link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    name: String,
    size: u64,
    #[serde(rename = "hash")]
    digest: Digest,
}

impl Link {
    pub fn new(name: impl Into<String>, size: u64, digest: Digest) -> Self {
        Self {
            name: name.into(),
            size,
            digest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cumulative size of the subtree this link points to
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAGLink <{} - name: \"{}\", size: {}>",
            self.digest, self.name, self.size
        )
    }
}

/// Canonical link order: ascending byte-wise by name.
///
/// `sort_by` is stable, so links sharing a name keep the order
///  they were supplied in.
pub(crate) fn sort_links(links: &mut [Link]) {
    links.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
}
