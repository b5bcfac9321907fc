/**
 * Merkle DAG nodes: immutable links and nodes, the
 *  canonical dag-pb codec, and the builder that is the
 *  only way to obtain a hashed node.
 */
pub mod dag;
/**
 * Digests, hash algorithms and content identifiers.
 * Wraps the multiformats crates under names that say
 *  what they are used for.
 */
pub mod linked_data;
/**
 * Single-block path resolution. Stops at link
 *  boundaries and hands back the rest of the path
 *  rather than fetching anything itself.
 */
pub mod resolver;

pub mod prelude {
    pub use crate::dag::{Builder, BuilderError, DecodeError, Link, LinkInput, LinkSelector, Node};
    pub use crate::linked_data::{multibase, Cid, Digest, HashAlgorithm, IdentityError};
    pub use crate::resolver::{resolve, tree, LinkBoundary, Resolution, ResolverError, TreeEntry, Value};
}
