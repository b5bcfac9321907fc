//! Merkle DAG nodes
//!
//! - **[`Link`]**: named, sized edge to another node, addressed by digest
//! - **[`Node`]**: immutable data + links, with the canonical bytes and digest
//!   it is identified by
//! - **[`codec`]**: the canonical dag-pb protobuf encoding
//! - **[`Builder`]**: the only way to produce a [`Node`]
//!
//! # Canonical form
//!
//! Links are always kept sorted by name, compared byte-wise, with the
//!  empty name first. The sort is stable, so links that share a name keep
//!  the order they were given in. Two nodes built from the same data and
//!  the same multiset of links therefore encode to identical bytes and
//!  hash to the same digest, no matter what order the links arrived in.

mod builder;
pub mod codec;
mod link;
mod node;

pub use builder::{Builder, BuilderError, LinkInput, LinkSelector};
pub use codec::{DecodeError, Decoded};
pub use link::Link;
pub use node::Node;
