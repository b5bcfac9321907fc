//! Linked data primitives
//!
//! Thin layer over the multiformats crates, named after what they are
//!  used for here:
//!
//! - **[`Digest`]**: the opaque content hash carried by links and nodes
//! - **[`HashAlgorithm`]**: digest primitives selectable by multicodec name
//! - **[`hash`]** / **[`to_content_id`]**: the identity operations

mod digest;
mod identity;

pub use cid::multibase;
pub use cid::Cid;
pub use multihash::Multihash;

pub use digest::Digest;
pub use identity::{
    hash, hash_by_name, to_content_id, HashAlgorithm, IdentityError, DAG_PB_CODEC,
};
