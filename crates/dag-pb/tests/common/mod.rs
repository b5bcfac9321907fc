//! Shared fixtures for the resolver and builder integration tests
#![allow(dead_code)]

use std::str::FromStr;

use bytes::Bytes;
use dag_pb::prelude::*;
use tracing_subscriber::EnvFilter;

pub const HASH_U: &str = "QmXg9Pp2ytZ14xgmQjYEiHjVjMFXzCVVEcRTWJBmLgR39U";
pub const HASH_V: &str = "QmXg9Pp2ytZ14xgmQjYEiHjVjMFXzCVVEcRTWJBmLgR39V";

/// Install a test subscriber; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn digest(b58: &str) -> Digest {
    Digest::from_str(b58).unwrap()
}

/// The two links every fixture node shares: an anonymous one and a named one
pub fn fixture_links() -> Vec<Link> {
    vec![
        Link::new("", 10, digest(HASH_U)),
        Link::new("named link", 8, digest(HASH_V)),
    ]
}

/// Encoded blocks for an empty node, a links-only node and a data+links node
pub async fn fixture_blocks() -> (Bytes, Bytes, Bytes) {
    init_tracing();
    let builder = Builder::default();

    let empty = builder.create(Bytes::new(), Vec::<Link>::new()).await.unwrap();
    let links = builder.create(Bytes::new(), fixture_links()).await.unwrap();
    let data_links = builder
        .create(Bytes::from_static(b"aaah the data"), fixture_links())
        .await
        .unwrap();

    (
        empty.serialized().clone(),
        links.serialized().clone(),
        data_links.serialized().clone(),
    )
}
