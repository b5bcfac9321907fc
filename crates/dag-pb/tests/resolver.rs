//! Integration tests for single-block path resolution

mod common;

use std::collections::HashMap;

use bytes::Bytes;
use common::{digest, fixture_blocks, fixture_links, HASH_U, HASH_V};
use dag_pb::prelude::*;
use dag_pb::resolver::MULTICODEC;

#[test]
fn test_multicodec_is_dag_pb() {
    assert_eq!(MULTICODEC, "dag-pb");
}

#[tokio::test]
async fn test_empty_node() {
    let (empty, _, _) = fixture_blocks().await;

    let result = resolve(&empty, "links").unwrap();
    assert_eq!(result.value, Value::Links(vec![]));
    assert_eq!(result.remainder_path, "");

    let result = resolve(&empty, "data").unwrap();
    assert_eq!(result.value, Value::Data(Bytes::new()));
    assert_eq!(result.remainder_path, "");

    let result = resolve(&empty, "pathThatDoesNotExist");
    assert!(matches!(result, Err(ResolverError::PathNotFound(_))));

    assert!(tree(&empty).unwrap().is_empty());
}

#[tokio::test]
async fn test_links_node() {
    let (_, links, _) = fixture_blocks().await;

    let result = resolve(&links, "links").unwrap();
    assert_eq!(result.value.as_links().unwrap(), fixture_links().as_slice());
    assert_eq!(result.remainder_path, "");

    let result = resolve(&links, "links/1").unwrap();
    assert_eq!(result.value.as_digest().unwrap().to_string(), HASH_V);
    assert_eq!(result.remainder_path, "");

    let result = resolve(&links, "links/5");
    assert!(matches!(result, Err(ResolverError::PathNotFound(_))));

    let result = resolve(&links, "links/name");
    assert!(matches!(result, Err(ResolverError::PathNotFound(_))));
}

#[tokio::test]
async fn test_links_node_yields_remainder_path() {
    let (_, links, _) = fixture_blocks().await;

    let result = resolve(&links, "links/1/data").unwrap();
    let boundary = result.value.as_boundary().unwrap();
    assert_eq!(boundary.digest().to_string(), HASH_V);
    assert_eq!(result.remainder_path, "data");
    assert!(!result.is_complete());

    let result = resolve(&links, "links/1/links/0/data").unwrap();
    let boundary = result.value.as_boundary().unwrap();
    assert_eq!(boundary.digest().to_string(), HASH_V);
    assert_eq!(result.remainder_path, "links/0/data");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "value": { "/": HASH_V }, "remainderPath": "links/0/data" })
    );
}

#[tokio::test]
async fn test_links_node_tree() {
    let (_, links, _) = fixture_blocks().await;

    let paths = tree(&links).unwrap();
    assert_eq!(
        paths,
        vec![
            TreeEntry {
                path: "".to_string(),
                value: Value::Digest(digest(HASH_U)),
            },
            TreeEntry {
                path: "named link".to_string(),
                value: Value::Digest(digest(HASH_V)),
            },
        ]
    );
}

#[tokio::test]
async fn test_data_links_node() {
    let (_, _, data_links) = fixture_blocks().await;

    let result = resolve(&data_links, "links").unwrap();
    assert_eq!(result.value, Value::Links(fixture_links()));
    assert_eq!(result.remainder_path, "");

    let result = resolve(&data_links, "data").unwrap();
    assert_eq!(
        result.value,
        Value::Data(Bytes::from_static(b"aaah the data"))
    );
    assert_eq!(result.remainder_path, "");

    let result = resolve(&data_links, "pathThatDoesNotExist");
    assert!(matches!(result, Err(ResolverError::PathNotFound(_))));

    let paths = tree(&data_links).unwrap();
    let json = serde_json::to_value(&paths).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "path": "", "value": HASH_U },
            { "path": "named link", "value": HASH_V },
            { "path": "data", "value": b"aaah the data".to_vec() },
        ])
    );
}

/// The resolver never fetches; a caller walking a path across blocks
///  feeds each boundary's target back in with the remainder.
#[tokio::test]
async fn test_caller_driven_traversal() -> anyhow::Result<()> {
    let builder = Builder::default();
    let leaf = builder
        .create(Bytes::from_static(b"leaf data"), Vec::<Link>::new())
        .await?;
    let middle = builder.create(Bytes::new(), vec![("leaf", &leaf)]).await?;
    let root = builder.create(Bytes::new(), vec![("middle", &middle)]).await?;

    let blocks: HashMap<Digest, Bytes> = [&leaf, &middle, &root]
        .into_iter()
        .map(|n| (n.digest().clone(), n.serialized().clone()))
        .collect();

    let mut block = root.serialized().clone();
    let mut path = "links/0/links/0/data".to_string();
    let mut hops = 0;
    let value = loop {
        let resolution = resolve(&block, &path)?;
        match resolution.value {
            Value::Boundary(boundary) => {
                block = blocks
                    .get(boundary.digest())
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("missing block {}", boundary.digest()))?;
                path = resolution.remainder_path;
                hops += 1;
            }
            value => break value,
        }
    };

    assert_eq!(hops, 2);
    assert_eq!(value, Value::Data(Bytes::from_static(b"leaf data")));
    Ok(())
}
