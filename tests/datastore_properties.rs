//! Property-based tests for store invariants.
//!
//! - Valid keys and values read back exactly as written
//! - Concurrent creates of distinct keys are never lost
//! - Reopening the snapshot reproduces the live entries

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use flatkv::{DataStore, SnapshotConfig, SyncPolicy};
use proptest::prelude::*;

fn open_temp(policy: SyncPolicy) -> (tempfile::TempDir, DataStore) {
    let dir = tempfile::tempdir().unwrap();
    let config = SnapshotConfig::new(dir.path().join("datastore.json")).with_sync_policy(policy);
    let store = DataStore::open(&config).unwrap();
    (dir, store)
}

/// Keys within the 32 code unit limit, multi-byte characters included.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:_é]{1,32}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,64}",
        (0usize..=16384).prop_map(|len| "v".repeat(len)),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Create(String, String, Option<i64>),
    Delete(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = "[a-e]{1,2}";
    prop_oneof![
        3 => (key, "[a-z]{0,8}", prop::option::of(60i64..3600))
            .prop_map(|(k, v, ttl)| Op::Create(k, v, ttl)),
        1 => key.prop_map(Op::Delete),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn create_then_read_returns_value(key in key_strategy(), value in value_strategy()) {
        let (_dir, store) = open_temp(SyncPolicy::No);

        store.create(&key, &value, None).unwrap();
        prop_assert_eq!(store.read(&key), Some(value));
    }

    #[test]
    fn reopen_reproduces_live_entries(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (dir, store) = open_temp(SyncPolicy::No);
        let mut expected: BTreeMap<String, String> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Create(key, value, ttl) => {
                    if store.create(&key, &value, ttl).is_ok() {
                        expected.insert(key, value);
                    }
                }
                Op::Delete(key) => {
                    store.delete(&key).unwrap();
                    expected.remove(&key);
                }
            }
        }
        drop(store);

        let reopened = DataStore::open_path(dir.path().join("datastore.json")).unwrap();
        prop_assert_eq!(reopened.live_len(), expected.len());
        for (key, value) in &expected {
            let read_back = reopened.read(key);
            prop_assert_eq!(read_back.as_deref(), Some(value.as_str()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn concurrent_distinct_creates_are_not_lost(n in 10usize..=1000) {
        let (_dir, store) = open_temp(SyncPolicy::No);
        let store = Arc::new(store);

        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.create(&format!("key{}", i), "value", Some(600)))
            })
            .collect();

        for handle in handles {
            prop_assert!(handle.join().unwrap().is_ok());
        }

        prop_assert_eq!(store.live_len(), n);
        prop_assert_eq!(store.len(), n);
    }
}

#[test]
fn concurrent_reads_during_writes() {
    let (_dir, store) = open_temp(SyncPolicy::No);
    let store = Arc::new(store);
    store.create("stable", "value", None).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..200 {
                store.create(&format!("w{}", i), "x", None).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    assert_eq!(store.read("stable").as_deref(), Some("value"));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.len(), 201);
}
