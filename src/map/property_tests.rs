//! Property-Based Tests for the Map Module

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;

use crate::config::Settings;
use crate::map::ExpiringMap;

// == Test Configuration ==
const TEST_MAX_LENGTH: usize = 100;

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}"
}

#[derive(Debug, Clone)]
enum MapOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Remove { key: String },
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        (key_strategy(), any::<u32>()).prop_map(|(key, value)| MapOp::Set { key, value }),
        key_strategy().prop_map(|key| MapOp::Get { key }),
        key_strategy().prop_map(|key| MapOp::Remove { key }),
    ]
}

fn unique_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|key| seen.insert(key.clone())).collect()
}

fn map_with_length(max_length: usize) -> ExpiringMap<u32> {
    ExpiringMap::new(Settings::new().with_max_length(max_length)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Immediately after set(k, v), get(k) returns v.
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in any::<u32>()) {
        let map = map_with_length(TEST_MAX_LENGTH);

        map.set(key.clone(), value);

        prop_assert_eq!(map.get(&key), Some(value));
    }

    // After remove(k), get(k) finds nothing regardless of prior state.
    #[test]
    fn prop_remove_then_get(
        ops in prop::collection::vec(map_op_strategy(), 0..30),
        key in key_strategy()
    ) {
        let map = map_with_length(TEST_MAX_LENGTH);
        for op in ops {
            match op {
                MapOp::Set { key, value } => map.set(key, value),
                MapOp::Get { key } => { map.get(&key); }
                MapOp::Remove { key } => map.remove(&key),
            }
        }

        map.remove(&key);

        prop_assert_eq!(map.get(&key), None);
    }

    // The map never holds more than max_length entries after a set.
    #[test]
    fn prop_capacity_bound(
        ops in prop::collection::vec(map_op_strategy(), 1..200),
        max_length in 1usize..20
    ) {
        let map = map_with_length(max_length);

        for op in ops {
            match op {
                MapOp::Set { key, value } => map.set(key, value),
                MapOp::Get { key } => { map.get(&key); }
                MapOp::Remove { key } => map.remove(&key),
            }
            prop_assert!(
                map.len() <= max_length,
                "Map length {} exceeds max {}",
                map.len(),
                max_length
            );
        }
    }

    // Filling to capacity with distinct keys and adding one more evicts the
    // first key set, and only that key.
    #[test]
    fn prop_evicts_earliest_timestamp(
        keys in prop::collection::vec(key_strategy(), 2..10),
        new_key in key_strategy()
    ) {
        let keys = unique_keys(keys);
        prop_assume!(keys.len() >= 2);
        prop_assume!(!keys.contains(&new_key));

        let map = map_with_length(keys.len());
        for (i, key) in keys.iter().enumerate() {
            map.set(key.clone(), i as u32);
            // Keep timestamps strictly ordered.
            sleep(Duration::from_micros(50));
        }

        map.set(new_key.clone(), u32::MAX);

        prop_assert_eq!(map.len(), keys.len());
        prop_assert_eq!(map.get(&keys[0]), None, "Oldest key should be evicted");
        prop_assert_eq!(map.get(&new_key), Some(u32::MAX));
        for (i, key) in keys.iter().enumerate().skip(1) {
            prop_assert_eq!(map.get(key), Some(i as u32), "Key {} should survive", key);
        }
    }

    // Hits and misses reflect every lookup.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(map_op_strategy(), 1..50)) {
        let map = map_with_length(TEST_MAX_LENGTH);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                MapOp::Set { key, value } => map.set(key, value),
                MapOp::Get { key } => match map.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                MapOp::Remove { key } => map.remove(&key),
            }
        }

        let stats = map.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, map.len(), "Total entries mismatch");
    }
}

// Separate block with fewer cases for time-sensitive expiry tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_expired_entries_never_returned(
        keys in prop::collection::vec(key_strategy(), 1..20)
    ) {
        let map = ExpiringMap::new(Settings::new().with_age(Duration::from_millis(30))).unwrap();
        for key in &keys {
            map.set(key.clone(), 1u32);
        }

        sleep(Duration::from_millis(60));

        for key in &keys {
            prop_assert_eq!(map.get(key), None);
        }
        prop_assert!(map.is_empty());
    }
}
