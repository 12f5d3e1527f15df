//! Property-Based Tests for Cache Module
//!
//! Uses proptest over a simulated clock and the in-memory gateway.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{ManualClock, TimeoutCache};
use crate::config::{Config, UpdatePolicy};
use crate::storage::MemoryGateway;
use crate::tasks::IntervalScheduler;

// == Test Configuration ==
const T0: i64 = 1_700_000_000_000;

fn build(policy: UpdatePolicy) -> (Arc<TimeoutCache<String>>, ManualClock, IntervalScheduler) {
    let clock = ManualClock::new(T0);
    let scheduler = IntervalScheduler::new();
    let config = Config {
        update_policy: policy,
        ..Config::default()
    };
    let cache = TimeoutCache::with_clock(
        Arc::new(MemoryGateway::new()),
        &scheduler,
        &config,
        Arc::new(clock.clone()),
    )
    .unwrap();
    (cache, clock, scheduler)
}

// == Strategies ==
/// Generates lake-style identifiers
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2}[0-9]{0,3}"
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,-]{0,64}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Round-trip: a put is visible until its timeout has fully elapsed
    #[test]
    fn prop_put_visible_until_timeout(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        timeout_secs in 1u32..3_600,
    ) {
        tokio_test::block_on(async {
            let (cache, clock, _scheduler) = build(UpdatePolicy::Gated);

            cache.put_with_timeout(&key, value.clone(), timeout_secs).await.unwrap();
            prop_assert_eq!(cache.get(&key).await.unwrap(), Some(value.clone()));

            clock.advance(Duration::from_secs(u64::from(timeout_secs)));
            prop_assert_eq!(cache.get(&key).await.unwrap(), Some(value));

            clock.advance(Duration::from_millis(1));
            prop_assert_eq!(cache.get(&key).await.unwrap(), None);

            cache.flush_evictions().await;
            prop_assert_eq!(cache.size().await.unwrap(), 0);
            Ok(())
        })?;
    }

    // Gating: the first value wins until the gate is opened; upsert: last wins
    #[test]
    fn prop_second_put_follows_policy(
        key in valid_key_strategy(),
        first in valid_value_strategy(),
        second in valid_value_strategy(),
        upsert in any::<bool>(),
    ) {
        tokio_test::block_on(async {
            let policy = if upsert { UpdatePolicy::Upsert } else { UpdatePolicy::Gated };
            let (cache, _clock, _scheduler) = build(policy);

            cache.put(&key, first.clone()).await.unwrap();
            cache.put(&key, second.clone()).await.unwrap();

            let expected = if upsert { second } else { first };
            prop_assert_eq!(cache.get(&key).await.unwrap(), Some(expected));
            prop_assert_eq!(cache.size().await.unwrap(), 1);
            Ok(())
        })?;
    }

    // Sweep: exactly the entries whose expiry has passed are removed
    #[test]
    fn prop_sweep_leaves_only_live_entries(
        entries in prop::collection::btree_map(valid_key_strategy(), 1u32..120, 1..30),
        elapsed_secs in 0u64..150,
    ) {
        tokio_test::block_on(async {
            let (cache, clock, _scheduler) = build(UpdatePolicy::Gated);

            for (key, timeout) in &entries {
                cache.put_with_timeout(key, key.clone(), *timeout).await.unwrap();
            }

            clock.advance(Duration::from_secs(elapsed_secs));
            let removed = cache.remove_expired_entries().await.unwrap();

            let live: BTreeMap<_, _> = entries
                .iter()
                .filter(|(_, timeout)| u64::from(**timeout) > elapsed_secs)
                .collect();
            prop_assert_eq!(removed, entries.len() - live.len());
            prop_assert_eq!(cache.size().await.unwrap(), live.len() as u64);

            for key in live.keys() {
                prop_assert!(cache.get(key).await.unwrap().is_some());
            }
            Ok(())
        })?;
    }

    // Remove: removing any key never fails and only drops that key's rows
    #[test]
    fn prop_remove_is_idempotent(
        keys in prop::collection::vec(valid_key_strategy(), 1..20),
        target in valid_key_strategy(),
    ) {
        tokio_test::block_on(async {
            let (cache, _clock, _scheduler) = build(UpdatePolicy::Gated);

            let unique: HashSet<String> = keys.into_iter().collect();
            for key in &unique {
                cache.put(key, "v".to_string()).await.unwrap();
            }

            cache.remove(&target).await.unwrap();
            cache.remove(&target).await.unwrap();

            let expected = unique.iter().filter(|k| **k != target).count() as u64;
            prop_assert_eq!(cache.size().await.unwrap(), expected);
            prop_assert_eq!(cache.get(&target).await.unwrap(), None);
            Ok(())
        })?;
    }
}
