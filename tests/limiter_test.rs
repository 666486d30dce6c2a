//! Tests for [`RateLimiter`] — sliding-window admission control.

use std::sync::Arc;

use medhanit::store::keys;
use medhanit::{Admission, MemoryStore, RateLimiter, StateStore};

const T0: u64 = 1_700_000_000_000;

fn limiter() -> (Arc<MemoryStore>, RateLimiter) {
    let store = Arc::new(MemoryStore::new());
    let limiter = RateLimiter::new(store.clone());
    (store, limiter)
}

fn persisted_window(store: &MemoryStore) -> Vec<u64> {
    store
        .read(keys::REQUEST_TIMESTAMPS)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
        .unwrap_or_default()
}

#[test]
fn five_admits_then_sixth_denied() {
    let (_, limiter) = limiter();
    for i in 0..5 {
        assert!(limiter.try_admit_at(T0 + i * 1_000).is_granted());
    }

    match limiter.try_admit_at(T0 + 10_000) {
        Admission::Denied {
            retry_after_seconds,
        } => {
            // Oldest slot at T0 frees after the full window: 50s left.
            assert_eq!(retry_after_seconds, 50);
        }
        Admission::Granted => panic!("sixth request within the window must be denied"),
    }
}

#[test]
fn denied_attempt_is_not_recorded() {
    let (store, limiter) = limiter();
    for i in 0..5 {
        assert!(limiter.try_admit_at(T0 + i).is_granted());
    }
    assert!(!limiter.try_admit_at(T0 + 10).is_granted());
    assert!(!limiter.try_admit_at(T0 + 20).is_granted());

    assert_eq!(persisted_window(&store).len(), 5);
}

#[test]
fn admit_succeeds_after_the_window_elapses() {
    let (_, limiter) = limiter();
    for i in 0..5 {
        assert!(limiter.try_admit_at(T0 + i * 1_000).is_granted());
    }
    assert!(!limiter.try_admit_at(T0 + 59_999).is_granted());
    assert!(limiter.try_admit_at(T0 + 60_000).is_granted());
}

#[test]
fn retry_after_floors_at_one_second() {
    let (_, limiter) = limiter();
    for _ in 0..5 {
        assert!(limiter.try_admit_at(T0).is_granted());
    }

    match limiter.try_admit_at(T0 + 59_999) {
        Admission::Denied {
            retry_after_seconds,
        } => assert_eq!(retry_after_seconds, 1),
        Admission::Granted => panic!("window is full"),
    }
}

#[test]
fn window_prunes_aged_entries_on_persist() {
    let (store, limiter) = limiter();
    for i in 0..5 {
        assert!(limiter.try_admit_at(T0 + i).is_granted());
    }
    // All five aged out; the next admit rewrites the window with one entry.
    assert!(limiter.try_admit_at(T0 + 120_000).is_granted());
    assert_eq!(persisted_window(&store), vec![T0 + 120_000]);
}

#[test]
fn preview_reports_without_recording() {
    let (store, limiter) = limiter();
    assert!(limiter.preview_at(T0).is_granted());
    assert!(persisted_window(&store).is_empty());

    for _ in 0..5 {
        assert!(limiter.try_admit_at(T0).is_granted());
    }
    assert!(!limiter.preview_at(T0 + 1).is_granted());
    assert_eq!(persisted_window(&store).len(), 5);
}

#[test]
fn custom_limits_apply() {
    let store = Arc::new(MemoryStore::new());
    let limiter = RateLimiter::with_limits(store, 2, 10_000);

    assert!(limiter.try_admit_at(T0).is_granted());
    assert!(limiter.try_admit_at(T0 + 1_000).is_granted());
    match limiter.try_admit_at(T0 + 2_000) {
        Admission::Denied {
            retry_after_seconds,
        } => assert_eq!(retry_after_seconds, 8),
        Admission::Granted => panic!("third request exceeds the custom threshold"),
    }
    assert!(limiter.try_admit_at(T0 + 10_000).is_granted());
}

#[test]
fn corrupt_persisted_window_degrades_to_empty() {
    let (store, limiter) = limiter();
    store.write(keys::REQUEST_TIMESTAMPS, "][").unwrap();
    assert!(limiter.try_admit_at(T0).is_granted());
    assert_eq!(persisted_window(&store), vec![T0]);
}
