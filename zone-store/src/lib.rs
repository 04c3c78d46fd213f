//! Keyed snapshot store with change notification and bounded waits
//!
//! The store tracks the most recently observed snapshot per key and lets
//! asynchronous callers wait - with a deadline - for a condition over the
//! store's contents to become true. It exists for the "single writer,
//! many waiting readers" shape: one event source overwrites entries as
//! device reports arrive, while request handlers suspend until the store
//! reflects the state they asked for.
//!
//! # Features
//!
//! - **Whole-value snapshots**: entries are overwritten atomically, never
//!   partially updated
//! - **Point-in-time reads**: `snapshot()` copies are safe to hand out
//!   while mutation continues
//! - **Notify-on-mutation waits**: `wait_until()` wakes on every store
//!   mutation instead of polling an interval
//! - **Bounded everywhere**: every wait carries a deadline and fails with
//!   `WaitTimeout` instead of hanging
//! - **Generic keys and values**: independent stores coexist freely, in
//!   tests and in multi-device processes
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use zone_store::SnapshotStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store: SnapshotStore<String, String> = SnapshotStore::new();
//! let writer = store.clone();
//!
//! tokio::spawn(async move {
//!     writer.put("11".to_string(), "status".to_string());
//! });
//!
//! store
//!     .wait_until(Duration::from_secs(1), |s| s.contains(&"11".to_string()))
//!     .await
//!     .expect("snapshot arrived");
//! # }
//! ```

pub mod store;
pub mod wait;

pub use store::SnapshotStore;
pub use wait::WaitTimeout;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_clear_then_refill_workflow() {
        // The refresh-cycle shape: bulk clear, then wait for repopulation
        let store: SnapshotStore<String, u32> = SnapshotStore::new();
        store.put("11".to_string(), 1);
        store.put("12".to_string(), 2);

        store.clear();
        let writer = store.clone();

        let wait = tokio::spawn(async move {
            store
                .wait_until(Duration::from_secs(1), |s| s.len() == 2)
                .await
        });

        writer.put("11".to_string(), 3);
        writer.put("12".to_string(), 4);

        assert!(wait.await.unwrap().is_ok());
        assert_eq!(writer.get(&"11".to_string()), Some(3));
    }

    #[tokio::test]
    async fn test_partial_state_left_after_timeout() {
        let store: SnapshotStore<String, u32> = SnapshotStore::new();
        store.put("11".to_string(), 1);

        let result = store
            .wait_until(Duration::from_millis(20), |s| s.len() == 6)
            .await;

        // Timed-out waits leave the store as-is, never claiming success
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }
}
