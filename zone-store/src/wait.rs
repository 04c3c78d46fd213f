//! Deadline-bounded predicate waits
//!
//! The wait primitive suspends on the store's revision channel and
//! re-evaluates its predicate on every mutation, instead of polling on a
//! fixed interval. Resolution semantics are the same as a poll loop -
//! resolve when the predicate holds, fail when the deadline passes - with
//! none of the added latency or idle churn.

use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::trace;

use crate::store::SnapshotStore;

/// A wait predicate did not resolve before its deadline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("condition not met within {0:?}")]
pub struct WaitTimeout(pub Duration);

impl<K, V> SnapshotStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Waits until the predicate holds over the store, or the deadline
    /// passes
    ///
    /// The predicate is evaluated immediately, then again after every
    /// store mutation. All waits are bounded; an unresponsive device
    /// surfaces as `WaitTimeout` rather than a hang.
    ///
    /// Dropping the returned future cancels the wait: the subscription is
    /// released and no state is retained.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use std::time::Duration;
    /// # use zone_store::SnapshotStore;
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let store: SnapshotStore<&str, u32> = SnapshotStore::new();
    /// let waiter = store.clone();
    ///
    /// let wait = tokio::spawn(async move {
    ///     waiter
    ///         .wait_until(Duration::from_secs(1), |s| s.contains(&"a"))
    ///         .await
    /// });
    ///
    /// store.put("a", 1);
    /// assert!(wait.await.unwrap().is_ok());
    /// # }
    /// ```
    pub async fn wait_until<F>(&self, timeout: Duration, mut predicate: F) -> Result<(), WaitTimeout>
    where
        F: FnMut(&Self) -> bool,
    {
        // Subscribe before the first evaluation so a mutation landing
        // between the check and the suspension is not lost.
        let mut rx = self.subscribe();
        let deadline = Instant::now() + timeout;

        loop {
            if predicate(self) {
                return Ok(());
            }

            match timeout_at(deadline, rx.changed()).await {
                Ok(Ok(())) => continue,
                // Sender gone: no further mutations can ever occur
                Ok(Err(_)) => {
                    trace!("store revision channel closed during wait");
                    return Err(WaitTimeout(timeout));
                }
                Err(_) => return Err(WaitTimeout(timeout)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_resolves_immediately_when_predicate_holds() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        store.put("a", 1);

        let result = store
            .wait_until(Duration::from_millis(10), |s| s.contains(&"a"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_wakes_on_mutation() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        let writer = store.clone();

        let wait = tokio::spawn(async move {
            store
                .wait_until(Duration::from_secs(2), |s| s.len() == 2)
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.put("a", 1);
        writer.put("b", 2);

        assert!(wait.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();

        let result = store
            .wait_until(Duration::from_millis(20), |s| !s.is_empty())
            .await;
        assert_eq!(result, Err(WaitTimeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_unrelated_mutation_does_not_resolve() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();
        let writer = store.clone();

        let wait = tokio::spawn(async move {
            store
                .wait_until(Duration::from_millis(50), |s| s.contains(&"b"))
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.put("a", 1);

        // Woken by the put, predicate still false, then deadline
        assert!(wait.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_cancelled_wait_releases_cleanly() {
        let store: SnapshotStore<&str, i32> = SnapshotStore::new();

        {
            let waiter = store.clone();
            let wait = tokio::spawn(async move {
                waiter
                    .wait_until(Duration::from_secs(30), |s| !s.is_empty())
                    .await
            });
            tokio::time::sleep(Duration::from_millis(10)).await;
            wait.abort();
            let _ = wait.await;
        }

        // The store is still fully usable after an abandoned wait
        store.put("a", 1);
        assert_eq!(store.get(&"a"), Some(1));
    }
}
