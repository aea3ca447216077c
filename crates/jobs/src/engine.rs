//! Queue and throttle primitives between the due scan and the processor.
//!
//! The due scan is the single producer; processor invocations are the
//! consumers. The throttle caps how many work items a single user can start
//! inside a rolling window so one user with many due templates cannot starve
//! the rest.

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;
use moneta_shared::types::{TransactionId, UserId};
use moneta_shared::RecurrenceConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Payload of one recurrence work item as delivered by the job engine.
///
/// Both fields are optional because delivery is a data contract, not a type
/// guarantee: the engine replays raw payloads. The processor validates them
/// before touching the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceWorkItem {
    /// The template to process.
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    /// The template's owning user; also the throttle key.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl RecurrenceWorkItem {
    /// A well-formed work item.
    #[must_use]
    pub const fn new(transaction_id: TransactionId, user_id: UserId) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            user_id: Some(user_id),
        }
    }
}

/// Creates the bounded work-item queue connecting the due scan to the
/// processor.
#[must_use]
pub fn work_queue(
    capacity: usize,
) -> (
    mpsc::Sender<RecurrenceWorkItem>,
    mpsc::Receiver<RecurrenceWorkItem>,
) {
    mpsc::channel(capacity)
}

/// Rolling-window rate limiter keyed by user id.
///
/// At most `limit` starts per key within any `period`-long window. Only
/// rate is bounded; ordering between a user's work items is not.
pub struct KeyedThrottle {
    limit: usize,
    period: Duration,
    starts: DashMap<UserId, VecDeque<Instant>>,
}

impl KeyedThrottle {
    /// Creates a throttle allowing `limit` starts per `period` per key.
    #[must_use]
    pub fn new(limit: usize, period: Duration) -> Self {
        Self {
            limit,
            period,
            starts: DashMap::new(),
        }
    }

    /// Creates a throttle from configuration.
    #[must_use]
    pub fn from_config(config: &RecurrenceConfig) -> Self {
        Self::new(
            config.throttle_limit,
            Duration::from_secs(config.throttle_period_secs),
        )
    }

    /// Records a start for `key` if the window has room.
    ///
    /// # Errors
    ///
    /// Returns the duration until the oldest recorded start leaves the
    /// window, i.e. how long the caller should wait before retrying.
    pub fn try_acquire(&self, key: UserId) -> Result<(), Duration> {
        let now = Instant::now();

        // Keys whose newest start has left the window hold no live state;
        // drop them so the map does not grow with every user ever seen.
        // Must run before the entry guard is taken below.
        self.starts.retain(|_, window| {
            window
                .back()
                .is_some_and(|newest| now.duration_since(*newest) < self.period)
        });

        let mut window = self.starts.entry(key).or_default();

        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) >= self.period {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < self.limit {
            window.push_back(now);
            Ok(())
        } else {
            let oldest = window.front().copied().unwrap_or(now);
            Err(self.period.saturating_sub(now.duration_since(oldest)))
        }
    }

    /// Number of keys currently holding live window state.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.starts.len()
    }

    /// Waits until the window has room for `key`, then records the start.
    pub async fn acquire(&self, key: UserId) {
        loop {
            match self.try_acquire(key) {
                Ok(()) => return,
                Err(wait) => tokio::time::sleep(wait.max(Duration::from_millis(1))).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_throttle_caps_starts_within_window() {
        let throttle = KeyedThrottle::new(3, Duration::from_secs(60));
        let user = UserId::new();

        for _ in 0..3 {
            assert!(throttle.try_acquire(user).is_ok());
        }
        assert!(throttle.try_acquire(user).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_is_per_key() {
        let throttle = KeyedThrottle::new(1, Duration::from_secs(60));
        let alice = UserId::new();
        let bob = UserId::new();

        assert!(throttle.try_acquire(alice).is_ok());
        assert!(throttle.try_acquire(alice).is_err());
        // Another user is unaffected by Alice's window.
        assert!(throttle.try_acquire(bob).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_rolls_forward() {
        let throttle = KeyedThrottle::new(2, Duration::from_secs(60));
        let user = UserId::new();

        assert!(throttle.try_acquire(user).is_ok());
        assert!(throttle.try_acquire(user).is_ok());

        let wait = throttle.try_acquire(user).unwrap_err();
        assert!(wait <= Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(throttle.try_acquire(user).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_keys_are_evicted_from_the_map() {
        let throttle = KeyedThrottle::new(2, Duration::from_secs(60));
        let alice = UserId::new();
        let bob = UserId::new();

        assert!(throttle.try_acquire(alice).is_ok());
        assert_eq!(throttle.tracked_keys(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(throttle.try_acquire(bob).is_ok());

        // Alice's whole window has expired; only Bob holds state now.
        assert_eq!(throttle.tracked_keys(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_a_slot() {
        let throttle = KeyedThrottle::new(1, Duration::from_secs(10));
        let user = UserId::new();

        throttle.acquire(user).await;
        // The second acquire must sleep until the window rolls; with paused
        // time this completes immediately once the clock is auto-advanced.
        throttle.acquire(user).await;
    }

    #[tokio::test]
    async fn test_queue_delivers_in_order() {
        let (sender, mut receiver) = work_queue(8);
        let item = RecurrenceWorkItem::new(TransactionId::new(), UserId::new());
        sender.send(item.clone()).await.unwrap();
        drop(sender);

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.transaction_id, item.transaction_id);
        assert!(receiver.recv().await.is_none());
    }

    #[test]
    fn test_work_item_tolerates_missing_fields() {
        let item: RecurrenceWorkItem = serde_json::from_str("{}").unwrap();
        assert!(item.transaction_id.is_none());
        assert!(item.user_id.is_none());
    }
}
