//! In-memory subscription collection.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{HistoryEntry, Subscription, SubscriptionSpec, HISTORY_LIMIT};

/// Result of [`SubscriptionStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Merged,
}

/// Collection of subscriptions, keyed by plan code.
///
/// Backed by a Vec so iteration order equals insertion order, which is
/// the order the poll loop processes subscriptions in. All reads hand out
/// clones; the poll loop works on a [`list`](Self::list) snapshot and
/// applies results through [`commit`](Self::commit).
#[derive(Debug, Default)]
pub struct SubscriptionStore {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl SubscriptionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new subscription or merge settings into an existing one.
    ///
    /// A merge replaces the datacenter filter, the notify flags, and the
    /// server name (including clearing it), and leaves `last_status`,
    /// `history`, and `created_at` untouched. Seed `last_status` and
    /// `history` apply to inserts only.
    pub fn add(&self, spec: SubscriptionSpec) -> AddOutcome {
        let mut subscriptions = self.subscriptions.write();
        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.plan_code == spec.plan_code)
        {
            existing.datacenters = spec.datacenters.into_iter().collect();
            existing.notify_available = spec.notify_available;
            existing.notify_unavailable = spec.notify_unavailable;
            existing.server_name = spec.server_name;
            info!(plan_code = %existing.plan_code, "subscription already exists, updating settings");
            return AddOutcome::Merged;
        }

        let mut history: VecDeque<HistoryEntry> =
            spec.history.unwrap_or_default().into_iter().collect();
        while history.len() > HISTORY_LIMIT {
            history.pop_front();
        }
        let subscription = Subscription {
            plan_code: spec.plan_code,
            datacenters: spec.datacenters.into_iter().collect(),
            notify_available: spec.notify_available,
            notify_unavailable: spec.notify_unavailable,
            server_name: spec.server_name,
            last_status: spec.last_status.unwrap_or_default(),
            history,
            created_at: Utc::now(),
        };
        info!(plan_code = %subscription.plan_code, "subscription added");
        subscriptions.push(subscription);
        AddOutcome::Inserted
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn remove(&self, plan_code: &str) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.plan_code != plan_code);
        let removed = subscriptions.len() < before;
        if removed {
            info!(plan_code = %plan_code, "subscription removed");
        }
        removed
    }

    /// Remove all subscriptions. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut subscriptions = self.subscriptions.write();
        let count = subscriptions.len();
        subscriptions.clear();
        if count > 0 {
            info!(count, "subscriptions cleared");
        }
        count
    }

    /// Clone of one subscription.
    #[must_use]
    pub fn get(&self, plan_code: &str) -> Option<Subscription> {
        self.subscriptions
            .read()
            .iter()
            .find(|s| s.plan_code == plan_code)
            .cloned()
    }

    /// Clone of the whole collection, in processing order.
    #[must_use]
    pub fn list(&self) -> Vec<Subscription> {
        self.subscriptions.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }

    /// Apply one check's results: replace `last_status` wholesale and
    /// append history entries, evicting oldest past [`HISTORY_LIMIT`].
    ///
    /// Returns false when the subscription was removed between the list
    /// snapshot and this call, in which case nothing is recorded.
    pub fn commit(
        &self,
        plan_code: &str,
        last_status: HashMap<String, String>,
        entries: Vec<HistoryEntry>,
    ) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let Some(subscription) = subscriptions.iter_mut().find(|s| s.plan_code == plan_code)
        else {
            debug!(plan_code = %plan_code, "commit skipped, subscription no longer exists");
            return false;
        };
        subscription.last_status = last_status;
        subscription.history.extend(entries);
        while subscription.history.len() > HISTORY_LIMIT {
            subscription.history.pop_front();
        }
        true
    }
}
