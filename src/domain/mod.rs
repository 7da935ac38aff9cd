//! Domain types: subscriptions, availability snapshots, and alerts.

mod alert;
mod availability;
mod subscription;

pub use alert::{GroupedStockAlert, LocationStatus, StockAlert};
pub use availability::{
    flatten_snapshot, is_unavailable, status_key, AvailabilityRecord, AvailabilitySnapshot,
    CatalogServer, ConfigAvailability, ConfigDescriptor, STATUS_UNAVAILABLE,
};
pub use subscription::{
    HistoryEntry, Subscription, SubscriptionSpec, TransitionKind, HISTORY_LIMIT,
};
