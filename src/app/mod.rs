//! Application layer - stores, diffing, dispatch, and the poll loop.

mod cache;
mod callback;
mod diff;
mod dispatch;
mod monitor;
mod store;

pub use cache::{PriceCache, PRICE_CACHE_TTL};
pub use callback::{CallbackPayload, CALLBACK_BYTE_LIMIT};
pub use diff::{CheckOutcome, DiffEngine, PRICE_LOOKUP_TIMEOUT};
pub use dispatch::NotificationDispatcher;
pub use monitor::{
    MonitorStatus, StockMonitor, DEFAULT_CHECK_INTERVAL_SECS, MIN_CHECK_INTERVAL_SECS,
};
pub use store::{AddOutcome, SubscriptionStore};
