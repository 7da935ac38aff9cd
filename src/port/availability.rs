//! Availability lookup port.

use async_trait::async_trait;

use crate::domain::AvailabilitySnapshot;
use crate::error::LookupError;

/// Source of per-plan availability snapshots.
#[async_trait]
pub trait AvailabilityLookup: Send + Sync {
    /// Fetch the current snapshot for one plan code.
    ///
    /// An empty snapshot is treated by callers the same as an error: the
    /// subscription's tick is skipped without touching recorded state.
    async fn fetch_availability(
        &self,
        plan_code: &str,
    ) -> Result<AvailabilitySnapshot, LookupError>;
}
