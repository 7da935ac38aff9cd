//! Alert payloads produced by the diff engine.

use super::{ConfigDescriptor, TransitionKind};

/// A single availability transition at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct StockAlert {
    pub plan_code: String,
    pub datacenter: String,
    pub status: String,
    pub kind: TransitionKind,
    pub config: Option<ConfigDescriptor>,
    pub server_name: Option<String>,
    /// Resolved price text, when the lookup finished in time.
    pub price: Option<String>,
}

/// Status of one location inside a grouped alert.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationStatus {
    pub datacenter: String,
    pub status: String,
}

/// Simultaneous availabilities of one configuration, sent as one message.
///
/// Locations are kept in lexicographic order; price resolution probes the
/// first of them.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedStockAlert {
    pub plan_code: String,
    pub locations: Vec<LocationStatus>,
    pub config: ConfigDescriptor,
    pub server_name: Option<String>,
    pub price: Option<String>,
}
