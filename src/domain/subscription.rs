//! Subscription state for a single watched server plan.

use std::collections::{BTreeSet, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ConfigDescriptor;

/// Maximum number of history entries retained per subscription.
pub const HISTORY_LIMIT: usize = 100;

/// Direction of an availability-boundary transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Available,
    Unavailable,
}

impl TransitionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Available => "available",
            TransitionKind::Unavailable => "unavailable",
        }
    }
}

/// One recorded transition for a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub datacenter: String,
    pub status: String,
    pub change_type: TransitionKind,
    pub old_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigDescriptor>,
}

/// A watched server plan with its observation state.
///
/// `last_status` maps status keys to the most recently observed status.
/// The key is the location code for location-only snapshot entries and
/// `"{location}|{configKey}"` for configuration entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan_code: String,
    /// Locations to alert on. Empty means all locations.
    pub datacenters: BTreeSet<String>,
    pub notify_available: bool,
    pub notify_unavailable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub last_status: HashMap<String, String>,
    /// Newest entries last, capped at [`HISTORY_LIMIT`].
    pub history: VecDeque<HistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether alerts for this location pass the subscription's filter.
    #[must_use]
    pub fn monitors(&self, datacenter: &str) -> bool {
        self.datacenters.is_empty() || self.datacenters.contains(datacenter)
    }

    /// Plan code with the optional server name appended.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.server_name {
            Some(name) => format!("{} ({})", self.plan_code, name),
            None => self.plan_code.clone(),
        }
    }
}

/// Input for adding or updating a subscription.
///
/// `last_status` and `history` let a caller seed observation state when
/// restoring from its own storage. They apply to inserts only; updating
/// an existing subscription never touches recorded state.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionSpec {
    pub plan_code: String,
    #[serde(default)]
    pub datacenters: Vec<String>,
    #[serde(default = "default_notify_available")]
    pub notify_available: bool,
    #[serde(default)]
    pub notify_unavailable: bool,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub last_status: Option<HashMap<String, String>>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

fn default_notify_available() -> bool {
    true
}

impl SubscriptionSpec {
    /// Spec with default notification settings: available alerts on,
    /// unavailable alerts off, all locations.
    #[must_use]
    pub fn new(plan_code: impl Into<String>) -> Self {
        Self {
            plan_code: plan_code.into(),
            datacenters: Vec::new(),
            notify_available: true,
            notify_unavailable: false,
            server_name: None,
            last_status: None,
            history: None,
        }
    }
}
