//! Availability snapshot types as reported by the inventory endpoint.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Sentinel status meaning a plan cannot be ordered at a location.
/// Every other status value counts as orderable.
pub const STATUS_UNAVAILABLE: &str = "unavailable";

/// One snapshot entry, keyed by configuration key.
///
/// The upstream inventory reports two shapes: a bare status string where
/// the map key is itself the location code, and a configuration block
/// with per-location statuses plus hardware metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityRecord {
    Status(String),
    Config(ConfigAvailability),
}

/// Per-location statuses and hardware metadata for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigAvailability {
    /// Location code to status. Ordered keys keep per-tick processing
    /// deterministic.
    pub datacenters: BTreeMap<String, String>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Full availability snapshot for one plan code.
pub type AvailabilitySnapshot = BTreeMap<String, AvailabilityRecord>;

/// Status key for a location within a configuration entry.
#[must_use]
pub fn status_key(datacenter: &str, config_key: &str) -> String {
    format!("{datacenter}|{config_key}")
}

#[must_use]
pub fn is_unavailable(status: &str) -> bool {
    status == STATUS_UNAVAILABLE
}

/// Flatten a snapshot into the status-key image stored on a subscription.
///
/// Every location in the snapshot is recorded, including locations
/// outside a subscription's datacenter filter. The filter gates alerting
/// only, so widening it later does not replay already-seen states.
#[must_use]
pub fn flatten_snapshot(snapshot: &AvailabilitySnapshot) -> HashMap<String, String> {
    let mut flat = HashMap::new();
    for (config_key, record) in snapshot {
        match record {
            AvailabilityRecord::Status(status) => {
                flat.insert(config_key.clone(), status.clone());
            }
            AvailabilityRecord::Config(config) => {
                for (datacenter, status) in &config.datacenters {
                    flat.insert(status_key(datacenter, config_key), status.clone());
                }
            }
        }
    }
    flat
}

/// Hardware summary attached to alerts for configuration entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDescriptor {
    pub memory: String,
    pub storage: String,
    /// `"{memory} + {storage}"`, the one-line form used in messages.
    pub display: String,
    pub options: Vec<String>,
}

impl ConfigDescriptor {
    #[must_use]
    pub fn from_availability(config: &ConfigAvailability) -> Self {
        let memory = config.memory.clone().unwrap_or_else(|| "N/A".to_string());
        let storage = config.storage.clone().unwrap_or_else(|| "N/A".to_string());
        let display = format!("{memory} + {storage}");
        Self {
            memory,
            storage,
            display,
            options: config.options.clone(),
        }
    }
}

/// One catalog listing, used for new-plan detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogServer {
    pub plan_code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub bandwidth: Option<String>,
}
