#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal_macros::dec;

use rackwatch::domain::{AvailabilityRecord, AvailabilitySnapshot, ConfigAvailability};
use rackwatch::error::LookupError;
use rackwatch::port::{AlertAction, AlertSink, AvailabilityLookup, PriceLookup, PriceQuote};

/// Thread-safe alert collector for delivery assertions.
#[derive(Clone, Default)]
pub struct RecordingSink {
    texts: Arc<Mutex<Vec<String>>>,
    rich: Arc<Mutex<Vec<(String, Vec<Vec<AlertAction>>)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().expect("lock recorded texts").clone()
    }

    pub fn rich(&self) -> Vec<(String, Vec<Vec<AlertAction>>)> {
        self.rich.lock().expect("lock recorded rich sends").clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send_text(&self, message: &str) -> bool {
        self.texts
            .lock()
            .expect("lock recorded texts")
            .push(message.to_string());
        true
    }

    async fn send_with_actions(&self, message: &str, actions: &[Vec<AlertAction>]) -> bool {
        self.rich
            .lock()
            .expect("lock recorded rich sends")
            .push((message.to_string(), actions.to_vec()));
        true
    }
}

/// Scriptable stand-in for the internal monitor API.
///
/// Serves the current snapshot for every plan and a fixed EUR quote for
/// every price request.
pub struct ScriptedSource {
    snapshot: Mutex<AvailabilitySnapshot>,
}

impl ScriptedSource {
    pub fn new(snapshot: AvailabilitySnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    pub fn swap(&self, snapshot: AvailabilitySnapshot) {
        *self.snapshot.lock().expect("lock scripted snapshot") = snapshot;
    }
}

#[async_trait]
impl AvailabilityLookup for ScriptedSource {
    async fn fetch_availability(
        &self,
        _plan_code: &str,
    ) -> Result<AvailabilitySnapshot, LookupError> {
        Ok(self
            .snapshot
            .lock()
            .expect("lock scripted snapshot")
            .clone())
    }
}

#[async_trait]
impl PriceLookup for ScriptedSource {
    async fn fetch_price(
        &self,
        _plan_code: &str,
        _datacenter: &str,
        _options: &[String],
    ) -> Result<PriceQuote, LookupError> {
        Ok(PriceQuote {
            price: dec!(24.99),
            currency: "EUR".to_string(),
        })
    }
}

/// Build a snapshot with one configuration entry.
pub fn config_snapshot(config_key: &str, statuses: &[(&str, &str)]) -> AvailabilitySnapshot {
    let mut snapshot = AvailabilitySnapshot::new();
    snapshot.insert(
        config_key.to_string(),
        AvailabilityRecord::Config(ConfigAvailability {
            datacenters: statuses
                .iter()
                .map(|(dc, status)| (dc.to_string(), status.to_string()))
                .collect(),
            memory: Some("64GB".to_string()),
            storage: Some("2x960GB NVMe".to_string()),
            options: vec!["ram-64g".to_string(), "ssd-2x960".to_string()],
        }),
    );
    snapshot
}
