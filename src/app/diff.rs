//! Per-subscription availability diffing.
//!
//! One check fetches a fresh snapshot, classifies transitions against the
//! subscription's recorded statuses, resolves prices for restocks, sends
//! alerts, and commits the new state. The boundary is infallible: every
//! failure degrades to a log line so one subscription can never stall the
//! poll loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::domain::{
    flatten_snapshot, is_unavailable, status_key, AvailabilityRecord, ConfigDescriptor,
    GroupedStockAlert, HistoryEntry, LocationStatus, StockAlert, Subscription, TransitionKind,
};
use crate::port::{AvailabilityLookup, PriceLookup};

use super::cache::PriceCache;
use super::dispatch::NotificationDispatcher;
use super::store::SubscriptionStore;

/// How long a restock alert waits for its price before going out without.
pub const PRICE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// What one check did, for loop logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub alerts_sent: usize,
    pub transitions: usize,
}

/// Classify an availability-boundary transition.
///
/// Only crossings of the unavailable boundary count; a change between two
/// orderable statuses stays silent.
fn classify_transition(old_status: Option<&str>, status: &str) -> Option<TransitionKind> {
    match old_status {
        None if is_unavailable(status) => Some(TransitionKind::Unavailable),
        None => Some(TransitionKind::Available),
        Some(old) if is_unavailable(old) && !is_unavailable(status) => {
            Some(TransitionKind::Available)
        }
        Some(old) if !is_unavailable(old) && is_unavailable(status) => {
            Some(TransitionKind::Unavailable)
        }
        Some(_) => None,
    }
}

fn wants(subscription: &Subscription, kind: TransitionKind) -> bool {
    match kind {
        TransitionKind::Available => subscription.notify_available,
        TransitionKind::Unavailable => subscription.notify_unavailable,
    }
}

struct Transition {
    datacenter: String,
    status: String,
    old_status: Option<String>,
    kind: TransitionKind,
}

fn history_entry(transition: &Transition, config: Option<ConfigDescriptor>) -> HistoryEntry {
    HistoryEntry {
        timestamp: Utc::now(),
        datacenter: transition.datacenter.clone(),
        status: transition.status.clone(),
        change_type: transition.kind,
        old_status: transition.old_status.clone(),
        config,
    }
}

/// Detects transitions and drives alerting for single subscriptions.
pub struct DiffEngine {
    store: Arc<SubscriptionStore>,
    availability: Arc<dyn AvailabilityLookup>,
    prices: Arc<dyn PriceLookup>,
    cache: Arc<PriceCache>,
    dispatcher: Arc<NotificationDispatcher>,
    price_timeout: Duration,
}

impl DiffEngine {
    #[must_use]
    pub fn new(
        store: Arc<SubscriptionStore>,
        availability: Arc<dyn AvailabilityLookup>,
        prices: Arc<dyn PriceLookup>,
        cache: Arc<PriceCache>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            availability,
            prices,
            cache,
            dispatcher,
            price_timeout: PRICE_LOOKUP_TIMEOUT,
        }
    }

    /// Override the price wait, for tests and tuning.
    #[must_use]
    pub fn with_price_timeout(mut self, price_timeout: Duration) -> Self {
        self.price_timeout = price_timeout;
        self
    }

    /// Run one availability check for a subscription snapshot.
    ///
    /// The caller passes a detached clone; results are committed back to
    /// the live store only if the subscription still exists there.
    pub async fn check_subscription(&self, subscription: &Subscription) -> CheckOutcome {
        let plan_code = &subscription.plan_code;
        let snapshot = match self.availability.fetch_availability(plan_code).await {
            Ok(snapshot) if !snapshot.is_empty() => snapshot,
            Ok(_) => {
                warn!(plan_code = %plan_code, "availability lookup returned no data, skipping");
                return CheckOutcome::default();
            }
            Err(error) => {
                warn!(plan_code = %plan_code, error = %error, "availability lookup failed, skipping");
                return CheckOutcome::default();
            }
        };
        debug!(plan_code = %plan_code, entries = snapshot.len(), "availability snapshot fetched");

        let mut outcome = CheckOutcome::default();
        let mut history: Vec<HistoryEntry> = Vec::new();

        for (config_key, record) in &snapshot {
            match record {
                AvailabilityRecord::Status(status) => {
                    // bare form: the config key is the location itself
                    let datacenter = config_key;
                    if !subscription.monitors(datacenter) {
                        continue;
                    }
                    let old_status = subscription.last_status.get(datacenter).cloned();
                    let Some(kind) = classify_transition(old_status.as_deref(), status) else {
                        continue;
                    };
                    if !wants(subscription, kind) {
                        continue;
                    }
                    let transition = Transition {
                        datacenter: datacenter.clone(),
                        status: status.clone(),
                        old_status,
                        kind,
                    };
                    self.alert_single(subscription, &transition, None).await;
                    history.push(history_entry(&transition, None));
                    outcome.alerts_sent += 1;
                    outcome.transitions += 1;
                }
                AvailabilityRecord::Config(config) => {
                    let descriptor = ConfigDescriptor::from_availability(config);
                    let mut restocked: Vec<Transition> = Vec::new();
                    let mut sold_out: Vec<Transition> = Vec::new();

                    for (datacenter, status) in &config.datacenters {
                        if !subscription.monitors(datacenter) {
                            continue;
                        }
                        let key = status_key(datacenter, config_key);
                        let old_status = subscription.last_status.get(&key).cloned();
                        let Some(kind) = classify_transition(old_status.as_deref(), status)
                        else {
                            continue;
                        };
                        if !wants(subscription, kind) {
                            continue;
                        }
                        let transition = Transition {
                            datacenter: datacenter.clone(),
                            status: status.clone(),
                            old_status,
                            kind,
                        };
                        match kind {
                            TransitionKind::Available => restocked.push(transition),
                            TransitionKind::Unavailable => sold_out.push(transition),
                        }
                    }

                    if !restocked.is_empty() {
                        // one grouped alert, one price probe for the
                        // lexicographically first location
                        let price = self
                            .resolve_price(
                                plan_code,
                                &restocked[0].datacenter,
                                &descriptor.options,
                            )
                            .await;
                        let alert = GroupedStockAlert {
                            plan_code: plan_code.clone(),
                            locations: restocked
                                .iter()
                                .map(|t| LocationStatus {
                                    datacenter: t.datacenter.clone(),
                                    status: t.status.clone(),
                                })
                                .collect(),
                            config: descriptor.clone(),
                            server_name: subscription.server_name.clone(),
                            price,
                        };
                        self.dispatcher.send_grouped(&alert).await;
                        outcome.alerts_sent += 1;
                        for transition in &restocked {
                            history.push(history_entry(transition, Some(descriptor.clone())));
                        }
                        outcome.transitions += restocked.len();
                    }

                    for transition in &sold_out {
                        self.alert_single(subscription, transition, Some(descriptor.clone()))
                            .await;
                        history.push(history_entry(transition, Some(descriptor.clone())));
                        outcome.alerts_sent += 1;
                        outcome.transitions += 1;
                    }
                }
            }
        }

        let last_status = flatten_snapshot(&snapshot);
        if !self.store.commit(plan_code, last_status, history) {
            debug!(plan_code = %plan_code, "subscription removed mid-check, discarding results");
        }
        if outcome.transitions > 0 {
            info!(
                plan_code = %plan_code,
                transitions = outcome.transitions,
                alerts = outcome.alerts_sent,
                "availability transitions detected"
            );
        }
        outcome
    }

    async fn alert_single(
        &self,
        subscription: &Subscription,
        transition: &Transition,
        config: Option<ConfigDescriptor>,
    ) {
        let price = match transition.kind {
            TransitionKind::Available => {
                let options = config
                    .as_ref()
                    .map(|c| c.options.clone())
                    .unwrap_or_default();
                self.resolve_price(&subscription.plan_code, &transition.datacenter, &options)
                    .await
            }
            TransitionKind::Unavailable => None,
        };
        let alert = StockAlert {
            plan_code: subscription.plan_code.clone(),
            datacenter: transition.datacenter.clone(),
            status: transition.status.clone(),
            kind: transition.kind,
            config,
            server_name: subscription.server_name.clone(),
            price,
        };
        self.dispatcher.send_single(&alert).await;
    }

    /// Resolve a price with a bounded wait.
    ///
    /// The lookup runs as a detached task that writes the cache on
    /// success, so a slow endpoint can still populate the cache after
    /// this call gave up on it.
    async fn resolve_price(
        &self,
        plan_code: &str,
        datacenter: &str,
        options: &[String],
    ) -> Option<String> {
        if let Some(price) = self.cache.get(plan_code, options) {
            debug!(plan_code = %plan_code, price = %price, "using cached price");
            return Some(price);
        }

        let prices = Arc::clone(&self.prices);
        let cache = Arc::clone(&self.cache);
        let plan = plan_code.to_string();
        let dc = datacenter.to_string();
        let opts = options.to_vec();
        let lookup = tokio::spawn(async move {
            match prices.fetch_price(&plan, &dc, &opts).await {
                Ok(quote) => {
                    let price = quote.display();
                    cache.set(&plan, &opts, &price);
                    Some(price)
                }
                Err(error) => {
                    warn!(plan_code = %plan, error = %error, "price lookup failed");
                    None
                }
            }
        });

        match timeout(self.price_timeout, lookup).await {
            Ok(Ok(price)) => price,
            Ok(Err(join_error)) => {
                warn!(plan_code = %plan_code, error = %join_error, "price lookup task failed");
                None
            }
            Err(_) => {
                warn!(
                    plan_code = %plan_code,
                    waited_secs = self.price_timeout.as_secs(),
                    "price lookup timed out, alerting without price"
                );
                None
            }
        }
    }
}
