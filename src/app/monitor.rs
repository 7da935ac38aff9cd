//! Poll-loop lifecycle and catalog sweeps.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::domain::{CatalogServer, Subscription};
use crate::error::MonitorError;

use super::diff::DiffEngine;
use super::dispatch::NotificationDispatcher;
use super::store::SubscriptionStore;

/// Smallest accepted poll interval.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 60;
/// Interval used until configured otherwise.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
/// Pause between consecutive subscriptions within one pass.
const SUBSCRIPTION_PAUSE: Duration = Duration::from_secs(1);
/// How long [`StockMonitor::stop`] waits for the loop to drain.
const STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// Point-in-time monitor state for status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub subscriptions_count: usize,
    pub known_servers_count: usize,
    pub check_interval: u64,
    pub subscriptions: Vec<Subscription>,
}

/// Owns the background poll loop and the known-catalog set.
///
/// All methods take `&self`; the monitor is shared behind an [`Arc`]
/// between the loop, signal handling and any status surface.
pub struct StockMonitor {
    store: Arc<SubscriptionStore>,
    engine: Arc<DiffEngine>,
    dispatcher: Arc<NotificationDispatcher>,
    known_servers: Mutex<HashSet<String>>,
    check_interval_secs: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl StockMonitor {
    #[must_use]
    pub fn new(
        store: Arc<SubscriptionStore>,
        engine: Arc<DiffEngine>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            engine,
            dispatcher,
            known_servers: Mutex::new(HashSet::new()),
            check_interval_secs: Arc::new(AtomicU64::new(DEFAULT_CHECK_INTERVAL_SECS)),
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: Mutex::new(None),
            loop_handle: Mutex::new(None),
        }
    }

    /// Spawn the poll loop.
    pub fn start(&self) -> Result<(), MonitorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        *self.stop_tx.lock() = Some(stop_tx);
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.engine),
            Arc::clone(&self.check_interval_secs),
            Arc::clone(&self.running),
            stop_rx,
        ));
        *self.loop_handle.lock() = Some(handle);
        info!("stock monitor started");
        Ok(())
    }

    /// Signal the loop and wait up to [`STOP_TIMEOUT`] for it to finish.
    pub async fn stop(&self) -> Result<(), MonitorError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(MonitorError::NotRunning);
        }
        if let Some(stop_tx) = self.stop_tx.lock().take() {
            let _ = stop_tx.send(true);
        }
        let handle = self.loop_handle.lock().take();
        if let Some(handle) = handle {
            match timeout(STOP_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(error = %error, "poll loop task failed while stopping");
                }
                Err(_) => {
                    warn!(
                        waited_secs = STOP_TIMEOUT.as_secs(),
                        "poll loop still draining, detaching"
                    );
                }
            }
        }
        info!("stock monitor stopped");
        Ok(())
    }

    /// Change the poll interval; takes effect from the next pass.
    pub fn set_check_interval(&self, secs: u64) -> Result<(), MonitorError> {
        if secs < MIN_CHECK_INTERVAL_SECS {
            return Err(MonitorError::IntervalTooShort {
                requested: secs,
                minimum: MIN_CHECK_INTERVAL_SECS,
            });
        }
        self.check_interval_secs.store(secs, Ordering::SeqCst);
        info!(check_interval_secs = secs, "check interval updated");
        Ok(())
    }

    /// Sweep a catalog listing for plans not seen before.
    ///
    /// The first sweep seeds the known set without alerting; later
    /// sweeps alert once per fresh plan. The set only ever grows, so a
    /// plan dropping out of the catalog and returning stays silent.
    pub async fn check_new_servers(&self, catalog: &[CatalogServer]) -> usize {
        let fresh: Vec<CatalogServer> = {
            let mut known = self.known_servers.lock();
            if known.is_empty() {
                known.extend(catalog.iter().map(|s| s.plan_code.clone()));
                info!(count = known.len(), "seeded known server catalog");
                return 0;
            }
            let fresh: Vec<CatalogServer> = catalog
                .iter()
                .filter(|s| !known.contains(&s.plan_code))
                .cloned()
                .collect();
            known.extend(fresh.iter().map(|s| s.plan_code.clone()));
            fresh
        };
        for server in &fresh {
            self.dispatcher.send_new_server(server).await;
        }
        if !fresh.is_empty() {
            info!(count = fresh.len(), "new server listings detected");
        }
        fresh.len()
    }

    #[must_use]
    pub fn status(&self) -> MonitorStatus {
        let subscriptions = self.store.list();
        MonitorStatus {
            running: self.running.load(Ordering::SeqCst),
            subscriptions_count: subscriptions.len(),
            known_servers_count: self.known_servers.lock().len(),
            check_interval: self.check_interval_secs.load(Ordering::SeqCst),
            subscriptions,
        }
    }
}

/// The background pass-and-sleep loop.
///
/// Each subscription check runs in its own task so a panic is contained
/// to that check. Both sleeps race the stop signal, so shutdown never
/// waits out an interval.
async fn run_loop(
    store: Arc<SubscriptionStore>,
    engine: Arc<DiffEngine>,
    check_interval_secs: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    mut stop_rx: watch::Receiver<bool>,
) {
    info!("poll loop started");
    'outer: while running.load(Ordering::SeqCst) {
        let subscriptions = store.list();
        if subscriptions.is_empty() {
            debug!("no subscriptions to check");
        } else {
            info!(count = subscriptions.len(), "checking subscriptions");
            for subscription in subscriptions {
                if !running.load(Ordering::SeqCst) {
                    break 'outer;
                }
                let plan_code = subscription.plan_code.clone();
                let check = {
                    let engine = Arc::clone(&engine);
                    tokio::spawn(async move { engine.check_subscription(&subscription).await })
                };
                match check.await {
                    Ok(outcome) => {
                        debug!(
                            plan_code = %plan_code,
                            alerts = outcome.alerts_sent,
                            "subscription checked"
                        );
                    }
                    Err(error) => {
                        error!(plan_code = %plan_code, error = %error, "subscription check panicked");
                    }
                }
                tokio::select! {
                    _ = stop_rx.changed() => break 'outer,
                    () = sleep(SUBSCRIPTION_PAUSE) => {}
                }
            }
        }
        let interval = Duration::from_secs(check_interval_secs.load(Ordering::SeqCst));
        debug!(seconds = interval.as_secs(), "pass complete, sleeping");
        tokio::select! {
            _ = stop_rx.changed() => break 'outer,
            () = sleep(interval) => {}
        }
    }
    info!("poll loop stopped");
}
