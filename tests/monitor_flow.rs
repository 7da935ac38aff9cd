mod support;

use std::sync::Arc;
use std::time::Duration;

use rackwatch::app::{
    DiffEngine, NotificationDispatcher, PriceCache, StockMonitor, SubscriptionStore,
};
use rackwatch::domain::{AvailabilitySnapshot, CatalogServer, SubscriptionSpec};
use rackwatch::error::MonitorError;

use support::{config_snapshot, RecordingSink, ScriptedSource};

struct World {
    store: Arc<SubscriptionStore>,
    source: Arc<ScriptedSource>,
    sink: RecordingSink,
    monitor: StockMonitor,
}

fn world(snapshot: AvailabilitySnapshot) -> World {
    let store = Arc::new(SubscriptionStore::new());
    let source = Arc::new(ScriptedSource::new(snapshot));
    let sink = RecordingSink::new();
    let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(sink.clone())));
    let engine = Arc::new(DiffEngine::new(
        store.clone(),
        source.clone(),
        source.clone(),
        Arc::new(PriceCache::new()),
        dispatcher.clone(),
    ));
    let monitor = StockMonitor::new(store.clone(), engine, dispatcher);
    World {
        store,
        source,
        sink,
        monitor,
    }
}

fn catalog_server(plan_code: &str) -> CatalogServer {
    CatalogServer {
        plan_code: plan_code.to_string(),
        name: None,
        cpu: None,
        memory: None,
        storage: None,
        bandwidth: None,
    }
}

#[tokio::test(start_paused = true)]
async fn first_pass_delivers_one_grouped_restock_alert() {
    let w = world(config_snapshot(
        "ram64",
        &[("gra", "available"), ("rbx", "1H-low")],
    ));
    w.store.add(SubscriptionSpec {
        server_name: Some("KS-LE-1".to_string()),
        ..SubscriptionSpec::new("25skle01")
    });

    w.monitor.start().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    w.monitor.stop().await.unwrap();

    let rich = w.sink.rich();
    assert_eq!(rich.len(), 1);
    let (message, actions) = &rich[0];
    assert!(message.contains("25skle01"));
    assert!(message.contains("In stock at 2 locations"));
    assert!(message.contains("€24.99/month"));
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].len(), 2);
    assert!(w.sink.texts().is_empty());

    let sub = w.store.get("25skle01").unwrap();
    assert_eq!(sub.last_status["gra|ram64"], "available");
    assert_eq!(sub.last_status["rbx|ram64"], "1H-low");
    assert_eq!(sub.history.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn sold_out_transition_alerts_on_a_later_pass() {
    let w = world(config_snapshot("ram64", &[("gra", "available")]));
    w.store.add(SubscriptionSpec {
        notify_unavailable: true,
        ..SubscriptionSpec::new("25skle01")
    });

    w.monitor.start().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(w.sink.rich().len(), 1);

    w.source
        .swap(config_snapshot("ram64", &[("gra", "unavailable")]));
    tokio::time::sleep(Duration::from_secs(60)).await;
    w.monitor.stop().await.unwrap();

    let texts = w.sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("out of stock"));
    assert!(texts[0].contains("sold out"));

    let sub = w.store.get("25skle01").unwrap();
    assert_eq!(sub.last_status["gra|ram64"], "unavailable");
    assert_eq!(sub.history.len(), 2);
    assert_eq!(sub.history[1].old_status.as_deref(), Some("available"));
}

#[tokio::test(start_paused = true)]
async fn re_adding_a_subscription_does_not_replay_alerts() {
    let w = world(config_snapshot("ram64", &[("gra", "available")]));
    w.store.add(SubscriptionSpec::new("25skle01"));

    w.monitor.start().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(w.sink.rich().len(), 1);

    // same plan again: settings merge, observed state survives
    w.store.add(SubscriptionSpec {
        datacenters: vec!["gra".to_string()],
        ..SubscriptionSpec::new("25skle01")
    });
    tokio::time::sleep(Duration::from_secs(60)).await;
    w.monitor.stop().await.unwrap();

    assert_eq!(w.sink.rich().len(), 1);
    assert_eq!(w.store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn lifecycle_survives_restart_and_rejects_double_start() {
    let w = world(AvailabilitySnapshot::new());

    w.monitor.start().unwrap();
    assert!(matches!(
        w.monitor.start(),
        Err(MonitorError::AlreadyRunning)
    ));
    w.monitor.stop().await.unwrap();
    assert!(matches!(
        w.monitor.stop().await,
        Err(MonitorError::NotRunning)
    ));

    w.monitor.start().unwrap();
    assert!(w.monitor.status().running);
    w.monitor.stop().await.unwrap();
    assert!(!w.monitor.status().running);
}

#[tokio::test]
async fn catalog_sweep_alerts_fresh_listings_once() {
    let w = world(AvailabilitySnapshot::new());
    let known = vec![catalog_server("25skle01"), catalog_server("25skle02")];
    assert_eq!(w.monitor.check_new_servers(&known).await, 0);
    assert!(w.sink.texts().is_empty());

    let mut next = known.clone();
    next.push(catalog_server("25skleb03"));
    assert_eq!(w.monitor.check_new_servers(&next).await, 1);

    let texts = w.sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("New server listed"));
    assert!(texts[0].contains("25skleb03"));

    assert_eq!(w.monitor.check_new_servers(&next).await, 0);
    assert_eq!(w.sink.texts().len(), 1);
}

#[tokio::test]
async fn status_serializes_with_flat_keys() {
    let w = world(AvailabilitySnapshot::new());
    w.store.add(SubscriptionSpec::new("25skle01"));

    let value = serde_json::to_value(w.monitor.status()).unwrap();
    assert_eq!(value["running"], false);
    assert_eq!(value["subscriptions_count"], 1);
    assert_eq!(value["known_servers_count"], 0);
    assert_eq!(value["check_interval"], 60);
    assert_eq!(value["subscriptions"][0]["planCode"], "25skle01");
}
