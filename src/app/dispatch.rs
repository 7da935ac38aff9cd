//! Alert presentation and delivery entry points.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{CatalogServer, GroupedStockAlert, StockAlert, TransitionKind};
use crate::port::{AlertAction, AlertSink};

use super::callback::CallbackPayload;

/// Buttons per keyboard row on grouped alerts.
const ACTIONS_PER_ROW: usize = 2;

/// Formats alerts and pushes them through the configured sink.
///
/// Delivery results come back as plain success flags. Failures are
/// logged here and never retried; the transition is consumed either way.
pub struct NotificationDispatcher {
    sink: Arc<dyn AlertSink>,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Send one single-location transition alert.
    pub async fn send_single(&self, alert: &StockAlert) -> bool {
        let message = match alert.kind {
            TransitionKind::Available => available_message(alert),
            TransitionKind::Unavailable => unavailable_message(alert),
        };
        info!(
            plan_code = %alert.plan_code,
            datacenter = %alert.datacenter,
            change = alert.kind.as_str(),
            "sending availability notification"
        );
        let sent = self.sink.send_text(&message).await;
        if sent {
            info!(plan_code = %alert.plan_code, datacenter = %alert.datacenter, "notification sent");
        } else {
            warn!(plan_code = %alert.plan_code, datacenter = %alert.datacenter, "notification send failed");
        }
        sent
    }

    /// Send one grouped restock alert with an action per location.
    pub async fn send_grouped(&self, alert: &GroupedStockAlert) -> bool {
        let message = grouped_message(alert);
        let actions = grouped_actions(alert);
        info!(
            plan_code = %alert.plan_code,
            config = %alert.config.display,
            locations = alert.locations.len(),
            "sending grouped restock notification"
        );
        let sent = self.sink.send_with_actions(&message, &actions).await;
        if sent {
            info!(plan_code = %alert.plan_code, "grouped notification sent");
        } else {
            warn!(plan_code = %alert.plan_code, "grouped notification send failed");
        }
        sent
    }

    /// Send a new-listing alert for a catalog entry.
    pub async fn send_new_server(&self, server: &CatalogServer) -> bool {
        let message = new_server_message(server);
        info!(plan_code = %server.plan_code, "sending new listing notification");
        let sent = self.sink.send_text(&message).await;
        if !sent {
            warn!(plan_code = %server.plan_code, "new listing notification send failed");
        }
        sent
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn available_message(alert: &StockAlert) -> String {
    let mut message = String::from("🎉 Server restock alert!\n\n");
    if let Some(name) = &alert.server_name {
        message.push_str(&format!("Server: {name}\n"));
    }
    message.push_str(&format!("Plan: {}\n", alert.plan_code));
    message.push_str(&format!("Datacenter: {}\n", alert.datacenter));
    if let Some(config) = &alert.config {
        message.push_str(&format!(
            "Config: {}\n├─ Memory: {}\n└─ Storage: {}\n",
            config.display, config.memory, config.storage
        ));
    }
    if let Some(price) = &alert.price {
        message.push_str(&format!("\n💰 Price: {price}\n"));
    }
    message.push_str(&format!(
        "Status: {}\nTime: {}\n\n💡 Go grab it!",
        alert.status,
        timestamp()
    ));
    message
}

fn unavailable_message(alert: &StockAlert) -> String {
    let mut message = String::from("📦 Server out of stock\n\n");
    if let Some(name) = &alert.server_name {
        message.push_str(&format!("Server: {name}\n"));
    }
    message.push_str(&format!("Plan: {}\n", alert.plan_code));
    message.push_str(&format!("Datacenter: {}\n", alert.datacenter));
    if let Some(config) = &alert.config {
        message.push_str(&format!("Config: {}\n", config.display));
    }
    message.push_str(&format!("Status: sold out\nTime: {}", timestamp()));
    message
}

fn grouped_message(alert: &GroupedStockAlert) -> String {
    let mut message = String::from("🎉 Server restock alert!\n\n");
    if let Some(name) = &alert.server_name {
        message.push_str(&format!("Server: {name}\n"));
    }
    message.push_str(&format!("Plan: {}\n", alert.plan_code));
    message.push_str(&format!(
        "Config: {}\n├─ Memory: {}\n└─ Storage: {}\n",
        alert.config.display, alert.config.memory, alert.config.storage
    ));
    if let Some(price) = &alert.price {
        message.push_str(&format!("\n💰 Price: {price}\n"));
    }
    message.push_str(&format!(
        "\n✅ In stock at {} locations:\n",
        alert.locations.len()
    ));
    for location in &alert.locations {
        message.push_str(&format!(
            "  • {} ({})\n",
            datacenter_display(&location.datacenter),
            location.datacenter.to_uppercase()
        ));
    }
    message.push_str(&format!("\nTime: {}", timestamp()));
    message
}

fn new_server_message(server: &CatalogServer) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
    format!(
        "🆕 New server listed!\n\n\
         Plan: {}\n\
         Name: {}\n\
         CPU: {}\n\
         Memory: {}\n\
         Storage: {}\n\
         Bandwidth: {}\n\
         Time: {}\n\n\
         💡 Go take a look!",
        server.plan_code,
        field(&server.name),
        field(&server.cpu),
        field(&server.memory),
        field(&server.storage),
        field(&server.bandwidth),
        timestamp()
    )
}

fn grouped_actions(alert: &GroupedStockAlert) -> Vec<Vec<AlertAction>> {
    let buttons: Vec<AlertAction> = alert
        .locations
        .iter()
        .map(|location| AlertAction {
            label: datacenter_label(&location.datacenter),
            payload: CallbackPayload::add_to_queue(
                alert.plan_code.clone(),
                location.datacenter.clone(),
                alert.config.options.clone(),
            )
            .encode(),
        })
        .collect();
    buttons
        .chunks(ACTIONS_PER_ROW)
        .map(<[AlertAction]>::to_vec)
        .collect()
}

/// Long display name for message bodies.
fn datacenter_display(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "gra" => "🇫🇷 Gravelines, France".to_string(),
        "rbx" => "🇫🇷 Roubaix, France".to_string(),
        "sbg" => "🇫🇷 Strasbourg, France".to_string(),
        "bhs" => "🇨🇦 Beauharnois, Canada".to_string(),
        "syd" => "🇦🇺 Sydney, Australia".to_string(),
        "sgp" => "🇸🇬 Singapore".to_string(),
        "ynm" => "🇮🇳 Mumbai, India".to_string(),
        "waw" => "🇵🇱 Warsaw, Poland".to_string(),
        "fra" => "🇩🇪 Frankfurt, Germany".to_string(),
        "lon" => "🇬🇧 London, UK".to_string(),
        "par" => "🇫🇷 Paris, France".to_string(),
        "eri" => "🇮🇹 Erice, Italy".to_string(),
        "lim" => "🇵🇱 Limanowa, Poland".to_string(),
        _ => code.to_uppercase(),
    }
}

/// Short label for action buttons.
fn datacenter_label(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "gra" => "🇫🇷 Gra".to_string(),
        "rbx" => "🇫🇷 Rbx".to_string(),
        "sbg" => "🇫🇷 Sbg".to_string(),
        "bhs" => "🇨🇦 Bhs".to_string(),
        "syd" => "🇦🇺 Syd".to_string(),
        "sgp" => "🇸🇬 Sgp".to_string(),
        "ynm" => "🇮🇳 Mum".to_string(),
        "waw" => "🇵🇱 Waw".to_string(),
        "fra" => "🇩🇪 Fra".to_string(),
        "lon" => "🇬🇧 Lon".to_string(),
        "par" => "🇫🇷 Par".to_string(),
        "eri" => "🇮🇹 Eri".to_string(),
        "lim" => "🇵🇱 Lim".to_string(),
        _ => code.to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::domain::{ConfigDescriptor, LocationStatus};

    #[derive(Default)]
    struct RecordingSink {
        texts: Mutex<Vec<String>>,
        rich: Mutex<Vec<(String, Vec<Vec<AlertAction>>)>>,
        fail: bool,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn send_text(&self, message: &str) -> bool {
            self.texts.lock().push(message.to_string());
            !self.fail
        }

        async fn send_with_actions(&self, message: &str, actions: &[Vec<AlertAction>]) -> bool {
            self.rich.lock().push((message.to_string(), actions.to_vec()));
            !self.fail
        }
    }

    fn descriptor() -> ConfigDescriptor {
        ConfigDescriptor {
            memory: "32GB".to_string(),
            storage: "2x480GB SSD".to_string(),
            display: "32GB + 2x480GB SSD".to_string(),
            options: vec!["ram-32g".to_string()],
        }
    }

    fn available_alert(price: Option<&str>) -> StockAlert {
        StockAlert {
            plan_code: "25skle01".to_string(),
            datacenter: "gra".to_string(),
            status: "available".to_string(),
            kind: TransitionKind::Available,
            config: Some(descriptor()),
            server_name: Some("KS-2".to_string()),
            price: price.map(String::from),
        }
    }

    fn grouped_alert() -> GroupedStockAlert {
        GroupedStockAlert {
            plan_code: "25skle01".to_string(),
            locations: vec![
                LocationStatus {
                    datacenter: "gra".to_string(),
                    status: "available".to_string(),
                },
                LocationStatus {
                    datacenter: "rbx".to_string(),
                    status: "1H-high".to_string(),
                },
                LocationStatus {
                    datacenter: "sbg".to_string(),
                    status: "available".to_string(),
                },
            ],
            config: descriptor(),
            server_name: None,
            price: Some("€24.99/month".to_string()),
        }
    }

    #[tokio::test]
    async fn single_available_message_contents() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone());

        assert!(dispatcher.send_single(&available_alert(Some("€24.99/month"))).await);

        let texts = sink.texts.lock();
        let message = &texts[0];
        assert!(message.starts_with("🎉 Server restock alert!"));
        assert!(message.contains("Server: KS-2"));
        assert!(message.contains("Plan: 25skle01"));
        assert!(message.contains("Datacenter: gra"));
        assert!(message.contains("Config: 32GB + 2x480GB SSD"));
        assert!(message.contains("💰 Price: €24.99/month"));
        assert!(message.contains("Status: available"));
        assert!(message.ends_with("💡 Go grab it!"));
    }

    #[tokio::test]
    async fn single_available_without_price_omits_price_line() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone());

        dispatcher.send_single(&available_alert(None)).await;

        let texts = sink.texts.lock();
        assert!(!texts[0].contains("💰"));
    }

    #[tokio::test]
    async fn single_unavailable_message_contents() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone());

        let alert = StockAlert {
            kind: TransitionKind::Unavailable,
            status: "unavailable".to_string(),
            price: None,
            server_name: None,
            ..available_alert(None)
        };
        dispatcher.send_single(&alert).await;

        let texts = sink.texts.lock();
        let message = &texts[0];
        assert!(message.starts_with("📦 Server out of stock"));
        assert!(message.contains("Config: 32GB + 2x480GB SSD"));
        assert!(!message.contains("├─"));
        assert!(message.contains("Status: sold out"));
        assert!(!message.contains("💡"));
    }

    #[tokio::test]
    async fn grouped_message_lists_locations_and_actions() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone());

        assert!(dispatcher.send_grouped(&grouped_alert()).await);

        let rich = sink.rich.lock();
        let (message, actions) = &rich[0];
        assert!(message.contains("✅ In stock at 3 locations:"));
        assert!(message.contains("🇫🇷 Gravelines, France (GRA)"));
        assert!(message.contains("🇫🇷 Roubaix, France (RBX)"));
        assert!(message.contains("💰 Price: €24.99/month"));

        // three buttons, two per row
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].len(), 2);
        assert_eq!(actions[1].len(), 1);
        assert_eq!(actions[0][0].label, "🇫🇷 Gra");
        assert!(actions[0][0].payload.len() <= 64);
    }

    #[tokio::test]
    async fn new_server_message_defaults_missing_fields() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(sink.clone());

        let server = CatalogServer {
            plan_code: "25skle01".to_string(),
            name: Some("KS-2".to_string()),
            cpu: None,
            memory: None,
            storage: None,
            bandwidth: None,
        };
        assert!(dispatcher.send_new_server(&server).await);

        let texts = sink.texts.lock();
        let message = &texts[0];
        assert!(message.starts_with("🆕 New server listed!"));
        assert!(message.contains("Name: KS-2"));
        assert!(message.contains("CPU: N/A"));
    }

    #[tokio::test]
    async fn send_failure_is_reported_to_caller() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..RecordingSink::default()
        });
        let dispatcher = NotificationDispatcher::new(sink.clone());

        assert!(!dispatcher.send_single(&available_alert(None)).await);
        assert!(!dispatcher.send_grouped(&grouped_alert()).await);
    }

    #[test]
    fn unknown_datacenter_falls_back_to_uppercase() {
        assert_eq!(datacenter_display("abc"), "ABC");
        assert_eq!(datacenter_label("abc"), "ABC");
        assert_eq!(datacenter_label("YNM"), "🇮🇳 Mum");
    }
}
