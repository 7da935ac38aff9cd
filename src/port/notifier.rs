//! Alert delivery port.
//!
//! The dispatcher talks to the outside world through [`AlertSink`]. The
//! capability split is decided at construction time: plain sinks get the
//! default `send_with_actions`, which drops the actions and falls back to
//! a text send; rich sinks override it to attach interactive actions.

use async_trait::async_trait;
use tracing::{debug, info};

/// One interactive action attached to a message (a button).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertAction {
    /// Short human label.
    pub label: String,
    /// Encoded callback payload, at most 64 bytes.
    pub payload: String,
}

/// Trait for alert delivery transports.
///
/// Sends return `true` on delivery and `false` on failure. Failures are
/// the implementation's to log; callers never retry.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver a plain-text message.
    async fn send_text(&self, message: &str) -> bool;

    /// Deliver a message with interactive action rows attached.
    ///
    /// The default drops the actions and degrades to a text send, for
    /// transports without a structured-action concept.
    async fn send_with_actions(&self, message: &str, actions: &[Vec<AlertAction>]) -> bool {
        if !actions.is_empty() {
            debug!("transport has no action support, sending text only");
        }
        self.send_text(message).await
    }
}

/// A no-op sink for testing or when delivery is disabled.
pub struct NullSink;

#[async_trait]
impl AlertSink for NullSink {
    async fn send_text(&self, _message: &str) -> bool {
        true
    }
}

/// A sink that logs messages via tracing instead of delivering them.
pub struct TracingSink;

#[async_trait]
impl AlertSink for TracingSink {
    async fn send_text(&self, message: &str) -> bool {
        info!(message = %message, "alert");
        true
    }
}
