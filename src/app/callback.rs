//! Callback payload encoding for interactive alert actions.
//!
//! Chat transports cap callback data at 64 bytes. Payloads encode as
//! compact JSON when they fit; larger ones fall back to a `b64:` prefix
//! plus base64 of the JSON, truncated to stay inside the budget. A
//! truncated fallback is still a valid, deterministic button payload but
//! may no longer decode.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Hard upper bound on the encoded payload, in bytes.
pub const CALLBACK_BYTE_LIMIT: usize = 64;

/// Budget for inline JSON; the rest is reserved for the `b64:` prefix.
const INLINE_JSON_LIMIT: usize = 60;

const ACTION_ADD_TO_QUEUE: &str = "add_to_queue";

/// Structured payload behind an alert action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub action: String,
    pub plan_code: String,
    pub datacenter: String,
    pub options: Vec<String>,
}

impl CallbackPayload {
    /// Payload asking the order side to queue this plan at a location.
    #[must_use]
    pub fn add_to_queue(
        plan_code: impl Into<String>,
        datacenter: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            action: ACTION_ADD_TO_QUEUE.to_string(),
            plan_code: plan_code.into(),
            datacenter: datacenter.into(),
            options,
        }
    }

    /// Encode within the 64-byte budget.
    #[must_use]
    pub fn encode(&self) -> String {
        // serde_json writes maps in field order, so this is deterministic
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(_) => String::new(),
        };
        if json.len() <= INLINE_JSON_LIMIT {
            return json;
        }
        let mut encoded = STANDARD.encode(json.as_bytes());
        encoded.truncate(INLINE_JSON_LIMIT);
        format!("b64:{encoded}")
    }

    /// Best-effort decode of an encoded payload.
    ///
    /// Returns `None` for foreign data and for fallback encodings whose
    /// truncation destroyed the JSON.
    #[must_use]
    pub fn decode(data: &str) -> Option<Self> {
        if let Some(encoded) = data.strip_prefix("b64:") {
            let bytes = STANDARD.decode(encoded).ok()?;
            return serde_json::from_slice(&bytes).ok();
        }
        serde_json::from_str(data).ok()
    }
}
