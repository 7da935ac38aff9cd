//! Telegram alert delivery.
//!
//! Requires the `telegram` feature to be enabled.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::error;

use crate::port::{AlertAction, AlertSink};

/// Telegram delivery credentials.
///
/// Credentials come from the environment only, never from the config
/// file.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for alerts.
    pub chat_id: i64,
}

impl TelegramConfig {
    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    ///
    /// Returns `None` if either is missing, empty, or not a numeric
    /// chat id; the caller then falls back to log-only delivery.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|id| id.parse().ok())?;

        Some(Self { bot_token, chat_id })
    }
}

/// Sends alerts to one Telegram chat.
///
/// Grouped restock alerts carry an inline keyboard; everything else is
/// plain text.
pub struct TelegramSender {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSender {
    #[must_use]
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
            chat_id: ChatId(config.chat_id),
        }
    }
}

#[async_trait]
impl AlertSink for TelegramSender {
    async fn send_text(&self, message: &str) -> bool {
        match self.bot.send_message(self.chat_id, message).await {
            Ok(_) => true,
            Err(error) => {
                error!(error = %error, "failed to send telegram message");
                false
            }
        }
    }

    async fn send_with_actions(&self, message: &str, actions: &[Vec<AlertAction>]) -> bool {
        let keyboard = keyboard_from_actions(actions);
        match self
            .bot
            .send_message(self.chat_id, message)
            .reply_markup(keyboard)
            .await
        {
            Ok(_) => true,
            Err(error) => {
                error!(error = %error, "failed to send telegram message with keyboard");
                false
            }
        }
    }
}

fn keyboard_from_actions(actions: &[Vec<AlertAction>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(actions.iter().map(|row| {
        row.iter()
            .map(|action| {
                InlineKeyboardButton::callback(action.label.clone(), action.payload.clone())
            })
            .collect::<Vec<_>>()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use teloxide::types::InlineKeyboardButtonKind;

    // env vars are process-global, serialize the tests that touch them
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn action(label: &str, payload: &str) -> AlertAction {
        AlertAction {
            label: label.to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn keyboard_preserves_row_shape() {
        let rows = vec![
            vec![action("🇫🇷 Gra", "p1"), action("🇫🇷 Rbx", "p2")],
            vec![action("🇨🇦 Bhs", "p3")],
        ];
        let keyboard = keyboard_from_actions(&rows);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0].len(), 2);
        assert_eq!(keyboard.inline_keyboard[1].len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "🇫🇷 Gra");
        assert!(matches!(
            &keyboard.inline_keyboard[0][1].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "p2"
        ));
    }

    #[test]
    fn from_env_requires_both_variables() {
        let _guard = ENV_LOCK.lock();
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
        assert!(TelegramConfig::from_env().is_none());

        std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        assert!(TelegramConfig::from_env().is_none());

        std::env::set_var("TELEGRAM_CHAT_ID", "-1001234567890");
        let config = TelegramConfig::from_env().unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.chat_id, -1_001_234_567_890);

        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn from_env_rejects_non_numeric_chat_id() {
        let _guard = ENV_LOCK.lock();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        std::env::set_var("TELEGRAM_CHAT_ID", "@channelname");
        assert!(TelegramConfig::from_env().is_none());
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn from_env_treats_an_empty_token_as_unset() {
        let _guard = ENV_LOCK.lock();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "");
        std::env::set_var("TELEGRAM_CHAT_ID", "42");
        assert!(TelegramConfig::from_env().is_none());
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }
}
