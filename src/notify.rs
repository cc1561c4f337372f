//! Best-effort Telegram notifications to the store admin.
//!
//! Notification failures are logged and never affect the request that
//! triggered them; money paths must not depend on Telegram being up.

use serde_json::json;

use crate::config::Config;

/// Telegram admin notifier. Disabled (no-op) unless both the bot token
/// and chat id are configured.
#[derive(Clone)]
pub struct AdminNotifier {
    http: reqwest::Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl AdminNotifier {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            bot_token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
        }
    }

    /// Send a message to the admin chat, HTML formatted
    pub async fn send(&self, message: &str) {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return;
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let result = self
            .http
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": message,
                "parse_mode": "HTML",
            }))
            .send()
            .await;

        if let Err(e) = result {
            tracing::error!("Telegram notify error: {}", e);
        }
    }

    /// Fire-and-forget variant for use inside request handlers
    pub fn send_detached(&self, message: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.send(&message).await;
        });
    }
}
