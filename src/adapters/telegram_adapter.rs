//! Telegram Bot API notification adapter.
//!
//! One `sendMessage` call per notification over the blocking HTTP client.
//! Delivery is best-effort; the caller decides whether a failure aborts.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;
use crate::ports::notify_port::NotifyPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            client,
            base_url: API_BASE.to_string(),
            bot_token,
            chat_id,
        }
    }

    /// Reads `[telegram] bot_token` and `chat_id`; `None` when either is
    /// absent so the caller can fall back to the console notifier.
    pub fn from_config(config: &dyn ConfigPort) -> Option<Self> {
        let bot_token = config
            .get_string("telegram", "bot_token")
            .filter(|t| !t.trim().is_empty())?;
        let chat_id = config
            .get_string("telegram", "chat_id")
            .filter(|c| !c.trim().is_empty())?;
        Some(Self::new(bot_token, chat_id))
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

impl NotifyPort for TelegramNotifier {
    fn send(&self, text: &str) -> Result<(), ScreenerError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(self.send_url())
            .json(&request)
            .send()
            .map_err(|e| ScreenerError::Notify {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ScreenerError::Notify {
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let result: SendMessageResponse =
            response.json().map_err(|e| ScreenerError::Notify {
                reason: format!("malformed response: {e}"),
            })?;

        if result.ok {
            Ok(())
        } else {
            Err(ScreenerError::Notify {
                reason: result
                    .description
                    .unwrap_or_else(|| "rejected without description".into()),
            })
        }
    }
}
