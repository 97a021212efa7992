//! Telegram channel — long-polls the Bot API for updates.
//!
//! Inbound messages become `InboundEvent`s keyed by the numeric user id;
//! replies are delivered with `sendMessage`, rendering the router's option
//! rows as a `ReplyKeyboardMarkup`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{Channel, EventStream, InboundEvent, Reply};
use crate::error::ChannelError;
use crate::render;

/// Hard ceiling on one sendMessage body.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Telegram transport — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// Send one reply, splitting bodies that exceed the API limit. Every
    /// chunk carries the reply's keyboard so the options stay visible.
    async fn send_reply(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
        for chunk in render::paginate(&reply.text, TELEGRAM_MAX_MESSAGE_LENGTH) {
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if !reply.keyboard.is_empty() {
                body["reply_markup"] = keyboard_markup(reply);
            }
            let resp = self
                .client
                .post(self.api_url("sendMessage"))
                .json(&body)
                .send()
                .await
                .map_err(|e| ChannelError::SendFailed {
                    name: "telegram".into(),
                    reason: e.to_string(),
                })?;
            if !resp.status().is_success() {
                let status = resp.status();
                let err = resp.text().await.unwrap_or_default();
                return Err(ChannelError::SendFailed {
                    name: "telegram".into(),
                    reason: format!("sendMessage returned {status}: {err}"),
                });
            }
        }
        Ok(())
    }
}

/// One-time resizable reply keyboard, rows straight from the router.
fn keyboard_markup(reply: &Reply) -> serde_json::Value {
    serde_json::json!({
        "keyboard": &reply.keyboard.rows,
        "one_time_keyboard": true,
        "resize_keyboard": true,
    })
}

fn event_from_update(update: &serde_json::Value) -> Option<InboundEvent> {
    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;
    let from = message.get("from")?;
    let user_id = from.get("id").and_then(serde_json::Value::as_i64)?;

    let first_name = from
        .get("first_name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    let last_name = from.get("last_name").and_then(serde_json::Value::as_str);
    let display_name = match last_name {
        Some(last) if !first_name.is_empty() => format!("{first_name} {last}"),
        Some(last) => last.to_string(),
        None => first_name.to_string(),
    };

    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(user_id);

    let mut event = InboundEvent::new(&user_id.to_string(), &display_name, text)
        .with_metadata(serde_json::json!({ "chat_id": chat_id.to_string() }));
    if let Some(username) = from.get("username").and_then(serde_json::Value::as_str) {
        event = event.with_handle(username);
    }
    Some(event)
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;
            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message"],
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let Some(results) = data.get("result").and_then(serde_json::Value::as_array)
                else {
                    continue;
                };
                for update in results {
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64)
                    {
                        offset = uid + 1;
                    }
                    let Some(event) = event_from_update(update) else {
                        continue;
                    };
                    if tx.send(event).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(Box::pin(stream))
    }

    async fn respond(&self, event: &InboundEvent, replies: &[Reply]) -> Result<(), ChannelError> {
        let chat_id = event
            .metadata
            .get("chat_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChannelError::InvalidMessage("No chat_id in event metadata".into()))?;

        // Delivery order is the only ordering guarantee, so send serially.
        for reply in replies {
            self.send_reply(chat_id, reply).await?;
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}
