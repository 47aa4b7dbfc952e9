use std::sync::Arc;

use crate::{domain::ChatId, messaging::port::MessagingPort};

/// Delivers messages to the single configured chat.
///
/// Delivery failures are logged and absorbed so a broken channel never stops
/// the polling loop.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self { messenger, chat_id }
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub async fn send(&self, message: &str) {
        match self.messenger.send_text(&self.chat_id, message).await {
            Ok(()) => tracing::info!(chat_id = %self.chat_id, "bot sent message \"{message}\""),
            Err(e) => tracing::error!(chat_id = %self.chat_id, "failed to send telegram message: {e}"),
        }
    }
}
