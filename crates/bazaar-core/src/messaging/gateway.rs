//! Outbound channel port.

use crate::action::CallbackAction;
use crate::error::Result;
use crate::types::{ChatId, MessageId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One tappable control: a label plus the encoded action it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            label: label.into(),
            action: action.encode(),
        }
    }
}

/// Rows of buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one row of buttons, builder-style.
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// What a screen asks the channel to display: rich text plus controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenContent {
    pub text: String,
    pub keyboard: Keyboard,
}

impl ScreenContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::new(),
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

/// Outcome of an edit or delete against the channel.
///
/// `NotFound` is an expected condition — the user (or a previous cleanup)
/// removed the message first — and is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Ok,
    NotFound,
}

/// The one-way chat transport the engine renders through.
///
/// Calls issued for the same chat are delivered in the order issued; nothing
/// is assumed across different chats.
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    async fn send(&self, chat_id: ChatId, content: ScreenContent) -> Result<MessageId>;

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        content: ScreenContent,
    ) -> Result<DeliveryStatus>;

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<DeliveryStatus>;
}
