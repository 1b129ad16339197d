//! Per-session message lifecycle.
//!
//! Three message populations with different lifetimes share one chat: the
//! single home message (edited in place forever), the current screen's
//! temporaries (swept before the next screen renders), and payment messages
//! (resolved by the gateway callback, surviving navigation). This manager is
//! the only code that touches the channel on their behalf.

use super::gateway::{ChannelGateway, DeliveryStatus, ScreenContent};
use crate::error::Result;
use crate::session::Session;
use crate::types::{ChatId, MessageId, PaymentRef};
use std::sync::Arc;

pub struct MessageLifecycle {
    gateway: Arc<dyn ChannelGateway>,
}

impl MessageLifecycle {
    pub fn new(gateway: Arc<dyn ChannelGateway>) -> Self {
        Self { gateway }
    }

    /// Direct access to the channel, for renderers that produce their own
    /// temporary messages.
    pub fn gateway(&self) -> Arc<dyn ChannelGateway> {
        self.gateway.clone()
    }

    /// Returns the session's home message id, creating the home message with
    /// placeholder content on first need. Idempotent.
    pub async fn ensure_home(&self, session: &mut Session) -> Result<MessageId> {
        if let Some(id) = session.home_message_id {
            return Ok(id);
        }
        let id = self
            .gateway
            .send(session.chat_id, ScreenContent::text("…"))
            .await?;
        session.home_message_id = Some(id);
        Ok(id)
    }

    /// Renders the home surface by editing it in place.
    ///
    /// If the home message has vanished from the channel (deleted by the
    /// user), a fresh one is sent and becomes the home — at no point do two
    /// live home messages exist.
    pub async fn render_home(&self, session: &mut Session, content: ScreenContent) -> Result<()> {
        match session.home_message_id {
            None => {
                let id = self.gateway.send(session.chat_id, content).await?;
                session.home_message_id = Some(id);
            }
            Some(id) => {
                match self.gateway.edit(session.chat_id, id, content.clone()).await? {
                    DeliveryStatus::Ok => {}
                    DeliveryStatus::NotFound => {
                        tracing::debug!(
                            "home message {} of chat {} vanished, re-sending",
                            id,
                            session.chat_id
                        );
                        let fresh = self.gateway.send(session.chat_id, content).await?;
                        session.home_message_id = Some(fresh);
                    }
                }
            }
        }
        Ok(())
    }

    /// Sends an ephemeral message and tracks it for the next sweep.
    pub async fn send_temporary(
        &self,
        session: &mut Session,
        content: ScreenContent,
    ) -> Result<MessageId> {
        let id = self.gateway.send(session.chat_id, content).await?;
        session.temporary_message_ids.push(id);
        Ok(id)
    }

    /// Adopts an already-sent message into the current screen's temporaries.
    pub fn track_temporary(&self, session: &mut Session, message_id: MessageId) {
        session.temporary_message_ids.push(message_id);
    }

    /// Deletes every tracked temporary and empties the list.
    ///
    /// Called at the start of any screen render that will produce its own
    /// temporaries. Cleanup failures are logged and swallowed: a missing
    /// message is already in the desired state, and a screen render must
    /// never abort because cleanup failed.
    pub async fn clear_temporaries(&self, session: &mut Session) {
        for id in std::mem::take(&mut session.temporary_message_ids) {
            self.delete_best_effort(session.chat_id, id).await;
        }
    }

    /// Tracks a payment-linked message under its external reference. Exempt
    /// from the temporary sweep.
    pub fn track_payment(&self, session: &mut Session, reference: PaymentRef, id: MessageId) {
        session.payment_messages.insert(reference, id);
    }

    /// Resolves a payment message once the gateway callback fires: removes the
    /// tracking entry and deletes the message from the chat. Returns the
    /// message id if the reference was tracked.
    pub async fn resolve_payment(
        &self,
        session: &mut Session,
        reference: &PaymentRef,
    ) -> Option<MessageId> {
        let id = session.payment_messages.remove(reference)?;
        self.delete_best_effort(session.chat_id, id).await;
        Some(id)
    }

    /// Deletes one message, tolerating both races and transport failures.
    pub async fn delete_best_effort(&self, chat_id: ChatId, id: MessageId) {
        match self.gateway.delete(chat_id, id).await {
            Ok(DeliveryStatus::Ok) => {}
            Ok(DeliveryStatus::NotFound) => {
                tracing::debug!("message {} of chat {} already gone", id, chat_id);
            }
            Err(err) => {
                tracing::warn!("failed to delete message {} of chat {}: {}", id, chat_id, err);
            }
        }
    }
}
