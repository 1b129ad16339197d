//! Recording channel gateway.

use async_trait::async_trait;
use bazaar_core::error::Result;
use bazaar_core::messaging::{ChannelGateway, DeliveryStatus, ScreenContent};
use bazaar_core::types::{ChatId, MessageId};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;

/// Per-chat channel-call accounting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub sends: usize,
    pub edits: usize,
    pub deletes: usize,
}

#[derive(Default)]
struct Inner {
    live: BTreeMap<(ChatId, MessageId), ScreenContent>,
    counts: HashMap<ChatId, CallCounts>,
    deleted: HashMap<ChatId, Vec<MessageId>>,
}

/// An in-process [`ChannelGateway`] that keeps every live message in memory.
///
/// Tests observe the live message set and the per-chat call counts here: the
/// single-home invariant (sends vs edits), the temporary sweep and the
/// payment-message exemption are all checkable without a real chat transport.
/// Deleting a message the user already removed reports `NotFound`, exactly
/// like a real channel.
#[derive(Default)]
pub struct RecordingGateway {
    next_id: AtomicI64,
    inner: Mutex<Inner>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn counts(&self, chat_id: ChatId) -> CallCounts {
        self.inner
            .lock()
            .await
            .counts
            .get(&chat_id)
            .copied()
            .unwrap_or_default()
    }

    /// Live messages of one chat, in send order.
    pub async fn live_messages(&self, chat_id: ChatId) -> Vec<(MessageId, ScreenContent)> {
        self.inner
            .lock()
            .await
            .live
            .range((chat_id, MessageId(i64::MIN))..=(chat_id, MessageId(i64::MAX)))
            .map(|((_, id), content)| (*id, content.clone()))
            .collect()
    }

    pub async fn content(&self, chat_id: ChatId, id: MessageId) -> Option<ScreenContent> {
        self.inner.lock().await.live.get(&(chat_id, id)).cloned()
    }

    pub async fn is_live(&self, chat_id: ChatId, id: MessageId) -> bool {
        self.inner.lock().await.live.contains_key(&(chat_id, id))
    }

    /// Every id the engine asked to delete, whether or not it was live.
    pub async fn deletions(&self, chat_id: ChatId) -> Vec<MessageId> {
        self.inner
            .lock()
            .await
            .deleted
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes a message the way a user would, without touching the counts.
    pub async fn simulate_user_delete(&self, chat_id: ChatId, id: MessageId) -> bool {
        self.inner.lock().await.live.remove(&(chat_id, id)).is_some()
    }
}

#[async_trait]
impl ChannelGateway for RecordingGateway {
    async fn send(&self, chat_id: ChatId, content: ScreenContent) -> Result<MessageId> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut inner = self.inner.lock().await;
        inner.live.insert((chat_id, id), content);
        inner.counts.entry(chat_id).or_default().sends += 1;
        Ok(id)
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        content: ScreenContent,
    ) -> Result<DeliveryStatus> {
        let mut inner = self.inner.lock().await;
        inner.counts.entry(chat_id).or_default().edits += 1;
        match inner.live.get_mut(&(chat_id, message_id)) {
            Some(slot) => {
                *slot = content;
                Ok(DeliveryStatus::Ok)
            }
            None => Ok(DeliveryStatus::NotFound),
        }
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<DeliveryStatus> {
        let mut inner = self.inner.lock().await;
        inner.counts.entry(chat_id).or_default().deletes += 1;
        inner.deleted.entry(chat_id).or_default().push(message_id);
        match inner.live.remove(&(chat_id, message_id)) {
            Some(_) => Ok(DeliveryStatus::Ok),
            None => Ok(DeliveryStatus::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_edit_delete_accounting() {
        let gateway = RecordingGateway::new();
        let chat = ChatId(1);

        let id = gateway
            .send(chat, ScreenContent::text("hello"))
            .await
            .unwrap();
        assert_eq!(
            gateway
                .edit(chat, id, ScreenContent::text("edited"))
                .await
                .unwrap(),
            DeliveryStatus::Ok
        );
        assert_eq!(gateway.content(chat, id).await.unwrap().text, "edited");

        assert_eq!(gateway.delete(chat, id).await.unwrap(), DeliveryStatus::Ok);
        assert_eq!(
            gateway.delete(chat, id).await.unwrap(),
            DeliveryStatus::NotFound
        );

        let counts = gateway.counts(chat).await;
        assert_eq!((counts.sends, counts.edits, counts.deletes), (1, 1, 2));
    }

    #[tokio::test]
    async fn test_chats_do_not_see_each_other() {
        let gateway = RecordingGateway::new();
        gateway
            .send(ChatId(1), ScreenContent::text("one"))
            .await
            .unwrap();
        gateway
            .send(ChatId(2), ScreenContent::text("two"))
            .await
            .unwrap();

        assert_eq!(gateway.live_messages(ChatId(1)).await.len(), 1);
        assert_eq!(gateway.live_messages(ChatId(2)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_user_delete_makes_later_edits_not_found() {
        let gateway = RecordingGateway::new();
        let chat = ChatId(1);
        let id = gateway
            .send(chat, ScreenContent::text("hello"))
            .await
            .unwrap();

        assert!(gateway.simulate_user_delete(chat, id).await);
        assert_eq!(
            gateway
                .edit(chat, id, ScreenContent::text("late"))
                .await
                .unwrap(),
            DeliveryStatus::NotFound
        );
    }
}
