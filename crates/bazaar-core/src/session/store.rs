//! Concurrency-safe session store.

use super::model::Session;
use crate::types::ChatId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Handle to one chat's serialized session state.
///
/// The inner mutex is the per-chat mutual-exclusion domain required by the
/// scheduling model: events for the same chat lock it for their whole handling
/// path (including outbound channel calls), events for different chats never
/// contend on it. `tokio::sync::Mutex` queues waiters fairly, so same-chat
/// events are processed in arrival order.
pub type SessionSlot = Arc<Mutex<Session>>;

/// Owns every live session, keyed by chat identity.
///
/// The outer lock guards only the shape of the map; it is never held across an
/// await on a session slot, so chats stay independent of each other.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ChatId, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the chat's session slot, creating an empty session on first
    /// access. Never fails.
    pub async fn get_or_create(&self, chat_id: ChatId) -> SessionSlot {
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(&chat_id) {
                return slot.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(chat_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(chat_id))))
            .clone()
    }

    pub async fn exists(&self, chat_id: ChatId) -> bool {
        self.sessions.read().await.contains_key(&chat_id)
    }

    /// Clears the chat's session back to its initial state (home screen, one
    /// seeded history entry). A no-op for unknown chats.
    pub async fn reset(&self, chat_id: ChatId) {
        let slot = {
            let sessions = self.sessions.read().await;
            sessions.get(&chat_id).cloned()
        };
        if let Some(slot) = slot {
            slot.lock().await.reset();
        }
    }

    /// Hard-deletes the chat's session, reporting whether one existed.
    pub async fn remove(&self, chat_id: ChatId) -> bool {
        self.sessions.write().await.remove(&chat_id).is_some()
    }

    /// Removes every session idle for longer than `threshold` and returns the
    /// affected chat ids.
    ///
    /// A slot whose mutex is currently held is being processed right now and
    /// is skipped — it is not idle whatever its timestamp says.
    pub async fn remove_idle(&self, threshold: chrono::Duration) -> Vec<ChatId> {
        let candidates: Vec<ChatId> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter_map(|(chat_id, slot)| match slot.try_lock() {
                    Ok(session) if session.idle_for() > threshold => Some(*chat_id),
                    _ => None,
                })
                .collect()
        };

        if candidates.is_empty() {
            return candidates;
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = Vec::with_capacity(candidates.len());
        for chat_id in candidates {
            let still_idle = sessions
                .get(&chat_id)
                .and_then(|slot| slot.try_lock().ok().map(|s| s.idle_for() > threshold))
                .unwrap_or(false);
            if still_idle {
                sessions.remove(&chat_id);
                removed.push(chat_id);
            }
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
