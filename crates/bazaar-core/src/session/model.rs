//! Session domain model.

use super::context::ContextBag;
use super::navigation::NavigationStack;
use crate::action::{CallbackAction, ScreenId};
use crate::types::{ChatId, MessageId, PaymentRef};
use crate::wizard::ActiveWizard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The complete conversational state of one chat identity.
///
/// A session is created on the first inbound event for an unseen chat, mutated
/// by every subsequent event for that chat, and destroyed only by idle expiry
/// or an explicit reset. It is exclusively owned by its chat's serialized
/// execution path — see [`super::SessionStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Primary key: the conversation this session belongs to.
    pub chat_id: ChatId,
    /// Display name captured from the most recent inbound event.
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Updated on every processed event; drives idle expiry.
    pub last_activity_at: DateTime<Utc>,
    /// The logically current rendered screen.
    pub current_screen: ScreenId,
    /// Screen-scoped transient state (drafts, flags, pagination contexts).
    pub context: ContextBag,
    /// Back-navigation history of screens the user has left.
    pub navigation: NavigationStack,
    /// At most one active data-collection wizard.
    pub wizard: Option<ActiveWizard>,
    /// The single persistent "home" message, created lazily and then only
    /// edited in place.
    pub home_message_id: Option<MessageId>,
    /// Ephemeral messages belonging to the current screen, cleared before the
    /// next screen renders its own.
    pub temporary_message_ids: Vec<MessageId>,
    /// Payment-linked messages, resolved by the gateway callback rather than
    /// by navigation, so they survive the temporary sweep.
    pub payment_messages: HashMap<PaymentRef, MessageId>,
}

impl Session {
    pub fn new(chat_id: ChatId) -> Self {
        let now = Utc::now();
        Self {
            chat_id,
            display_name: None,
            created_at: now,
            last_activity_at: now,
            current_screen: CallbackAction::home(),
            context: ContextBag::new(),
            navigation: NavigationStack::new(),
            wizard: None,
            home_message_id: None,
            temporary_message_ids: Vec::new(),
            payment_messages: HashMap::new(),
        }
    }

    /// Marks the session as active now.
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// How long the session has been idle.
    pub fn idle_for(&self) -> chrono::Duration {
        Utc::now() - self.last_activity_at
    }

    /// Clears everything except the chat identity and re-seeds the navigation
    /// history with a single home entry.
    pub fn reset(&mut self) {
        let now = Utc::now();
        self.display_name = None;
        self.created_at = now;
        self.last_activity_at = now;
        self.current_screen = CallbackAction::home();
        self.context.clear();
        self.navigation = NavigationStack::seeded(CallbackAction::home());
        self.wizard = None;
        self.home_message_id = None;
        self.temporary_message_ids.clear();
        self.payment_messages.clear();
    }
}
