//! Inbound event dispatcher.
//!
//! The single entry point for structured actions, free-text input and payment
//! callbacks. Per chat, events are serialized on the session slot's mutex;
//! across chats they run fully in parallel. Screen handlers never hold a
//! reference to the dispatcher — re-dispatch is expressed as a [`Control`]
//! value returned to the routing loop, which is also the only place that
//! records navigation history.

use crate::screens::{self, wizard};
use bazaar_core::BazaarError;
use bazaar_core::action::{CallbackAction, ScreenId};
use bazaar_core::config::{EngineConfig, WizardPolicy};
use bazaar_core::domain::{
    ApplicationService, NotificationService, OrderService, PaymentPurpose, PaymentService,
    ProjectService,
};
use bazaar_core::error::Result;
use bazaar_core::messaging::{ChannelGateway, MessageLifecycle, ScreenContent};
use bazaar_core::session::{Session, SessionStore};
use bazaar_core::types::{ChatId, MessageId, PaymentRef};
use bazaar_core::wizard::ActiveWizard;
use std::sync::Arc;

/// How a transition should interact with navigation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    /// User-initiated forward transition: the screen being left is recorded.
    Forward,
    /// Back/home navigation: nothing is recorded.
    Return,
    /// System-initiated redraw of the current screen: nothing is recorded and
    /// the current screen does not change.
    Redraw,
}

/// What a handler asks the routing loop to do next.
pub(crate) enum Control {
    Done,
    Redirect { to: ScreenId, intent: NavIntent },
}

/// The marketplace ports the screens call into.
#[derive(Clone)]
pub struct Services {
    pub projects: Arc<dyn ProjectService>,
    pub applications: Arc<dyn ApplicationService>,
    pub orders: Arc<dyn OrderService>,
    pub notifications: Arc<dyn NotificationService>,
    pub payments: Arc<dyn PaymentService>,
}

pub struct Dispatcher {
    pub(crate) store: Arc<SessionStore>,
    pub(crate) lifecycle: MessageLifecycle,
    pub(crate) services: Services,
    pub(crate) config: EngineConfig,
}

impl Dispatcher {
    pub fn new(
        store: Arc<SessionStore>,
        gateway: Arc<dyn ChannelGateway>,
        services: Services,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            lifecycle: MessageLifecycle::new(gateway),
            services,
            config,
        }
    }

    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Routes one structured action (button press).
    pub async fn dispatch(
        &self,
        chat_id: ChatId,
        raw_action: &str,
        source: MessageId,
        display_name: Option<&str>,
    ) -> Result<()> {
        let action = match CallbackAction::parse(raw_action) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!("chat {}: dropping malformed action '{}': {}", chat_id, raw_action, err);
                return Ok(());
            }
        };
        tracing::debug!("chat {}: action {} (message {})", chat_id, action, source);

        let slot = self.store.get_or_create(chat_id).await;
        let mut session = slot.lock().await;
        session.touch();
        if let Some(name) = display_name {
            session.display_name = Some(name.to_string());
        }

        let result = self.route(&mut session, action, NavIntent::Forward).await;
        self.present_failure(&mut session, result).await
    }

    /// Routes one free-text input to whichever subsystem currently claims
    /// text ownership: the active wizard first, then an awaiting-input flag.
    /// Unclaimed text is removed so the chat stays tidy.
    pub async fn dispatch_text(
        &self,
        chat_id: ChatId,
        text: &str,
        source: MessageId,
    ) -> Result<()> {
        let slot = self.store.get_or_create(chat_id).await;
        let mut session = slot.lock().await;
        session.touch();

        let result = self.route_text(&mut session, text, source).await;
        self.present_failure(&mut session, result).await
    }

    /// Entry point for the asynchronous payment-gateway callback: applies the
    /// payment, resolves the tracked invoice message and refreshes the wallet
    /// screen when it is currently on display.
    pub async fn payment_completed(&self, chat_id: ChatId, reference: PaymentRef) -> Result<()> {
        let slot = self.store.get_or_create(chat_id).await;
        let mut session = slot.lock().await;

        let receipt = self.services.payments.complete(&reference).await?;
        self.lifecycle.resolve_payment(&mut session, &reference).await;

        if session.current_screen == CallbackAction::new("wallet", "show") {
            let refresh = self
                .route(
                    &mut session,
                    CallbackAction::new("wallet", "show"),
                    NavIntent::Redraw,
                )
                .await;
            if let Err(err) = refresh {
                tracing::warn!("chat {}: wallet refresh after payment failed: {}", chat_id, err);
            }
        }

        let text = match receipt.purpose {
            PaymentPurpose::TopUp => {
                format!("✅ Payment received — {} added to your balance.", receipt.amount)
            }
            PaymentPurpose::Subscription(plan) => {
                format!("✅ Payment received — {} subscription is active.", plan.as_str())
            }
        };
        self.notice(&mut session, &text).await;
        Ok(())
    }

    /// The explicit re-dispatch loop: handlers return redirects instead of
    /// calling back into the dispatcher.
    pub(crate) async fn route(
        &self,
        session: &mut Session,
        action: ScreenId,
        intent: NavIntent,
    ) -> Result<()> {
        let mut action = action;
        let mut intent = intent;
        loop {
            match self.handle(session, &action, intent).await? {
                Control::Done => return Ok(()),
                Control::Redirect { to, intent: next } => {
                    action = to;
                    intent = next;
                }
            }
        }
    }

    async fn handle(
        &self,
        session: &mut Session,
        action: &ScreenId,
        intent: NavIntent,
    ) -> Result<Control> {
        match action.namespace.as_str() {
            "nav" => self.handle_nav(session, action).await,
            "wizard" => wizard::handle_command(self, session, action).await,
            _ => self.show_screen(session, action, intent).await,
        }
    }

    async fn handle_nav(&self, session: &mut Session, action: &ScreenId) -> Result<Control> {
        match action.action.as_str() {
            "back" => {
                // Explicit navigation abandons any wizard in flight
                self.discard_wizard(session).await;
                let target = session.navigation.pop().unwrap_or_else(CallbackAction::home);
                Ok(Control::Redirect {
                    to: target,
                    intent: NavIntent::Return,
                })
            }
            "home" => {
                self.discard_wizard(session).await;
                session.navigation.reset();
                Ok(Control::Redirect {
                    to: CallbackAction::home(),
                    intent: NavIntent::Return,
                })
            }
            "reset" => {
                // Remove the old surface before the record is wiped, so the
                // fresh session starts from a clean chat
                self.discard_wizard(session).await;
                self.lifecycle.clear_temporaries(session).await;
                if let Some(home) = session.home_message_id {
                    self.lifecycle.delete_best_effort(session.chat_id, home).await;
                }
                session.reset();
                Ok(Control::Redirect {
                    to: CallbackAction::home(),
                    intent: NavIntent::Redraw,
                })
            }
            other => Err(BazaarError::validation(format!(
                "unknown navigation action '{other}'"
            ))),
        }
    }

    /// Drops the active wizard, removing its deferred validation notice so
    /// nothing of the abandoned flow lingers in the chat.
    async fn discard_wizard(&self, session: &mut Session) {
        if let Some(wizard) = session.wizard.take() {
            if let Some(notice) = wizard.pending_delete() {
                self.lifecycle.delete_best_effort(session.chat_id, notice).await;
            }
        }
    }

    async fn show_screen(
        &self,
        session: &mut Session,
        action: &ScreenId,
        intent: NavIntent,
    ) -> Result<Control> {
        let in_place = action.action == "page" || screens::is_command(action);

        if !in_place && *action != session.current_screen {
            if intent == NavIntent::Forward {
                session.navigation.push(session.current_screen.clone());
            }
            // Context entries are scoped to the screen that wrote them
            session.context.clear();
            session.current_screen = action.clone();
        }

        match action.namespace.as_str() {
            "home" => screens::home::show(self, session).await,
            "projects" => screens::projects::handle(self, session, action).await,
            "applications" => screens::applications::handle(self, session, action).await,
            "orders" => screens::orders::handle(self, session, action).await,
            "wallet" => screens::wallet::handle(self, session, action).await,
            "notifications" => screens::notifications::handle(self, session, action).await,
            other => Err(BazaarError::validation(format!(
                "unknown screen namespace '{other}'"
            ))),
        }
    }

    async fn route_text(
        &self,
        session: &mut Session,
        text: &str,
        source: MessageId,
    ) -> Result<()> {
        if session.wizard.is_some() {
            return wizard::handle_input(self, session, text, source).await;
        }

        match session
            .context
            .take::<screens::AwaitingInput>(screens::KEY_AWAITING)?
        {
            Some(screens::AwaitingInput::SearchQuery) => {
                self.lifecycle.delete_best_effort(session.chat_id, source).await;
                let query = text.trim().to_string();
                self.route(
                    session,
                    CallbackAction::with_param("projects", "results", query),
                    NavIntent::Forward,
                )
                .await
            }
            Some(screens::AwaitingInput::TopUpAmount) => {
                screens::wallet::handle_top_up_amount(self, session, text, source).await
            }
            None => {
                tracing::debug!("chat {}: unsolicited text, removing", session.chat_id);
                self.lifecycle.delete_best_effort(session.chat_id, source).await;
                Ok(())
            }
        }
    }

    /// Installs a wizard according to the configured replacement policy.
    /// Returns `false` when the start was rejected.
    pub(crate) async fn start_wizard(
        &self,
        session: &mut Session,
        wizard: ActiveWizard,
    ) -> Result<bool> {
        if session.wizard.is_some() && self.config.wizard_policy == WizardPolicy::Reject {
            self.notice(session, "Finish or cancel the current form first.").await;
            return Ok(false);
        }
        let kind = wizard.kind();
        if let Some(old) = session.wizard.replace(wizard) {
            tracing::debug!(
                "chat {}: {} discarded in favour of {}",
                session.chat_id,
                old.kind(),
                kind
            );
            if let Some(notice) = old.pending_delete() {
                self.lifecycle.delete_best_effort(session.chat_id, notice).await;
            }
        }
        Ok(true)
    }

    /// Sends a short-lived notice, tracked as a temporary so the next screen
    /// render sweeps it away.
    pub(crate) async fn notice(&self, session: &mut Session, text: &str) {
        if let Err(err) = self
            .lifecycle
            .send_temporary(session, ScreenContent::text(text))
            .await
        {
            tracing::warn!("chat {}: failed to send notice: {}", session.chat_id, err);
        }
    }

    /// Maps a failed event to user-visible behaviour per the error taxonomy.
    /// The home surface keeps its controls in every branch.
    async fn present_failure(&self, session: &mut Session, result: Result<()>) -> Result<()> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        match &err {
            BazaarError::Validation(message) => {
                self.notice(session, &format!("⚠️ {message}")).await;
            }
            BazaarError::Domain { message, .. } => {
                self.notice(session, &format!("🚫 {message}")).await;
            }
            BazaarError::NotFound { .. } => {
                self.notice(session, "This item is no longer available.").await;
                if let Err(err) = self
                    .route(session, CallbackAction::home(), NavIntent::Return)
                    .await
                {
                    tracing::warn!("chat {}: fallback to home failed: {}", session.chat_id, err);
                }
            }
            BazaarError::Transport(message) => {
                tracing::warn!("chat {}: transport failure: {}", session.chat_id, message);
            }
            _ => {
                tracing::warn!("chat {}: {}", session.chat_id, err);
                self.notice(session, "Something went wrong — please try again.").await;
            }
        }
        Ok(())
    }
}
