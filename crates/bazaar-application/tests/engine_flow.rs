//! End-to-end engine flows against the in-memory infrastructure.
//!
//! Every test drives the dispatcher the way a chat transport would: button
//! presses via `dispatch`, typed replies via `dispatch_text`, gateway
//! callbacks via `payment_completed`, and asserts on what the recording
//! gateway actually shows in the chat.

use bazaar_application::{Dispatcher, Services};
use bazaar_core::action::CallbackAction;
use bazaar_core::config::{EngineConfig, WizardPolicy};
use bazaar_core::domain::{
    ApplicationStatus, ApplicationSummary, NotificationService, PaymentService, ProjectService,
    ProjectStatus, ProjectSummary, SubscriptionPlan,
};
use bazaar_core::session::{Session, SessionStore};
use bazaar_core::types::{ChatId, EntityId, MessageId};
use bazaar_core::wizard::{ActiveWizard, WizardKind};
use bazaar_infrastructure::{
    InMemoryApplications, InMemoryNotifications, InMemoryOrders, InMemoryPayments,
    InMemoryProjects, RecordingGateway,
};
use chrono::Utc;
use std::sync::Arc;

const CHAT: ChatId = ChatId(1);

struct Harness {
    dispatcher: Dispatcher,
    gateway: Arc<RecordingGateway>,
    projects: Arc<InMemoryProjects>,
    applications: Arc<InMemoryApplications>,
    payments: Arc<InMemoryPayments>,
    notifications: Arc<InMemoryNotifications>,
    store: Arc<SessionStore>,
}

impl Harness {
    fn new(config: EngineConfig) -> Self {
        let gateway = Arc::new(RecordingGateway::new());
        let projects = Arc::new(InMemoryProjects::new());
        let applications = Arc::new(InMemoryApplications::new());
        let payments = Arc::new(InMemoryPayments::new());
        let orders = Arc::new(InMemoryOrders::new(payments.clone()));
        let notifications = Arc::new(InMemoryNotifications::new());
        let store = Arc::new(SessionStore::new());

        let services = Services {
            projects: projects.clone(),
            applications: applications.clone(),
            orders,
            notifications: notifications.clone(),
            payments: payments.clone(),
        };
        let dispatcher = Dispatcher::new(store.clone(), gateway.clone(), services, config);

        Self {
            dispatcher,
            gateway,
            projects,
            applications,
            payments,
            notifications,
            store,
        }
    }

    async fn tap(&self, action: &str) {
        self.dispatcher
            .dispatch(CHAT, action, MessageId(0), Some("Ada"))
            .await
            .unwrap();
    }

    async fn say(&self, text: &str, source: i64) {
        self.dispatcher
            .dispatch_text(CHAT, text, MessageId(source))
            .await
            .unwrap();
    }

    async fn session(&self) -> Session {
        self.store.get_or_create(CHAT).await.lock().await.clone()
    }

    async fn home_text(&self) -> String {
        let session = self.session().await;
        let home = session.home_message_id.expect("no home message yet");
        self.gateway
            .content(CHAT, home)
            .await
            .expect("home message not live")
            .text
    }
}

fn small_pages() -> EngineConfig {
    EngineConfig {
        page_size: 3,
        ..EngineConfig::default()
    }
}

fn open_project(id: EntityId, owner: ChatId, title: &str) -> ProjectSummary {
    ProjectSummary {
        id,
        owner,
        title: title.to_string(),
        description: "Twenty characters of description at least".to_string(),
        budget: 50_000,
        duration_days: 30,
        status: ProjectStatus::Open,
        created_at: Utc::now(),
    }
}

fn accepted_application(id: EntityId, project_id: EntityId) -> ApplicationSummary {
    ApplicationSummary {
        id,
        project_id,
        applicant: ChatId(50),
        cover_letter: "I have shipped three similar storefronts".to_string(),
        price: 45_000,
        delivery_days: 21,
        status: ApplicationStatus::Accepted,
        created_at: Utc::now(),
    }
}

async fn seed_projects(h: &Harness, count: i64) {
    for id in 1..=count {
        h.projects
            .seed(open_project(id, ChatId(99), &format!("Project {id}")))
            .await;
    }
}

// ============================================================================
// Home surface & navigation
// ============================================================================

#[tokio::test]
async fn test_home_is_sent_once_and_only_edited_after() {
    let h = Harness::new(EngineConfig::default());

    h.tap("home:show").await;
    h.tap("wallet:show").await;
    h.tap("notifications:feed").await;
    h.tap("nav:back").await;
    h.tap("nav:home").await;

    let counts = h.gateway.counts(CHAT).await;
    assert_eq!(counts.sends, 1, "only the home message is ever sent");
    assert!(counts.edits >= 4);
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 1);
}

#[tokio::test]
async fn test_vanished_home_is_resent_not_duplicated() {
    let h = Harness::new(EngineConfig::default());
    h.tap("home:show").await;

    let old_home = h.session().await.home_message_id.unwrap();
    assert!(h.gateway.simulate_user_delete(CHAT, old_home).await);

    h.tap("wallet:show").await;

    let new_home = h.session().await.home_message_id.unwrap();
    assert_ne!(old_home, new_home);
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 1);
    assert_eq!(h.gateway.counts(CHAT).await.sends, 2);
}

#[tokio::test]
async fn test_back_walks_the_history_and_bottoms_out_at_home() {
    let h = Harness::new(EngineConfig::default());

    h.tap("home:show").await;
    h.tap("projects:browse").await;
    h.tap("wallet:show").await;
    assert_eq!(h.session().await.navigation.len(), 2);

    h.tap("nav:back").await;
    let session = h.session().await;
    assert_eq!(session.current_screen, CallbackAction::new("projects", "browse"));
    assert_eq!(session.navigation.len(), 1);

    h.tap("nav:back").await;
    assert_eq!(h.session().await.current_screen, CallbackAction::home());

    // Back on an empty stack still lands on home
    h.tap("nav:back").await;
    assert_eq!(h.session().await.current_screen, CallbackAction::home());
}

#[tokio::test]
async fn test_reset_wipes_the_chat_and_starts_clean() {
    let h = Harness::new(small_pages());
    seed_projects(&h, 4).await;

    h.tap("home:show").await;
    h.tap("projects:browse").await;
    assert!(h.gateway.live_messages(CHAT).await.len() > 1);
    let old_home = h.session().await.home_message_id.unwrap();

    h.tap("nav:reset").await;

    let session = h.session().await;
    assert_ne!(session.home_message_id, Some(old_home));
    assert_eq!(session.navigation.len(), 1);
    assert!(session.context.is_empty());
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 1);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_pagination_walkthrough_seven_ids_page_size_three() {
    let h = Harness::new(small_pages());
    seed_projects(&h, 7).await;

    h.tap("projects:browse").await;
    assert_eq!(h.session().await.temporary_message_ids.len(), 3);
    assert!(h.home_text().await.contains("Page 1 of 3"));

    h.tap("projects:page:browse:next").await;
    h.tap("projects:page:browse:next").await;
    assert_eq!(h.session().await.temporary_message_ids.len(), 1);
    assert!(h.home_text().await.contains("Page 3 of 3"));

    // Next from the last page stays put
    h.tap("projects:page:browse:next").await;
    assert!(h.home_text().await.contains("Page 3 of 3"));
    assert_eq!(h.session().await.temporary_message_ids.len(), 1);

    // Exactly home + one card remain in the chat
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 2);
}

#[tokio::test]
async fn test_empty_listing_renders_no_results_without_a_context() {
    let h = Harness::new(small_pages());

    h.tap("projects:browse").await;

    let session = h.session().await;
    assert!(session.temporary_message_ids.is_empty());
    assert!(!session.context.contains("page:browse"));
    assert!(h.home_text().await.contains("no open projects"));
}

#[tokio::test]
async fn test_leaving_a_list_screen_sweeps_its_cards() {
    let h = Harness::new(small_pages());
    seed_projects(&h, 2).await;

    h.tap("projects:browse").await;
    assert_eq!(h.session().await.temporary_message_ids.len(), 2);

    h.tap("wallet:show").await;
    assert!(h.session().await.temporary_message_ids.is_empty());
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 1);
}

// ============================================================================
// Wizards
// ============================================================================

async fn complete_project_form(h: &Harness) {
    h.tap("home:show").await;
    h.tap("projects:create").await;
    h.say("Landing page", 9001).await;
    h.say("Design and build a landing page for our product", 9002)
        .await;
    h.say("50000", 9003).await;
    h.say("30", 9004).await;
}

#[tokio::test]
async fn test_project_wizard_round_trip() {
    let h = Harness::new(EngineConfig::default());
    complete_project_form(&h).await;

    let session = h.session().await;
    let wizard = session.wizard.as_ref().expect("wizard should be active");
    assert!(wizard.at_confirmation());
    assert!(wizard.can_finalize());

    h.tap("wizard:confirm").await;

    let session = h.session().await;
    assert!(session.wizard.is_none());
    let created = h.projects.open_projects().await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(
        session.current_screen,
        CallbackAction::with_param("projects", "view", created[0].to_string())
    );
    assert!(h.home_text().await.contains("Landing page"));
}

#[tokio::test]
async fn test_single_field_edit_returns_to_confirmation() {
    let h = Harness::new(EngineConfig::default());
    complete_project_form(&h).await;

    h.tap("wizard:edit:budget").await;
    h.say("75000", 9005).await;

    let session = h.session().await;
    match session.wizard.as_ref() {
        Some(ActiveWizard::Project(state)) => {
            assert!(state.at_confirmation());
            assert_eq!(state.flow.budget, Some(75_000));
            assert_eq!(state.flow.title.as_deref(), Some("Landing page"));
        }
        other => panic!("unexpected wizard state: {other:?}"),
    }
}

#[tokio::test]
async fn test_keeping_the_current_value_changes_nothing() {
    let h = Harness::new(EngineConfig::default());
    complete_project_form(&h).await;

    h.tap("wizard:edit:title").await;
    h.tap("wizard:keep").await;

    let session = h.session().await;
    match session.wizard.as_ref() {
        Some(ActiveWizard::Project(state)) => {
            assert!(state.at_confirmation());
            assert_eq!(state.flow.title.as_deref(), Some("Landing page"));
            assert_eq!(state.flow.budget, Some(50_000));
        }
        other => panic!("unexpected wizard state: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_input_is_deleted_and_state_preserved() {
    let h = Harness::new(EngineConfig::default());
    h.tap("home:show").await;
    h.tap("projects:create").await;

    h.say("ab", 9001).await;

    let session = h.session().await;
    let wizard = session.wizard.as_ref().expect("wizard survives rejection");
    assert!(!wizard.at_confirmation());
    // The offending message was removed immediately
    assert!(h.gateway.deletions(CHAT).await.contains(&MessageId(9001)));

    h.say("Landing page", 9002).await;
    match h.session().await.wizard.as_ref() {
        Some(ActiveWizard::Project(state)) => {
            assert_eq!(state.flow.title.as_deref(), Some("Landing page"));
        }
        other => panic!("unexpected wizard state: {other:?}"),
    }
}

#[tokio::test]
async fn test_overlong_text_keeps_the_message_and_defers_the_notice() {
    let h = Harness::new(EngineConfig::default());
    h.tap("home:show").await;
    h.tap("projects:create").await;
    h.say("Landing page", 9001).await;

    h.say(&"d".repeat(2_001), 9002).await;

    let session = h.session().await;
    // The user's message stays so they can shorten it
    assert!(!h.gateway.deletions(CHAT).await.contains(&MessageId(9002)));
    let notice = session
        .wizard
        .as_ref()
        .and_then(|w| w.pending_delete())
        .expect("error notice pending deletion");
    assert!(h.gateway.is_live(CHAT, notice).await);

    h.say("Design and build a landing page for our product", 9003)
        .await;
    assert!(!h.gateway.is_live(CHAT, notice).await);
    assert!(h.session().await.wizard.as_ref().is_some_and(|w| w.pending_delete().is_none()));
}

#[tokio::test]
async fn test_new_wizard_replaces_the_active_one() {
    let h = Harness::new(EngineConfig::default());
    h.projects.seed(open_project(1, ChatId(99), "Storefront")).await;
    h.applications.seed(accepted_application(5, 1)).await;

    h.tap("home:show").await;
    h.tap("projects:create").await;
    h.say("Landing page", 9001).await;
    assert_eq!(h.session().await.wizard.as_ref().map(|w| w.kind()), Some(WizardKind::Project));

    h.tap("orders:create:5").await;

    let session = h.session().await;
    match session.wizard.as_ref() {
        Some(ActiveWizard::Order(state)) => {
            assert_eq!(state.flow.application_id, 5);
            assert_eq!(state.flow.amount, None);
        }
        other => panic!("expected a fresh order wizard, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reject_policy_keeps_the_active_wizard() {
    let config = EngineConfig {
        wizard_policy: WizardPolicy::Reject,
        ..EngineConfig::default()
    };
    let h = Harness::new(config);
    h.applications.seed(accepted_application(5, 1)).await;

    h.tap("home:show").await;
    h.tap("projects:create").await;
    h.say("Landing page", 9001).await;

    h.tap("orders:create:5").await;

    match h.session().await.wizard.as_ref() {
        Some(ActiveWizard::Project(state)) => {
            assert_eq!(state.flow.title.as_deref(), Some("Landing page"));
        }
        other => panic!("project wizard should survive, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_discards_the_wizard_and_goes_back() {
    let h = Harness::new(EngineConfig::default());
    h.tap("home:show").await;
    h.tap("projects:create").await;
    h.say("Landing page", 9001).await;

    h.tap("wizard:cancel").await;

    let session = h.session().await;
    assert!(session.wizard.is_none());
    assert_eq!(session.current_screen, CallbackAction::home());
    assert!(h.projects.open_projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_wizard_insufficient_funds_preserves_the_form() {
    let h = Harness::new(EngineConfig::default());
    h.applications.seed(accepted_application(5, 1)).await;

    h.tap("home:show").await;
    h.tap("orders:create:5").await;
    h.say("45000", 9001).await;
    h.say("Two milestones, net 7 payout", 9002).await;
    h.tap("wizard:confirm").await;

    // Rejected by the payments rule; nothing was lost
    match h.session().await.wizard.as_ref() {
        Some(ActiveWizard::Order(state)) => {
            assert!(state.at_confirmation());
            assert_eq!(state.flow.amount, Some(45_000));
        }
        other => panic!("order wizard should survive the rejection, got {other:?}"),
    }

    h.payments.credit(CHAT, 50_000).await;
    h.tap("wizard:confirm").await;

    assert!(h.session().await.wizard.is_none());
    assert_eq!(h.payments.wallet(CHAT).await.unwrap().balance, 5_000);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_prompt_consumes_the_next_message() {
    let h = Harness::new(small_pages());
    h.projects.seed(open_project(1, ChatId(99), "Rust backend")).await;
    h.projects.seed(open_project(2, ChatId(99), "Logo design")).await;

    h.tap("home:show").await;
    h.tap("projects:search").await;
    h.say("rust", 9001).await;

    let session = h.session().await;
    assert_eq!(
        session.current_screen,
        CallbackAction::with_param("projects", "results", "rust")
    );
    assert_eq!(session.temporary_message_ids.len(), 1);
    assert!(h.gateway.deletions(CHAT).await.contains(&MessageId(9001)));
}

#[tokio::test]
async fn test_unsolicited_text_is_removed() {
    let h = Harness::new(EngineConfig::default());
    h.tap("home:show").await;

    h.say("hello?", 9001).await;

    assert!(h.gateway.deletions(CHAT).await.contains(&MessageId(9001)));
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 1);
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_top_up_invoice_survives_navigation_until_the_callback() {
    let h = Harness::new(EngineConfig::default());

    h.tap("home:show").await;
    h.tap("wallet:show").await;
    h.tap("wallet:topup").await;
    h.say("5000", 9001).await;

    let session = h.session().await;
    assert_eq!(session.current_screen, CallbackAction::new("wallet", "show"));
    assert_eq!(session.payment_messages.len(), 1);
    let (reference, invoice_message) = session
        .payment_messages
        .iter()
        .map(|(r, m)| (r.clone(), *m))
        .next()
        .unwrap();
    assert!(h.gateway.is_live(CHAT, invoice_message).await);

    // Navigating away must not sweep the invoice
    h.tap("notifications:feed").await;
    h.tap("nav:home").await;
    assert!(h.gateway.is_live(CHAT, invoice_message).await);

    h.dispatcher.payment_completed(CHAT, reference).await.unwrap();

    assert!(!h.gateway.is_live(CHAT, invoice_message).await);
    assert!(h.session().await.payment_messages.is_empty());
    assert_eq!(h.payments.wallet(CHAT).await.unwrap().balance, 5_000);
}

#[tokio::test]
async fn test_completed_payment_refreshes_a_visible_wallet_screen() {
    let h = Harness::new(EngineConfig::default());

    h.tap("home:show").await;
    h.tap("wallet:show").await;
    h.tap("wallet:topup").await;
    h.say("7000", 9001).await;
    assert!(h.home_text().await.contains("Balance: <b>0</b>"));

    let reference = h.session().await.payment_messages.keys().next().unwrap().clone();
    h.dispatcher.payment_completed(CHAT, reference).await.unwrap();

    assert!(h.home_text().await.contains("Balance: <b>7000</b>"));
}

#[tokio::test]
async fn test_subscription_purchase_activates_after_the_callback() {
    let h = Harness::new(EngineConfig::default());

    h.tap("home:show").await;
    h.tap("wallet:show").await;
    h.tap("wallet:subscribe:pro").await;

    let reference = h.session().await.payment_messages.keys().next().unwrap().clone();
    h.dispatcher.payment_completed(CHAT, reference).await.unwrap();

    let wallet = h.payments.wallet(CHAT).await.unwrap();
    assert_eq!(wallet.subscription.map(|s| s.plan), Some(SubscriptionPlan::Pro));
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn test_notification_feed_and_mark_all_read() {
    let h = Harness::new(EngineConfig::default());
    h.notifications.push(CHAT, "New application received").await;
    h.notifications.push(CHAT, "Order released").await;

    h.tap("home:show").await;
    assert!(h.home_text().await.contains("2 unread"));

    h.tap("notifications:feed").await;
    assert_eq!(h.session().await.temporary_message_ids.len(), 2);

    h.tap("notifications:read").await;
    assert!(h.session().await.temporary_message_ids.is_empty());
    assert!(h.home_text().await.contains("caught up"));
    assert!(h.notifications.unread_for(CHAT).await.unwrap().is_empty());
}

// ============================================================================
// Cross-chat isolation
// ============================================================================

#[tokio::test]
async fn test_chats_have_independent_sessions_and_surfaces() {
    let h = Harness::new(EngineConfig::default());
    let other = ChatId(2);

    h.tap("home:show").await;
    h.dispatcher
        .dispatch(other, "wallet:show", MessageId(0), Some("Grace"))
        .await
        .unwrap();

    let mine = h.session().await;
    let theirs = h.store.get_or_create(other).await.lock().await.clone();
    assert_eq!(mine.current_screen, CallbackAction::home());
    assert_eq!(theirs.current_screen, CallbackAction::new("wallet", "show"));
    assert_ne!(mine.home_message_id, theirs.home_message_id);
    assert_eq!(h.gateway.live_messages(CHAT).await.len(), 1);
    assert_eq!(h.gateway.live_messages(other).await.len(), 1);
}
