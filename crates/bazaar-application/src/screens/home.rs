//! The home screen: the menu everything starts from.

use crate::dispatcher::{Control, Dispatcher};
use bazaar_core::action::CallbackAction;
use bazaar_core::error::Result;
use bazaar_core::markup::escape_html;
use bazaar_core::messaging::{Button, Keyboard, ScreenContent};
use bazaar_core::session::Session;

pub(crate) async fn show(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;

    let unread = d
        .services
        .notifications
        .unread_for(session.chat_id)
        .await?
        .len();

    let mut text = match &session.display_name {
        Some(name) => format!("👋 Hello, <b>{}</b>!\n\n", escape_html(name)),
        None => "👋 Hello!\n\n".to_string(),
    };
    text.push_str("This is the Bazaar marketplace. What would you like to do?");
    if unread > 0 {
        text.push_str(&format!("\n\n🔔 {unread} unread notification(s)."));
    }

    let notifications_label = if unread > 0 {
        format!("🔔 Notifications ({unread})")
    } else {
        "🔔 Notifications".to_string()
    };

    let keyboard = Keyboard::new()
        .row(vec![
            Button::new("🔎 Browse projects", &CallbackAction::new("projects", "browse")),
            Button::new("🔍 Search", &CallbackAction::new("projects", "search")),
        ])
        .row(vec![
            Button::new("➕ Post a project", &CallbackAction::new("projects", "create")),
            Button::new("📂 My projects", &CallbackAction::new("projects", "mine")),
        ])
        .row(vec![
            Button::new("📨 My applications", &CallbackAction::new("applications", "mine")),
            Button::new("📦 My orders", &CallbackAction::new("orders", "mine")),
        ])
        .row(vec![
            Button::new("💰 Wallet", &CallbackAction::new("wallet", "show")),
            Button::new(notifications_label, &CallbackAction::new("notifications", "feed")),
        ]);

    d.lifecycle
        .render_home(session, ScreenContent::with_keyboard(text, keyboard))
        .await?;
    Ok(Control::Done)
}
