//! Notification feed.

use super::{nav_row, page_param, pager_row};
use crate::dispatcher::{Control, Dispatcher, NavIntent};
use bazaar_core::BazaarError;
use bazaar_core::action::CallbackAction;
use bazaar_core::domain::Notification;
use bazaar_core::error::Result;
use bazaar_core::markup::escape_html;
use bazaar_core::messaging::{Button, Keyboard, ScreenContent};
use bazaar_core::pagination::{EntityKind, PageDirective, PageOutcome, PageSeed, PageView, Paginator};
use bazaar_core::session::Session;

pub(crate) async fn handle(
    d: &Dispatcher,
    session: &mut Session,
    action: &CallbackAction,
) -> Result<Control> {
    match action.action.as_str() {
        "feed" => list(d, session, PageDirective::Init).await,
        "page" => {
            let (_, directive) = page_param(action)?;
            list(d, session, directive).await
        }
        "read" => {
            d.services
                .notifications
                .mark_all_read(session.chat_id)
                .await?;
            Ok(Control::Redirect {
                to: CallbackAction::new("notifications", "feed"),
                intent: NavIntent::Redraw,
            })
        }
        other => Err(BazaarError::validation(format!(
            "unknown notifications action '{other}'"
        ))),
    }
}

async fn list(d: &Dispatcher, session: &mut Session, directive: PageDirective) -> Result<Control> {
    let seed = match directive {
        PageDirective::Init => Some(PageSeed {
            entity_kind: EntityKind::Notification,
            ids: d.services.notifications.unread_for(session.chat_id).await?,
            page_size: d.config.page_size,
        }),
        _ => None,
    };

    let gateway = d.lifecycle.gateway();
    let notifications = d.services.notifications.clone();
    let chat_id = session.chat_id;
    let outcome = Paginator::new(&d.lifecycle)
        .render(session, "feed", directive, seed, move |view: PageView| async move {
            let mut produced = Vec::with_capacity(view.ids.len());
            for id in view.ids {
                if let Some(notification) = notifications.get(id).await? {
                    produced.push(gateway.send(chat_id, card(&notification)).await?);
                }
            }
            Ok(produced)
        })
        .await?;

    let content = match outcome {
        PageOutcome::NoResults => ScreenContent::with_keyboard(
            "<b>🔔 Notifications</b>\n\nYou're all caught up.".to_string(),
            Keyboard::new().row(nav_row()),
        ),
        PageOutcome::Rendered {
            page, total_pages, ..
        } => ScreenContent::with_keyboard(
            format!("<b>🔔 Notifications</b>\n\nPage {} of {}.", page + 1, total_pages),
            Keyboard::new()
                .row(pager_row("notifications", "feed", page, total_pages))
                .row(vec![Button::new(
                    "✅ Mark all read",
                    &CallbackAction::new("notifications", "read"),
                )])
                .row(nav_row()),
        ),
    };
    d.lifecycle.render_home(session, content).await?;
    Ok(Control::Done)
}

fn card(notification: &Notification) -> ScreenContent {
    ScreenContent::text(format!(
        "{}\n<i>{}</i>",
        escape_html(&notification.text),
        notification.created_at.format("%Y-%m-%d %H:%M"),
    ))
}
