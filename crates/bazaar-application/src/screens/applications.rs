//! Application screens: the chat's own submitted applications.

use super::{nav_row, page_param, pager_row, snippet};
use crate::dispatcher::{Control, Dispatcher};
use bazaar_core::BazaarError;
use bazaar_core::action::CallbackAction;
use bazaar_core::domain::{ApplicationStatus, ApplicationSummary};
use bazaar_core::error::Result;
use bazaar_core::markup::escape_html;
use bazaar_core::messaging::{Button, Keyboard, ScreenContent};
use bazaar_core::pagination::{EntityKind, PageDirective, PageOutcome, PageSeed, PageView, Paginator};
use bazaar_core::session::Session;
use bazaar_core::types::EntityId;

pub(crate) async fn handle(
    d: &Dispatcher,
    session: &mut Session,
    action: &CallbackAction,
) -> Result<Control> {
    match action.action.as_str() {
        "mine" => list(d, session, PageDirective::Init).await,
        "page" => {
            let (_, directive) = page_param(action)?;
            list(d, session, directive).await
        }
        "view" => view(d, session, action.entity_param()?).await,
        other => Err(BazaarError::validation(format!(
            "unknown applications action '{other}'"
        ))),
    }
}

fn status_label(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "⏳ pending",
        ApplicationStatus::Accepted => "✅ accepted",
        ApplicationStatus::Declined => "❌ declined",
    }
}

async fn list(d: &Dispatcher, session: &mut Session, directive: PageDirective) -> Result<Control> {
    let seed = match directive {
        PageDirective::Init => Some(PageSeed {
            entity_kind: EntityKind::Application,
            ids: d.services.applications.submitted_by(session.chat_id).await?,
            page_size: d.config.page_size,
        }),
        _ => None,
    };

    let gateway = d.lifecycle.gateway();
    let applications = d.services.applications.clone();
    let chat_id = session.chat_id;
    let outcome = Paginator::new(&d.lifecycle)
        .render(session, "mine", directive, seed, move |view: PageView| async move {
            let mut produced = Vec::with_capacity(view.ids.len());
            for id in view.ids {
                if let Some(application) = applications.get(id).await? {
                    produced.push(gateway.send(chat_id, card(&application)).await?);
                }
            }
            Ok(produced)
        })
        .await?;

    let content = match outcome {
        PageOutcome::NoResults => ScreenContent::with_keyboard(
            "<b>📨 My applications</b>\n\nYou have not applied to anything yet.".to_string(),
            Keyboard::new().row(nav_row()),
        ),
        PageOutcome::Rendered {
            page, total_pages, ..
        } => ScreenContent::with_keyboard(
            format!("<b>📨 My applications</b>\n\nPage {} of {}.", page + 1, total_pages),
            Keyboard::new()
                .row(pager_row("applications", "mine", page, total_pages))
                .row(nav_row()),
        ),
    };
    d.lifecycle.render_home(session, content).await?;
    Ok(Control::Done)
}

fn card(application: &ApplicationSummary) -> ScreenContent {
    let text = format!(
        "{}\n\n💵 {} • 🚚 {} days • {}",
        escape_html(&snippet(&application.cover_letter, 120)),
        application.price,
        application.delivery_days,
        status_label(application.status),
    );
    let keyboard = Keyboard::new().row(vec![Button::new(
        "👁 View",
        &CallbackAction::with_param("applications", "view", application.id.to_string()),
    )]);
    ScreenContent::with_keyboard(text, keyboard)
}

async fn view(d: &Dispatcher, session: &mut Session, id: EntityId) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;

    let Some(application) = d.services.applications.get(id).await? else {
        d.lifecycle
            .render_home(
                session,
                ScreenContent::with_keyboard(
                    "😕 This application is no longer available.".to_string(),
                    Keyboard::new().row(nav_row()),
                ),
            )
            .await?;
        return Ok(Control::Done);
    };

    let text = format!(
        "<b>📨 Application #{}</b>\n\n{}\n\n💵 Price: {}\n🚚 Delivery: {} days\n📌 Status: {}",
        application.id,
        escape_html(&application.cover_letter),
        application.price,
        application.delivery_days,
        status_label(application.status),
    );

    let mut keyboard = Keyboard::new().row(vec![Button::new(
        "📁 Project",
        &CallbackAction::with_param("projects", "view", application.project_id.to_string()),
    )]);
    if application.status == ApplicationStatus::Accepted {
        keyboard = keyboard.row(vec![Button::new(
            "🔒 Open escrow order",
            &CallbackAction::with_param("orders", "create", application.id.to_string()),
        )]);
    }
    keyboard = keyboard.row(nav_row());

    d.lifecycle
        .render_home(session, ScreenContent::with_keyboard(text, keyboard))
        .await?;
    Ok(Control::Done)
}
