//! Project screens: browsing, searching, posting, applying.

use super::{AwaitingInput, KEY_AWAITING, back_to_previous, nav_row, page_param, pager_row, snippet};
use crate::dispatcher::{Control, Dispatcher};
use crate::screens::wizard;
use bazaar_core::BazaarError;
use bazaar_core::action::CallbackAction;
use bazaar_core::domain::{ProjectStatus, ProjectSummary};
use bazaar_core::error::Result;
use bazaar_core::markup::escape_html;
use bazaar_core::messaging::{Button, Keyboard, ScreenContent};
use bazaar_core::pagination::{EntityKind, PageDirective, PageOutcome, PageSeed, PageView, Paginator};
use bazaar_core::session::Session;
use bazaar_core::types::EntityId;
use bazaar_core::wizard::ActiveWizard;

pub(crate) async fn handle(
    d: &Dispatcher,
    session: &mut Session,
    action: &CallbackAction,
) -> Result<Control> {
    match action.action.as_str() {
        "browse" => list(d, session, "browse", PageDirective::Init).await,
        "mine" => list(d, session, "mine", PageDirective::Init).await,
        "results" => list(d, session, "search", PageDirective::Init).await,
        "page" => {
            let (key, directive) = page_param(action)?;
            let key = key.to_string();
            list(d, session, &key, directive).await
        }
        "search" => prompt_search(d, session).await,
        "view" => view(d, session, action.entity_param()?).await,
        "create" => create(d, session).await,
        "apply" => apply(d, session, action.entity_param()?).await,
        other => Err(BazaarError::validation(format!(
            "unknown projects action '{other}'"
        ))),
    }
}

fn listing_title(key: &str) -> &'static str {
    match key {
        "mine" => "📂 My projects",
        "search" => "🔍 Search results",
        _ => "🔎 Open projects",
    }
}

fn empty_listing_text(key: &str) -> &'static str {
    match key {
        "mine" => "You have not posted any projects yet.",
        "search" => "Nothing matched your search.",
        _ => "There are no open projects right now.",
    }
}

/// Ordered ids for a fresh listing. The search key reads its query from the
/// current screen's parameter, so redrawing the screen re-runs the search.
async fn listing_ids(d: &Dispatcher, session: &Session, key: &str) -> Result<Vec<EntityId>> {
    match key {
        "mine" => d.services.projects.owned_by(session.chat_id).await,
        "search" => {
            let query = session
                .current_screen
                .param
                .clone()
                .unwrap_or_default();
            d.services.projects.search(&query).await
        }
        _ => d.services.projects.open_projects().await,
    }
}

async fn list(
    d: &Dispatcher,
    session: &mut Session,
    key: &str,
    directive: PageDirective,
) -> Result<Control> {
    let seed = match directive {
        PageDirective::Init => Some(PageSeed {
            entity_kind: EntityKind::Project,
            ids: listing_ids(d, session, key).await?,
            page_size: d.config.page_size,
        }),
        _ => None,
    };

    let gateway = d.lifecycle.gateway();
    let projects = d.services.projects.clone();
    let chat_id = session.chat_id;
    let outcome = Paginator::new(&d.lifecycle)
        .render(session, key, directive, seed, move |view: PageView| async move {
            let mut produced = Vec::with_capacity(view.ids.len());
            for id in view.ids {
                if let Some(project) = projects.get(id).await? {
                    produced.push(gateway.send(chat_id, card(&project)).await?);
                }
            }
            Ok(produced)
        })
        .await?;

    let content = match outcome {
        PageOutcome::NoResults => ScreenContent::with_keyboard(
            format!("<b>{}</b>\n\n{}", listing_title(key), empty_listing_text(key)),
            Keyboard::new().row(nav_row()),
        ),
        PageOutcome::Rendered {
            page, total_pages, ..
        } => ScreenContent::with_keyboard(
            format!("<b>{}</b>\n\nPage {} of {}.", listing_title(key), page + 1, total_pages),
            Keyboard::new()
                .row(pager_row("projects", key, page, total_pages))
                .row(nav_row()),
        ),
    };
    d.lifecycle.render_home(session, content).await?;
    Ok(Control::Done)
}

fn card(project: &ProjectSummary) -> ScreenContent {
    let text = format!(
        "<b>{}</b>\n{}\n\n💵 {} • ⏱ {} days",
        escape_html(&project.title),
        escape_html(&snippet(&project.description, 160)),
        project.budget,
        project.duration_days,
    );
    let keyboard = Keyboard::new().row(vec![Button::new(
        "👁 View",
        &CallbackAction::with_param("projects", "view", project.id.to_string()),
    )]);
    ScreenContent::with_keyboard(text, keyboard)
}

async fn prompt_search(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;
    session.context.put(KEY_AWAITING, &AwaitingInput::SearchQuery)?;
    d.lifecycle
        .render_home(
            session,
            ScreenContent::with_keyboard(
                "🔍 Send me a search query as a message.".to_string(),
                Keyboard::new().row(nav_row()),
            ),
        )
        .await?;
    Ok(Control::Done)
}

async fn view(d: &Dispatcher, session: &mut Session, id: EntityId) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;

    let Some(project) = d.services.projects.get(id).await? else {
        d.lifecycle
            .render_home(
                session,
                ScreenContent::with_keyboard(
                    "😕 This project is no longer available.".to_string(),
                    Keyboard::new().row(nav_row()),
                ),
            )
            .await?;
        return Ok(Control::Done);
    };

    let status = match project.status {
        ProjectStatus::Open => "open",
        ProjectStatus::InProgress => "in progress",
        ProjectStatus::Completed => "completed",
        ProjectStatus::Cancelled => "cancelled",
    };
    let text = format!(
        "<b>{}</b>\n\n{}\n\n💵 Budget: {}\n⏱ Duration: {} days\n📌 Status: {}",
        escape_html(&project.title),
        escape_html(&project.description),
        project.budget,
        project.duration_days,
        status,
    );

    let mut keyboard = Keyboard::new();
    if project.owner != session.chat_id && project.status == ProjectStatus::Open {
        keyboard = keyboard.row(vec![Button::new(
            "📝 Apply",
            &CallbackAction::with_param("projects", "apply", project.id.to_string()),
        )]);
    }
    keyboard = keyboard.row(nav_row());

    d.lifecycle
        .render_home(session, ScreenContent::with_keyboard(text, keyboard))
        .await?;
    Ok(Control::Done)
}

async fn create(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    if !d
        .start_wizard(session, ActiveWizard::project(session.chat_id))
        .await?
    {
        return Ok(back_to_previous(session));
    }
    d.lifecycle.clear_temporaries(session).await;
    wizard::render(d, session).await?;
    Ok(Control::Done)
}

async fn apply(d: &Dispatcher, session: &mut Session, project_id: EntityId) -> Result<Control> {
    let Some(project) = d.services.projects.get(project_id).await? else {
        d.lifecycle.clear_temporaries(session).await;
        d.lifecycle
            .render_home(
                session,
                ScreenContent::with_keyboard(
                    "😕 This project is no longer available.".to_string(),
                    Keyboard::new().row(nav_row()),
                ),
            )
            .await?;
        return Ok(Control::Done);
    };

    if project.owner == session.chat_id {
        d.notice(session, "You cannot apply to your own project.").await;
        return Ok(back_to_previous(session));
    }
    if project.status != ProjectStatus::Open {
        d.notice(session, "This project is not accepting applications.").await;
        return Ok(back_to_previous(session));
    }

    if !d
        .start_wizard(
            session,
            ActiveWizard::application(session.chat_id, project_id),
        )
        .await?
    {
        return Ok(back_to_previous(session));
    }
    d.lifecycle.clear_temporaries(session).await;
    wizard::render(d, session).await?;
    Ok(Control::Done)
}
