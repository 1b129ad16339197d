//! Order screens: escrow orders placed by this chat.

use super::{back_to_previous, nav_row, page_param, pager_row, snippet};
use crate::dispatcher::{Control, Dispatcher};
use crate::screens::wizard;
use bazaar_core::BazaarError;
use bazaar_core::action::CallbackAction;
use bazaar_core::domain::{ApplicationStatus, OrderStatus, OrderSummary};
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
        "mine" => list(d, session, PageDirective::Init).await,
        "page" => {
            let (_, directive) = page_param(action)?;
            list(d, session, directive).await
        }
        "view" => view(d, session, action.entity_param()?).await,
        "create" => create(d, session, action.entity_param()?).await,
        other => Err(BazaarError::validation(format!(
            "unknown orders action '{other}'"
        ))),
    }
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::EscrowHeld => "🔒 escrow held",
        OrderStatus::Released => "✅ released",
        OrderStatus::Refunded => "↩️ refunded",
    }
}

async fn list(d: &Dispatcher, session: &mut Session, directive: PageDirective) -> Result<Control> {
    let seed = match directive {
        PageDirective::Init => Some(PageSeed {
            entity_kind: EntityKind::Order,
            ids: d.services.orders.placed_by(session.chat_id).await?,
            page_size: d.config.page_size,
        }),
        _ => None,
    };

    let gateway = d.lifecycle.gateway();
    let orders = d.services.orders.clone();
    let chat_id = session.chat_id;
    let outcome = Paginator::new(&d.lifecycle)
        .render(session, "mine", directive, seed, move |view: PageView| async move {
            let mut produced = Vec::with_capacity(view.ids.len());
            for id in view.ids {
                if let Some(order) = orders.get(id).await? {
                    produced.push(gateway.send(chat_id, card(&order)).await?);
                }
            }
            Ok(produced)
        })
        .await?;

    let content = match outcome {
        PageOutcome::NoResults => ScreenContent::with_keyboard(
            "<b>📦 My orders</b>\n\nYou have no orders yet.".to_string(),
            Keyboard::new().row(nav_row()),
        ),
        PageOutcome::Rendered {
            page, total_pages, ..
        } => ScreenContent::with_keyboard(
            format!("<b>📦 My orders</b>\n\nPage {} of {}.", page + 1, total_pages),
            Keyboard::new()
                .row(pager_row("orders", "mine", page, total_pages))
                .row(nav_row()),
        ),
    };
    d.lifecycle.render_home(session, content).await?;
    Ok(Control::Done)
}

fn card(order: &OrderSummary) -> ScreenContent {
    let text = format!(
        "<b>Order #{}</b>\n{}\n\n💵 {} • {}",
        order.id,
        escape_html(&snippet(&order.terms, 120)),
        order.amount,
        status_label(order.status),
    );
    let keyboard = Keyboard::new().row(vec![Button::new(
        "👁 View",
        &CallbackAction::with_param("orders", "view", order.id.to_string()),
    )]);
    ScreenContent::with_keyboard(text, keyboard)
}

async fn view(d: &Dispatcher, session: &mut Session, id: EntityId) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;

    let Some(order) = d.services.orders.get(id).await? else {
        d.lifecycle
            .render_home(
                session,
                ScreenContent::with_keyboard(
                    "😕 This order is no longer available.".to_string(),
                    Keyboard::new().row(nav_row()),
                ),
            )
            .await?;
        return Ok(Control::Done);
    };

    let text = format!(
        "<b>📦 Order #{}</b>\n\n{}\n\n💵 Amount: {}\n📌 Status: {}",
        order.id,
        escape_html(&order.terms),
        order.amount,
        status_label(order.status),
    );
    let keyboard = Keyboard::new()
        .row(vec![Button::new(
            "📨 Application",
            &CallbackAction::with_param("applications", "view", order.application_id.to_string()),
        )])
        .row(nav_row());

    d.lifecycle
        .render_home(session, ScreenContent::with_keyboard(text, keyboard))
        .await?;
    Ok(Control::Done)
}

/// Starts the order wizard for an accepted application.
async fn create(d: &Dispatcher, session: &mut Session, application_id: EntityId) -> Result<Control> {
    let Some(application) = d.services.applications.get(application_id).await? else {
        d.notice(session, "This application is no longer available.").await;
        return Ok(back_to_previous(session));
    };
    if application.status != ApplicationStatus::Accepted {
        d.notice(session, "Only accepted applications can be ordered.").await;
        return Ok(back_to_previous(session));
    }

    if !d
        .start_wizard(session, ActiveWizard::order(session.chat_id, application_id))
        .await?
    {
        return Ok(back_to_previous(session));
    }
    d.lifecycle.clear_temporaries(session).await;
    wizard::render(d, session).await?;
    Ok(Control::Done)
}
