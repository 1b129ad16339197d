//! The wizard surface.
//!
//! Renders whichever flow is active onto the home message: one prompt per
//! collection step, an isolated-edit prompt, and the confirmation summary with
//! per-field edit buttons. Finalization hands the completed draft to the
//! owning domain service and redirects to the created entity.

use super::back_to_previous;
use crate::dispatcher::{Control, Dispatcher, NavIntent};
use bazaar_core::BazaarError;
use bazaar_core::action::{CallbackAction, ScreenId};
use bazaar_core::error::Result;
use bazaar_core::markup::escape_html;
use bazaar_core::messaging::{Button, Keyboard, ScreenContent};
use bazaar_core::session::Session;
use bazaar_core::types::{ChatId, MessageId};
use bazaar_core::wizard::{
    ActiveWizard, ApplicationDraft, ApplicationStep, OrderDraft, OrderStep, ProjectDraft,
    ProjectStep, ValidationError, WizardPosition, WizardState, application, order, project,
};

pub(crate) async fn handle_command(
    d: &Dispatcher,
    session: &mut Session,
    action: &CallbackAction,
) -> Result<Control> {
    match action.action.as_str() {
        "cancel" => cancel(d, session).await,
        "confirm" => confirm(d, session).await,
        "edit" => {
            let field = action.require_param()?;
            match session.wizard.as_mut() {
                Some(wizard) => {
                    wizard.enter_edit(field)?;
                    render(d, session).await?;
                }
                None => d.notice(session, "No form is in progress.").await,
            }
            Ok(Control::Done)
        }
        "keep" => {
            if let Some(wizard) = session.wizard.as_mut() {
                wizard.finish_editing();
                render(d, session).await?;
            }
            Ok(Control::Done)
        }
        other => Err(BazaarError::validation(format!(
            "unknown wizard action '{other}'"
        ))),
    }
}

/// Feeds free-text input to the active wizard.
///
/// Consumed input messages are removed from the chat; rejected ones are
/// removed too unless the error is recoverable (over-long text), in which
/// case the user's message stays so they can shorten it and the error notice
/// is deferred-deleted once corrected input arrives.
pub(crate) async fn handle_input(
    d: &Dispatcher,
    session: &mut Session,
    text: &str,
    source: MessageId,
) -> Result<()> {
    let chat_id = session.chat_id;
    let outcome = match session.wizard.as_mut() {
        Some(wizard) => wizard.submit_input(text),
        None => return Ok(()),
    };

    match outcome {
        Ok(stale_notice) => {
            d.lifecycle.delete_best_effort(chat_id, source).await;
            if let Some(stale) = stale_notice {
                d.lifecycle.delete_best_effort(chat_id, stale).await;
            }
            render(d, session).await
        }
        Err(err) => reject_input(d, session, err, source).await,
    }
}

async fn reject_input(
    d: &Dispatcher,
    session: &mut Session,
    err: ValidationError,
    source: MessageId,
) -> Result<()> {
    let chat_id = session.chat_id;
    if !err.keeps_user_input() {
        d.lifecycle.delete_best_effort(chat_id, source).await;
    }

    let notice = d
        .lifecycle
        .gateway()
        .send(chat_id, ScreenContent::text(format!("⚠️ {err}")))
        .await?;
    if err.keeps_user_input() {
        // The notice lives until corrected input arrives
        if let Some(wizard) = session.wizard.as_mut() {
            if let Some(replaced) = wizard.note_rejected_input(notice) {
                d.lifecycle.delete_best_effort(chat_id, replaced).await;
            }
        }
    } else {
        d.lifecycle.track_temporary(session, notice);
    }
    Ok(())
}

async fn cancel(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    if let Some(wizard) = session.wizard.take() {
        tracing::debug!("chat {}: {} cancelled", session.chat_id, wizard.kind());
        if let Some(notice) = wizard.pending_delete() {
            d.lifecycle.delete_best_effort(session.chat_id, notice).await;
        }
    }
    Ok(back_to_previous(session))
}

async fn confirm(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    let Some(wizard) = session.wizard.take() else {
        d.notice(session, "No form is in progress.").await;
        return Ok(Control::Done);
    };
    if !wizard.can_finalize() {
        session.wizard = Some(wizard);
        return Err(BazaarError::validation("the form is not complete yet"));
    }

    match finalize(d, session.chat_id, &wizard).await {
        Ok(target) => Ok(Control::Redirect {
            to: target,
            intent: NavIntent::Return,
        }),
        Err(err) => {
            // Preserved so the user can retry without re-entering anything
            session.wizard = Some(wizard);
            Err(err)
        }
    }
}

/// Hands the completed draft to the owning domain service and returns the
/// screen of the created entity.
async fn finalize(d: &Dispatcher, chat_id: ChatId, wizard: &ActiveWizard) -> Result<ScreenId> {
    let missing = || BazaarError::internal("confirmed form is missing fields");
    match wizard {
        ActiveWizard::Project(state) => {
            let new = state.flow.clone().into_new(chat_id).ok_or_else(missing)?;
            let id = d.services.projects.create(new).await?;
            tracing::info!("chat {}: project {} created", chat_id, id);
            Ok(CallbackAction::with_param("projects", "view", id.to_string()))
        }
        ActiveWizard::Application(state) => {
            let new = state.flow.clone().into_new(chat_id).ok_or_else(missing)?;
            let id = d.services.applications.create(new).await?;
            tracing::info!("chat {}: application {} created", chat_id, id);
            Ok(CallbackAction::with_param("applications", "view", id.to_string()))
        }
        ActiveWizard::Order(state) => {
            let new = state.flow.clone().into_new(chat_id).ok_or_else(missing)?;
            let id = d.services.orders.create(new).await?;
            tracing::info!("chat {}: order {} created", chat_id, id);
            Ok(CallbackAction::with_param("orders", "view", id.to_string()))
        }
    }
}

/// Renders the active wizard's current position onto the home message.
pub(crate) async fn render(d: &Dispatcher, session: &mut Session) -> Result<()> {
    let content = match session.wizard.as_ref() {
        Some(ActiveWizard::Project(state)) => project_screen(state),
        Some(ActiveWizard::Application(state)) => application_screen(state),
        Some(ActiveWizard::Order(state)) => order_screen(state),
        None => return Ok(()),
    };
    d.lifecycle.render_home(session, content).await
}

fn cancel_button() -> Button {
    Button::new("✖️ Cancel", &CallbackAction::new("wizard", "cancel"))
}

fn prompt_screen(title: &str, prompt: String) -> ScreenContent {
    ScreenContent::with_keyboard(
        format!("<b>{title}</b>\n\n{prompt}"),
        Keyboard::new().row(vec![cancel_button()]),
    )
}

fn edit_screen(field_label: &str, prompt: String) -> ScreenContent {
    ScreenContent::with_keyboard(
        format!("✏️ <b>Editing {field_label}</b>\n\n{prompt}"),
        Keyboard::new()
            .row(vec![Button::new(
                "↩️ Keep current value",
                &CallbackAction::new("wizard", "keep"),
            )])
            .row(vec![cancel_button()]),
    )
}

fn edit_button(label: &str, field: &str) -> Button {
    Button::new(
        format!("✏️ {label}"),
        &CallbackAction::with_param("wizard", "edit", field),
    )
}

/// Display helper for not-yet-collected fields; unreachable on confirmation
/// screens, where every field is populated.
fn shown(value: &Option<String>) -> String {
    match value {
        Some(text) => escape_html(text),
        None => "—".to_string(),
    }
}

fn shown_number<N: std::fmt::Display + Copy>(value: &Option<N>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => "—".to_string(),
    }
}

fn project_prompt(step: ProjectStep) -> (usize, String) {
    match step {
        ProjectStep::Title => (
            1,
            format!(
                "Send me the project title ({}–{} characters).",
                project::TITLE_MIN,
                project::TITLE_MAX
            ),
        ),
        ProjectStep::Description => (
            2,
            format!(
                "Describe the work ({}–{} characters).",
                project::DESCRIPTION_MIN,
                project::DESCRIPTION_MAX
            ),
        ),
        ProjectStep::Budget => (
            3,
            format!(
                "What is the budget? Send a number between {} and {}.",
                project::BUDGET_MIN,
                project::BUDGET_MAX
            ),
        ),
        ProjectStep::Duration => (
            4,
            format!(
                "How many days should it take? ({}–{})",
                project::DURATION_MIN,
                project::DURATION_MAX
            ),
        ),
    }
}

fn project_screen(state: &WizardState<ProjectDraft>) -> ScreenContent {
    match state.position() {
        WizardPosition::Collecting { step } => {
            let (n, prompt) = project_prompt(step);
            prompt_screen(&format!("📋 New project — step {n} of 4"), prompt)
        }
        WizardPosition::Editing { step } => {
            let (_, prompt) = project_prompt(step);
            edit_screen(step.as_str(), prompt)
        }
        WizardPosition::Confirmation => {
            let draft = &state.flow;
            let text = format!(
                "📋 <b>New project — confirm</b>\n\n\
                 <b>Title:</b> {}\n\
                 <b>Description:</b> {}\n\
                 <b>Budget:</b> {}\n\
                 <b>Duration:</b> {} days\n\n\
                 Everything correct?",
                shown(&draft.title),
                shown(&draft.description),
                shown_number(&draft.budget),
                shown_number(&draft.duration_days),
            );
            let keyboard = Keyboard::new()
                .row(vec![Button::new(
                    "✅ Post project",
                    &CallbackAction::new("wizard", "confirm"),
                )])
                .row(vec![
                    edit_button("Title", ProjectStep::Title.as_str()),
                    edit_button("Description", ProjectStep::Description.as_str()),
                ])
                .row(vec![
                    edit_button("Budget", ProjectStep::Budget.as_str()),
                    edit_button("Duration", ProjectStep::Duration.as_str()),
                ])
                .row(vec![cancel_button()]);
            ScreenContent::with_keyboard(text, keyboard)
        }
    }
}

fn application_prompt(step: ApplicationStep) -> (usize, String) {
    match step {
        ApplicationStep::CoverLetter => (
            1,
            format!(
                "Why are you the right person? Send a cover letter ({}–{} characters).",
                application::COVER_LETTER_MIN,
                application::COVER_LETTER_MAX
            ),
        ),
        ApplicationStep::Price => (
            2,
            format!(
                "What is your price? Send a number between {} and {}.",
                application::PRICE_MIN,
                application::PRICE_MAX
            ),
        ),
        ApplicationStep::DeliveryDays => (
            3,
            format!(
                "How many days until delivery? ({}–{})",
                application::DELIVERY_MIN,
                application::DELIVERY_MAX
            ),
        ),
    }
}

fn application_screen(state: &WizardState<ApplicationDraft>) -> ScreenContent {
    match state.position() {
        WizardPosition::Collecting { step } => {
            let (n, prompt) = application_prompt(step);
            prompt_screen(&format!("📝 New application — step {n} of 3"), prompt)
        }
        WizardPosition::Editing { step } => {
            let (_, prompt) = application_prompt(step);
            edit_screen(step.as_str().replace('_', " ").as_str(), prompt)
        }
        WizardPosition::Confirmation => {
            let draft = &state.flow;
            let text = format!(
                "📝 <b>New application — confirm</b>\n\n\
                 <b>Cover letter:</b> {}\n\
                 <b>Price:</b> {}\n\
                 <b>Delivery:</b> {} days\n\n\
                 Everything correct?",
                shown(&draft.cover_letter),
                shown_number(&draft.price),
                shown_number(&draft.delivery_days),
            );
            let keyboard = Keyboard::new()
                .row(vec![Button::new(
                    "✅ Submit application",
                    &CallbackAction::new("wizard", "confirm"),
                )])
                .row(vec![
                    edit_button("Cover letter", ApplicationStep::CoverLetter.as_str()),
                    edit_button("Price", ApplicationStep::Price.as_str()),
                ])
                .row(vec![
                    edit_button("Delivery", ApplicationStep::DeliveryDays.as_str()),
                    cancel_button(),
                ]);
            ScreenContent::with_keyboard(text, keyboard)
        }
    }
}

fn order_prompt(step: OrderStep) -> (usize, String) {
    match step {
        OrderStep::Amount => (
            1,
            format!(
                "How much should be held in escrow? Send a number between {} and {}.",
                order::AMOUNT_MIN,
                order::AMOUNT_MAX
            ),
        ),
        OrderStep::Terms => (
            2,
            format!(
                "State the terms of the order ({}–{} characters).",
                order::TERMS_MIN,
                order::TERMS_MAX
            ),
        ),
    }
}

fn order_screen(state: &WizardState<OrderDraft>) -> ScreenContent {
    match state.position() {
        WizardPosition::Collecting { step } => {
            let (n, prompt) = order_prompt(step);
            prompt_screen(&format!("🔒 New escrow order — step {n} of 2"), prompt)
        }
        WizardPosition::Editing { step } => {
            let (_, prompt) = order_prompt(step);
            edit_screen(step.as_str(), prompt)
        }
        WizardPosition::Confirmation => {
            let draft = &state.flow;
            let text = format!(
                "🔒 <b>New escrow order — confirm</b>\n\n\
                 <b>Amount:</b> {}\n\
                 <b>Terms:</b> {}\n\n\
                 The amount is taken from your wallet and held until the work\n\
                 is accepted. Everything correct?",
                shown_number(&draft.amount),
                shown(&draft.terms),
            );
            let keyboard = Keyboard::new()
                .row(vec![Button::new(
                    "✅ Open order",
                    &CallbackAction::new("wizard", "confirm"),
                )])
                .row(vec![
                    edit_button("Amount", OrderStep::Amount.as_str()),
                    edit_button("Terms", OrderStep::Terms.as_str()),
                ])
                .row(vec![cancel_button()]);
            ScreenContent::with_keyboard(text, keyboard)
        }
    }
}
