//! Wallet and subscription screens.
//!
//! Top-ups and subscription purchases go through the payments port: an
//! invoice message is sent and tracked under its payment reference, surviving
//! navigation until the gateway callback resolves it.

use super::{AwaitingInput, KEY_AWAITING, nav_row};
use crate::dispatcher::{Control, Dispatcher, NavIntent};
use bazaar_core::BazaarError;
use bazaar_core::action::CallbackAction;
use bazaar_core::domain::{PaymentInvoice, PaymentPurpose, SubscriptionPlan};
use bazaar_core::error::Result;
use bazaar_core::messaging::{Button, Keyboard, ScreenContent};
use bazaar_core::session::Session;
use bazaar_core::types::MessageId;

pub const TOP_UP_MIN: u64 = 1_000;
pub const TOP_UP_MAX: u64 = 1_000_000;

pub(crate) async fn handle(
    d: &Dispatcher,
    session: &mut Session,
    action: &CallbackAction,
) -> Result<Control> {
    match action.action.as_str() {
        "show" => show(d, session).await,
        "topup" => prompt_top_up(d, session).await,
        "subscribe" => subscribe(d, session, action.require_param()?).await,
        other => Err(BazaarError::validation(format!(
            "unknown wallet action '{other}'"
        ))),
    }
}

async fn show(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;

    let wallet = d.services.payments.wallet(session.chat_id).await?;
    let mut text = format!("💰 <b>Wallet</b>\n\nBalance: <b>{}</b>", wallet.balance);
    match &wallet.subscription {
        Some(sub) => text.push_str(&format!(
            "\n⭐ Subscription: {} until {}",
            sub.plan.as_str(),
            sub.expires_at.format("%Y-%m-%d"),
        )),
        None => text.push_str("\n⭐ Subscription: none"),
    }

    let keyboard = Keyboard::new()
        .row(vec![Button::new(
            "➕ Top up",
            &CallbackAction::new("wallet", "topup"),
        )])
        .row(vec![
            Button::new(
                format!("⭐ Basic — {}", SubscriptionPlan::Basic.price()),
                &CallbackAction::with_param("wallet", "subscribe", SubscriptionPlan::Basic.as_str()),
            ),
            Button::new(
                format!("🌟 Pro — {}", SubscriptionPlan::Pro.price()),
                &CallbackAction::with_param("wallet", "subscribe", SubscriptionPlan::Pro.as_str()),
            ),
        ])
        .row(nav_row());

    d.lifecycle
        .render_home(session, ScreenContent::with_keyboard(text, keyboard))
        .await?;
    Ok(Control::Done)
}

async fn prompt_top_up(d: &Dispatcher, session: &mut Session) -> Result<Control> {
    d.lifecycle.clear_temporaries(session).await;
    session.context.put(KEY_AWAITING, &AwaitingInput::TopUpAmount)?;
    d.lifecycle
        .render_home(
            session,
            ScreenContent::with_keyboard(
                format!(
                    "➕ <b>Top up</b>\n\nHow much? Send a number between {TOP_UP_MIN} and {TOP_UP_MAX}."
                ),
                Keyboard::new().row(nav_row()),
            ),
        )
        .await?;
    Ok(Control::Done)
}

/// Consumes the amount the top-up prompt asked for.
pub(crate) async fn handle_top_up_amount(
    d: &Dispatcher,
    session: &mut Session,
    text: &str,
    source: MessageId,
) -> Result<()> {
    d.lifecycle.delete_best_effort(session.chat_id, source).await;

    let digits: String = text
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '_'))
        .collect();
    let amount = match digits.parse::<u64>() {
        Ok(value) if (TOP_UP_MIN..=TOP_UP_MAX).contains(&value) => value,
        _ => {
            // Re-arm the prompt so the next message is still treated as an amount
            session.context.put(KEY_AWAITING, &AwaitingInput::TopUpAmount)?;
            d.notice(
                session,
                &format!("⚠️ Send a whole number between {TOP_UP_MIN} and {TOP_UP_MAX}."),
            )
            .await;
            return Ok(());
        }
    };

    let invoice = d
        .services
        .payments
        .create_invoice(session.chat_id, amount, PaymentPurpose::TopUp)
        .await?;
    send_invoice(d, session, &invoice).await?;

    // Back to the wallet screen the top-up started from
    let target = session.navigation.pop().unwrap_or_else(CallbackAction::home);
    d.route(session, target, NavIntent::Return).await
}

async fn subscribe(d: &Dispatcher, session: &mut Session, plan_raw: &str) -> Result<Control> {
    let plan = SubscriptionPlan::parse(plan_raw).ok_or_else(|| {
        BazaarError::validation(format!("unknown subscription plan '{plan_raw}'"))
    })?;

    let invoice = d
        .services
        .payments
        .create_invoice(
            session.chat_id,
            plan.price(),
            PaymentPurpose::Subscription(plan),
        )
        .await?;
    send_invoice(d, session, &invoice).await?;
    Ok(Control::Done)
}

/// Sends the invoice message and tracks it under its payment reference, so
/// the gateway callback can resolve it however far the user navigates away.
async fn send_invoice(d: &Dispatcher, session: &mut Session, invoice: &PaymentInvoice) -> Result<()> {
    let text = format!(
        "🧾 <b>Invoice</b>\n\nAmount: <b>{}</b>\nPay here: {}\n\nThis message disappears once the payment completes.",
        invoice.amount, invoice.pay_url,
    );
    let id = d
        .lifecycle
        .gateway()
        .send(session.chat_id, ScreenContent::text(text))
        .await?;
    d.lifecycle
        .track_payment(session, invoice.reference.clone(), id);
    tracing::debug!(
        "chat {}: invoice {} issued as message {}",
        session.chat_id,
        invoice.reference,
        id
    );
    Ok(())
}
