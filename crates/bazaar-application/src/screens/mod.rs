//! Screen handlers.
//!
//! One module per namespace. Every handler renders through the lifecycle
//! manager: temporaries are swept before a screen produces its own, and the
//! home message is only ever edited.

pub(crate) mod applications;
pub(crate) mod home;
pub(crate) mod notifications;
pub(crate) mod orders;
pub(crate) mod projects;
pub(crate) mod wallet;
pub(crate) mod wizard;

use crate::dispatcher::{Control, NavIntent};
use bazaar_core::BazaarError;
use bazaar_core::action::CallbackAction;
use bazaar_core::error::Result;
use bazaar_core::messaging::Button;
use bazaar_core::pagination::PageDirective;
use bazaar_core::session::Session;
use serde::{Deserialize, Serialize};

/// Context-bag key for the awaiting-free-text flag.
pub(crate) const KEY_AWAITING: &str = "awaiting_input";

/// What kind of free-text input the current screen is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AwaitingInput {
    SearchQuery,
    TopUpAmount,
}

/// Actions that run against the current screen without being one: they touch
/// neither navigation history nor the context bag.
pub(crate) fn is_command(action: &CallbackAction) -> bool {
    matches!(
        (action.namespace.as_str(), action.action.as_str()),
        ("notifications", "read") | ("wallet", "subscribe")
    )
}

/// The standard back/home row every non-home screen carries.
pub(crate) fn nav_row() -> Vec<Button> {
    vec![
        Button::new("⬅️ Back", &CallbackAction::new("nav", "back")),
        Button::new("🏠 Home", &CallbackAction::new("nav", "home")),
    ]
}

/// Pager controls for a list screen: prev/next around a current-page counter
/// that fires a redraw of the current page.
pub(crate) fn pager_row(
    namespace: &str,
    key: &str,
    page: usize,
    total_pages: usize,
) -> Vec<Button> {
    let mut row = Vec::new();
    if page > 0 {
        row.push(Button::new(
            "⬅️",
            &CallbackAction::with_param(namespace, "page", format!("{key}:prev")),
        ));
    }
    row.push(Button::new(
        format!("{} / {}", page + 1, total_pages),
        &CallbackAction::with_param(namespace, "page", format!("{key}:current")),
    ));
    if page + 1 < total_pages {
        row.push(Button::new(
            "➡️",
            &CallbackAction::with_param(namespace, "page", format!("{key}:next")),
        ));
    }
    row
}

/// Splits a pagination action parameter (`<context-key>:<directive>`).
pub(crate) fn page_param(action: &CallbackAction) -> Result<(&str, PageDirective)> {
    let tail = action.require_param()?;
    let (key, directive) = tail.rsplit_once(':').ok_or_else(|| {
        BazaarError::validation(format!("malformed pagination parameter '{tail}'"))
    })?;
    let directive = PageDirective::parse(directive).ok_or_else(|| {
        BazaarError::validation(format!("unknown pagination directive '{directive}'"))
    })?;
    Ok((key, directive))
}

/// Redirect back to the previous screen (or home when there is none),
/// popping the frame the current transition pushed.
pub(crate) fn back_to_previous(session: &mut Session) -> Control {
    let target = session.navigation.pop().unwrap_or_else(CallbackAction::home);
    Control::Redirect {
        to: target,
        intent: NavIntent::Return,
    }
}

/// Shortens card text to `max` characters on a character boundary.
pub(crate) fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_param_splits_key_and_directive() {
        let action = CallbackAction::with_param("projects", "page", "browse:next");
        let (key, directive) = page_param(&action).unwrap();
        assert_eq!(key, "browse");
        assert_eq!(directive, PageDirective::Next);
    }

    #[test]
    fn test_page_param_rejects_garbage() {
        let action = CallbackAction::with_param("projects", "page", "browse");
        assert!(page_param(&action).is_err());

        let action = CallbackAction::with_param("projects", "page", "browse:sideways");
        assert!(page_param(&action).is_err());
    }

    #[test]
    fn test_pager_row_hides_edge_arrows() {
        let first = pager_row("projects", "browse", 0, 3);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].label, "1 / 3");

        let middle = pager_row("projects", "browse", 1, 3);
        assert_eq!(middle.len(), 3);

        let last = pager_row("projects", "browse", 2, 3);
        assert_eq!(last.len(), 2);
    }

    #[test]
    fn test_snippet_preserves_short_text() {
        assert_eq!(snippet("short", 10), "short");
        assert!(snippet(&"long ".repeat(50), 20).ends_with('…'));
    }
}
