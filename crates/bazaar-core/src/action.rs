//! The structured-action grammar.
//!
//! Every button press arrives as an opaque `namespace:action:parameter` string
//! and every logical screen is identified by the same triple, so one type
//! covers both. The parameter is the unsplit tail after the second separator
//! and may itself contain separators (search queries, compound pagination
//! parameters).

use crate::error::{BazaarError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the namespace, action and parameter segments.
pub const SEPARATOR: char = ':';

/// A parsed `namespace:action:parameter?` descriptor.
///
/// Doubles as the identifier of a logical screen (see [`ScreenId`]): a screen
/// is whatever a structured action renders, independent of which messages
/// currently display it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackAction {
    pub namespace: String,
    pub action: String,
    pub param: Option<String>,
}

/// Identifier of a logical screen: the `(namespace, action, parameter)` triple.
pub type ScreenId = CallbackAction;

impl CallbackAction {
    pub fn new(namespace: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            action: action.into(),
            param: None,
        }
    }

    pub fn with_param(
        namespace: impl Into<String>,
        action: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            action: action.into(),
            param: Some(param.into()),
        }
    }

    /// The home screen every session starts on and falls back to.
    pub fn home() -> Self {
        Self::new("home", "show")
    }

    /// Parses a raw action descriptor.
    ///
    /// Splits on the first two separators only; everything after the second
    /// separator is kept as one opaque parameter tail.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = raw.splitn(3, SEPARATOR);
        let namespace = segments.next().unwrap_or_default();
        let action = segments.next().unwrap_or_default();
        if namespace.is_empty() || action.is_empty() {
            return Err(BazaarError::validation(format!(
                "malformed action descriptor '{raw}'"
            )));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            action: action.to_string(),
            param: segments.next().map(str::to_string),
        })
    }

    /// Encodes the descriptor back into its wire form.
    pub fn encode(&self) -> String {
        match &self.param {
            Some(param) => format!(
                "{}{SEPARATOR}{}{SEPARATOR}{param}",
                self.namespace, self.action
            ),
            None => format!("{}{SEPARATOR}{}", self.namespace, self.action),
        }
    }

    /// The parameter tail, or a validation error naming the action.
    pub fn require_param(&self) -> Result<&str> {
        self.param.as_deref().ok_or_else(|| {
            BazaarError::validation(format!(
                "action '{}:{}' requires a parameter",
                self.namespace, self.action
            ))
        })
    }

    /// The parameter tail parsed as an entity id.
    pub fn entity_param(&self) -> Result<i64> {
        let raw = self.require_param()?;
        raw.parse().map_err(|_| {
            BazaarError::validation(format!("'{raw}' is not a valid entity id"))
        })
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
