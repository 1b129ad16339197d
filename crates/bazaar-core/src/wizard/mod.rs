//! Stepped data-collection wizards.
//!
//! One generic state machine ([`WizardState`]) drives three concrete flows:
//! project creation, application creation and order creation. Each flow walks
//! an ordered sequence of field steps, reaches a confirmation screen once
//! every field is collected, and allows editing any single field from
//! confirmation before finalizing.

pub mod application;
mod fields;
pub mod order;
pub mod project;
mod state;

// Re-export public API
pub use application::{ApplicationDraft, ApplicationStep};
pub use order::{OrderDraft, OrderStep};
pub use project::{ProjectDraft, ProjectStep};
pub use state::{
    SubmitOutcome, SubmitProgress, ValidationError, WizardFlow, WizardPosition, WizardState,
};

use crate::types::{ChatId, MessageId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which flow a wizard instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardKind {
    Project,
    Application,
    Order,
}

impl fmt::Display for WizardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Project => "project creation",
            Self::Application => "application creation",
            Self::Order => "order creation",
        };
        write!(f, "{label}")
    }
}

/// The at-most-one wizard a session may be running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum ActiveWizard {
    Project(WizardState<ProjectDraft>),
    Application(WizardState<ApplicationDraft>),
    Order(WizardState<OrderDraft>),
}

impl ActiveWizard {
    /// Starts a project-creation wizard.
    pub fn project(chat_id: ChatId) -> Self {
        Self::Project(WizardState::start(chat_id, ProjectDraft::default()))
    }

    /// Starts an application-creation wizard targeting `project_id`.
    pub fn application(chat_id: ChatId, project_id: crate::types::EntityId) -> Self {
        Self::Application(WizardState::start(
            chat_id,
            ApplicationDraft::for_project(project_id),
        ))
    }

    /// Starts an order-creation wizard backed by an accepted application.
    pub fn order(chat_id: ChatId, application_id: crate::types::EntityId) -> Self {
        Self::Order(WizardState::start(
            chat_id,
            OrderDraft::for_application(application_id),
        ))
    }

    pub fn kind(&self) -> WizardKind {
        match self {
            Self::Project(_) => WizardKind::Project,
            Self::Application(_) => WizardKind::Application,
            Self::Order(_) => WizardKind::Order,
        }
    }

    pub fn at_confirmation(&self) -> bool {
        match self {
            Self::Project(state) => state.at_confirmation(),
            Self::Application(state) => state.at_confirmation(),
            Self::Order(state) => state.at_confirmation(),
        }
    }

    /// Whether `finalize` may run: confirmation reached and nothing missing.
    pub fn can_finalize(&self) -> bool {
        match self {
            Self::Project(state) => state.can_finalize(),
            Self::Application(state) => state.can_finalize(),
            Self::Order(state) => state.can_finalize(),
        }
    }

    pub fn pending_delete(&self) -> Option<MessageId> {
        match self {
            Self::Project(state) => state.pending_delete(),
            Self::Application(state) => state.pending_delete(),
            Self::Order(state) => state.pending_delete(),
        }
    }

    /// Feeds text input to whichever flow is running; on success returns the
    /// stale validation notice to clean up, if one was pending.
    pub fn submit_input(
        &mut self,
        raw: &str,
    ) -> std::result::Result<Option<MessageId>, ValidationError> {
        match self {
            Self::Project(state) => state.submit_input(raw).map(|o| o.cleanup),
            Self::Application(state) => state.submit_input(raw).map(|o| o.cleanup),
            Self::Order(state) => state.submit_input(raw).map(|o| o.cleanup),
        }
    }

    /// Jumps to the named field for single-field editing. Only legal from
    /// confirmation; unknown field identifiers are a validation error.
    pub fn enter_edit(&mut self, field: &str) -> crate::error::Result<()> {
        let unknown =
            || crate::BazaarError::validation(format!("unknown wizard field '{field}'"));
        match self {
            Self::Project(state) => {
                state.enter_edit(ProjectStep::parse(field).ok_or_else(unknown)?)
            }
            Self::Application(state) => {
                state.enter_edit(ApplicationStep::parse(field).ok_or_else(unknown)?)
            }
            Self::Order(state) => state.enter_edit(OrderStep::parse(field).ok_or_else(unknown)?),
        }
    }

    /// Records a validation notice for deferred deletion, returning the one
    /// it replaces.
    pub fn note_rejected_input(&mut self, notice: MessageId) -> Option<MessageId> {
        match self {
            Self::Project(state) => state.note_rejected_input(notice),
            Self::Application(state) => state.note_rejected_input(notice),
            Self::Order(state) => state.note_rejected_input(notice),
        }
    }

    /// Leaves single-field editing without submitting anything.
    pub fn finish_editing(&mut self) {
        match self {
            Self::Project(state) => state.finish_editing(),
            Self::Application(state) => state.finish_editing(),
            Self::Order(state) => state.finish_editing(),
        }
    }
}
