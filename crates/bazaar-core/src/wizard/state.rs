//! Generic wizard state machine.

use super::WizardKind;
use crate::error::{BazaarError, Result};
use crate::types::{ChatId, MessageId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Field-level rejection of user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input cannot be salvaged (wrong shape, out of range); the
    /// offending message is deleted immediately.
    #[error("{0}")]
    Rejected(String),
    /// The input is usable but too long; the user's message is kept so they
    /// can shorten it, and the error notice is removed once corrected input
    /// arrives.
    #[error("{0}")]
    TooLong(String),
}

impl ValidationError {
    /// Whether the user's offending message should stay in the chat.
    pub fn keeps_user_input(&self) -> bool {
        matches!(self, Self::TooLong(_))
    }
}

impl From<ValidationError> for BazaarError {
    fn from(err: ValidationError) -> Self {
        BazaarError::Validation(err.to_string())
    }
}

/// One concrete data-collection flow: an ordered set of field steps plus the
/// validation/coercion rules for each.
pub trait WizardFlow: Sized + Send + Sync {
    /// Flow-specific step enumeration.
    type Step: Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    const KIND: WizardKind;

    fn first_step() -> Self::Step;

    /// The step following `step` in collection order, or `None` when `step`
    /// is the last field before confirmation.
    fn step_after(step: Self::Step) -> Option<Self::Step>;

    /// Validates and stores one field.
    fn submit(&mut self, step: Self::Step, input: &str) -> std::result::Result<(), ValidationError>;

    /// A flow is complete iff every required field is populated.
    fn is_complete(&self) -> bool;
}

/// Where a wizard currently stands.
///
/// Single-field editing is its own variant rather than a flag: an editing
/// wizard is by construction on a data step, never on confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WizardPosition<S> {
    /// Collecting fields in order.
    Collecting { step: S },
    /// Editing one field in isolation; finishes back at confirmation.
    Editing { step: S },
    /// Every field collected; awaiting confirm, edit or cancel.
    Confirmation,
}

/// How a successful submission moved the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitProgress<S> {
    /// Advanced to the next field in collection order.
    Advanced { next: S },
    /// The last field was collected; the flow is now complete.
    ReachedConfirmation,
    /// A single-field edit finished.
    ReturnedToConfirmation,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome<S> {
    pub progress: SubmitProgress<S>,
    /// Stale validation notice to remove now that valid input arrived.
    pub cleanup: Option<MessageId>,
}

/// Generic wizard instance: a flow plus its position and bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "F: Serialize", deserialize = "F: DeserializeOwned"))]
pub struct WizardState<F: WizardFlow> {
    pub chat_id: ChatId,
    pub flow: F,
    position: WizardPosition<F::Step>,
    pending_delete: Option<MessageId>,
}

impl<F: WizardFlow> WizardState<F> {
    /// Begins a flow at its first step.
    pub fn start(chat_id: ChatId, flow: F) -> Self {
        Self {
            chat_id,
            flow,
            position: WizardPosition::Collecting {
                step: F::first_step(),
            },
            pending_delete: None,
        }
    }

    pub fn kind(&self) -> WizardKind {
        F::KIND
    }

    pub fn position(&self) -> WizardPosition<F::Step> {
        self.position
    }

    /// The step currently awaiting input, if any.
    pub fn current_step(&self) -> Option<F::Step> {
        match self.position {
            WizardPosition::Collecting { step } | WizardPosition::Editing { step } => Some(step),
            WizardPosition::Confirmation => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.position, WizardPosition::Editing { .. })
    }

    pub fn at_confirmation(&self) -> bool {
        matches!(self.position, WizardPosition::Confirmation)
    }

    pub fn is_complete(&self) -> bool {
        self.flow.is_complete()
    }

    /// Whether `finalize` may run: confirmation reached and nothing missing.
    pub fn can_finalize(&self) -> bool {
        self.at_confirmation() && self.is_complete()
    }

    pub fn pending_delete(&self) -> Option<MessageId> {
        self.pending_delete
    }

    /// Records a validation notice to delete once the next valid input
    /// arrives, replacing (and returning) any previously recorded one.
    pub fn note_rejected_input(&mut self, notice: MessageId) -> Option<MessageId> {
        self.pending_delete.replace(notice)
    }

    /// Feeds one raw text input into the current step.
    ///
    /// On success the field is stored, any pending validation notice is
    /// surrendered for cleanup, and the wizard advances — to the next field,
    /// or to confirmation when the flow is complete or an edit finished.
    pub fn submit_input(
        &mut self,
        raw: &str,
    ) -> std::result::Result<SubmitOutcome<F::Step>, ValidationError> {
        let (step, editing) = match self.position {
            WizardPosition::Collecting { step } => (step, false),
            WizardPosition::Editing { step } => (step, true),
            WizardPosition::Confirmation => {
                return Err(ValidationError::Rejected(
                    "not expecting text input here — use the buttons below".to_string(),
                ));
            }
        };

        self.flow.submit(step, raw)?;
        let cleanup = self.pending_delete.take();

        let progress = if editing {
            self.position = WizardPosition::Confirmation;
            SubmitProgress::ReturnedToConfirmation
        } else {
            match F::step_after(step) {
                Some(next) => {
                    self.position = WizardPosition::Collecting { step: next };
                    SubmitProgress::Advanced { next }
                }
                None => {
                    self.position = WizardPosition::Confirmation;
                    SubmitProgress::ReachedConfirmation
                }
            }
        };

        Ok(SubmitOutcome { progress, cleanup })
    }

    /// Jumps to a single field for editing. Only legal from confirmation.
    pub fn enter_edit(&mut self, step: F::Step) -> Result<()> {
        if !self.at_confirmation() {
            return Err(BazaarError::validation(
                "fields can only be edited from the confirmation screen",
            ));
        }
        self.position = WizardPosition::Editing { step };
        Ok(())
    }

    /// Leaves single-field editing without submitting anything; the wizard is
    /// back at confirmation with every field unchanged. A no-op outside
    /// editing.
    pub fn finish_editing(&mut self) {
        if self.is_editing() {
            self.position = WizardPosition::Confirmation;
        }
    }
}
