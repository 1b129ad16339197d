//! Application-creation flow (bidding on a project).

use super::fields::{bounded_number, required_text};
use super::state::{ValidationError, WizardFlow};
use super::WizardKind;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};

pub const COVER_LETTER_MIN: usize = 20;
pub const COVER_LETTER_MAX: usize = 1_000;
pub const PRICE_MIN: u64 = 1_000;
pub const PRICE_MAX: u64 = 1_000_000;
pub const DELIVERY_MIN: u64 = 1;
pub const DELIVERY_MAX: u64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStep {
    CoverLetter,
    Price,
    DeliveryDays,
}

impl ApplicationStep {
    /// Parses the field identifier used in edit-button parameters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cover_letter" => Some(Self::CoverLetter),
            "price" => Some(Self::Price),
            "delivery_days" => Some(Self::DeliveryDays),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoverLetter => "cover_letter",
            Self::Price => "price",
            Self::DeliveryDays => "delivery_days",
        }
    }
}

/// Fields collected while applying to a project. Seeded with the target
/// project id, which is not a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub project_id: EntityId,
    pub cover_letter: Option<String>,
    pub price: Option<u64>,
    pub delivery_days: Option<u32>,
}

impl ApplicationDraft {
    pub fn for_project(project_id: EntityId) -> Self {
        Self {
            project_id,
            cover_letter: None,
            price: None,
            delivery_days: None,
        }
    }
}

impl ApplicationDraft {
    /// Converts a complete draft into a creation payload; `None` while any
    /// field is still missing.
    pub fn into_new(self, applicant: crate::types::ChatId) -> Option<crate::domain::NewApplication> {
        Some(crate::domain::NewApplication {
            project_id: self.project_id,
            applicant,
            cover_letter: self.cover_letter?,
            price: self.price?,
            delivery_days: self.delivery_days?,
        })
    }
}

impl WizardFlow for ApplicationDraft {
    type Step = ApplicationStep;

    const KIND: WizardKind = WizardKind::Application;

    fn first_step() -> ApplicationStep {
        ApplicationStep::CoverLetter
    }

    fn step_after(step: ApplicationStep) -> Option<ApplicationStep> {
        match step {
            ApplicationStep::CoverLetter => Some(ApplicationStep::Price),
            ApplicationStep::Price => Some(ApplicationStep::DeliveryDays),
            ApplicationStep::DeliveryDays => None,
        }
    }

    fn submit(&mut self, step: ApplicationStep, input: &str) -> Result<(), ValidationError> {
        match step {
            ApplicationStep::CoverLetter => {
                self.cover_letter = Some(required_text(
                    "cover letter",
                    input,
                    COVER_LETTER_MIN,
                    COVER_LETTER_MAX,
                )?);
            }
            ApplicationStep::Price => {
                self.price = Some(bounded_number("price", input, PRICE_MIN, PRICE_MAX)?);
            }
            ApplicationStep::DeliveryDays => {
                self.delivery_days = Some(bounded_number(
                    "delivery time",
                    input,
                    DELIVERY_MIN,
                    DELIVERY_MAX,
                )? as u32);
            }
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.cover_letter.is_some() && self.price.is_some() && self.delivery_days.is_some()
    }
}
