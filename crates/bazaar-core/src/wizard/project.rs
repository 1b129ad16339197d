//! Project-creation flow.

use super::fields::{bounded_number, required_text};
use super::state::{ValidationError, WizardFlow};
use super::WizardKind;
use serde::{Deserialize, Serialize};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 2_000;
pub const BUDGET_MIN: u64 = 1_000;
pub const BUDGET_MAX: u64 = 1_000_000;
pub const DURATION_MIN: u64 = 1;
pub const DURATION_MAX: u64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStep {
    Title,
    Description,
    Budget,
    Duration,
}

impl ProjectStep {
    /// Parses the field identifier used in edit-button parameters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "budget" => Some(Self::Budget),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Budget => "budget",
            Self::Duration => "duration",
        }
    }
}

/// Fields collected while posting a new project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<u64>,
    pub duration_days: Option<u32>,
}

impl ProjectDraft {
    /// Converts a complete draft into a creation payload; `None` while any
    /// field is still missing.
    pub fn into_new(self, owner: crate::types::ChatId) -> Option<crate::domain::NewProject> {
        Some(crate::domain::NewProject {
            owner,
            title: self.title?,
            description: self.description?,
            budget: self.budget?,
            duration_days: self.duration_days?,
        })
    }
}

impl WizardFlow for ProjectDraft {
    type Step = ProjectStep;

    const KIND: WizardKind = WizardKind::Project;

    fn first_step() -> ProjectStep {
        ProjectStep::Title
    }

    fn step_after(step: ProjectStep) -> Option<ProjectStep> {
        match step {
            ProjectStep::Title => Some(ProjectStep::Description),
            ProjectStep::Description => Some(ProjectStep::Budget),
            ProjectStep::Budget => Some(ProjectStep::Duration),
            ProjectStep::Duration => None,
        }
    }

    fn submit(&mut self, step: ProjectStep, input: &str) -> Result<(), ValidationError> {
        match step {
            ProjectStep::Title => {
                self.title = Some(required_text("title", input, TITLE_MIN, TITLE_MAX)?);
            }
            ProjectStep::Description => {
                self.description = Some(required_text(
                    "description",
                    input,
                    DESCRIPTION_MIN,
                    DESCRIPTION_MAX,
                )?);
            }
            ProjectStep::Budget => {
                self.budget = Some(bounded_number("budget", input, BUDGET_MIN, BUDGET_MAX)?);
            }
            ProjectStep::Duration => {
                self.duration_days = Some(bounded_number(
                    "duration",
                    input,
                    DURATION_MIN,
                    DURATION_MAX,
                )? as u32);
            }
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.description.is_some()
            && self.budget.is_some()
            && self.duration_days.is_some()
    }
}
