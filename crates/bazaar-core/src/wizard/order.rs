//! Order-creation flow (funding escrow for an accepted application).

use super::fields::{bounded_number, required_text};
use super::state::{ValidationError, WizardFlow};
use super::WizardKind;
use crate::types::EntityId;
use serde::{Deserialize, Serialize};

pub const AMOUNT_MIN: u64 = 1_000;
pub const AMOUNT_MAX: u64 = 1_000_000;
pub const TERMS_MIN: usize = 10;
pub const TERMS_MAX: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStep {
    Amount,
    Terms,
}

impl OrderStep {
    /// Parses the field identifier used in edit-button parameters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "amount" => Some(Self::Amount),
            "terms" => Some(Self::Terms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Terms => "terms",
        }
    }
}

/// Fields collected while opening an escrow order. Seeded with the accepted
/// application id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub application_id: EntityId,
    pub amount: Option<u64>,
    pub terms: Option<String>,
}

impl OrderDraft {
    pub fn for_application(application_id: EntityId) -> Self {
        Self {
            application_id,
            amount: None,
            terms: None,
        }
    }
}

impl OrderDraft {
    /// Converts a complete draft into a creation payload; `None` while any
    /// field is still missing.
    pub fn into_new(self, client: crate::types::ChatId) -> Option<crate::domain::NewOrder> {
        Some(crate::domain::NewOrder {
            application_id: self.application_id,
            client,
            amount: self.amount?,
            terms: self.terms?,
        })
    }
}

impl WizardFlow for OrderDraft {
    type Step = OrderStep;

    const KIND: WizardKind = WizardKind::Order;

    fn first_step() -> OrderStep {
        OrderStep::Amount
    }

    fn step_after(step: OrderStep) -> Option<OrderStep> {
        match step {
            OrderStep::Amount => Some(OrderStep::Terms),
            OrderStep::Terms => None,
        }
    }

    fn submit(&mut self, step: OrderStep, input: &str) -> Result<(), ValidationError> {
        match step {
            OrderStep::Amount => {
                self.amount = Some(bounded_number("amount", input, AMOUNT_MIN, AMOUNT_MAX)?);
            }
            OrderStep::Terms => {
                self.terms = Some(required_text("terms", input, TERMS_MIN, TERMS_MAX)?);
            }
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.amount.is_some() && self.terms.is_some()
    }
}
