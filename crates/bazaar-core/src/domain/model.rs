//! Boundary-level summaries of marketplace entities.

use crate::types::{ChatId, EntityId, PaymentRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: EntityId,
    pub owner: ChatId,
    pub title: String,
    pub description: String,
    pub budget: u64,
    pub duration_days: u32,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a project from a completed wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub owner: ChatId,
    pub title: String,
    pub description: String,
    pub budget: u64,
    pub duration_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub id: EntityId,
    pub project_id: EntityId,
    pub applicant: ChatId,
    pub cover_letter: String,
    pub price: u64,
    pub delivery_days: u32,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub project_id: EntityId,
    pub applicant: ChatId,
    pub cover_letter: String,
    pub price: u64,
    pub delivery_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    EscrowHeld,
    Released,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: EntityId,
    pub application_id: EntityId,
    pub client: ChatId,
    pub amount: u64,
    pub terms: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub application_id: EntityId,
    pub client: ChatId,
    pub amount: u64,
    pub terms: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    pub recipient: ChatId,
    pub text: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Basic,
    Pro,
}

impl SubscriptionPlan {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "basic" => Some(Self::Basic),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
        }
    }

    /// Monthly price in wallet units.
    pub fn price(&self) -> u64 {
        match self {
            Self::Basic => 5_000,
            Self::Pro => 15_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    pub plan: SubscriptionPlan,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub owner: ChatId,
    pub balance: u64,
    pub subscription: Option<SubscriptionSummary>,
}

/// What a pending payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    TopUp,
    Subscription(SubscriptionPlan),
}

/// An invoice issued by the payment gateway, awaiting completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInvoice {
    pub reference: PaymentRef,
    pub owner: ChatId,
    pub amount: u64,
    pub purpose: PaymentPurpose,
    /// Where the user completes the payment; opaque to the engine.
    pub pay_url: String,
}

/// Confirmation details for a completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: PaymentRef,
    pub owner: ChatId,
    pub amount: u64,
    pub purpose: PaymentPurpose,
}
