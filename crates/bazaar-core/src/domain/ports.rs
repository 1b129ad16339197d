//! Domain service ports.
//!
//! Fallible, bounded calls into the marketplace. A `Domain` error carries a
//! business-rule rejection meant for the user verbatim; a missing entity is
//! reported as `Ok(None)` by the getters so screens can render their own
//! terminal "no longer available" state.

use super::model::*;
use crate::error::Result;
use crate::types::{ChatId, EntityId, PaymentRef};
use async_trait::async_trait;

#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn create(&self, new: NewProject) -> Result<EntityId>;

    async fn get(&self, id: EntityId) -> Result<Option<ProjectSummary>>;

    /// Ids of all open projects, newest first.
    async fn open_projects(&self) -> Result<Vec<EntityId>>;

    /// Ids of open projects matching a free-text query, newest first.
    async fn search(&self, query: &str) -> Result<Vec<EntityId>>;

    /// Ids of the chat's own projects, newest first.
    async fn owned_by(&self, owner: ChatId) -> Result<Vec<EntityId>>;
}

#[async_trait]
pub trait ApplicationService: Send + Sync {
    /// Creates an application; rejects duplicates per (project, applicant).
    async fn create(&self, new: NewApplication) -> Result<EntityId>;

    async fn get(&self, id: EntityId) -> Result<Option<ApplicationSummary>>;

    /// Ids of the chat's own applications, newest first.
    async fn submitted_by(&self, applicant: ChatId) -> Result<Vec<EntityId>>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Opens an escrow order; rejects when the client's wallet cannot cover
    /// the amount.
    async fn create(&self, new: NewOrder) -> Result<EntityId>;

    async fn get(&self, id: EntityId) -> Result<Option<OrderSummary>>;

    /// Ids of the chat's own orders, newest first.
    async fn placed_by(&self, client: ChatId) -> Result<Vec<EntityId>>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Ids of the chat's unread notifications, newest first.
    async fn unread_for(&self, recipient: ChatId) -> Result<Vec<EntityId>>;

    async fn get(&self, id: EntityId) -> Result<Option<Notification>>;

    async fn mark_all_read(&self, recipient: ChatId) -> Result<()>;
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn wallet(&self, owner: ChatId) -> Result<WalletSummary>;

    /// Issues an invoice with the gateway and returns it unpaid.
    async fn create_invoice(
        &self,
        owner: ChatId,
        amount: u64,
        purpose: PaymentPurpose,
    ) -> Result<PaymentInvoice>;

    /// Applies a completed payment (wallet credit or subscription activation)
    /// and returns the receipt.
    async fn complete(&self, reference: &PaymentRef) -> Result<PaymentReceipt>;
}
