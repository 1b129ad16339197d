//! In-memory domain services.
//!
//! Each service implements one core port over a map behind a lock, with the
//! same business-rule rejections a real marketplace backend would return
//! (duplicate application, insufficient funds). Seed helpers let tests and
//! demos arrange entities directly.

use async_trait::async_trait;
use bazaar_core::domain::{
    ApplicationService, ApplicationStatus, ApplicationSummary, NewApplication, NewOrder,
    NewProject, Notification, NotificationService, OrderService, OrderStatus, OrderSummary,
    PaymentInvoice, PaymentPurpose, PaymentReceipt, PaymentService, ProjectService, ProjectStatus,
    ProjectSummary, SubscriptionSummary, WalletSummary,
};
use bazaar_core::error::{BazaarError, Result};
use bazaar_core::types::{ChatId, EntityId, PaymentRef};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;

fn newest_first(ids: &mut Vec<EntityId>) {
    ids.sort_unstable_by(|a, b| b.cmp(a));
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Default)]
pub struct InMemoryProjects {
    next_id: AtomicI64,
    projects: Mutex<HashMap<EntityId, ProjectSummary>>,
}

impl InMemoryProjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pre-built project, keeping generated ids above the seeded one.
    pub async fn seed(&self, project: ProjectSummary) {
        self.next_id.fetch_max(project.id, Ordering::SeqCst);
        self.projects.lock().await.insert(project.id, project);
    }
}

#[async_trait]
impl ProjectService for InMemoryProjects {
    async fn create(&self, new: NewProject) -> Result<EntityId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let project = ProjectSummary {
            id,
            owner: new.owner,
            title: new.title,
            description: new.description,
            budget: new.budget,
            duration_days: new.duration_days,
            status: ProjectStatus::Open,
            created_at: Utc::now(),
        };
        self.projects.lock().await.insert(id, project);
        Ok(id)
    }

    async fn get(&self, id: EntityId) -> Result<Option<ProjectSummary>> {
        Ok(self.projects.lock().await.get(&id).cloned())
    }

    async fn open_projects(&self) -> Result<Vec<EntityId>> {
        let projects = self.projects.lock().await;
        let mut ids: Vec<EntityId> = projects
            .values()
            .filter(|p| p.status == ProjectStatus::Open)
            .map(|p| p.id)
            .collect();
        newest_first(&mut ids);
        Ok(ids)
    }

    async fn search(&self, query: &str) -> Result<Vec<EntityId>> {
        let needle = query.to_lowercase();
        let projects = self.projects.lock().await;
        let mut ids: Vec<EntityId> = projects
            .values()
            .filter(|p| {
                p.status == ProjectStatus::Open
                    && (p.title.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle))
            })
            .map(|p| p.id)
            .collect();
        newest_first(&mut ids);
        Ok(ids)
    }

    async fn owned_by(&self, owner: ChatId) -> Result<Vec<EntityId>> {
        let projects = self.projects.lock().await;
        let mut ids: Vec<EntityId> = projects
            .values()
            .filter(|p| p.owner == owner)
            .map(|p| p.id)
            .collect();
        newest_first(&mut ids);
        Ok(ids)
    }
}

// ============================================================================
// Applications
// ============================================================================

#[derive(Default)]
pub struct InMemoryApplications {
    next_id: AtomicI64,
    applications: Mutex<HashMap<EntityId, ApplicationSummary>>,
}

impl InMemoryApplications {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, application: ApplicationSummary) {
        self.next_id.fetch_max(application.id, Ordering::SeqCst);
        self.applications
            .lock()
            .await
            .insert(application.id, application);
    }

    /// Moves an application through its review lifecycle.
    pub async fn set_status(&self, id: EntityId, status: ApplicationStatus) -> bool {
        match self.applications.lock().await.get_mut(&id) {
            Some(application) => {
                application.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ApplicationService for InMemoryApplications {
    async fn create(&self, new: NewApplication) -> Result<EntityId> {
        let mut applications = self.applications.lock().await;
        let duplicate = applications
            .values()
            .any(|a| a.project_id == new.project_id && a.applicant == new.applicant);
        if duplicate {
            return Err(BazaarError::domain(
                "applications",
                "You have already applied to this project.",
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let application = ApplicationSummary {
            id,
            project_id: new.project_id,
            applicant: new.applicant,
            cover_letter: new.cover_letter,
            price: new.price,
            delivery_days: new.delivery_days,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        applications.insert(id, application);
        Ok(id)
    }

    async fn get(&self, id: EntityId) -> Result<Option<ApplicationSummary>> {
        Ok(self.applications.lock().await.get(&id).cloned())
    }

    async fn submitted_by(&self, applicant: ChatId) -> Result<Vec<EntityId>> {
        let applications = self.applications.lock().await;
        let mut ids: Vec<EntityId> = applications
            .values()
            .filter(|a| a.applicant == applicant)
            .map(|a| a.id)
            .collect();
        newest_first(&mut ids);
        Ok(ids)
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Default)]
struct Wallet {
    balance: u64,
    subscription: Option<SubscriptionSummary>,
}

#[derive(Default)]
struct PaymentsInner {
    wallets: HashMap<ChatId, Wallet>,
    pending: HashMap<PaymentRef, PaymentInvoice>,
}

#[derive(Default)]
pub struct InMemoryPayments {
    inner: Mutex<PaymentsInner>,
}

impl InMemoryPayments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits a wallet directly, bypassing the invoice flow.
    pub async fn credit(&self, owner: ChatId, amount: u64) {
        let mut inner = self.inner.lock().await;
        inner.wallets.entry(owner).or_default().balance += amount;
    }

    /// Takes `amount` out of the wallet, rejecting overdrafts.
    pub(crate) async fn debit(&self, owner: ChatId, amount: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let wallet = inner.wallets.entry(owner).or_default();
        if wallet.balance < amount {
            return Err(BazaarError::domain(
                "payments",
                format!(
                    "Insufficient funds: balance {}, required {}.",
                    wallet.balance, amount
                ),
            ));
        }
        wallet.balance -= amount;
        Ok(())
    }
}

#[async_trait]
impl PaymentService for InMemoryPayments {
    async fn wallet(&self, owner: ChatId) -> Result<WalletSummary> {
        let mut inner = self.inner.lock().await;
        let wallet = inner.wallets.entry(owner).or_default();
        Ok(WalletSummary {
            owner,
            balance: wallet.balance,
            subscription: wallet.subscription.clone(),
        })
    }

    async fn create_invoice(
        &self,
        owner: ChatId,
        amount: u64,
        purpose: PaymentPurpose,
    ) -> Result<PaymentInvoice> {
        let reference = PaymentRef::generate();
        let invoice = PaymentInvoice {
            reference: reference.clone(),
            owner,
            amount,
            purpose,
            pay_url: format!("https://pay.example/{reference}"),
        };
        self.inner
            .lock()
            .await
            .pending
            .insert(reference, invoice.clone());
        Ok(invoice)
    }

    async fn complete(&self, reference: &PaymentRef) -> Result<PaymentReceipt> {
        let mut inner = self.inner.lock().await;
        let invoice = inner
            .pending
            .remove(reference)
            .ok_or_else(|| BazaarError::not_found("payment", reference))?;

        let wallet = inner.wallets.entry(invoice.owner).or_default();
        match invoice.purpose {
            PaymentPurpose::TopUp => wallet.balance += invoice.amount,
            PaymentPurpose::Subscription(plan) => {
                wallet.subscription = Some(SubscriptionSummary {
                    plan,
                    expires_at: Utc::now() + chrono::Duration::days(30),
                });
            }
        }

        Ok(PaymentReceipt {
            reference: invoice.reference,
            owner: invoice.owner,
            amount: invoice.amount,
            purpose: invoice.purpose,
        })
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Escrow orders; the amount is debited from the client's wallet at creation.
pub struct InMemoryOrders {
    next_id: AtomicI64,
    orders: Mutex<HashMap<EntityId, OrderSummary>>,
    payments: Arc<InMemoryPayments>,
}

impl InMemoryOrders {
    pub fn new(payments: Arc<InMemoryPayments>) -> Self {
        Self {
            next_id: AtomicI64::new(0),
            orders: Mutex::new(HashMap::new()),
            payments,
        }
    }
}

#[async_trait]
impl OrderService for InMemoryOrders {
    async fn create(&self, new: NewOrder) -> Result<EntityId> {
        self.payments.debit(new.client, new.amount).await?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order = OrderSummary {
            id,
            application_id: new.application_id,
            client: new.client,
            amount: new.amount,
            terms: new.terms,
            status: OrderStatus::EscrowHeld,
            created_at: Utc::now(),
        };
        self.orders.lock().await.insert(id, order);
        Ok(id)
    }

    async fn get(&self, id: EntityId) -> Result<Option<OrderSummary>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn placed_by(&self, client: ChatId) -> Result<Vec<EntityId>> {
        let orders = self.orders.lock().await;
        let mut ids: Vec<EntityId> = orders
            .values()
            .filter(|o| o.client == client)
            .map(|o| o.id)
            .collect();
        newest_first(&mut ids);
        Ok(ids)
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Default)]
pub struct InMemoryNotifications {
    next_id: AtomicI64,
    notifications: Mutex<HashMap<EntityId, Notification>>,
}

impl InMemoryNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a notification to a chat.
    pub async fn push(&self, recipient: ChatId, text: impl Into<String>) -> EntityId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let notification = Notification {
            id,
            recipient,
            text: text.into(),
            read: false,
            created_at: Utc::now(),
        };
        self.notifications.lock().await.insert(id, notification);
        id
    }
}

#[async_trait]
impl NotificationService for InMemoryNotifications {
    async fn unread_for(&self, recipient: ChatId) -> Result<Vec<EntityId>> {
        let notifications = self.notifications.lock().await;
        let mut ids: Vec<EntityId> = notifications
            .values()
            .filter(|n| n.recipient == recipient && !n.read)
            .map(|n| n.id)
            .collect();
        newest_first(&mut ids);
        Ok(ids)
    }

    async fn get(&self, id: EntityId) -> Result<Option<Notification>> {
        Ok(self.notifications.lock().await.get(&id).cloned())
    }

    async fn mark_all_read(&self, recipient: ChatId) -> Result<()> {
        let mut notifications = self.notifications.lock().await;
        for notification in notifications.values_mut() {
            if notification.recipient == recipient {
                notification.read = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_application(project_id: EntityId, applicant: ChatId) -> NewApplication {
        NewApplication {
            project_id,
            applicant,
            cover_letter: "I have shipped three similar storefronts".to_string(),
            price: 45_000,
            delivery_days: 21,
        }
    }

    #[tokio::test]
    async fn test_created_projects_are_open_and_newest_first() {
        let projects = InMemoryProjects::new();
        for n in 1..=3 {
            projects
                .create(NewProject {
                    owner: ChatId(1),
                    title: format!("Project {n}"),
                    description: "Twenty characters of description".to_string(),
                    budget: 50_000,
                    duration_days: 30,
                })
                .await
                .unwrap();
        }
        assert_eq!(projects.open_projects().await.unwrap(), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_search_matches_title_and_description() {
        let projects = InMemoryProjects::new();
        projects
            .create(NewProject {
                owner: ChatId(1),
                title: "Rust backend".to_string(),
                description: "An async marketplace service".to_string(),
                budget: 50_000,
                duration_days: 30,
            })
            .await
            .unwrap();

        assert_eq!(projects.search("rust").await.unwrap().len(), 1);
        assert_eq!(projects.search("marketplace").await.unwrap().len(), 1);
        assert!(projects.search("cobol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_application_is_a_domain_error() {
        let applications = InMemoryApplications::new();
        applications
            .create(new_application(1, ChatId(2)))
            .await
            .unwrap();

        let err = applications
            .create(new_application(1, ChatId(2)))
            .await
            .unwrap_err();
        assert!(err.is_domain());

        // Same applicant, different project is fine
        applications
            .create(new_application(2, ChatId(2)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_order_requires_funds() {
        let payments = Arc::new(InMemoryPayments::new());
        let orders = InMemoryOrders::new(payments.clone());

        let new = NewOrder {
            application_id: 1,
            client: ChatId(1),
            amount: 10_000,
            terms: "Two milestones, net 7 payout".to_string(),
        };
        let err = orders.create(new.clone()).await.unwrap_err();
        assert!(err.is_domain());

        payments.credit(ChatId(1), 25_000).await;
        orders.create(new).await.unwrap();
        assert_eq!(payments.wallet(ChatId(1)).await.unwrap().balance, 15_000);
    }

    #[tokio::test]
    async fn test_top_up_completion_credits_the_wallet() {
        let payments = InMemoryPayments::new();
        let invoice = payments
            .create_invoice(ChatId(1), 5_000, PaymentPurpose::TopUp)
            .await
            .unwrap();

        payments.complete(&invoice.reference).await.unwrap();
        assert_eq!(payments.wallet(ChatId(1)).await.unwrap().balance, 5_000);

        // A reference completes once
        assert!(
            payments
                .complete(&invoice.reference)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_subscription_completion_activates_the_plan() {
        use bazaar_core::domain::SubscriptionPlan;

        let payments = InMemoryPayments::new();
        let invoice = payments
            .create_invoice(
                ChatId(1),
                SubscriptionPlan::Pro.price(),
                PaymentPurpose::Subscription(SubscriptionPlan::Pro),
            )
            .await
            .unwrap();
        payments.complete(&invoice.reference).await.unwrap();

        let wallet = payments.wallet(ChatId(1)).await.unwrap();
        assert_eq!(
            wallet.subscription.map(|s| s.plan),
            Some(SubscriptionPlan::Pro)
        );
    }

    #[tokio::test]
    async fn test_mark_all_read_empties_the_unread_feed() {
        let notifications = InMemoryNotifications::new();
        notifications.push(ChatId(1), "New application").await;
        notifications.push(ChatId(1), "Order released").await;
        notifications.push(ChatId(2), "Unrelated").await;

        assert_eq!(notifications.unread_for(ChatId(1)).await.unwrap().len(), 2);
        notifications.mark_all_read(ChatId(1)).await.unwrap();
        assert!(notifications.unread_for(ChatId(1)).await.unwrap().is_empty());
        assert_eq!(notifications.unread_for(ChatId(2)).await.unwrap().len(), 1);
    }
}
