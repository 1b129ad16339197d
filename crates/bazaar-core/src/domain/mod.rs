//! Marketplace boundary.
//!
//! The engine does not own the marketplace: projects, applications, orders,
//! notifications and payments live behind these ports. Only the summaries the
//! screens render are modelled here.

mod model;
mod ports;

// Re-export public API
pub use model::{
    ApplicationStatus, ApplicationSummary, NewApplication, NewOrder, NewProject, Notification,
    OrderStatus, OrderSummary, PaymentInvoice, PaymentPurpose, PaymentReceipt, ProjectStatus,
    ProjectSummary, SubscriptionPlan, SubscriptionSummary, WalletSummary,
};
pub use ports::{
    ApplicationService, NotificationService, OrderService, PaymentService, ProjectService,
};
