//! Domain layer for the OSMech workshop system.
//!
//! This crate provides:
//! - Aggregate and command abstractions for pure, event-producing commands
//! - The service order aggregate with its ledger, workflow and payment
//! - Inventory, expenses, users, company settings and the audit log
//! - `WorkshopService`, which commits every change atomically with its audit entry

pub mod aggregate;
pub mod audit;
pub mod auth;
pub mod command;
pub mod diagnosis;
pub mod error;
pub mod expense;
pub mod inventory;
pub mod money;
pub mod order;
pub mod service;
pub mod settings;
pub mod user;
pub mod warning;

pub use aggregate::{Aggregate, DomainEvent};
pub use audit::{AuditAction, AuditLog, AuditLogEntry};
pub use auth::{Actor, AdminCredentialAuthorizer, AuthError, DeleteAuthorizer, hash_credential};
pub use command::{Command, CommandResult};
pub use diagnosis::{AiDiagnosis, DiagnosisRequest, RecommendedPart};
pub use error::{DomainError, ErrorKind};
pub use expense::{Expense, ExpenseCategory, ExpenseStatus, NewExpense};
pub use inventory::{
    Inventory, InventoryError, InventoryItem, InventoryPatch, NewInventoryItem, StockLevel,
    StockMovement, StockPolicy,
};
pub use money::{Money, Percentage};
pub use order::{
    AddItem, AssignMechanic, AttachDiagnosis, ChangeStatus, Customer, CustomerNotification,
    ItemDraft, ItemStatus, ItemType, NotificationTrigger, OrderError, OrderEvent, OrderIntake,
    OrderStatus, PaymentMethod, RegisterPayment, RemoveItem, ServiceItem, ServiceOrder,
    SetDiscount, Vehicle,
};
pub use service::{OrderFilter, OrderOutcome, WorkshopService, WorkshopSnapshot};
pub use settings::CompanySettings;
pub use user::{NewUser, Role, User};
pub use warning::Warning;
