//! Report views.

pub mod dashboard;
pub mod dre;
pub mod team;

pub use dashboard::{Dashboard, DashboardParams, LowStockItem, StatusCount};
pub use dre::{CategoryExpenses, DreReport};
pub use team::{MechanicPerformance, TeamParams, TeamReport};
