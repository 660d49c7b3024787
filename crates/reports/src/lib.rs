//! Reports computed from the workshop collections.
//!
//! This crate provides the read-only side of the system:
//! - [`Report`] trait for views built from a [`domain::WorkshopSnapshot`]
//! - [`ReportGenerator`] for building reports from the live store
//! - Three views: DRE (income statement), team performance, dashboard
//! - CSV export with quoted text fields

pub mod csv;
pub mod error;
pub mod generator;
pub mod period;
pub mod report;
pub mod views;

#[cfg(test)]
mod fixtures;

pub use error::{ReportError, Result};
pub use generator::ReportGenerator;
pub use period::Period;
pub use report::Report;
pub use views::{
    CategoryExpenses, Dashboard, DashboardParams, DreReport, MechanicPerformance, TeamParams,
    TeamReport,
};
