pub mod back_office;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod reports;
pub mod team;
