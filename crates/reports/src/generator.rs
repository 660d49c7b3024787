//! Report generator: loads a snapshot and builds reports from it.

use std::sync::Arc;
use std::time::Instant;

use domain::{OrderFilter, WorkshopService};
use store::StateStore;

use crate::Result;
use crate::csv::orders_csv;
use crate::report::Report;

/// Builds reports from the current state of the workshop.
pub struct ReportGenerator<S: StateStore> {
    service: Arc<WorkshopService<S>>,
}

impl<S: StateStore> Clone for ReportGenerator<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: StateStore> ReportGenerator<S> {
    pub fn new(service: Arc<WorkshopService<S>>) -> Self {
        Self { service }
    }

    /// Builds one report from a fresh snapshot.
    #[tracing::instrument(skip(self, params), fields(report = R::name()))]
    pub async fn generate<R: Report>(&self, params: &R::Params) -> Result<R> {
        let started = Instant::now();
        let snapshot = self.service.snapshot().await?;
        let report = R::build(&snapshot, params)?;

        metrics::counter!("reports_generated_total", "report" => R::name()).increment(1);
        metrics::histogram!("report_build_seconds", "report" => R::name())
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(orders = snapshot.orders.len(), "report built");

        Ok(report)
    }

    /// Exports the orders matching `filter` as CSV, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn orders_csv(&self, filter: &OrderFilter) -> Result<String> {
        let orders = self.service.list_orders(filter).await?;
        Ok(orders_csv(&orders))
    }
}
