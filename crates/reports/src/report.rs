//! Report trait.

use domain::WorkshopSnapshot;
use serde::Serialize;

use crate::Result;

/// A read-only view computed from a snapshot of every collection.
///
/// Reports never write; building the same report twice from the same
/// snapshot gives the same result.
pub trait Report: Serialize + Sized + Send {
    /// Parameters that select what the report covers.
    type Params: Send + Sync;

    /// Returns the name of this report.
    fn name() -> &'static str;

    /// Builds the report.
    fn build(snapshot: &WorkshopSnapshot, params: &Self::Params) -> Result<Self>;
}
