//! The diagnosis collaborator seam.

use std::time::Instant;

use async_trait::async_trait;
use domain::{AiDiagnosis, DiagnosisRequest};

use crate::Result;

/// Produces a structured diagnosis for a vehicle complaint.
#[async_trait]
pub trait DiagnosisService: Send + Sync {
    /// Provider name, used in logs and metric labels.
    fn provider(&self) -> &'static str;

    /// Asks for a diagnosis. No retry is attempted.
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<AiDiagnosis>;
}

/// Wraps a service and records request, failure and latency metrics.
#[derive(Debug, Clone)]
pub struct Instrumented<D> {
    inner: D,
}

impl<D: DiagnosisService> Instrumented<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: DiagnosisService> DiagnosisService for Instrumented<D> {
    fn provider(&self) -> &'static str {
        self.inner.provider()
    }

    #[tracing::instrument(skip(self, request), fields(provider = self.inner.provider()))]
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<AiDiagnosis> {
        let provider = self.inner.provider();
        metrics::counter!("diagnosis_requests_total", "provider" => provider).increment(1);
        let start = Instant::now();

        let result = self.inner.diagnose(request).await;

        metrics::histogram!("diagnosis_duration_seconds", "provider" => provider)
            .record(start.elapsed().as_secs_f64());
        match &result {
            Ok(diagnosis) => tracing::info!(
                causes = diagnosis.possible_causes.len(),
                parts = diagnosis.recommended_parts.len(),
                "diagnosis received"
            ),
            Err(e) => {
                metrics::counter!(
                    "diagnosis_failures_total",
                    "provider" => provider,
                    "reason" => e.label()
                )
                .increment(1);
                tracing::warn!(error = %e, "diagnosis failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiagnosisError, InMemoryDiagnosisService};

    fn request() -> DiagnosisRequest {
        DiagnosisRequest {
            vehicle_model: "VW Gol".to_string(),
            complaint: "Motor falhando".to_string(),
            mileage: None,
        }
    }

    #[tokio::test]
    async fn test_instrumented_passes_results_through() {
        let service = Instrumented::new(InMemoryDiagnosisService::new());
        assert_eq!(service.provider(), "memory");

        let diagnosis = service.diagnose(&request()).await.unwrap();
        assert!(!diagnosis.is_empty());
        assert_eq!(service.inner().call_count(), 1);

        service.inner().set_fail(true);
        assert!(matches!(
            service.diagnose(&request()).await,
            Err(DiagnosisError::Network(_))
        ));
        assert_eq!(service.inner().call_count(), 2);
    }
}
