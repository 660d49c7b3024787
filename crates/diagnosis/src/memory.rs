//! In-memory diagnosis service.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use domain::{AiDiagnosis, DiagnosisRequest, RecommendedPart};

use crate::{DiagnosisError, Result};
use crate::service::DiagnosisService;

#[derive(Debug)]
struct InMemoryDiagnosisState {
    answer: AiDiagnosis,
    requests: Vec<DiagnosisRequest>,
    fail: bool,
}

/// Diagnosis service that answers from memory, for tests and offline use.
#[derive(Debug, Clone)]
pub struct InMemoryDiagnosisService {
    state: Arc<Mutex<InMemoryDiagnosisState>>,
}

impl Default for InMemoryDiagnosisService {
    fn default() -> Self {
        Self::with_answer(default_answer())
    }
}

impl InMemoryDiagnosisService {
    /// Creates a service that answers with a generic inspection plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service that always answers with `answer`.
    pub fn with_answer(answer: AiDiagnosis) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryDiagnosisState {
                answer,
                requests: Vec::new(),
                fail: false,
            })),
        }
    }

    /// Configures the service to fail every call.
    pub fn set_fail(&self, fail: bool) {
        self.lock().fail = fail;
    }

    /// Returns the number of calls received, failed ones included.
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Returns the last request received.
    pub fn last_request(&self) -> Option<DiagnosisRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryDiagnosisState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DiagnosisService for InMemoryDiagnosisService {
    fn provider(&self) -> &'static str {
        "memory"
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<AiDiagnosis> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if state.fail {
            return Err(DiagnosisError::Network(
                "diagnosis service unavailable".to_string(),
            ));
        }
        Ok(state.answer.clone())
    }
}

fn default_answer() -> AiDiagnosis {
    AiDiagnosis {
        possible_causes: vec![
            "Desgaste natural de componentes".to_string(),
            "Falha elétrica intermitente".to_string(),
            "Falta de manutenção periódica".to_string(),
        ],
        diagnosis_steps: vec![
            "Confirmar o sintoma com o cliente".to_string(),
            "Realizar leitura do scanner".to_string(),
            "Inspecionar visualmente os componentes afetados".to_string(),
        ],
        recommended_parts: vec![RecommendedPart {
            name: "Kit de revisão".to_string(),
            estimated_cost: 250.0,
        }],
        estimated_labor_hours: 2.0,
        preventive_maintenance: "Fazer revisão completa a cada 10.000 km".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests_and_fails_on_demand() {
        let service = InMemoryDiagnosisService::new();
        let request = DiagnosisRequest {
            vehicle_model: "Ford Ka".to_string(),
            complaint: "Luz da injeção acesa".to_string(),
            mileage: Some(40_000),
        };

        let answer = service.diagnose(&request).await.unwrap();
        assert_eq!(answer.possible_causes.len(), 3);
        assert_eq!(service.last_request(), Some(request.clone()));

        service.set_fail(true);
        assert!(service.diagnose(&request).await.is_err());
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let service = InMemoryDiagnosisService::new();
        let clone = service.clone();
        clone.set_fail(true);

        let request = DiagnosisRequest {
            vehicle_model: "Ford Ka".to_string(),
            complaint: "Ruído".to_string(),
            mileage: None,
        };
        assert!(service.diagnose(&request).await.is_err());
    }
}
