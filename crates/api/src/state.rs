//! Shared application state.

use std::sync::Arc;

use diagnosis::{
    DiagnosisService, GeminiConfig, GeminiDiagnosisService, InMemoryDiagnosisService,
    Instrumented,
};
use domain::{AdminCredentialAuthorizer, DeleteAuthorizer, StockPolicy, WorkshopService};
use reports::ReportGenerator;
use store::{FileStateStore, InMemoryStateStore, StateStore};

use crate::config::{Config, StoreBackend};
use crate::error::StartupError;

/// The store backend, picked at startup.
pub type DynStore = Box<dyn StateStore>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: Arc<WorkshopService<DynStore>>,
    pub reports: ReportGenerator<DynStore>,
    pub diagnosis: Arc<dyn DiagnosisService>,
}

impl AppState {
    pub fn new(
        store: DynStore,
        authorizer: Arc<dyn DeleteAuthorizer>,
        stock_policy: StockPolicy,
        diagnosis: Arc<dyn DiagnosisService>,
    ) -> Self {
        let service = Arc::new(WorkshopService::new(store, authorizer).with_stock_policy(stock_policy));
        Self {
            reports: ReportGenerator::new(Arc::clone(&service)),
            service,
            diagnosis,
        }
    }

    /// Builds the state described by the configuration and bootstraps the
    /// administrator when the user collection is empty.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let store: DynStore = match config.store {
            StoreBackend::Memory => Box::new(InMemoryStateStore::new()),
            StoreBackend::File => Box::new(FileStateStore::open(&config.data_dir).await?),
        };

        let authorizer = AdminCredentialAuthorizer::new(config.delete_password_hash.clone());
        if !authorizer.is_configured() {
            tracing::warn!("OSMECH_DELETE_PASSWORD_HASH not set, order deletion is disabled");
        }

        let diagnosis: Arc<dyn DiagnosisService> = match &config.gemini_api_key {
            Some(key) => Arc::new(Instrumented::new(GeminiDiagnosisService::new(
                GeminiConfig::new(key.clone())
                    .with_model(config.ai_model.clone())
                    .with_timeout(config.ai_timeout),
            )?)),
            None => {
                tracing::warn!("GEMINI_API_KEY not set, using the offline diagnosis service");
                Arc::new(Instrumented::new(InMemoryDiagnosisService::new()))
            }
        };

        let state = Self::new(store, Arc::new(authorizer), config.stock_policy, diagnosis);
        if let Some(admin) = state
            .service
            .ensure_default_admin(&config.admin_name, config.admin_email.clone())
            .await?
        {
            tracing::info!(user_id = %admin.id, name = %admin.name, "created bootstrap administrator");
        }
        Ok(state)
    }
}
