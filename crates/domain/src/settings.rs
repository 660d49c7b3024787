//! Company settings printed on quotes and receipts.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub name: String,
    #[serde(default)]
    pub cnpj: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "OSMech Oficina".to_string(),
            cnpj: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
        }
    }
}

impl CompanySettings {
    /// Checks the settings before saving.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "company name is required".to_string(),
            ));
        }
        let digits = self.cnpj.chars().filter(|c| c.is_ascii_digit()).count();
        if !self.cnpj.trim().is_empty() && digits != 14 {
            return Err(DomainError::Validation(
                "CNPJ must have 14 digits".to_string(),
            ));
        }
        Ok(())
    }
}
