//! AI diagnosis payloads exchanged with the diagnosis collaborator.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::order::ServiceOrder;

/// What is sent to the diagnosis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub vehicle_model: String,
    pub complaint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
}

impl DiagnosisRequest {
    /// Builds the request for an order's vehicle and complaint.
    pub fn for_order(order: &ServiceOrder) -> Self {
        Self {
            vehicle_model: order.vehicle().display_name(),
            complaint: order.complaint().to_string(),
            mileage: order.vehicle().mileage,
        }
    }
}

/// A part the diagnosis recommends, with its estimated cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedPart {
    pub name: String,
    /// Estimated cost in reais, as the model returns it.
    pub estimated_cost: f64,
}

impl RecommendedPart {
    /// The estimate as money, or None when the model returned garbage.
    pub fn estimated_money(&self) -> Option<Money> {
        if !self.estimated_cost.is_finite() || self.estimated_cost < 0.0 {
            return None;
        }
        Some(Money::from_cents((self.estimated_cost * 100.0).round() as i64))
    }
}

/// Structured result attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDiagnosis {
    pub possible_causes: Vec<String>,
    pub diagnosis_steps: Vec<String>,
    pub recommended_parts: Vec<RecommendedPart>,
    pub estimated_labor_hours: f64,
    pub preventive_maintenance: String,
}

impl AiDiagnosis {
    /// Name of the first recommended part, if any.
    pub fn first_part_name(&self) -> Option<&str> {
        self.recommended_parts
            .first()
            .map(|p| p.name.trim())
            .filter(|name| !name.is_empty())
    }

    /// Labor hours clamped to a usable, non-negative value.
    pub fn labor_hours(&self) -> f64 {
        if self.estimated_labor_hours.is_finite() && self.estimated_labor_hours > 0.0 {
            self.estimated_labor_hours
        } else {
            0.0
        }
    }

    /// Returns true if the result carries no usable content.
    pub fn is_empty(&self) -> bool {
        self.possible_causes.is_empty()
            && self.diagnosis_steps.is_empty()
            && self.recommended_parts.is_empty()
            && self.preventive_maintenance.trim().is_empty()
    }
}
