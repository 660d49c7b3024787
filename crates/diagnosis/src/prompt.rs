//! Prompt and response schema for the diagnosis request.

use domain::{AiDiagnosis, DiagnosisRequest};
use serde_json::{Value, json};

use crate::{DiagnosisError, Result};

/// Builds the instruction sent to the model.
pub fn build_prompt(request: &DiagnosisRequest) -> String {
    let mut prompt = format!(
        "Você é um mecânico automotivo experiente. Analise o problema relatado \
         e responda em português do Brasil.\n\
         Veículo: {}\n\
         Reclamação do cliente: {}\n",
        request.vehicle_model.trim(),
        request.complaint.trim(),
    );
    if let Some(mileage) = request.mileage {
        prompt.push_str(&format!("Quilometragem: {mileage} km\n"));
    }
    prompt.push_str(
        "Liste 3 causas prováveis, os passos de diagnóstico, as peças recomendadas \
         com custo estimado em reais, as horas de mão de obra estimadas e uma \
         recomendação de manutenção preventiva.",
    );
    prompt
}

/// JSON schema the model must answer with.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "possibleCauses": { "type": "ARRAY", "items": { "type": "STRING" } },
            "diagnosisSteps": { "type": "ARRAY", "items": { "type": "STRING" } },
            "recommendedParts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "estimatedCost": { "type": "NUMBER" }
                    },
                    "required": ["name", "estimatedCost"]
                }
            },
            "estimatedLaborHours": { "type": "NUMBER" },
            "preventiveMaintenance": { "type": "STRING" }
        },
        "required": [
            "possibleCauses",
            "diagnosisSteps",
            "recommendedParts",
            "estimatedLaborHours",
            "preventiveMaintenance"
        ]
    })
}

/// Parses the model's text answer, tolerating a markdown code fence.
pub fn parse_diagnosis(text: &str) -> Result<AiDiagnosis> {
    let body = strip_fence(text.trim());
    if body.is_empty() {
        return Err(DiagnosisError::InvalidResponse("empty answer".to_string()));
    }

    let diagnosis: AiDiagnosis = serde_json::from_str(body)
        .map_err(|e| DiagnosisError::InvalidResponse(e.to_string()))?;
    if diagnosis.is_empty() {
        return Err(DiagnosisError::InvalidResponse(
            "answer has no causes, steps or parts".to_string(),
        ));
    }
    Ok(diagnosis)
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = r#"{
        "possibleCauses": ["Pastilhas gastas", "Disco empenado", "Pinça travada"],
        "diagnosisSteps": ["Medir espessura das pastilhas"],
        "recommendedParts": [{ "name": "Pastilha de freio", "estimatedCost": 180.5 }],
        "estimatedLaborHours": 1.5,
        "preventiveMaintenance": "Revisar freios a cada 10.000 km"
    }"#;

    #[test]
    fn test_prompt_includes_vehicle_and_mileage() {
        let request = DiagnosisRequest {
            vehicle_model: "Fiat Uno".to_string(),
            complaint: "Barulho ao frear".to_string(),
            mileage: Some(85_000),
        };
        let prompt = build_prompt(&request);

        assert!(prompt.contains("Veículo: Fiat Uno"));
        assert!(prompt.contains("Reclamação do cliente: Barulho ao frear"));
        assert!(prompt.contains("Quilometragem: 85000 km"));
    }

    #[test]
    fn test_prompt_without_mileage() {
        let request = DiagnosisRequest {
            vehicle_model: "Fiat Uno".to_string(),
            complaint: "Barulho".to_string(),
            mileage: None,
        };
        assert!(!build_prompt(&request).contains("Quilometragem"));
    }

    #[test]
    fn test_parse_plain_and_fenced_answers() {
        let plain = parse_diagnosis(ANSWER).unwrap();
        assert_eq!(plain.possible_causes.len(), 3);
        assert_eq!(plain.first_part_name(), Some("Pastilha de freio"));

        let fenced = parse_diagnosis(&format!("```json\n{ANSWER}\n```")).unwrap();
        assert_eq!(fenced, plain);
    }

    #[test]
    fn test_parse_rejects_garbage_and_empty() {
        assert!(matches!(
            parse_diagnosis("não sei"),
            Err(DiagnosisError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_diagnosis("   "),
            Err(DiagnosisError::InvalidResponse(_))
        ));

        let empty = r#"{"possibleCauses":[],"diagnosisSteps":[],"recommendedParts":[],
            "estimatedLaborHours":0,"preventiveMaintenance":""}"#;
        assert!(matches!(
            parse_diagnosis(empty),
            Err(DiagnosisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = response_schema();
        assert_eq!(schema["required"].as_array().map(Vec::len), Some(5));
    }
}
