//! Gemini client against a mock HTTP server.

use diagnosis::{DiagnosisError, DiagnosisService, GeminiConfig, GeminiDiagnosisService};
use domain::DiagnosisRequest;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn request() -> DiagnosisRequest {
    DiagnosisRequest {
        vehicle_model: "Chevrolet Onix".to_string(),
        complaint: "Ar-condicionado não gela".to_string(),
        mileage: Some(62_000),
    }
}

async fn service(server: &MockServer) -> GeminiDiagnosisService {
    GeminiDiagnosisService::new(
        GeminiConfig::new("test-key").with_base_url(format!("{}/v1beta", server.uri())),
    )
    .unwrap()
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_successful_diagnosis() {
    let server = MockServer::start().await;
    let answer = json!({
        "possibleCauses": ["Falta de gás", "Compressor", "Filtro de cabine"],
        "diagnosisSteps": ["Medir pressão do sistema"],
        "recommendedParts": [{ "name": "Gás R134a", "estimatedCost": 150.0 }],
        "estimatedLaborHours": 1.0,
        "preventiveMaintenance": "Trocar filtro de cabine a cada 6 meses"
    });
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&answer.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let diagnosis = service(&server).await.diagnose(&request()).await.unwrap();

    assert_eq!(diagnosis.possible_causes.len(), 3);
    assert_eq!(diagnosis.first_part_name(), Some("Gás R134a"));
    assert_eq!(diagnosis.labor_hours(), 1.0);
}

#[tokio::test]
async fn test_request_carries_prompt_and_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{}")))
        .mount(&server)
        .await;

    let _ = service(&server).await.diagnose(&request()).await;

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Chevrolet Onix"));
    assert!(prompt.contains("62000 km"));
    assert_eq!(
        body["generationConfig"]["responseMimeType"],
        "application/json"
    );
}

#[tokio::test]
async fn test_rate_limit_and_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let service = service(&server).await;
    assert!(matches!(
        service.diagnose(&request()).await,
        Err(DiagnosisError::RateLimited)
    ));
    match service.diagnose(&request()).await {
        Err(DiagnosisError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_answer_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("desculpe, não entendi")))
        .mount(&server)
        .await;

    let err = service(&server).await.diagnose(&request()).await.unwrap_err();
    assert!(matches!(err, DiagnosisError::InvalidResponse(_)));
    assert_eq!(err.kind(), domain::ErrorKind::ExternalService);
}
