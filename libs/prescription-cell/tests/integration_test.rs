use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prescription_cell::router::prescription_routes;
use shared_config::AppConfig;

fn test_config(store_uri: &str) -> AppConfig {
    AppConfig {
        store_base_url: store_uri.to_string(),
        port: 0,
        store_timeout_seconds: 5,
    }
}

fn create_test_app(config: AppConfig) -> Router {
    prescription_routes(Arc::new(config))
}

fn appointment_json(id: Uuid, doctor_id: Uuid, patient_id: Uuid, status: &str) -> Value {
    json!({
        "id": id,
        "doctorId": doctor_id,
        "patientId": patient_id,
        "date": "2026-07-01",
        "time": "11:00:00",
        "status": status,
        "consultationType": "video",
        "fee": 300.0,
        "createdAt": "2026-06-15T09:00:00Z",
        "updatedAt": "2026-07-01T11:40:00Z"
    })
}

fn prescription_json(id: Uuid, appointment_id: Uuid, doctor_id: Uuid, patient_id: Uuid) -> Value {
    json!({
        "id": id,
        "appointmentId": appointment_id,
        "doctorId": doctor_id,
        "patientId": patient_id,
        "diagnosis": "Seasonal allergy",
        "medicines": [
            { "name": "Cetirizine", "dosage": "10mg", "frequency": "once daily", "durationDays": 14 }
        ],
        "advice": "Avoid known triggers",
        "createdAt": "2026-07-01T11:45:00Z"
    })
}

async fn send_json(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

#[tokio::test]
async fn prescription_created_for_completed_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let prescription_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_json(
            appointment_id,
            doctor_id,
            patient_id,
            "completed",
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/prescriptions"))
        .and(body_partial_json(json!({
            "appointmentId": appointment_id,
            "doctorId": doctor_id,
            "patientId": patient_id,
            "diagnosis": "Seasonal allergy",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(prescription_json(
            prescription_id,
            appointment_id,
            doctor_id,
            patient_id,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .and(body_partial_json(json!({ "prescriptionId": prescription_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let (status, body) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": appointment_id,
            "diagnosis": "Seasonal allergy",
            "medicines": [
                { "name": "Cetirizine", "dosage": "10mg", "frequency": "once daily", "durationDays": 14 }
            ],
            "advice": "Avoid known triggers",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["prescription"]["id"], json!(prescription_id));
}

#[tokio::test]
async fn prescription_rejected_for_uncompleted_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment_json(
            appointment_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "confirmed",
        )))
        .mount(&mock_server)
        .await;

    let (status, body) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": appointment_id,
            "diagnosis": "Too soon",
            "medicines": [],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("completed"));
}

#[tokio::test]
async fn second_prescription_for_same_appointment_is_conflict() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();

    let mut appointment =
        appointment_json(appointment_id, Uuid::new_v4(), Uuid::new_v4(), "completed");
    appointment["prescriptionId"] = json!(Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment))
        .mount(&mock_server)
        .await;

    let (status, _) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": appointment_id,
            "diagnosis": "Duplicate",
            "medicines": [],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn lookup_by_appointment_returns_prescription() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();
    let prescription_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/prescriptions"))
        .and(query_param("appointmentId", appointment_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([prescription_json(
            prescription_id,
            appointment_id,
            Uuid::new_v4(),
            Uuid::new_v4()
        )])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/appointments/{}", appointment_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["id"], json!(prescription_id));
}

#[tokio::test]
async fn lookup_by_appointment_without_prescription_is_404() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/prescriptions"))
        .and(query_param("appointmentId", appointment_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/appointments/{}", appointment_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patient_history_lists_prescriptions() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/prescriptions"))
        .and(query_param("patientId", patient_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            prescription_json(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), patient_id),
            prescription_json(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), patient_id),
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/patients/{}", patient_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 2);
}
