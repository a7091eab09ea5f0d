use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_cell::router::review_routes;
use shared_config::AppConfig;

fn test_config(store_uri: &str) -> AppConfig {
    AppConfig {
        store_base_url: store_uri.to_string(),
        port: 0,
        store_timeout_seconds: 5,
    }
}

fn create_test_app(config: AppConfig) -> Router {
    review_routes(Arc::new(config))
}

fn review_json(id: Uuid, doctor_id: Uuid, created_at: DateTime<Utc>) -> Value {
    json!({
        "id": id,
        "doctorId": doctor_id,
        "patientId": Uuid::new_v4(),
        "appointmentId": Uuid::new_v4(),
        "rating": 4,
        "comment": "Helpful and on time",
        "createdAt": created_at.to_rfc3339(),
    })
}

fn completed_appointment_json(id: Uuid, doctor_id: Uuid, patient_id: Uuid) -> Value {
    json!({
        "id": id,
        "doctorId": doctor_id,
        "patientId": patient_id,
        "date": "2026-07-01",
        "time": "09:30:00",
        "status": "completed",
        "consultationType": "clinic",
        "fee": 450.0,
        "createdAt": "2026-06-20T10:00:00Z",
        "updatedAt": "2026-07-01T10:15:00Z"
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
async fn review_created_for_completed_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_appointment_json(
            appointment_id,
            doctor_id,
            patient_id,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .and(query_param("appointmentId", appointment_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    // Doctor id must come from the appointment, not the caller.
    Mock::given(method("POST"))
        .and(path("/reviews"))
        .and(body_partial_json(json!({ "doctorId": doctor_id, "rating": 5 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": Uuid::new_v4(),
            "doctorId": doctor_id,
            "patientId": patient_id,
            "appointmentId": appointment_id,
            "rating": 5,
            "comment": "Excellent care",
            "createdAt": Utc::now().to_rfc3339(),
        })))
        .mount(&mock_server)
        .await;

    let (status, body) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": appointment_id,
            "patientId": patient_id,
            "rating": 5,
            "comment": "Excellent care",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["review"]["rating"], 5);
}

#[tokio::test]
async fn review_rejected_for_uncompleted_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let mut appointment =
        completed_appointment_json(appointment_id, Uuid::new_v4(), patient_id);
    appointment["status"] = json!("confirmed");

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
            "patientId": patient_id,
            "rating": 4,
            "comment": "Too early to tell",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn review_rejected_for_other_patients_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_appointment_json(
            appointment_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
        )))
        .mount(&mock_server)
        .await;

    let (status, _) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": appointment_id,
            "patientId": Uuid::new_v4(),
            "rating": 1,
            "comment": "Never met this doctor",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_review_is_conflict() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let appointment_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed_appointment_json(
            appointment_id,
            doctor_id,
            patient_id,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .and(query_param("appointmentId", appointment_id.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([review_json(Uuid::new_v4(), doctor_id, Utc::now())])),
        )
        .mount(&mock_server)
        .await;

    let (status, _) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": appointment_id,
            "patientId": patient_id,
            "rating": 3,
            "comment": "Second thoughts",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn out_of_range_rating_is_bad_request() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let (status, _) = send_json(
        app,
        "POST",
        "/",
        json!({
            "appointmentId": Uuid::new_v4(),
            "patientId": Uuid::new_v4(),
            "rating": 6,
            "comment": "Off the scale",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_inside_window_succeeds() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let review_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let created_at = Utc::now() - Duration::hours(2);

    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", review_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(review_json(review_id, doctor_id, created_at)),
        )
        .mount(&mock_server)
        .await;

    let mut updated = review_json(review_id, doctor_id, created_at);
    updated["rating"] = json!(2);
    updated["updatedAt"] = json!(Utc::now().to_rfc3339());
    Mock::given(method("PATCH"))
        .and(path(format!("/reviews/{}", review_id)))
        .and(body_partial_json(json!({ "rating": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .mount(&mock_server)
        .await;

    let (status, body) = send_json(
        app,
        "PATCH",
        &format!("/{}", review_id),
        json!({ "rating": 2 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 2);
}

#[tokio::test]
async fn edit_after_window_is_forbidden() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let review_id = Uuid::new_v4();
    let created_at = Utc::now() - Duration::hours(48);

    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", review_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(review_json(review_id, Uuid::new_v4(), created_at)),
        )
        .mount(&mock_server)
        .await;

    let (status, body) = send_json(
        app,
        "PATCH",
        &format!("/{}", review_id),
        json!({ "comment": "Changed my mind" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("24 hour"));
}

#[tokio::test]
async fn delete_after_window_is_forbidden() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let review_id = Uuid::new_v4();
    let created_at = Utc::now() - Duration::days(3);

    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", review_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(review_json(review_id, Uuid::new_v4(), created_at)),
        )
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", review_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_inside_window_succeeds() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let review_id = Uuid::new_v4();
    let created_at = Utc::now() - Duration::minutes(30);

    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", review_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(review_json(review_id, Uuid::new_v4(), created_at)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/reviews/{}", review_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", review_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn doctor_can_reply_after_window() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let review_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    // Well past the patient edit window; replies are not subject to it.
    let created_at = Utc::now() - Duration::days(10);

    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", review_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(review_json(review_id, doctor_id, created_at)),
        )
        .mount(&mock_server)
        .await;

    let mut replied = review_json(review_id, doctor_id, created_at);
    replied["doctorReply"] = json!("Thank you for the feedback");
    Mock::given(method("PATCH"))
        .and(path(format!("/reviews/{}", review_id)))
        .and(body_partial_json(json!({ "doctorReply": "Thank you for the feedback" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(replied))
        .mount(&mock_server)
        .await;

    let (status, body) = send_json(
        app,
        "POST",
        &format!("/{}/reply", review_id),
        json!({ "reply": "Thank you for the feedback" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctorReply"], "Thank you for the feedback");
}

#[tokio::test]
async fn doctor_reviews_listing_returns_totals() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server.uri()));

    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .and(query_param("doctorId", doctor_id.to_string()))
        .and(query_param("_sort", "createdAt"))
        .and(query_param("_order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            review_json(Uuid::new_v4(), doctor_id, Utc::now() - Duration::days(1)),
            review_json(Uuid::new_v4(), doctor_id, Utc::now() - Duration::days(4)),
        ])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/doctors/{}", doctor_id))
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
