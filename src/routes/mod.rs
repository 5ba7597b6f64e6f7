use axum::Router;
use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};

use crate::models::{AppState, Clinic, Employee, Patient, Service, WaitingListEntry};

pub mod appointment_routes;
pub mod crud_routes;
pub mod extract;
pub mod health_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/clinics", crud_routes::router::<Clinic>())
        .nest("/api/patients", crud_routes::router::<Patient>())
        .nest("/api/employees", crud_routes::router::<Employee>())
        .nest("/api/services", crud_routes::router::<Service>())
        .nest("/api/appointments", appointment_routes::router())
        .nest("/api/waiting-list", crud_routes::router::<WaitingListEntry>())
        .merge(health_routes::router())
        .with_state(state)
}

/// Browser clients on any origin; no credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use sqlx::PgPool;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// Router over a pool that never connects; only paths that fail before
    /// reaching the store may be exercised with it.
    fn offline_app() -> Router {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/never_contacted")
            .unwrap();
        router(AppState { db })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send_raw(app: &Router, uri: &str, raw: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(&offline_app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "OK", "message": "Medical Appointment Booking API is running"})
        );
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (status, body) = send_raw(&offline_app(), "/api/clinics", "{\"name\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn unknown_fields_are_rejected() {
        let app = offline_app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/clinics",
            Some(json!({"name": "Test Clinic", "fax": "none"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn blank_clinic_name_is_a_validation_error() {
        let (status, body) = send(
            &offline_app(),
            "POST",
            "/api/clinics",
            Some(json!({"name": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"], "name is required");
    }

    #[tokio::test]
    async fn reversed_appointment_interval_is_400() {
        let (status, body) = send(
            &offline_app(),
            "POST",
            "/api/appointments",
            Some(json!({
                "patient_id": 1,
                "employee_id": 1,
                "service_id": 1,
                "clinic_id": 1,
                "start_datetime": "2025-10-25T10:30:00Z",
                "end_datetime": "2025-10-25T10:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn appointment_cannot_start_completed() {
        let (status, body) = send(
            &offline_app(),
            "POST",
            "/api/appointments",
            Some(json!({
                "patient_id": 1,
                "employee_id": 1,
                "service_id": 1,
                "clinic_id": 1,
                "start_datetime": "2025-10-25T10:00:00Z",
                "end_datetime": "2025-10-25T10:30:00Z",
                "status": "COMPLETED"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");
    }

    #[tokio::test]
    async fn money_the_column_cannot_hold_is_400() {
        let app = offline_app();
        for price in [json!(10000000000000u64), json!(12.345)] {
            let (status, body) = send(
                &app,
                "POST",
                "/api/services",
                Some(json!({"name": "Huge", "duration_minutes": 30, "price": price})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}");
            assert_eq!(body["code"], "VALIDATION_ERROR");
        }

        let (status, body) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(json!({
                "patient_id": 1,
                "employee_id": 1,
                "service_id": 1,
                "clinic_id": 1,
                "start_datetime": "2025-10-25T10:00:00Z",
                "end_datetime": "2025-10-25T10:30:00Z",
                "payment_amount": 99999999999999u64
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_numeric_id_is_400() {
        let (status, body) = send(&offline_app(), "GET", "/api/patients/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let app = offline_app().layer(cors_layer());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/appointments")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "requires database"]
    async fn booking_flow_over_http(pool: PgPool) {
        let app = router(AppState { db: pool });

        let (status, clinic) = send(
            &app,
            "POST",
            "/api/clinics",
            Some(json!({"name": "Test Clinic", "address": "123 Test Street"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, patient) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"first_name": "John", "last_name": "Doe", "email": "john@example.com"})),
        )
        .await;
        let (_, employee) = send(
            &app,
            "POST",
            "/api/employees",
            Some(json!({"clinic_id": clinic["id"], "first_name": "Jane", "last_name": "Smith"})),
        )
        .await;
        assert_eq!(employee["timezone"], "Asia/Colombo");
        let (_, service) = send(
            &app,
            "POST",
            "/api/services",
            Some(json!({"name": "General Consultation", "duration_minutes": 30, "price": 100.0})),
        )
        .await;

        let booking = |start: &str, end: &str| {
            json!({
                "patient_id": patient["id"],
                "employee_id": employee["id"],
                "service_id": service["id"],
                "clinic_id": clinic["id"],
                "start_datetime": start,
                "end_datetime": end,
                "appointment_type": "INITIAL_CONSULTATION"
            })
        };

        let (status, appt) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(booking("2025-10-25T10:00:00Z", "2025-10-25T10:30:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(appt["status"], "SCHEDULED");
        assert_eq!(appt["payment_status"], "PENDING");

        let (status, body) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(booking("2025-10-25T10:15:00Z", "2025-10-25T10:45:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "APPOINTMENT_CONFLICT");

        let uri = format!("/api/appointments/{}", appt["id"]);
        let mut confirm = booking("2025-10-25T10:00:00Z", "2025-10-25T10:30:00Z");
        confirm["status"] = json!("CONFIRMED");
        let (status, updated) = send(&app, "PUT", &uri, Some(confirm)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "CONFIRMED");

        // The clinic is still referenced by the employee and the appointment.
        let clinic_uri = format!("/api/clinics/{}", clinic["id"]);
        let (status, body) = send(&app, "DELETE", &clinic_uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONSTRAINT_VIOLATION");

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, list) = send(&app, "GET", "/api/appointments", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([]));
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "requires database"]
    async fn waiting_list_defaults_apply(pool: PgPool) {
        let app = router(AppState { db: pool });
        let (_, patient) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"first_name": "John", "last_name": "Doe"})),
        )
        .await;
        let (_, service) = send(
            &app,
            "POST",
            "/api/services",
            Some(json!({"name": "Follow Up", "duration_minutes": 15})),
        )
        .await;

        let (status, entry) = send(
            &app,
            "POST",
            "/api/waiting-list",
            Some(json!({"patient_id": patient["id"], "service_id": service["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["urgency_level"], "MEDIUM");
        assert_eq!(entry["status"], "ACTIVE");

        let (status, body) = send(&app, "DELETE", "/api/waiting-list/424242", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
