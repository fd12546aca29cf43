//! Integration tests for the HTTP surface: auth enforcement and the
//! conflict-checked entry creation flow, driven through the full
//! production router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use tower::ServiceExt;

use common::{test_router, token_for};

async fn seed_schedule_refs(pool: &PgPool) -> (i64, i64, i64, i64) {
    let dept: (i64,) =
        sqlx::query_as("INSERT INTO departments (name, code) VALUES ('CS', 'CS') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let batch: (i64,) = sqlx::query_as(
        "INSERT INTO batches (name, department_id, academic_year) \
         VALUES ('CS-A', $1, '2025-26') RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();
    let subject: (i64,) = sqlx::query_as(
        "INSERT INTO subjects (name, code, department_id, weekly_hours) \
         VALUES ('Algorithms', 'CS301', $1, 4) RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();
    let faculty: (i64,) = sqlx::query_as(
        "INSERT INTO faculty (name, email, department_id) \
         VALUES ('Rao', 'rao@example.edu', $1) RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();
    let slot: (i64,) = sqlx::query_as(
        "INSERT INTO time_slots (name, start_time, end_time, duration_minutes, sort_order) \
         VALUES ('P1', '09:00', '10:00', 60, 1) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    (batch.0, subject.0, faculty.0, slot.0)
}

fn entry_body(batch: i64, subject: i64, faculty: i64, slot: i64) -> String {
    serde_json::json!({
        "entries": [{
            "batch_id": batch,
            "kind": "lesson",
            "subject_id": subject,
            "faculty_id": faculty,
            "time_slot_id": slot,
            "day_of_week": "monday",
            "entry_date": null,
            "entry_type": "regular"
        }]
    })
    .to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn health_endpoint_is_public(pool: PgPool) {
    let (app, _config) = test_router(pool);
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reads_require_authentication(pool: PgPool) {
    let (app, _config) = test_router(pool);
    let response = app
        .oneshot(
            Request::get("/api/v1/time-slots")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn mutations_require_admin_role(pool: PgPool) {
    let (app, config) = test_router(pool);
    let token = token_for(&config, 9, "faculty");
    let response = app
        .oneshot(
            Request::post("/api/v1/time-slots")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"name":"P1","start_time":"09:00:00","end_time":"10:00:00"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_creates_time_slot(pool: PgPool) {
    let (app, config) = test_router(pool);
    let token = token_for(&config, 1, "admin");
    let response = app
        .oneshot(
            Request::post("/api/v1/time-slots")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"name":"P1","start_time":"09:00:00","end_time":"10:00:00"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn entry_creation_is_conflict_checked(pool: PgPool) {
    let (batch, subject, faculty, slot) = seed_schedule_refs(&pool).await;
    let (app, config) = test_router(pool);
    let token = token_for(&config, 1, "admin");

    let first = app
        .clone()
        .oneshot(
            Request::post("/api/v1/timetable/entries")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(entry_body(batch, subject, faculty, slot)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    // The identical proposal now double-books the batch slot.
    let second = app
        .oneshot(
            Request::post("/api/v1/timetable/entries")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(entry_body(batch, subject, faculty, slot)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn validate_only_persists_nothing(pool: PgPool) {
    let (batch, subject, faculty, slot) = seed_schedule_refs(&pool).await;
    let (app, config) = test_router(pool.clone());
    let token = token_for(&config, 1, "admin");

    let body = serde_json::json!({
        "entries": [{
            "batch_id": batch,
            "kind": "lesson",
            "subject_id": subject,
            "faculty_id": faculty,
            "time_slot_id": slot,
            "day_of_week": "monday",
            "entry_date": null,
            "entry_type": "regular"
        }],
        "validate_only": true
    })
    .to_string();

    let response = app
        .oneshot(
            Request::post("/api/v1/timetable/entries")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timetable_entries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}
