//! Transactional atomicity of multi-row entry creation.
//!
//! A bulk create is one transaction: a failure on the last item must
//! leave zero persisted rows, never a partial batch.

use sqlx::PgPool;

use collegium_db::models::timetable_entry::CreateTimetableEntry;
use collegium_db::repositories::TimetableEntryRepo;

async fn seed(pool: &PgPool) -> (i64, i64, i64, i64) {
    let dept: (i64,) =
        sqlx::query_as("INSERT INTO departments (name, code) VALUES ('EE', 'EE') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let batch: (i64,) = sqlx::query_as(
        "INSERT INTO batches (name, department_id, academic_year) \
         VALUES ('EE-A', $1, '2025-26') RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();
    let subject: (i64,) = sqlx::query_as(
        "INSERT INTO subjects (name, code, department_id, weekly_hours) \
         VALUES ('Circuits', 'EE101', $1, 3) RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();
    let faculty: (i64,) = sqlx::query_as(
        "INSERT INTO faculty (name, email, department_id) \
         VALUES ('Menon', 'menon@example.edu', $1) RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();
    (dept.0, batch.0, subject.0, faculty.0)
}

async fn slot(pool: &PgPool, name: &str, sort: i32) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO time_slots (name, start_time, end_time, duration_minutes, sort_order) \
         VALUES ($1, '09:00', '10:00', 60, $2) RETURNING id",
    )
    .bind(name)
    .bind(sort)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

#[sqlx::test(migrations = "./migrations")]
async fn failing_last_item_rolls_back_everything(pool: PgPool) {
    let (_dept, batch, subject, faculty) = seed(&pool).await;

    // Nine distinct slots, then a tenth item that reuses slot 0 -- a
    // guaranteed unique-index violation on the final insert.
    let mut slots = Vec::new();
    for i in 0..9 {
        slots.push(slot(&pool, &format!("P{i}"), i).await);
    }
    slots.push(slots[0]);

    let mut tx = pool.begin().await.unwrap();
    let mut failed = false;
    for (i, slot_id) in slots.iter().enumerate() {
        let input = CreateTimetableEntry {
            batch_id: batch,
            subject_id: Some(subject),
            faculty_id: Some(faculty),
            event_title: None,
            event_color: None,
            time_slot_id: *slot_id,
            day_of_week: 0,
            entry_date: None,
            entry_type: "regular".to_string(),
            source_template_id: None,
            notes: None,
            created_by: None,
        };
        if TimetableEntryRepo::create_in_tx(&mut tx, &input).await.is_err() {
            assert_eq!(i, 9, "only the duplicate tenth item should fail");
            failed = true;
            break;
        }
    }
    assert!(failed);
    drop(tx); // roll back

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timetable_entries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0, "rollback must leave zero rows, not nine");
}

#[sqlx::test(migrations = "./migrations")]
async fn committed_transaction_persists_all(pool: PgPool) {
    let (_dept, batch, subject, faculty) = seed(&pool).await;

    let mut slots = Vec::new();
    for i in 0..5 {
        slots.push(slot(&pool, &format!("P{i}"), i).await);
    }

    let mut tx = pool.begin().await.unwrap();
    for slot_id in &slots {
        let input = CreateTimetableEntry {
            batch_id: batch,
            subject_id: Some(subject),
            faculty_id: Some(faculty),
            event_title: None,
            event_color: None,
            time_slot_id: *slot_id,
            day_of_week: 1,
            entry_date: None,
            entry_type: "regular".to_string(),
            source_template_id: None,
            notes: None,
            created_by: None,
        };
        TimetableEntryRepo::create_in_tx(&mut tx, &input).await.unwrap();
    }
    tx.commit().await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timetable_entries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 5);
}
