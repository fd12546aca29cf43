//! Integration tests for the entry store's uniqueness invariants.
//!
//! The partial unique indexes are the storage-level double-booking net;
//! these tests verify they hold for both the batch and faculty keys, that
//! inactive entries do not participate, and that snapshot restore keeps
//! the original id.

use chrono::NaiveDate;
use sqlx::PgPool;

use collegium_db::models::timetable_entry::CreateTimetableEntry;
use collegium_db::repositories::TimetableEntryRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    batch_a: i64,
    batch_b: i64,
    subject: i64,
    faculty_a: i64,
    faculty_b: i64,
    slot: i64,
}

async fn seed(pool: &PgPool) -> Fixture {
    let dept: (i64,) =
        sqlx::query_as("INSERT INTO departments (name, code) VALUES ('CS', 'CS') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();

    let mut batches = Vec::new();
    for name in ["CS-A", "CS-B"] {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO batches (name, department_id, academic_year) \
             VALUES ($1, $2, '2025-26') RETURNING id",
        )
        .bind(name)
        .bind(dept.0)
        .fetch_one(pool)
        .await
        .unwrap();
        batches.push(row.0);
    }

    let subject: (i64,) = sqlx::query_as(
        "INSERT INTO subjects (name, code, department_id, weekly_hours) \
         VALUES ('Algorithms', 'CS301', $1, 4) RETURNING id",
    )
    .bind(dept.0)
    .fetch_one(pool)
    .await
    .unwrap();

    let mut faculty = Vec::new();
    for (name, email) in [("Rao", "rao@example.edu"), ("Iyer", "iyer@example.edu")] {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO faculty (name, email, department_id) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(dept.0)
        .fetch_one(pool)
        .await
        .unwrap();
        faculty.push(row.0);
    }

    let slot: (i64,) = sqlx::query_as(
        "INSERT INTO time_slots (name, start_time, end_time, duration_minutes, sort_order) \
         VALUES ('P1', '09:00', '10:00', 60, 1) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    Fixture {
        batch_a: batches[0],
        batch_b: batches[1],
        subject: subject.0,
        faculty_a: faculty[0],
        faculty_b: faculty[1],
        slot: slot.0,
    }
}

fn lesson(
    f: &Fixture,
    batch_id: i64,
    faculty_id: i64,
    date: Option<NaiveDate>,
) -> CreateTimetableEntry {
    CreateTimetableEntry {
        batch_id,
        subject_id: Some(f.subject),
        faculty_id: Some(faculty_id),
        event_title: None,
        event_color: None,
        time_slot_id: f.slot,
        day_of_week: 0,
        entry_date: date,
        entry_type: "regular".to_string(),
        source_template_id: None,
        notes: None,
        created_by: None,
    }
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some("23505")
                && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Batch uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_batch_slot_rejected(pool: PgPool) {
    let f = seed(&pool).await;

    TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_a, None))
        .await
        .unwrap();

    // Same batch/slot/day, different faculty: still a batch double-booking.
    let err = TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_b, None))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err, "uq_timetable_entries_batch_slot"));
}

#[sqlx::test(migrations = "./migrations")]
async fn dated_and_recurring_keys_are_distinct(pool: PgPool) {
    let f = seed(&pool).await;
    let monday = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

    TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_a, None))
        .await
        .unwrap();

    // A dated instance in the same slot does not collide with the weekly
    // entry; it must still collide with itself.
    TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_b, Some(monday)))
        .await
        .unwrap();
    let err = TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_b, Some(monday)))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err, "uq_timetable_entries_batch_slot"));
}

// ---------------------------------------------------------------------------
// Faculty uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn faculty_double_booking_rejected_across_batches(pool: PgPool) {
    let f = seed(&pool).await;

    TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_a, None))
        .await
        .unwrap();

    // Different batch, same faculty/slot/day.
    let err = TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_b, f.faculty_a, None))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err, "uq_timetable_entries_faculty_slot"));
}

#[sqlx::test(migrations = "./migrations")]
async fn custom_events_do_not_book_faculty(pool: PgPool) {
    let f = seed(&pool).await;

    let event = CreateTimetableEntry {
        batch_id: f.batch_a,
        subject_id: None,
        faculty_id: None,
        event_title: Some("Orientation".to_string()),
        event_color: Some("#336699".to_string()),
        time_slot_id: f.slot,
        day_of_week: 0,
        entry_date: None,
        entry_type: "extra".to_string(),
        source_template_id: None,
        notes: None,
        created_by: None,
    };
    TimetableEntryRepo::create(&pool, &event).await.unwrap();

    // A second custom event in the same batch slot is still a batch
    // collision, but a lesson in another batch is fine (no faculty row
    // exists to collide with).
    TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_b, f.faculty_a, None))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Deactivation frees the slot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn deactivated_entry_frees_its_keys(pool: PgPool) {
    let f = seed(&pool).await;

    let first = TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_a, None))
        .await
        .unwrap();
    let prior = TimetableEntryRepo::deactivate(&pool, first.id)
        .await
        .unwrap()
        .expect("entry should deactivate");
    assert_eq!(prior.id, first.id);
    assert!(!prior.is_active);

    // The slot is free again.
    TimetableEntryRepo::create(&pool, &lesson(&f, f.batch_a, f.faculty_a, None))
        .await
        .unwrap();

    // Second deactivation of the same row is a no-op.
    assert!(TimetableEntryRepo::deactivate(&pool, first.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Snapshot restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn restore_keeps_original_id_and_fields(pool: PgPool) {
    let f = seed(&pool).await;
    let monday = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

    let mut input = lesson(&f, f.batch_a, f.faculty_a, Some(monday));
    input.notes = Some("restored-notes".to_string());
    let original = TimetableEntryRepo::create(&pool, &input).await.unwrap();

    TimetableEntryRepo::deactivate(&pool, original.id)
        .await
        .unwrap()
        .unwrap();

    let restored = TimetableEntryRepo::restore_from_snapshot(&pool, &original)
        .await
        .unwrap();
    assert_eq!(restored.id, original.id);
    assert!(restored.is_active);
    assert_eq!(restored.batch_id, original.batch_id);
    assert_eq!(restored.faculty_id, original.faculty_id);
    assert_eq!(restored.entry_date, original.entry_date);
    assert_eq!(restored.notes.as_deref(), Some("restored-notes"));
}
