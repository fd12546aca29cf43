//! Conflict detection for proposed timetable entries.
//!
//! The detector receives the ordered list of proposed entries together
//! with a snapshot of the stored active entries that could collide with
//! them, and the calendar facts for the batch scope. Checks run per entry
//! in request order; intra-request duplicates are compared against earlier
//! positions only, so the first occurrence stays valid and later copies
//! are flagged.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::CalendarFacts;
use crate::error::CoreError;
use crate::timetable::{DayOfWeek, EntryDraft, EntryType, ExistingEntry};
use crate::types::DbId;

/// Batch id -> department id, for resolving calendar fact scope. Built by
/// the caller while validating batch references.
pub type BatchDepartments = HashMap<DbId, DbId>;

/// Upper bound on proposed entries per detection call. Requests above it
/// are rejected before any per-entry work.
pub const MAX_BULK_ENTRIES: usize = 500;

// ---------------------------------------------------------------------------
// Conflict shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Structured detail for one detected conflict. Closed set; every variant
/// carries the ids a caller needs to self-correct.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictDetail {
    /// The batch already has an active entry in this slot.
    BatchDoubleBooking {
        batch_id: DbId,
        time_slot_id: DbId,
        day_of_week: DayOfWeek,
        entry_date: Option<NaiveDate>,
        conflicting_entry_ids: Vec<DbId>,
    },
    /// The faculty member already teaches in this slot.
    FacultyConflict {
        faculty_id: DbId,
        time_slot_id: DbId,
        day_of_week: DayOfWeek,
        entry_date: Option<NaiveDate>,
        conflicting_entry_ids: Vec<DbId>,
    },
    /// An earlier entry in the same request occupies the same batch slot.
    InternalBatchConflict {
        batch_id: DbId,
        time_slot_id: DbId,
        day_of_week: DayOfWeek,
        entry_date: Option<NaiveDate>,
        first_position: usize,
    },
    /// An earlier entry in the same request books the same faculty slot.
    InternalFacultyConflict {
        faculty_id: DbId,
        time_slot_id: DbId,
        day_of_week: DayOfWeek,
        entry_date: Option<NaiveDate>,
        first_position: usize,
    },
    /// The date is a holiday. Informational only.
    HolidayScheduling {
        entry_date: NaiveDate,
        holiday_names: Vec<String>,
    },
    /// A regular class proposed inside a blocking exam period.
    ExamPeriodConflict {
        entry_date: NaiveDate,
        exam_period_id: DbId,
        exam_period_name: String,
    },
    /// The same subject is already scheduled for this batch on this date
    /// in a different slot. Informational only.
    ModuleOverlap {
        batch_id: DbId,
        subject_id: DbId,
        entry_date: NaiveDate,
        conflicting_entry_ids: Vec<DbId>,
    },
}

impl ConflictDetail {
    pub fn severity(&self) -> Severity {
        match self {
            Self::BatchDoubleBooking { .. }
            | Self::FacultyConflict { .. }
            | Self::InternalBatchConflict { .. }
            | Self::InternalFacultyConflict { .. }
            | Self::ExamPeriodConflict { .. } => Severity::Error,
            Self::HolidayScheduling { .. } | Self::ModuleOverlap { .. } => Severity::Warning,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BatchDoubleBooking {
                batch_id,
                time_slot_id,
                day_of_week,
                entry_date,
                ..
            } => format!(
                "Batch {batch_id} already has an entry in slot {time_slot_id} on {day_of_week:?}{}",
                fmt_date(entry_date)
            ),
            Self::FacultyConflict {
                faculty_id,
                time_slot_id,
                day_of_week,
                entry_date,
                ..
            } => format!(
                "Faculty {faculty_id} is already booked in slot {time_slot_id} on {day_of_week:?}{}",
                fmt_date(entry_date)
            ),
            Self::InternalBatchConflict { first_position, .. } => format!(
                "Duplicates the batch slot of entry #{first_position} in this request"
            ),
            Self::InternalFacultyConflict {
                faculty_id,
                first_position,
                ..
            } => format!(
                "Faculty {faculty_id} is already booked by entry #{first_position} in this request"
            ),
            Self::HolidayScheduling {
                entry_date,
                holiday_names,
            } => format!(
                "{entry_date} is a holiday ({})",
                holiday_names.join(", ")
            ),
            Self::ExamPeriodConflict {
                entry_date,
                exam_period_name,
                ..
            } => format!(
                "Regular classes are blocked on {entry_date} by exam period '{exam_period_name}'"
            ),
            Self::ModuleOverlap {
                subject_id,
                entry_date,
                ..
            } => format!(
                "Subject {subject_id} is already scheduled for this batch on {entry_date}"
            ),
        }
    }
}

fn fmt_date(date: &Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!(" ({d})"),
        None => String::new(),
    }
}

/// One detected conflict: structured detail plus derived severity and a
/// human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub severity: Severity,
    pub message: String,
    #[serde(flatten)]
    pub detail: ConflictDetail,
}

impl Conflict {
    fn new(detail: ConflictDetail) -> Self {
        Self {
            severity: detail.severity(),
            message: detail.message(),
            detail,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Conflicts for one proposed entry, by its position in the request.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub index: usize,
    pub conflicts: Vec<Conflict>,
}

impl EntryReport {
    pub fn has_errors(&self) -> bool {
        self.conflicts.iter().any(Conflict::is_error)
    }
}

/// Full detection result, aligned 1:1 with the proposed entries.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub entries: Vec<EntryReport>,
    pub has_errors: bool,
    pub has_warnings: bool,
}

impl ConflictReport {
    /// Positions of entries with no error-severity conflicts. These are
    /// eligible for creation regardless of warnings.
    pub fn valid_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| !e.has_errors())
            .map(|e| e.index)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_errors()).count()
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Run conflict detection for `proposed` against the stored `existing`
/// snapshot and `facts`.
///
/// `existing` must contain every active entry that could collide with the
/// proposal (the repository query over the affected batches, faculty, and
/// dates); entries outside that set are simply never matched.
/// `departments` must map every proposed batch to its department.
pub fn detect(
    proposed: &[EntryDraft],
    existing: &[ExistingEntry],
    facts: &CalendarFacts,
    departments: &BatchDepartments,
) -> Result<ConflictReport, CoreError> {
    if proposed.is_empty() {
        return Err(CoreError::Validation(
            "at least one entry must be proposed".into(),
        ));
    }
    if proposed.len() > MAX_BULK_ENTRIES {
        return Err(CoreError::Validation(format!(
            "too many entries in one request: {} (max {MAX_BULK_ENTRIES})",
            proposed.len()
        )));
    }

    let mut entries = Vec::with_capacity(proposed.len());

    for (i, draft) in proposed.iter().enumerate() {
        let mut conflicts = Vec::new();

        // 1. Stored batch double-booking.
        let batch_hits: Vec<DbId> = existing
            .iter()
            .filter(|e| e.batch_key() == draft.batch_key())
            .map(|e| e.id)
            .collect();
        if !batch_hits.is_empty() {
            conflicts.push(Conflict::new(ConflictDetail::BatchDoubleBooking {
                batch_id: draft.batch_id,
                time_slot_id: draft.time_slot_id,
                day_of_week: draft.day_of_week,
                entry_date: draft.entry_date,
                conflicting_entry_ids: batch_hits,
            }));
        }

        // 2. Stored faculty double-booking.
        if let Some(key) = draft.faculty_key() {
            let faculty_hits: Vec<DbId> = existing
                .iter()
                .filter(|e| e.faculty_key() == Some(key))
                .map(|e| e.id)
                .collect();
            if !faculty_hits.is_empty() {
                conflicts.push(Conflict::new(ConflictDetail::FacultyConflict {
                    faculty_id: key.0,
                    time_slot_id: draft.time_slot_id,
                    day_of_week: draft.day_of_week,
                    entry_date: draft.entry_date,
                    conflicting_entry_ids: faculty_hits,
                }));
            }
        }

        // 3. Intra-request duplicates against earlier positions. Without
        // this, two colliding entries in one request would each pass the
        // stored-set check (neither exists yet) and both reach storage.
        if let Some(pos) = proposed[..i]
            .iter()
            .position(|earlier| earlier.batch_key() == draft.batch_key())
        {
            conflicts.push(Conflict::new(ConflictDetail::InternalBatchConflict {
                batch_id: draft.batch_id,
                time_slot_id: draft.time_slot_id,
                day_of_week: draft.day_of_week,
                entry_date: draft.entry_date,
                first_position: pos,
            }));
        }
        if let Some(key) = draft.faculty_key() {
            if let Some(pos) = proposed[..i]
                .iter()
                .position(|earlier| earlier.faculty_key() == Some(key))
            {
                conflicts.push(Conflict::new(ConflictDetail::InternalFacultyConflict {
                    faculty_id: key.0,
                    time_slot_id: draft.time_slot_id,
                    day_of_week: draft.day_of_week,
                    entry_date: draft.entry_date,
                    first_position: pos,
                }));
            }
        }

        // 4. Calendar facts, dated entries only.
        if let Some(date) = draft.entry_date {
            let department_id = departments.get(&draft.batch_id).copied().ok_or_else(|| {
                CoreError::Internal(format!(
                    "no department mapping for batch {}",
                    draft.batch_id
                ))
            })?;
            let holidays = facts.holidays_on(date, department_id);
            if !holidays.is_empty() {
                conflicts.push(Conflict::new(ConflictDetail::HolidayScheduling {
                    entry_date: date,
                    holiday_names: holidays.iter().map(|h| h.name.clone()).collect(),
                }));
            }
            if draft.entry_type == EntryType::Regular {
                if let Some(period) = facts.blocking_exam_period(date, department_id) {
                    conflicts.push(Conflict::new(ConflictDetail::ExamPeriodConflict {
                        entry_date: date,
                        exam_period_id: period.id,
                        exam_period_name: period.name.clone(),
                    }));
                }
            }

            // Same subject, same batch, same date, different slot.
            if let Some(subject_id) = draft.kind.subject_id() {
                let overlap_ids: Vec<DbId> = existing
                    .iter()
                    .filter(|e| {
                        e.batch_id == draft.batch_id
                            && e.subject_id == Some(subject_id)
                            && e.entry_date == Some(date)
                            && e.time_slot_id != draft.time_slot_id
                    })
                    .map(|e| e.id)
                    .collect();
                if !overlap_ids.is_empty() {
                    conflicts.push(Conflict::new(ConflictDetail::ModuleOverlap {
                        batch_id: draft.batch_id,
                        subject_id,
                        entry_date: date,
                        conflicting_entry_ids: overlap_ids,
                    }));
                }
            }
        }

        entries.push(EntryReport {
            index: i,
            conflicts,
        });
    }

    let has_errors = entries.iter().any(EntryReport::has_errors);
    let has_warnings = entries
        .iter()
        .any(|e| e.conflicts.iter().any(|c| c.severity == Severity::Warning));

    Ok(ConflictReport {
        entries,
        has_errors,
        has_warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{ExamPeriodFact, HolidayFact, HolidayType};
    use crate::timetable::EntryKind;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(batch: DbId, faculty: DbId, slot: DbId, d: Option<NaiveDate>) -> EntryDraft {
        let day = d.map(DayOfWeek::from_date).unwrap_or(DayOfWeek::Monday);
        EntryDraft {
            batch_id: batch,
            kind: EntryKind::Lesson {
                subject_id: 100,
                faculty_id: faculty,
            },
            time_slot_id: slot,
            day_of_week: day,
            entry_date: d,
            entry_type: EntryType::Regular,
            source_template_id: None,
            notes: None,
        }
    }

    fn existing(id: DbId, batch: DbId, faculty: DbId, slot: DbId, d: Option<NaiveDate>) -> ExistingEntry {
        let day = d.map(DayOfWeek::from_date).unwrap_or(DayOfWeek::Monday);
        ExistingEntry {
            id,
            batch_id: batch,
            subject_id: Some(100),
            faculty_id: Some(faculty),
            time_slot_id: slot,
            day_of_week: day,
            entry_date: d,
        }
    }

    fn no_facts() -> CalendarFacts {
        CalendarFacts::empty()
    }

    fn depts() -> BatchDepartments {
        let mut m = HashMap::new();
        for batch in 0..=600i64 {
            m.insert(batch, 1);
        }
        m
    }

    #[test]
    fn empty_proposal_rejected() {
        assert!(detect(&[], &[], &no_facts(), &depts()).is_err());
    }

    #[test]
    fn oversized_proposal_rejected() {
        let many: Vec<EntryDraft> = (0..=MAX_BULK_ENTRIES as i64)
            .map(|i| draft(i, i, 1, None))
            .collect();
        assert!(detect(&many, &[], &no_facts(), &depts()).is_err());
    }

    #[test]
    fn clean_entry_has_no_conflicts() {
        let report = detect(&[draft(1, 20, 3, None)], &[], &no_facts(), &depts()).unwrap();
        assert!(!report.has_errors);
        assert!(!report.has_warnings);
        assert_eq!(report.valid_indices(), vec![0]);
    }

    #[test]
    fn batch_double_booking_detected() {
        let stored = vec![existing(55, 1, 99, 3, None)];
        let report = detect(&[draft(1, 20, 3, None)], &stored, &no_facts(), &depts()).unwrap();
        assert!(report.has_errors);
        assert_matches!(
            &report.entries[0].conflicts[0].detail,
            ConflictDetail::BatchDoubleBooking { conflicting_entry_ids, .. }
                if conflicting_entry_ids == &vec![55]
        );
    }

    #[test]
    fn faculty_conflict_detected_across_batches() {
        // Same faculty, same slot, different batch.
        let stored = vec![existing(55, 2, 20, 3, None)];
        let report = detect(&[draft(1, 20, 3, None)], &stored, &no_facts(), &depts()).unwrap();
        assert!(report.has_errors);
        assert_matches!(
            &report.entries[0].conflicts[0].detail,
            ConflictDetail::FacultyConflict { faculty_id: 20, .. }
        );
    }

    #[test]
    fn internal_batch_conflict_catches_request_duplicates() {
        // Neither exists in storage; only the intra-request check can see this.
        let proposed = vec![draft(1, 20, 3, None), draft(1, 21, 3, None)];
        let report = detect(&proposed, &[], &no_facts(), &depts()).unwrap();
        assert!(!report.entries[0].has_errors());
        assert!(report.entries[1].has_errors());
        assert_matches!(
            &report.entries[1].conflicts[0].detail,
            ConflictDetail::InternalBatchConflict { first_position: 0, .. }
        );
    }

    #[test]
    fn internal_faculty_conflict_detected() {
        let proposed = vec![draft(1, 20, 3, None), draft(2, 20, 3, None)];
        let report = detect(&proposed, &[], &no_facts(), &depts()).unwrap();
        assert_matches!(
            &report.entries[1].conflicts[0].detail,
            ConflictDetail::InternalFacultyConflict { faculty_id: 20, first_position: 0, .. }
        );
    }

    #[test]
    fn first_occurrence_stays_valid() {
        let proposed = vec![draft(1, 20, 3, None), draft(1, 21, 3, None)];
        let report = detect(&proposed, &[], &no_facts(), &depts()).unwrap();
        assert_eq!(report.valid_indices(), vec![0]);
    }

    #[test]
    fn holiday_is_warning_not_error() {
        let monday = date(2025, 8, 25);
        let facts = CalendarFacts::new(
            vec![HolidayFact {
                id: 9,
                date: monday,
                name: "Founders Day".into(),
                holiday_type: HolidayType::University,
                department_id: None,
                is_recurring: false,
            }],
            vec![],
        );
        let report = detect(&[draft(1, 20, 3, Some(monday))], &[], &facts, &depts()).unwrap();
        assert!(!report.has_errors);
        assert!(report.has_warnings);
        assert_eq!(report.valid_indices(), vec![0]);
    }

    #[test]
    fn exam_period_blocks_regular_only() {
        let monday = date(2025, 11, 10);
        let facts = CalendarFacts::new(
            vec![],
            vec![ExamPeriodFact {
                id: 4,
                name: "End-sem".into(),
                start_date: monday,
                end_date: date(2025, 11, 21),
                blocks_regular_classes: true,
                department_id: None,
            }],
        );

        let regular = detect(&[draft(1, 20, 3, Some(monday))], &[], &facts, &depts()).unwrap();
        assert!(regular.has_errors);

        let mut makeup = draft(1, 20, 3, Some(monday));
        makeup.entry_type = EntryType::Makeup;
        let report = detect(&[makeup], &[], &facts, &depts()).unwrap();
        assert!(!report.has_errors);
    }

    #[test]
    fn module_overlap_warns_on_same_subject_same_date() {
        let monday = date(2025, 8, 4);
        // Subject 100 already taught to batch 1 that day in slot 7.
        let stored = vec![existing(55, 1, 30, 7, Some(monday))];
        let report = detect(&[draft(1, 20, 3, Some(monday))], &stored, &no_facts(), &depts()).unwrap();
        assert!(!report.has_errors);
        assert!(report.has_warnings);
        assert_matches!(
            &report.entries[0].conflicts[0].detail,
            ConflictDetail::ModuleOverlap { subject_id: 100, .. }
        );
    }

    #[test]
    fn dated_and_recurring_slots_do_not_collide() {
        // A weekly entry (no date) and a dated instance share slot/day but
        // have distinct uniqueness keys.
        let stored = vec![existing(55, 1, 99, 3, None)];
        let report =
            detect(&[draft(1, 20, 3, Some(date(2025, 8, 4)))], &stored, &no_facts(), &depts()).unwrap();
        assert!(!report.has_errors);
    }
}
