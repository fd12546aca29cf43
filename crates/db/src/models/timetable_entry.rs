//! Timetable entry model and DTOs.
//!
//! The row keeps nullable subject/faculty/event columns guarded by the
//! `ck_timetable_entries_kind` CHECK constraint; [`TimetableEntry::kind`]
//! surfaces them as the core crate's tagged [`EntryKind`].

use chrono::NaiveDate;
use collegium_core::error::CoreError;
use collegium_core::timetable::{DayOfWeek, EntryDraft, EntryKind, EntryType, ExistingEntry};
use collegium_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timetable_entries` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: DbId,
    pub batch_id: DbId,
    pub subject_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub event_title: Option<String>,
    pub event_color: Option<String>,
    pub time_slot_id: DbId,
    pub day_of_week: i16,
    pub entry_date: Option<NaiveDate>,
    pub entry_type: String,
    pub source_template_id: Option<DbId>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimetableEntry {
    /// The entry's kind as the core tagged variant. Errors only on rows
    /// that somehow violate the CHECK constraint.
    pub fn kind(&self) -> Result<EntryKind, CoreError> {
        match (self.subject_id, self.faculty_id, &self.event_title) {
            (Some(subject_id), Some(faculty_id), None) => Ok(EntryKind::Lesson {
                subject_id,
                faculty_id,
            }),
            (None, None, Some(title)) => Ok(EntryKind::CustomEvent {
                title: title.clone(),
                color: self.event_color.clone(),
            }),
            _ => Err(CoreError::Internal(format!(
                "timetable entry {} has inconsistent kind columns",
                self.id
            ))),
        }
    }

    /// Projection used by the conflict detector.
    pub fn to_existing(&self) -> Result<ExistingEntry, CoreError> {
        Ok(ExistingEntry {
            id: self.id,
            batch_id: self.batch_id,
            subject_id: self.subject_id,
            faculty_id: self.faculty_id,
            time_slot_id: self.time_slot_id,
            day_of_week: DayOfWeek::from_i16(self.day_of_week)?,
            entry_date: self.entry_date,
        })
    }

    /// Rebuild a draft from a stored row, e.g. when cloning it into
    /// another batch.
    pub fn to_draft(&self) -> Result<EntryDraft, CoreError> {
        Ok(EntryDraft {
            batch_id: self.batch_id,
            kind: self.kind()?,
            time_slot_id: self.time_slot_id,
            day_of_week: DayOfWeek::from_i16(self.day_of_week)?,
            entry_date: self.entry_date,
            entry_type: EntryType::parse(&self.entry_type)?,
            source_template_id: self.source_template_id,
            notes: self.notes.clone(),
        })
    }
}

/// Insert DTO, normally built from a validated [`EntryDraft`].
#[derive(Debug, Clone)]
pub struct CreateTimetableEntry {
    pub batch_id: DbId,
    pub subject_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub event_title: Option<String>,
    pub event_color: Option<String>,
    pub time_slot_id: DbId,
    pub day_of_week: i16,
    pub entry_date: Option<NaiveDate>,
    pub entry_type: String,
    pub source_template_id: Option<DbId>,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
}

impl CreateTimetableEntry {
    pub fn from_draft(draft: &EntryDraft, created_by: Option<DbId>) -> Self {
        let (subject_id, faculty_id, event_title, event_color) = match &draft.kind {
            EntryKind::Lesson {
                subject_id,
                faculty_id,
            } => (Some(*subject_id), Some(*faculty_id), None, None),
            EntryKind::CustomEvent { title, color } => {
                (None, None, Some(title.clone()), color.clone())
            }
        };
        Self {
            batch_id: draft.batch_id,
            subject_id,
            faculty_id,
            event_title,
            event_color,
            time_slot_id: draft.time_slot_id,
            day_of_week: draft.day_of_week.as_i16(),
            entry_date: draft.entry_date,
            entry_type: draft.entry_type.as_str().to_string(),
            source_template_id: draft.source_template_id,
            notes: draft.notes.clone(),
            created_by,
        }
    }
}

/// Patch DTO. Slot/day/date moves go through the reschedule bulk
/// operation, not here.
#[derive(Debug, Deserialize)]
pub struct UpdateTimetableEntry {
    pub entry_type: Option<String>,
    pub notes: Option<String>,
}

/// Query filters for listing entries.
#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    pub batch_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub day_of_week: Option<i16>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub include_inactive: bool,
}
