//! Timetable entry vocabulary: days, entry types, and the entry draft
//! shape shared by the conflict detector, the recurrence generator, and
//! the bulk operation planners.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Day of week
// ---------------------------------------------------------------------------

/// Day of the week, stored as SMALLINT 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Numeric value as stored in `timetable_entries.day_of_week`.
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Parse the stored numeric value. Errors on anything outside 0..=6.
    pub fn from_i16(value: i16) -> Result<Self, CoreError> {
        match value {
            0 => Ok(Self::Monday),
            1 => Ok(Self::Tuesday),
            2 => Ok(Self::Wednesday),
            3 => Ok(Self::Thursday),
            4 => Ok(Self::Friday),
            5 => Ok(Self::Saturday),
            6 => Ok(Self::Sunday),
            other => Err(CoreError::Validation(format!(
                "day_of_week must be 0..=6, got {other}"
            ))),
        }
    }

    /// The day of week a calendar date falls on.
    pub fn from_date(date: NaiveDate) -> Self {
        // num_days_from_monday is 0 for Monday, matching our encoding.
        match date.weekday().num_days_from_monday() {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            _ => Self::Sunday,
        }
    }
}

/// Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(
        DayOfWeek::from_date(date),
        DayOfWeek::Saturday | DayOfWeek::Sunday
    )
}

// ---------------------------------------------------------------------------
// Entry type
// ---------------------------------------------------------------------------

/// Kind of scheduled occurrence. Only `Regular` entries are blocked by
/// exam periods; makeup/extra/exam sessions may be scheduled inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Regular,
    Makeup,
    Extra,
    Exam,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Makeup => "makeup",
            Self::Extra => "extra",
            Self::Exam => "exam",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "regular" => Ok(Self::Regular),
            "makeup" => Ok(Self::Makeup),
            "extra" => Ok(Self::Extra),
            "exam" => Ok(Self::Exam),
            other => Err(CoreError::Validation(format!(
                "unknown entry_type '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry kind (lesson vs. custom event)
// ---------------------------------------------------------------------------

/// What occupies the slot: a taught lesson (subject + faculty, both
/// required together) or a custom event (title, optional display color).
/// The two are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Lesson { subject_id: DbId, faculty_id: DbId },
    CustomEvent { title: String, color: Option<String> },
}

impl EntryKind {
    /// The assigned faculty member, if this is a lesson.
    pub fn faculty_id(&self) -> Option<DbId> {
        match self {
            Self::Lesson { faculty_id, .. } => Some(*faculty_id),
            Self::CustomEvent { .. } => None,
        }
    }

    /// The taught subject, if this is a lesson.
    pub fn subject_id(&self) -> Option<DbId> {
        match self {
            Self::Lesson { subject_id, .. } => Some(*subject_id),
            Self::CustomEvent { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts and stored projections
// ---------------------------------------------------------------------------

/// A proposed (not yet persisted) timetable entry.
///
/// `entry_date = None` means a weekly recurring entry; `Some` means a
/// dated instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub batch_id: DbId,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub time_slot_id: DbId,
    pub day_of_week: DayOfWeek,
    pub entry_date: Option<NaiveDate>,
    pub entry_type: EntryType,
    #[serde(default)]
    pub source_template_id: Option<DbId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntryDraft {
    /// Field-level checks that do not require stored state: a dated draft
    /// must fall on its declared day of week, custom-event titles must be
    /// non-empty.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(date) = self.entry_date {
            let actual = DayOfWeek::from_date(date);
            if actual != self.day_of_week {
                return Err(CoreError::Validation(format!(
                    "entry_date {date} falls on {actual:?}, not {:?}",
                    self.day_of_week
                )));
            }
        }
        if let EntryKind::CustomEvent { title, .. } = &self.kind {
            if title.trim().is_empty() {
                return Err(CoreError::Validation(
                    "custom event title must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// The batch-side uniqueness key `(batch, slot, day, date)`.
    pub fn batch_key(&self) -> (DbId, DbId, DayOfWeek, Option<NaiveDate>) {
        (
            self.batch_id,
            self.time_slot_id,
            self.day_of_week,
            self.entry_date,
        )
    }

    /// The faculty-side uniqueness key, when a faculty member is assigned.
    pub fn faculty_key(&self) -> Option<(DbId, DbId, DayOfWeek, Option<NaiveDate>)> {
        self.kind
            .faculty_id()
            .map(|f| (f, self.time_slot_id, self.day_of_week, self.entry_date))
    }
}

/// Projection of a stored active entry, as needed by conflict checks.
#[derive(Debug, Clone, Serialize)]
pub struct ExistingEntry {
    pub id: DbId,
    pub batch_id: DbId,
    pub subject_id: Option<DbId>,
    pub faculty_id: Option<DbId>,
    pub time_slot_id: DbId,
    pub day_of_week: DayOfWeek,
    pub entry_date: Option<NaiveDate>,
}

impl ExistingEntry {
    pub fn batch_key(&self) -> (DbId, DbId, DayOfWeek, Option<NaiveDate>) {
        (
            self.batch_id,
            self.time_slot_id,
            self.day_of_week,
            self.entry_date,
        )
    }

    pub fn faculty_key(&self) -> Option<(DbId, DbId, DayOfWeek, Option<NaiveDate>)> {
        self.faculty_id
            .map(|f| (f, self.time_slot_id, self.day_of_week, self.entry_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lesson_draft(date_opt: Option<NaiveDate>, day: DayOfWeek) -> EntryDraft {
        EntryDraft {
            batch_id: 1,
            kind: EntryKind::Lesson {
                subject_id: 10,
                faculty_id: 20,
            },
            time_slot_id: 3,
            day_of_week: day,
            entry_date: date_opt,
            entry_type: EntryType::Regular,
            source_template_id: None,
            notes: None,
        }
    }

    #[test]
    fn day_of_week_roundtrip() {
        for v in 0..=6i16 {
            assert_eq!(DayOfWeek::from_i16(v).unwrap().as_i16(), v);
        }
        assert!(DayOfWeek::from_i16(7).is_err());
        assert!(DayOfWeek::from_i16(-1).is_err());
    }

    #[test]
    fn day_of_week_from_date() {
        // 2025-08-04 is a Monday.
        assert_eq!(DayOfWeek::from_date(date(2025, 8, 4)), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::from_date(date(2025, 8, 10)), DayOfWeek::Sunday);
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(date(2025, 8, 9))); // Saturday
        assert!(is_weekend(date(2025, 8, 10))); // Sunday
        assert!(!is_weekend(date(2025, 8, 11))); // Monday
    }

    #[test]
    fn entry_type_parse_roundtrip() {
        for t in [
            EntryType::Regular,
            EntryType::Makeup,
            EntryType::Extra,
            EntryType::Exam,
        ] {
            assert_eq!(EntryType::parse(t.as_str()).unwrap(), t);
        }
        assert!(EntryType::parse("lecture").is_err());
    }

    #[test]
    fn draft_date_must_match_declared_day() {
        let draft = lesson_draft(Some(date(2025, 8, 4)), DayOfWeek::Monday);
        assert!(draft.validate().is_ok());

        let wrong = lesson_draft(Some(date(2025, 8, 5)), DayOfWeek::Monday);
        assert!(wrong.validate().is_err());
    }

    #[test]
    fn recurring_draft_needs_no_date() {
        let draft = lesson_draft(None, DayOfWeek::Friday);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn empty_event_title_rejected() {
        let draft = EntryDraft {
            batch_id: 1,
            kind: EntryKind::CustomEvent {
                title: "  ".into(),
                color: None,
            },
            time_slot_id: 3,
            day_of_week: DayOfWeek::Monday,
            entry_date: None,
            entry_type: EntryType::Extra,
            source_template_id: None,
            notes: None,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn faculty_key_absent_for_custom_events() {
        let draft = EntryDraft {
            batch_id: 1,
            kind: EntryKind::CustomEvent {
                title: "Guest talk".into(),
                color: Some("#aa3366".into()),
            },
            time_slot_id: 3,
            day_of_week: DayOfWeek::Monday,
            entry_date: None,
            entry_type: EntryType::Extra,
            source_template_id: None,
            notes: None,
        };
        assert!(draft.faculty_key().is_none());
        assert!(lesson_draft(None, DayOfWeek::Monday).faculty_key().is_some());
    }
}
