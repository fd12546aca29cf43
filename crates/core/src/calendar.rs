//! Calendar facts: holidays and exam periods resolved against a batch's
//! department scope.
//!
//! [`CalendarFacts`] is an immutable per-request snapshot loaded by the
//! api crate from the `holidays` and `exam_periods` tables. Lookups take
//! the department of the batch being scheduled; a fact applies when its
//! own `department_id` is `None` (university-wide) or matches. All
//! lookups are pure; storage failures happen before construction and
//! propagate from the loader.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Holiday classification. Department-scoped types still rely on the
/// `department_id` column for the actual scoping decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayType {
    National,
    University,
    Department,
    Local,
}

impl HolidayType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::National => "national",
            Self::University => "university",
            Self::Department => "department",
            Self::Local => "local",
        }
    }
}

/// A holiday as seen by the scheduling engine.
#[derive(Debug, Clone, Serialize)]
pub struct HolidayFact {
    pub id: DbId,
    pub date: NaiveDate,
    pub name: String,
    pub holiday_type: HolidayType,
    /// `None` applies university-wide.
    pub department_id: Option<DbId>,
    /// Recurring holidays repeat on the same month/day every year.
    pub is_recurring: bool,
}

impl HolidayFact {
    fn falls_on(&self, date: NaiveDate) -> bool {
        if self.is_recurring {
            self.date.month() == date.month() && self.date.day() == date.day()
        } else {
            self.date == date
        }
    }
}

/// An exam period as seen by the scheduling engine.
#[derive(Debug, Clone, Serialize)]
pub struct ExamPeriodFact {
    pub id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub blocks_regular_classes: bool,
    pub department_id: Option<DbId>,
}

impl ExamPeriodFact {
    fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Snapshot of all holidays and exam periods visible to the engine.
#[derive(Debug, Clone, Default)]
pub struct CalendarFacts {
    holidays: Vec<HolidayFact>,
    exam_periods: Vec<ExamPeriodFact>,
}

impl CalendarFacts {
    pub fn new(holidays: Vec<HolidayFact>, exam_periods: Vec<ExamPeriodFact>) -> Self {
        Self {
            holidays,
            exam_periods,
        }
    }

    /// Facts with no holidays or exam periods; useful when blackout
    /// checks are disabled.
    pub fn empty() -> Self {
        Self::default()
    }

    fn in_scope(fact_department: Option<DbId>, department_id: DbId) -> bool {
        fact_department.is_none() || fact_department == Some(department_id)
    }

    /// All holidays falling on `date` that apply to `department_id`.
    pub fn holidays_on(&self, date: NaiveDate, department_id: DbId) -> Vec<&HolidayFact> {
        self.holidays
            .iter()
            .filter(|h| Self::in_scope(h.department_id, department_id) && h.falls_on(date))
            .collect()
    }

    /// The first applicable exam period covering `date` that blocks
    /// regular classes, if any.
    pub fn blocking_exam_period(
        &self,
        date: NaiveDate,
        department_id: DbId,
    ) -> Option<&ExamPeriodFact> {
        self.exam_periods.iter().find(|p| {
            Self::in_scope(p.department_id, department_id)
                && p.blocks_regular_classes
                && p.covers(date)
        })
    }

    /// True when `date` is a holiday or inside a blocking exam period for
    /// the given department.
    pub fn is_blackout(&self, date: NaiveDate, department_id: DbId) -> bool {
        !self.holidays_on(date, department_id).is_empty()
            || self.blocking_exam_period(date, department_id).is_some()
    }
}
