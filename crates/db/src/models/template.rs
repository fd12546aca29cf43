//! Timetable template model and DTOs.

use chrono::NaiveDate;
use collegium_core::error::CoreError;
use collegium_core::recurrence::{EndCondition, RecurrencePattern, TemplateRule};
use collegium_core::timetable::DayOfWeek;
use collegium_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `timetable_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimetableTemplate {
    pub id: DbId,
    pub name: String,
    pub batch_id: DbId,
    pub subject_id: DbId,
    pub faculty_id: DbId,
    pub time_slot_id: DbId,
    pub day_of_week: i16,
    pub recurrence_pattern: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub end_condition: String,
    pub total_hours: Option<f64>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimetableTemplate {
    /// Resolve the row into the core expansion rule. The slot duration is
    /// not stored on the template and must be supplied by the caller.
    ///
    /// When applying the template to a batch other than its own (bulk
    /// template-apply), pass the target as `batch_override`.
    pub fn to_rule(
        &self,
        slot_duration_minutes: i32,
        batch_override: Option<DbId>,
    ) -> Result<TemplateRule, CoreError> {
        Ok(TemplateRule {
            template_id: self.id,
            batch_id: batch_override.unwrap_or(self.batch_id),
            subject_id: self.subject_id,
            faculty_id: self.faculty_id,
            time_slot_id: self.time_slot_id,
            day_of_week: DayOfWeek::from_i16(self.day_of_week)?,
            pattern: RecurrencePattern::parse(&self.recurrence_pattern)?,
            start_date: self.start_date,
            end_date: self.end_date,
            end_condition: EndCondition::parse(&self.end_condition)?,
            total_hours: self.total_hours,
            slot_duration_minutes,
        })
    }
}

/// DTO for inserting a new template.
#[derive(Debug, Deserialize)]
pub struct CreateTimetableTemplate {
    pub name: String,
    pub batch_id: DbId,
    pub subject_id: DbId,
    pub faculty_id: DbId,
    pub time_slot_id: DbId,
    pub day_of_week: i16,
    pub recurrence_pattern: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub end_condition: String,
    #[serde(default)]
    pub total_hours: Option<f64>,
}
