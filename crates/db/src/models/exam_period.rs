//! Exam period model and DTOs.

use chrono::NaiveDate;
use collegium_core::calendar::ExamPeriodFact;
use collegium_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `exam_periods` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamPeriod {
    pub id: DbId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub blocks_regular_classes: bool,
    pub department_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl ExamPeriod {
    pub fn to_fact(&self) -> ExamPeriodFact {
        ExamPeriodFact {
            id: self.id,
            name: self.name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            blocks_regular_classes: self.blocks_regular_classes,
            department_id: self.department_id,
        }
    }
}

/// DTO for inserting a new exam period.
#[derive(Debug, Deserialize)]
pub struct CreateExamPeriod {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_blocks")]
    pub blocks_regular_classes: bool,
    #[serde(default)]
    pub department_id: Option<DbId>,
}

fn default_blocks() -> bool {
    true
}
