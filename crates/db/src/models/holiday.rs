//! Holiday model and DTOs.

use chrono::NaiveDate;
use collegium_core::calendar::{HolidayFact, HolidayType};
use collegium_core::error::CoreError;
use collegium_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `holidays` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Holiday {
    pub id: DbId,
    pub holiday_date: NaiveDate,
    pub name: String,
    pub holiday_type: String,
    pub department_id: Option<DbId>,
    pub is_recurring: bool,
    pub created_at: Timestamp,
}

impl Holiday {
    pub fn to_fact(&self) -> Result<HolidayFact, CoreError> {
        let holiday_type = match self.holiday_type.as_str() {
            "national" => HolidayType::National,
            "university" => HolidayType::University,
            "department" => HolidayType::Department,
            "local" => HolidayType::Local,
            other => {
                return Err(CoreError::Internal(format!(
                    "holiday {} has unknown type '{other}'",
                    self.id
                )))
            }
        };
        Ok(HolidayFact {
            id: self.id,
            date: self.holiday_date,
            name: self.name.clone(),
            holiday_type,
            department_id: self.department_id,
            is_recurring: self.is_recurring,
        })
    }
}

/// DTO for inserting a new holiday.
#[derive(Debug, Deserialize)]
pub struct CreateHoliday {
    pub holiday_date: NaiveDate,
    pub name: String,
    pub holiday_type: String,
    #[serde(default)]
    pub department_id: Option<DbId>,
    #[serde(default)]
    pub is_recurring: bool,
}
