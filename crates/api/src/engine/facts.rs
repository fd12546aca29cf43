//! Calendar facts loading.
//!
//! Loads the full holiday and exam period tables into a
//! [`CalendarFacts`] snapshot once per engine call; scope resolution
//! against each batch's department happens in core. Both tables are
//! configuration-sized, so one read apiece beats per-date queries.

use sqlx::PgPool;

use collegium_core::calendar::CalendarFacts;
use collegium_db::repositories::{ExamPeriodRepo, HolidayRepo};

use crate::error::AppResult;

/// Load a snapshot of all holidays and exam periods.
pub async fn load(pool: &PgPool) -> AppResult<CalendarFacts> {
    let holidays = HolidayRepo::list_all(pool).await?;
    let exam_periods = ExamPeriodRepo::list_all(pool).await?;

    let holiday_facts = holidays
        .iter()
        .map(|h| h.to_fact())
        .collect::<Result<Vec<_>, _>>()?;
    let period_facts = exam_periods.iter().map(|p| p.to_fact()).collect();

    Ok(CalendarFacts::new(holiday_facts, period_facts))
}
