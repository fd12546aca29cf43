//! Date projection for the reschedule bulk operation.
//!
//! `shift` applies the constant day offset between the source and target
//! range starts. `map` re-projects each source date onto the same ordinal
//! position in the target range; dates past the end of a shorter target
//! range are dropped and counted, never guessed.
//!
//! When weekend or blackout exclusion is on, an excluded candidate date is
//! pushed forward one day at a time to the next eligible date, probing at
//! most [`MAX_TARGET_PROBE_DAYS`] days; in `map` mode the push must also
//! stay inside the target range. An item with no eligible date is skipped
//! with its reason recorded.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarFacts;
use crate::error::CoreError;
use crate::timetable::is_weekend;
use crate::types::DbId;

/// How far past the excluded candidate the forward probe may look.
pub const MAX_TARGET_PROBE_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    Shift,
    Map,
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn validate(&self, label: &str) -> Result<(), CoreError> {
        if self.end < self.start {
            return Err(CoreError::Validation(format!(
                "{label} range end {} precedes start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Why a date could not be moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSkipReason {
    /// `map` mode: the ordinal position exceeds the target range length.
    Overflow,
    /// No eligible date within the probe window / target range.
    NoEligibleDate,
}

/// Outcome of projecting one source date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Projection {
    Moved { from: NaiveDate, to: NaiveDate },
    Skipped { from: NaiveDate, reason: MoveSkipReason },
}

/// Exclusion flags applied to candidate target dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exclusions {
    pub exclude_weekends: bool,
    pub respect_blackouts: bool,
}

/// Project `date` from `source` onto `target`. `department_id` scopes
/// the blackout lookups to the entry's batch.
pub fn project_date(
    date: NaiveDate,
    source: &DateRange,
    target: &DateRange,
    move_type: MoveType,
    exclusions: Exclusions,
    facts: &CalendarFacts,
    department_id: DbId,
) -> Projection {
    let candidate = match move_type {
        MoveType::Shift => {
            let offset = target.start.signed_duration_since(source.start);
            date + offset
        }
        MoveType::Map => {
            let ordinal = date.signed_duration_since(source.start);
            let projected = target.start + ordinal;
            if !target.contains(projected) {
                return Projection::Skipped {
                    from: date,
                    reason: MoveSkipReason::Overflow,
                };
            }
            projected
        }
    };

    // Push forward to the next eligible date, deterministically.
    let mut resolved = candidate;
    for _ in 0..=MAX_TARGET_PROBE_DAYS {
        let excluded = (exclusions.exclude_weekends && is_weekend(resolved))
            || (exclusions.respect_blackouts && facts.is_blackout(resolved, department_id));
        if !excluded {
            // map mode may not leave the target range while probing.
            if move_type == MoveType::Map && !target.contains(resolved) {
                break;
            }
            return Projection::Moved {
                from: date,
                to: resolved,
            };
        }
        resolved = resolved + Days::new(1);
    }

    Projection::Skipped {
        from: date,
        reason: MoveSkipReason::NoEligibleDate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{HolidayFact, HolidayType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(s: NaiveDate, e: NaiveDate) -> DateRange {
        DateRange { start: s, end: e }
    }

    fn no_facts() -> CalendarFacts {
        CalendarFacts::empty()
    }

    #[test]
    fn range_validation() {
        assert!(range(date(2025, 8, 1), date(2025, 8, 31)).validate("source").is_ok());
        assert!(range(date(2025, 8, 31), date(2025, 8, 1)).validate("source").is_err());
    }

    #[test]
    fn shift_applies_constant_offset() {
        let source = range(date(2025, 8, 4), date(2025, 8, 29));
        let target = range(date(2025, 9, 1), date(2025, 9, 26));
        let p = project_date(
            date(2025, 8, 6),
            &source,
            &target,
            MoveType::Shift,
            Exclusions::default(),
            &no_facts(),
            1,
        );
        assert_eq!(
            p,
            Projection::Moved {
                from: date(2025, 8, 6),
                to: date(2025, 9, 3)
            }
        );
    }

    #[test]
    fn map_projects_ordinal_position() {
        let source = range(date(2025, 8, 4), date(2025, 8, 15));
        let target = range(date(2025, 10, 6), date(2025, 10, 17));
        let p = project_date(
            date(2025, 8, 7), // day 3 of source
            &source,
            &target,
            MoveType::Map,
            Exclusions::default(),
            &no_facts(),
            1,
        );
        assert_eq!(
            p,
            Projection::Moved {
                from: date(2025, 8, 7),
                to: date(2025, 10, 9)
            }
        );
    }

    #[test]
    fn map_drops_overflow_when_target_shorter() {
        let source = range(date(2025, 8, 4), date(2025, 8, 15));
        let target = range(date(2025, 10, 6), date(2025, 10, 10)); // 5 days
        let p = project_date(
            date(2025, 8, 14),
            &source,
            &target,
            MoveType::Map,
            Exclusions::default(),
            &no_facts(),
            1,
        );
        assert_eq!(
            p,
            Projection::Skipped {
                from: date(2025, 8, 14),
                reason: MoveSkipReason::Overflow
            }
        );
    }

    #[test]
    fn weekend_candidate_pushes_to_monday() {
        let source = range(date(2025, 8, 4), date(2025, 8, 10));
        // Offset lands 2025-08-09 (Saturday) onto 2025-08-16 (Saturday).
        let target = range(date(2025, 8, 11), date(2025, 8, 24));
        let p = project_date(
            date(2025, 8, 9),
            &source,
            &target,
            MoveType::Shift,
            Exclusions {
                exclude_weekends: true,
                respect_blackouts: false,
            },
            &no_facts(),
            1,
        );
        assert_eq!(
            p,
            Projection::Moved {
                from: date(2025, 8, 9),
                to: date(2025, 8, 18) // following Monday
            }
        );
    }

    #[test]
    fn blackout_candidate_pushes_past_holiday() {
        let source = range(date(2025, 8, 4), date(2025, 8, 8));
        let target = range(date(2025, 8, 25), date(2025, 8, 29));
        let facts = CalendarFacts::new(
            vec![HolidayFact {
                id: 1,
                date: date(2025, 8, 25),
                name: "Holiday".into(),
                holiday_type: HolidayType::National,
                department_id: None,
                is_recurring: false,
            }],
            vec![],
        );
        let p = project_date(
            date(2025, 8, 4),
            &source,
            &target,
            MoveType::Shift,
            Exclusions {
                exclude_weekends: false,
                respect_blackouts: true,
            },
            &facts,
            1,
        );
        assert_eq!(
            p,
            Projection::Moved {
                from: date(2025, 8, 4),
                to: date(2025, 8, 26)
            }
        );
    }

    #[test]
    fn map_probe_may_not_leave_target_range() {
        let source = range(date(2025, 8, 4), date(2025, 8, 8));
        // Friday 2025-08-08 maps onto Friday 2025-08-15, the range end;
        // weekend exclusion has nowhere to push inside the range.
        let target = range(date(2025, 8, 11), date(2025, 8, 15));
        let facts = CalendarFacts::new(
            vec![HolidayFact {
                id: 1,
                date: date(2025, 8, 15),
                name: "Holiday".into(),
                holiday_type: HolidayType::National,
                department_id: None,
                is_recurring: false,
            }],
            vec![],
        );
        let p = project_date(
            date(2025, 8, 8),
            &source,
            &target,
            MoveType::Map,
            Exclusions {
                exclude_weekends: true,
                respect_blackouts: true,
            },
            &facts,
            1,
        );
        assert_eq!(
            p,
            Projection::Skipped {
                from: date(2025, 8, 8),
                reason: MoveSkipReason::NoEligibleDate
            }
        );
    }

    #[test]
    fn eligible_candidate_is_untouched_with_exclusions_on() {
        let source = range(date(2025, 8, 4), date(2025, 8, 8));
        let target = range(date(2025, 9, 1), date(2025, 9, 5));
        let p = project_date(
            date(2025, 8, 5),
            &source,
            &target,
            MoveType::Shift,
            Exclusions {
                exclude_weekends: true,
                respect_blackouts: true,
            },
            &no_facts(),
            1,
        );
        assert_eq!(
            p,
            Projection::Moved {
                from: date(2025, 8, 5),
                to: date(2025, 9, 2)
            }
        );
    }
}
