//! Template expansion into dated entry drafts.
//!
//! The generator walks dates from the template's start, stepping by the
//! recurrence pattern, and emits a draft for every date that matches the
//! configured day of week and is not blacked out. Skipped dates are
//! recorded with their reason so callers can report them instead of
//! silently dropping work.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarFacts;
use crate::error::CoreError;
use crate::timetable::{DayOfWeek, EntryDraft, EntryKind, EntryType};
use crate::types::DbId;

/// Defensive bound on loop cycles. A template that has not reached its
/// end condition after this many visited dates is misconfigured (end date
/// before start, unreachable hours target); generation stops and the
/// result carries `cap_reached = true` so callers can warn.
pub const MAX_CYCLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(CoreError::Validation(format!(
                "unknown recurrence_pattern '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    SemesterEnd,
    HoursComplete,
    SpecificDate,
}

impl EndCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SemesterEnd => "semester_end",
            Self::HoursComplete => "hours_complete",
            Self::SpecificDate => "specific_date",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "semester_end" => Ok(Self::SemesterEnd),
            "hours_complete" => Ok(Self::HoursComplete),
            "specific_date" => Ok(Self::SpecificDate),
            other => Err(CoreError::Validation(format!(
                "unknown end_condition '{other}'"
            ))),
        }
    }
}

/// The scheduling rule carried by a timetable template, plus the slot
/// duration resolved by the caller.
#[derive(Debug, Clone)]
pub struct TemplateRule {
    pub template_id: DbId,
    pub batch_id: DbId,
    pub subject_id: DbId,
    pub faculty_id: DbId,
    pub time_slot_id: DbId,
    pub day_of_week: DayOfWeek,
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub end_condition: EndCondition,
    /// Target instructional hours; required iff `HoursComplete`.
    pub total_hours: Option<f64>,
    pub slot_duration_minutes: i32,
}

impl TemplateRule {
    /// Required-field combinations per end condition.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.end_condition {
            EndCondition::HoursComplete => match self.total_hours {
                Some(h) if h > 0.0 => {}
                _ => {
                    return Err(CoreError::Validation(
                        "end_condition hours_complete requires a positive total_hours".into(),
                    ))
                }
            },
            EndCondition::SpecificDate => {
                if self.end_date.is_none() {
                    return Err(CoreError::Validation(
                        "end_condition specific_date requires an end_date".into(),
                    ));
                }
            }
            EndCondition::SemesterEnd => {}
        }
        if self.slot_duration_minutes <= 0 {
            return Err(CoreError::Validation(
                "time slot duration must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// A date the generator visited but did not schedule.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Holiday { names: Vec<String> },
    ExamPeriod { name: String },
}

/// Result of expanding one template.
#[derive(Debug, Clone, Serialize)]
pub struct Expansion {
    pub drafts: Vec<EntryDraft>,
    pub skipped: Vec<SkippedDate>,
    pub accumulated_hours: f64,
    /// True when [`MAX_CYCLES`] stopped the walk before an end condition.
    pub cap_reached: bool,
}

/// Expand `rule` into dated entry drafts. `department_id` is the
/// department of the rule's batch, for calendar fact scoping.
///
/// Drafts that collide with stored entries are not the generator's
/// concern; callers pass the result through the conflict detector before
/// persisting.
pub fn expand(
    rule: &TemplateRule,
    facts: &CalendarFacts,
    department_id: DbId,
) -> Result<Expansion, CoreError> {
    rule.validate()?;

    let slot_hours = f64::from(rule.slot_duration_minutes) / 60.0;
    let mut drafts = Vec::new();
    let mut skipped = Vec::new();
    let mut accumulated_hours = 0.0;
    let mut cap_reached = true;

    let mut current = rule.start_date;
    for _ in 0..MAX_CYCLES {
        if let Some(end) = rule.end_date {
            if current > end {
                cap_reached = false;
                break;
            }
        }
        if rule.end_condition == EndCondition::HoursComplete {
            // validate() guarantees total_hours is present here.
            let target = rule.total_hours.unwrap_or(0.0);
            if accumulated_hours >= target {
                cap_reached = false;
                break;
            }
        }

        if DayOfWeek::from_date(current) == rule.day_of_week {
            let holidays = facts.holidays_on(current, department_id);
            if !holidays.is_empty() {
                skipped.push(SkippedDate {
                    date: current,
                    reason: SkipReason::Holiday {
                        names: holidays.iter().map(|h| h.name.clone()).collect(),
                    },
                });
            } else if let Some(period) = facts.blocking_exam_period(current, department_id) {
                skipped.push(SkippedDate {
                    date: current,
                    reason: SkipReason::ExamPeriod {
                        name: period.name.clone(),
                    },
                });
            } else {
                drafts.push(EntryDraft {
                    batch_id: rule.batch_id,
                    kind: EntryKind::Lesson {
                        subject_id: rule.subject_id,
                        faculty_id: rule.faculty_id,
                    },
                    time_slot_id: rule.time_slot_id,
                    day_of_week: rule.day_of_week,
                    entry_date: Some(current),
                    entry_type: EntryType::Regular,
                    source_template_id: Some(rule.template_id),
                    notes: None,
                });
                accumulated_hours += slot_hours;
            }
        }

        current = match rule.pattern {
            RecurrencePattern::Daily => current + Days::new(1),
            RecurrencePattern::Weekly => current + Days::new(7),
            // Clamps to the target month's last day (Jan 31 -> Feb 28).
            RecurrencePattern::Monthly => current + Months::new(1),
        };
    }

    Ok(Expansion {
        drafts,
        skipped,
        accumulated_hours,
        cap_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{ExamPeriodFact, HolidayFact, HolidayType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_rule() -> TemplateRule {
        TemplateRule {
            template_id: 1,
            batch_id: 2,
            subject_id: 3,
            faculty_id: 4,
            time_slot_id: 5,
            day_of_week: DayOfWeek::Monday,
            pattern: RecurrencePattern::Weekly,
            start_date: date(2025, 8, 4), // a Monday
            end_date: Some(date(2025, 10, 31)),
            end_condition: EndCondition::SemesterEnd,
            total_hours: None,
            slot_duration_minutes: 60,
        }
    }

    fn holiday_on(d: NaiveDate) -> CalendarFacts {
        CalendarFacts::new(
            vec![HolidayFact {
                id: 1,
                date: d,
                name: "Holiday".into(),
                holiday_type: HolidayType::National,
                department_id: None,
                is_recurring: false,
            }],
            vec![],
        )
    }

    #[test]
    fn weekly_expansion_hits_every_monday_in_range() {
        let rule = weekly_rule();
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        // Mondays 2025-08-04 .. 2025-10-27 inclusive.
        assert_eq!(out.drafts.len(), 13);
        assert!(!out.cap_reached);
        assert!(out.skipped.is_empty());
        assert_eq!(out.drafts[0].entry_date, Some(date(2025, 8, 4)));
        assert_eq!(
            out.drafts.last().unwrap().entry_date,
            Some(date(2025, 10, 27))
        );
        for d in &out.drafts {
            assert_eq!(d.day_of_week, DayOfWeek::Monday);
            assert_eq!(d.source_template_id, Some(1));
        }
    }

    #[test]
    fn holiday_mondays_are_skipped_with_reason() {
        let rule = weekly_rule();
        let out = expand(&rule, &holiday_on(date(2025, 8, 25)), 1).unwrap();
        assert_eq!(out.drafts.len(), 12);
        assert!(!out
            .drafts
            .iter()
            .any(|d| d.entry_date == Some(date(2025, 8, 25))));
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].date, date(2025, 8, 25));
        assert_eq!(
            out.skipped[0].reason,
            SkipReason::Holiday {
                names: vec!["Holiday".into()]
            }
        );
    }

    #[test]
    fn hours_complete_generates_exact_count() {
        let mut rule = weekly_rule();
        rule.end_condition = EndCondition::HoursComplete;
        rule.end_date = None;
        rule.total_hours = Some(30.0);
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        assert_eq!(out.drafts.len(), 30);
        assert_eq!(out.accumulated_hours, 30.0);
        assert!(!out.cap_reached);
    }

    #[test]
    fn hours_complete_counts_slot_duration() {
        let mut rule = weekly_rule();
        rule.end_condition = EndCondition::HoursComplete;
        rule.end_date = None;
        rule.total_hours = Some(30.0);
        rule.slot_duration_minutes = 120;
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        assert_eq!(out.drafts.len(), 15);
        assert_eq!(out.accumulated_hours, 30.0);
    }

    #[test]
    fn hours_complete_requires_target() {
        let mut rule = weekly_rule();
        rule.end_condition = EndCondition::HoursComplete;
        rule.total_hours = None;
        assert!(expand(&rule, &CalendarFacts::empty(), 1).is_err());
    }

    #[test]
    fn specific_date_requires_end_date() {
        let mut rule = weekly_rule();
        rule.end_condition = EndCondition::SpecificDate;
        rule.end_date = None;
        assert!(expand(&rule, &CalendarFacts::empty(), 1).is_err());
    }

    #[test]
    fn daily_pattern_emits_only_matching_days() {
        let mut rule = weekly_rule();
        rule.pattern = RecurrencePattern::Daily;
        rule.end_date = Some(date(2025, 8, 17)); // two weeks
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        // Only the two Mondays in the window.
        assert_eq!(out.drafts.len(), 2);
    }

    #[test]
    fn monthly_pattern_steps_by_calendar_month() {
        let mut rule = weekly_rule();
        rule.pattern = RecurrencePattern::Monthly;
        rule.end_date = Some(date(2025, 12, 31));
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        // 2025-08-04 is a Monday; 09-04, 10-04, 11-04, 12-04 mostly are not.
        assert_eq!(out.drafts[0].entry_date, Some(date(2025, 8, 4)));
        for d in &out.drafts {
            assert_eq!(DayOfWeek::from_date(d.entry_date.unwrap()), DayOfWeek::Monday);
        }
    }

    #[test]
    fn reversed_range_produces_nothing_without_cap() {
        let mut rule = weekly_rule();
        rule.end_date = Some(date(2025, 8, 1)); // before start
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        assert!(out.drafts.is_empty());
        assert!(!out.cap_reached);
    }

    #[test]
    fn unreachable_target_reports_cap() {
        let mut rule = weekly_rule();
        rule.end_condition = EndCondition::HoursComplete;
        rule.end_date = None;
        rule.total_hours = Some(1000.0);
        let out = expand(&rule, &CalendarFacts::empty(), 1).unwrap();
        assert!(out.cap_reached);
        assert_eq!(out.drafts.len(), MAX_CYCLES);
    }

    #[test]
    fn exam_period_blocks_generation() {
        let facts = CalendarFacts::new(
            vec![],
            vec![ExamPeriodFact {
                id: 7,
                name: "Midterms".into(),
                start_date: date(2025, 9, 1),
                end_date: date(2025, 9, 12),
                blocks_regular_classes: true,
                department_id: None,
            }],
        );
        let out = expand(&weekly_rule(), &facts, 1).unwrap();
        // Mondays 09-01 and 09-08 fall inside the period.
        assert_eq!(out.skipped.len(), 2);
        assert!(out
            .skipped
            .iter()
            .all(|s| matches!(s.reason, SkipReason::ExamPeriod { .. })));
        assert_eq!(out.drafts.len(), 11);
    }
}
