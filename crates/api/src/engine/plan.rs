//! Shared planning types for the four bulk operation kinds.
//!
//! A planner validates its parameters, reads whatever stored state it
//! needs, and produces a [`Plan`]: the concrete mutations to apply, a
//! projection of each mutation's resulting entry for conflict detection,
//! and anything it already decided to skip (with reasons). The executor
//! takes it from there identically for every kind.

use chrono::NaiveDate;
use serde::Serialize;

use collegium_core::conflict::BatchDepartments;
use collegium_core::timetable::EntryDraft;
use collegium_core::types::DbId;

/// One mutation the executor will apply inside the transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedItem {
    /// Insert a new entry.
    Create { draft: EntryDraft },
    /// Reassign the faculty member on an existing entry.
    SetFaculty { entry_id: DbId, faculty_id: DbId },
    /// Move an existing dated entry to a new date.
    MoveDate {
        entry_id: DbId,
        entry_date: NaiveDate,
        day_of_week: i16,
    },
}

/// An item the planner dropped before conflict detection ever ran, with
/// a structured reason (map-mode overflow, no eligible target date,
/// holiday skip during expansion, ...).
#[derive(Debug, Clone, Serialize)]
pub struct PreSkippedItem {
    pub reason: String,
    pub detail: serde_json::Value,
}

/// Output of a planner, input to detection and execution.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Mutations to apply, in order.
    pub items: Vec<PlannedItem>,
    /// Resulting entry state per item, aligned 1:1 with `items`. The
    /// conflict detector runs over these.
    pub drafts: Vec<EntryDraft>,
    /// Entry ids being rewritten by this plan. They are excluded from the
    /// stored snapshot during detection: their old positions are vacated
    /// by the same transaction, and their new positions are all present
    /// in `drafts` where the intra-request checks see them.
    pub rewritten_entry_ids: Vec<DbId>,
    /// Items dropped during planning, before detection.
    pub pre_skipped: Vec<PreSkippedItem>,
    /// Non-fatal planner observations (e.g. recurrence cap reached).
    pub warnings: Vec<String>,
    /// Batch id -> department id for every batch touched by `drafts`.
    pub departments: BatchDepartments,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
