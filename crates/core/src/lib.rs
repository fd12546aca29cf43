//! Collegium core domain logic.
//!
//! This crate has zero internal dependencies and no I/O: everything in it
//! is synchronous and side-effect free so the scheduling rules can be unit
//! tested without a database. The `db` and `api` crates feed it snapshots
//! of stored state (existing entries, calendar facts) and persist whatever
//! it decides.

pub mod bulk;
pub mod calendar;
pub mod conflict;
pub mod error;
pub mod recurrence;
pub mod reschedule;
pub mod roles;
pub mod timetable;
pub mod types;
pub mod undo;
