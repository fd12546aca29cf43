//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Where patches exist, a `Deserialize` update DTO (all `Option` fields)

pub mod batch;
pub mod bulk_operation;
pub mod exam_period;
pub mod faculty;
pub mod holiday;
pub mod subject;
pub mod template;
pub mod time_slot;
pub mod timetable_entry;
pub mod undo_operation;
