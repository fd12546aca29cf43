//! Request handlers for the scheduling engine.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `collegium_db` and the engine
//! in [`crate::engine`], mapping errors via [`crate::error::AppError`].
//! Every mutation requires the admin role.

pub mod bulk;
pub mod entries;
pub mod exam_periods;
pub mod holidays;
pub mod templates;
pub mod time_slots;
pub mod undo;
