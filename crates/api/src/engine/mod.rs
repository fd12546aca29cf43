//! The bulk operation engine.
//!
//! Every bulk mutation runs the same five-step protocol: validate
//! (references and parameter combinations, always fatal), detect (project
//! the full resulting entry set through the conflict detector), dry-run
//! short-circuit, execute (one transaction, policy-driven skip/force),
//! track (durable `bulk_operations` record, cooperative cancellation).
//!
//! Planning is per-kind ([`clone`], [`faculty_replace`], [`reschedule`],
//! [`template_apply`]); everything after the plan is shared
//! ([`executor`]).

pub mod clone;
pub mod detector;
pub mod executor;
pub mod facts;
pub mod faculty_replace;
pub mod plan;
pub mod reschedule;
pub mod template_apply;
