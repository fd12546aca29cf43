//! Authentication primitives.
//!
//! Identity management (login, refresh, user administration) lives
//! outside this service; the engine only validates the HS256 access
//! tokens it is handed and extracts the principal for audit attribution.

pub mod jwt;
