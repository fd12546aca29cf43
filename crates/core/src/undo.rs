//! Undo ledger rules: TTL cap and the entity types with first-class
//! restore handlers.

use crate::error::CoreError;

/// Hard cap on a ledger record's lifetime, seconds.
pub const MAX_TTL_SECS: i64 = 300;

/// TTL used when the caller does not choose one.
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Entity types the undo endpoint can restore. Anything else is recorded
/// but fails at undo time with an explicit unsupported error.
pub const RESTORABLE_ENTITY_TYPES: &[&str] = &["timetable_entry", "holiday"];

/// Clamp a caller-chosen TTL into `1..=MAX_TTL_SECS`.
pub fn clamp_ttl(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_TTL_SECS).clamp(1, MAX_TTL_SECS)
}

/// Returns `true` if a restore handler exists for this entity type.
pub fn is_restorable(entity_type: &str) -> bool {
    RESTORABLE_ENTITY_TYPES.contains(&entity_type)
}

/// Validate that an entity type has a restore handler.
pub fn validate_restorable(entity_type: &str) -> Result<(), CoreError> {
    if is_restorable(entity_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Undo is not implemented for entity type '{entity_type}'. Supported: {}",
            RESTORABLE_ENTITY_TYPES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_to_cap() {
        assert_eq!(clamp_ttl(None), 300);
    }

    #[test]
    fn ttl_clamps_above_cap() {
        assert_eq!(clamp_ttl(Some(3600)), 300);
    }

    #[test]
    fn ttl_clamps_below_one() {
        assert_eq!(clamp_ttl(Some(0)), 1);
        assert_eq!(clamp_ttl(Some(-5)), 1);
    }

    #[test]
    fn ttl_passes_through_in_range() {
        assert_eq!(clamp_ttl(Some(120)), 120);
    }

    #[test]
    fn restorable_types() {
        assert!(is_restorable("timetable_entry"));
        assert!(is_restorable("holiday"));
        assert!(!is_restorable("batch"));
        assert!(!is_restorable(""));
    }

    #[test]
    fn unsupported_type_error_names_the_type() {
        let err = validate_restorable("exam_period").unwrap_err();
        assert!(err.to_string().contains("exam_period"));
    }
}
