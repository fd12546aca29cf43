//! Bulk operation vocabulary and status state machine.
//!
//! The `bulk_operations` table is the durable progress record for
//! fire-and-track execution; this module owns the status transitions so
//! the repository and engine layers agree on what a legal flip is.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Clone,
    FacultyReplace,
    Reschedule,
    TemplateApply,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::FacultyReplace => "faculty_replace",
            Self::Reschedule => "reschedule",
            Self::TemplateApply => "template_apply",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "clone" => Ok(Self::Clone),
            "faculty_replace" => Ok(Self::FacultyReplace),
            "reschedule" => Ok(Self::Reschedule),
            "template_apply" => Ok(Self::TemplateApply),
            other => Err(CoreError::Validation(format!(
                "unknown operation kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl BulkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "unknown bulk status '{other}'"
            ))),
        }
    }

    /// Completed, failed, and cancelled records never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Legal status flips. Cancellation is reachable from both
    /// non-terminal states; everything else moves forward only.
    pub fn can_transition(self, to: BulkStatus) -> bool {
        match self {
            Self::Pending => matches!(to, Self::Running | Self::Cancelled),
            Self::Running => matches!(to, Self::Completed | Self::Failed | Self::Cancelled),
            Self::Completed | Self::Failed | Self::Cancelled => false,
        }
    }

    pub fn validate_transition(self, to: BulkStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid bulk status transition: {} -> {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

/// What to do with entries that carry error-severity conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Abort the whole operation with the conflict report, zero mutations.
    #[default]
    Stop,
    /// Drop conflicting items; persist the rest in one transaction.
    Skip,
    /// Include conflicting items; the storage uniqueness indexes are the
    /// last line of defence.
    Force,
}

/// Options bag shared by all four bulk kinds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BulkOptions {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    #[serde(default)]
    pub exclude_weekends: bool,
    #[serde(default)]
    pub respect_blackouts: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        for k in [
            OperationKind::Clone,
            OperationKind::FacultyReplace,
            OperationKind::Reschedule,
            OperationKind::TemplateApply,
        ] {
            assert_eq!(OperationKind::parse(k.as_str()).unwrap(), k);
        }
        assert!(OperationKind::parse("merge").is_err());
    }

    #[test]
    fn status_roundtrip() {
        for s in [
            BulkStatus::Pending,
            BulkStatus::Running,
            BulkStatus::Completed,
            BulkStatus::Failed,
            BulkStatus::Cancelled,
        ] {
            assert_eq!(BulkStatus::parse(s.as_str()).unwrap(), s);
        }
    }

    #[test]
    fn pending_can_start_or_cancel() {
        assert!(BulkStatus::Pending.can_transition(BulkStatus::Running));
        assert!(BulkStatus::Pending.can_transition(BulkStatus::Cancelled));
        assert!(!BulkStatus::Pending.can_transition(BulkStatus::Completed));
    }

    #[test]
    fn running_reaches_all_terminals() {
        assert!(BulkStatus::Running.can_transition(BulkStatus::Completed));
        assert!(BulkStatus::Running.can_transition(BulkStatus::Failed));
        assert!(BulkStatus::Running.can_transition(BulkStatus::Cancelled));
    }

    #[test]
    fn terminal_states_are_frozen() {
        for s in [BulkStatus::Completed, BulkStatus::Failed, BulkStatus::Cancelled] {
            assert!(s.is_terminal());
            for to in [
                BulkStatus::Pending,
                BulkStatus::Running,
                BulkStatus::Completed,
                BulkStatus::Failed,
                BulkStatus::Cancelled,
            ] {
                assert!(!s.can_transition(to));
            }
        }
    }

    #[test]
    fn validate_transition_reports_names() {
        let err = BulkStatus::Completed
            .validate_transition(BulkStatus::Running)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("completed"));
        assert!(msg.contains("running"));
    }

    #[test]
    fn default_policy_is_stop() {
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::Stop);
        let opts: BulkOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.dry_run);
        assert_eq!(opts.conflict_policy, ConflictPolicy::Stop);
    }
}
