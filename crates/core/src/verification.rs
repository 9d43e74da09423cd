//! Instructor verification requests.
//!
//! Students apply to teach; an admin approves (promoting them to
//! `instructor`) or rejects with a note.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const VERIFICATION_PENDING: &str = "pending";
pub const VERIFICATION_APPROVED: &str = "approved";
pub const VERIFICATION_REJECTED: &str = "rejected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationDecision {
    Approve,
    Reject,
}

impl VerificationDecision {
    pub fn resulting_status(&self) -> &'static str {
        match self {
            Self::Approve => VERIFICATION_APPROVED,
            Self::Reject => VERIFICATION_REJECTED,
        }
    }
}

/// Only pending requests can be decided. Rejections must carry a note.
pub fn check_review(
    current_status: &str,
    decision: VerificationDecision,
    note: Option<&str>,
) -> Result<(), CoreError> {
    if current_status != VERIFICATION_PENDING {
        return Err(CoreError::Conflict(format!(
            "Verification request is already {current_status}"
        )));
    }
    if decision == VerificationDecision::Reject && note.map_or(true, |n| n.trim().is_empty()) {
        return Err(CoreError::Validation(
            "A note is required when rejecting a request".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn pending_request_can_be_approved_without_note() {
        assert!(check_review(VERIFICATION_PENDING, VerificationDecision::Approve, None).is_ok());
    }

    #[test]
    fn rejection_needs_note() {
        assert_matches!(
            check_review(VERIFICATION_PENDING, VerificationDecision::Reject, Some("  ")),
            Err(CoreError::Validation(_))
        );
        assert!(check_review(
            VERIFICATION_PENDING,
            VerificationDecision::Reject,
            Some("Portfolio link is broken")
        )
        .is_ok());
    }

    #[test]
    fn decided_request_is_final() {
        assert_matches!(
            check_review(VERIFICATION_APPROVED, VerificationDecision::Reject, Some("x")),
            Err(CoreError::Conflict(_))
        );
    }
}
