//! Lesson comment moderation states.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const COMMENT_PENDING: &str = "pending";
pub const COMMENT_APPROVED: &str = "approved";
pub const COMMENT_REJECTED: &str = "rejected";

/// Longest accepted comment body, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// A moderator's verdict on a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationDecision {
    Approve,
    Reject,
}

impl ModerationDecision {
    /// The comment status this decision leads to.
    pub fn resulting_status(&self) -> &'static str {
        match self {
            Self::Approve => COMMENT_APPROVED,
            Self::Reject => COMMENT_REJECTED,
        }
    }
}

/// Whether a comment with `status` is visible to `viewer_id`.
///
/// Approved comments are public; authors always see their own; moderators
/// see everything.
pub fn is_visible(status: &str, author_id: DbId, viewer_id: DbId, viewer_moderates: bool) -> bool {
    viewer_moderates || status == COMMENT_APPROVED || author_id == viewer_id
}

/// Trim and validate a comment body.
pub fn validate_comment_body(body: &str) -> Result<String, String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Comment must not be empty".into());
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment must be at most {MAX_COMMENT_LENGTH} characters"
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_map_to_statuses() {
        assert_eq!(ModerationDecision::Approve.resulting_status(), COMMENT_APPROVED);
        assert_eq!(ModerationDecision::Reject.resulting_status(), COMMENT_REJECTED);
    }

    #[test]
    fn pending_comment_visible_to_author_and_moderators_only() {
        assert!(is_visible(COMMENT_PENDING, 1, 1, false));
        assert!(is_visible(COMMENT_PENDING, 1, 2, true));
        assert!(!is_visible(COMMENT_PENDING, 1, 2, false));
        assert!(is_visible(COMMENT_APPROVED, 1, 2, false));
    }

    #[test]
    fn body_is_trimmed_and_bounded() {
        assert_eq!(validate_comment_body("  tasty  ").unwrap(), "tasty");
        assert!(validate_comment_body("   ").is_err());
        assert!(validate_comment_body(&"a".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
    }
}
