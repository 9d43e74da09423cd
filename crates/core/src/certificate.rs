//! Certificate verification codes.
//!
//! A certificate is identified publicly by a short code derived from the
//! learner, the course, and the issue time. The code is what a learner
//! shares; anyone can look it up to confirm the certificate exists.

use sha2::{Digest, Sha256};

use crate::types::{DbId, Timestamp};

/// Prefix shared by all codes.
pub const CODE_PREFIX: &str = "GUR";

/// Number of hex characters taken from the digest.
const CODE_HEX_LEN: usize = 12;

/// Characters per dash-separated group.
const GROUP_LEN: usize = 4;

/// Derive the verification code for a certificate.
///
/// Format: `GUR-XXXX-XXXX-XXXX` with uppercase hex groups.
pub fn certificate_code(user_id: DbId, course_id: DbId, issued_at: Timestamp) -> String {
    let seed = format!("{user_id}:{course_id}:{}", issued_at.to_rfc3339());
    let digest = format!("{:X}", Sha256::digest(seed.as_bytes()));
    let hex = &digest[..CODE_HEX_LEN];

    let groups: Vec<&str> = (0..CODE_HEX_LEN)
        .step_by(GROUP_LEN)
        .map(|i| &hex[i..i + GROUP_LEN])
        .collect();
    format!("{CODE_PREFIX}-{}", groups.join("-"))
}

/// Normalise a user-supplied code (trim, uppercase) and check its shape.
pub fn normalize_code(code: &str) -> Result<String, String> {
    let normalized = code.trim().to_uppercase();
    let mut parts = normalized.split('-');

    if parts.next() != Some(CODE_PREFIX) {
        return Err(format!("Certificate code must start with '{CODE_PREFIX}-'"));
    }

    let groups: Vec<&str> = parts.collect();
    let well_formed = groups.len() == CODE_HEX_LEN / GROUP_LEN
        && groups
            .iter()
            .all(|g| g.len() == GROUP_LEN && g.chars().all(|c| c.is_ascii_hexdigit()));
    if !well_formed {
        return Err("Malformed certificate code".into());
    }
    Ok(normalized)
}
