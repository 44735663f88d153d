//! Member Model

use serde::{Deserialize, Serialize};

// ── Status / membership type vocabulary ──────────────────────

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// The single membership type issued to new records.
pub const TYPE_ONE_TIME: &str = "one-time";
/// Legacy type still present on old records; accepted on read and filter.
pub const TYPE_LIFETIME: &str = "lifetime";
/// Legacy alternate spelling of [`TYPE_ONE_TIME`], normalized on write.
pub const TYPE_ONE_TIME_LEGACY: &str = "onetime";

/// Whether `status` is one of the recognized member statuses.
///
/// Transitions are deliberately unrestricted: any recognized value may be
/// written at any time (e.g. approved back to pending).
pub fn is_valid_status(status: &str) -> bool {
    matches!(status, STATUS_PENDING | STATUS_APPROVED | STATUS_REJECTED)
}

/// Normalize a membership type, folding the legacy `"onetime"` spelling
/// into `"one-time"`. Unknown values pass through unchanged.
pub fn normalize_membership_type(membership_type: &str) -> &str {
    if membership_type == TYPE_ONE_TIME_LEGACY {
        TYPE_ONE_TIME
    } else {
        membership_type
    }
}

// ── Member entity ────────────────────────────────────────────

/// Membership application of record.
///
/// `plan_id`/`plan_name`/`membership_fee` are a snapshot of the pricing plan
/// at application (or last edit) time, never live-joined; `plan_id` may
/// dangle after the plan is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    /// Human-readable identifier, `MBR-<year>-<seq>`, unique and immutable.
    pub member_id: String,
    pub full_name: String,
    pub father_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub occupation: String,
    pub annual_income: f64,
    pub membership_type: String,
    pub plan_id: Option<i64>,
    pub plan_name: String,
    pub membership_fee: f64,
    pub profile_image: Option<String>,
    pub status: String,
    /// Paired login account, if one exists. Kept alongside the email join so
    /// propagation survives email edits on either side.
    pub account_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public membership application payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberApplication {
    pub full_name: String,
    pub father_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub occupation: String,
    pub annual_income: f64,
    pub plan_id: Option<i64>,
    pub profile_image: Option<String>,
}

/// Admin member-creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub full_name: String,
    pub father_name: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub occupation: String,
    pub annual_income: f64,
    pub plan_id: Option<i64>,
    /// Login password for the paired account; defaults to the mobile number.
    pub password: Option<String>,
    /// Initial status; defaults to approved for admin-created members.
    pub status: Option<String>,
}

/// Admin member-update payload. `plan_id` re-resolves the fee/name snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub full_name: Option<String>,
    pub father_name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub annual_income: Option<f64>,
    pub plan_id: Option<i64>,
    pub profile_image: Option<String>,
    pub status: Option<String>,
}

/// Approved-member counts for the public stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberStats {
    pub total_members: i64,
    pub lifetime_members: i64,
    pub one_time_members: i64,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_members: i64,
    pub lifetime_members: i64,
    pub one_time_members: i64,
    pub pending_membership_requests: i64,
    pub pending_payment_requests: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_vocabulary() {
        assert!(is_valid_status("pending"));
        assert!(is_valid_status("approved"));
        assert!(is_valid_status("rejected"));
        assert!(!is_valid_status("archived"));
        assert!(!is_valid_status(""));
    }

    #[test]
    fn test_normalize_membership_type() {
        assert_eq!(normalize_membership_type("onetime"), "one-time");
        assert_eq!(normalize_membership_type("one-time"), "one-time");
        assert_eq!(normalize_membership_type("lifetime"), "lifetime");
    }
}
