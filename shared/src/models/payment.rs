//! Donation Payment Model

use serde::{Deserialize, Serialize};

/// Recognized donation categories.
pub const PAYMENT_CATEGORIES: &[&str] = &["imdad", "zakat", "fitra", "blindDonation"];

/// Default category when the submitter does not pick one.
pub const DEFAULT_CATEGORY: &str = "blindDonation";

pub fn is_valid_category(category: &str) -> bool {
    PAYMENT_CATEGORIES.contains(&category)
}

/// Proof-of-payment submitted by a member, reviewed manually by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub account_id: i64,
    pub category: String,
    pub amount: f64,
    /// Stored reference path of the uploaded screenshot.
    pub screenshot: String,
    pub status: String,
    pub created_at: i64,
}

/// Payment row joined with the submitting account (admin review list).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentWithAccount {
    pub id: i64,
    pub account_id: i64,
    pub category: String,
    pub amount: f64,
    pub screenshot: String,
    pub status: String,
    pub created_at: i64,
    pub account_name: String,
    pub account_email: String,
    pub account_phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_vocabulary() {
        assert!(is_valid_category("zakat"));
        assert!(is_valid_category("blindDonation"));
        assert!(!is_valid_category("tip"));
    }
}
