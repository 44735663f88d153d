//! Membership Plan Model

use serde::{Deserialize, Serialize};

/// Admin-configured pricing option.
///
/// Name and price carry no uniqueness constraint; members reference plans
/// only through snapshots, so deleting a plan never rewrites recorded fees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MembershipPlan {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub created_at: i64,
}

impl MembershipPlan {
    /// Display name with the blank-name fallback (`Plan <price>`).
    pub fn display_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("Plan {}", self.price)
        } else {
            trimmed.to_string()
        }
    }
}

/// Create plan payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCreate {
    pub name: String,
    pub price: f64,
}

/// Update plan payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
}

/// Plan snapshot produced by the resolver at application/edit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlan {
    pub fee: f64,
    pub plan_name: String,
    pub plan_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let plan = MembershipPlan {
            id: 1,
            name: "   ".into(),
            price: 250.0,
            created_at: 0,
        };
        assert_eq!(plan.display_name(), "Plan 250");

        let named = MembershipPlan {
            id: 2,
            name: " Gold ".into(),
            price: 500.0,
            created_at: 0,
        };
        assert_eq!(named.display_name(), "Gold");
    }
}
