use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Leave category. Accrual categories draw on a finite yearly allocation,
/// non-accrual categories have no balance ceiling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
    Other,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Unpaid => "unpaid",
            LeaveType::Other => "other",
        }
    }

    /// Accrual categories are accounted against a yearly balance row.
    pub fn is_accrual(&self) -> bool {
        matches!(self, LeaveType::Annual | LeaveType::Sick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn annual_and_sick_are_accrual() {
        assert!(LeaveType::Annual.is_accrual());
        assert!(LeaveType::Sick.is_accrual());
        assert!(!LeaveType::Unpaid.is_accrual());
        assert!(!LeaveType::Other.is_accrual());
    }

    #[test]
    fn string_forms_round_trip() {
        for leave_type in [
            LeaveType::Annual,
            LeaveType::Sick,
            LeaveType::Unpaid,
            LeaveType::Other,
        ] {
            let parsed = LeaveType::from_str(leave_type.as_str()).unwrap();
            assert_eq!(parsed, leave_type);
        }
    }
}
