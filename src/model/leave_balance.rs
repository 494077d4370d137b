//! Per (employee, leave type, year) balance ledger.
//!
//! Mutation goes through a single pure function, [`LeaveBalance::apply`],
//! so the accounting arithmetic can be tested without any persistence in
//! the picture. The workflow coordinator applies the returned balance
//! inside the same unit of work that transitions the request.

use rust_decimal::Decimal;

use crate::error::LeaveError;
use crate::model::leave_type::LeaveType;

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveBalance {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub year: i32,
    pub total_days: Decimal,
    /// Days permanently consumed by approved requests.
    pub used_days: Decimal,
    /// Days reserved by not-yet-decided requests.
    pub pending_days: Decimal,
}

/// A balance mutation, always causally attached to one request transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BalanceEvent {
    /// Submission: reserve days against the remaining capacity.
    Reserve(Decimal),
    /// Approval: move reserved days into used.
    Commit(Decimal),
    /// Rejection or cancellation: hand reserved days back.
    Release(Decimal),
}

impl LeaveBalance {
    pub fn new(employee_id: u64, leave_type: LeaveType, year: i32, total_days: Decimal) -> Self {
        Self {
            employee_id,
            leave_type,
            year,
            total_days,
            used_days: Decimal::ZERO,
            pending_days: Decimal::ZERO,
        }
    }

    /// Capacity still open to new reservations.
    pub fn remaining(&self) -> Decimal {
        self.total_days - self.used_days - self.pending_days
    }

    /// Applies one event and returns the resulting balance.
    ///
    /// `Reserve` enforces `used + pending <= total`; `Commit` and `Release`
    /// require the days to actually be reserved. A ledger that fails those
    /// preconditions was corrupted by something outside this module, which
    /// is reported as `LedgerInvariant` rather than a caller error.
    pub fn apply(&self, event: BalanceEvent) -> Result<LeaveBalance, LeaveError> {
        let days = match event {
            BalanceEvent::Reserve(days)
            | BalanceEvent::Commit(days)
            | BalanceEvent::Release(days) => days,
        };
        if days <= Decimal::ZERO {
            return Err(LeaveError::LedgerInvariant {
                detail: format!("balance event for non-positive day count {days}"),
            });
        }

        let mut next = self.clone();
        match event {
            BalanceEvent::Reserve(days) => {
                if self.remaining() < days {
                    return Err(LeaveError::InsufficientBalance {
                        requested: days,
                        remaining: self.remaining(),
                    });
                }
                next.pending_days += days;
            }
            BalanceEvent::Commit(days) => {
                if self.pending_days < days {
                    return Err(LeaveError::LedgerInvariant {
                        detail: format!(
                            "commit of {days} days exceeds {} pending",
                            self.pending_days
                        ),
                    });
                }
                next.pending_days -= days;
                next.used_days += days;
            }
            BalanceEvent::Release(days) => {
                if self.pending_days < days {
                    return Err(LeaveError::LedgerInvariant {
                        detail: format!(
                            "release of {days} days exceeds {} pending",
                            self.pending_days
                        ),
                    });
                }
                next.pending_days -= days;
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(total: i64, used: i64, pending: i64) -> LeaveBalance {
        LeaveBalance {
            employee_id: 1000,
            leave_type: LeaveType::Annual,
            year: 2030,
            total_days: Decimal::from(total),
            used_days: Decimal::from(used),
            pending_days: Decimal::from(pending),
        }
    }

    #[test]
    fn reserve_moves_capacity_into_pending() {
        let next = balance(20, 0, 0)
            .apply(BalanceEvent::Reserve(Decimal::from(5)))
            .unwrap();
        assert_eq!(next.pending_days, Decimal::from(5));
        assert_eq!(next.used_days, Decimal::ZERO);
        assert_eq!(next.remaining(), Decimal::from(15));
    }

    #[test]
    fn reserve_up_to_exact_remaining_succeeds() {
        let next = balance(20, 3, 2)
            .apply(BalanceEvent::Reserve(Decimal::from(15)))
            .unwrap();
        assert_eq!(next.remaining(), Decimal::ZERO);
    }

    #[test]
    fn reserve_beyond_remaining_is_insufficient() {
        let err = balance(20, 5, 0)
            .apply(BalanceEvent::Reserve(Decimal::from(16)))
            .unwrap_err();
        assert!(matches!(err, LeaveError::InsufficientBalance { .. }));
    }

    #[test]
    fn commit_moves_pending_into_used() {
        let next = balance(20, 0, 5)
            .apply(BalanceEvent::Commit(Decimal::from(5)))
            .unwrap();
        assert_eq!(next.used_days, Decimal::from(5));
        assert_eq!(next.pending_days, Decimal::ZERO);
        assert_eq!(next.total_days, Decimal::from(20));
    }

    #[test]
    fn release_returns_pending_and_leaves_used_alone() {
        let next = balance(20, 5, 3)
            .apply(BalanceEvent::Release(Decimal::from(3)))
            .unwrap();
        assert_eq!(next.used_days, Decimal::from(5));
        assert_eq!(next.pending_days, Decimal::ZERO);
    }

    #[test]
    fn commit_exceeding_pending_is_a_ledger_violation() {
        let err = balance(20, 0, 2)
            .apply(BalanceEvent::Commit(Decimal::from(5)))
            .unwrap_err();
        assert!(matches!(err, LeaveError::LedgerInvariant { .. }));
    }

    #[test]
    fn non_positive_event_is_a_ledger_violation() {
        let err = balance(20, 0, 0)
            .apply(BalanceEvent::Reserve(Decimal::ZERO))
            .unwrap_err();
        assert!(matches!(err, LeaveError::LedgerInvariant { .. }));
    }

    #[test]
    fn half_day_amounts_stay_exact() {
        let half = Decimal::new(45, 1); // 4.5
        let next = balance(20, 0, 0)
            .apply(BalanceEvent::Reserve(half))
            .unwrap();
        assert_eq!(next.pending_days, Decimal::new(45, 1));
        assert_eq!(next.remaining(), Decimal::new(155, 1));
    }
}
