//! Error taxonomy for the leave workflow engine.
//!
//! Every variant is an expected, recoverable-by-caller outcome. Only
//! [`LeaveError::ConcurrentModification`] and [`LeaveError::Timeout`] are
//! safe to retry automatically; all other kinds require the caller to
//! correct the request. Raw persistence failures never cross this boundary
//! uninterpreted: the store layer's [`StoreError`] is translated here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::leave_request::LeaveStatusKind;
use crate::model::leave_type::LeaveType;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("invalid date range: {start} to {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("start date {start} is in the past")]
    PastDate { start: NaiveDate },

    #[error("requested range spans {days} days, the maximum is 365")]
    RangeTooLarge { days: i64 },

    #[error("invalid reason: {detail}")]
    InvalidReason { detail: &'static str },

    #[error("range overlaps existing leave request {conflicting_id}")]
    OverlappingRequest { conflicting_id: u64 },

    #[error("insufficient balance: requested {requested} days, {remaining} remaining")]
    InsufficientBalance { requested: Decimal, remaining: Decimal },

    #[error("leave request {id} not found")]
    RequestNotFound { id: u64 },

    #[error("cannot {action} a request in {from} status")]
    InvalidTransition {
        from: LeaveStatusKind,
        action: &'static str,
    },

    #[error("employee {approver_id} cannot decide their own leave request")]
    SelfApprovalForbidden { approver_id: u64 },

    #[error("employee {actor_id} has no decision authority over employee {employee_id}")]
    Unauthorized { actor_id: u64, employee_id: u64 },

    #[error("no {leave_type} balance provisioned for employee {employee_id} in {year}")]
    BalanceNotProvisioned {
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    },

    #[error("operation lost a concurrent update race, retry the whole call")]
    ConcurrentModification,

    #[error("storage operation timed out")]
    Timeout,

    #[error("balance ledger invariant violated: {detail}")]
    LedgerInvariant { detail: String },

    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl LeaveError {
    /// Stable machine-readable kind, used by the HTTP layer's error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            LeaveError::InvalidRange { .. } => "InvalidRange",
            LeaveError::PastDate { .. } => "PastDate",
            LeaveError::RangeTooLarge { .. } => "RangeTooLarge",
            LeaveError::InvalidReason { .. } => "InvalidReason",
            LeaveError::OverlappingRequest { .. } => "OverlappingRequest",
            LeaveError::InsufficientBalance { .. } => "InsufficientBalance",
            LeaveError::RequestNotFound { .. } => "RequestNotFound",
            LeaveError::InvalidTransition { .. } => "InvalidTransition",
            LeaveError::SelfApprovalForbidden { .. } => "SelfApprovalForbidden",
            LeaveError::Unauthorized { .. } => "Unauthorized",
            LeaveError::BalanceNotProvisioned { .. } => "BalanceNotProvisioned",
            LeaveError::ConcurrentModification => "ConcurrentModification",
            LeaveError::Timeout => "Timeout",
            LeaveError::LedgerInvariant { .. } => "LedgerInvariant",
            LeaveError::Storage(_) => "Storage",
        }
    }

    /// Whether a caller may retry the same call without changing it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LeaveError::ConcurrentModification | LeaveError::Timeout
        )
    }
}

impl From<StoreError> for LeaveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => LeaveError::ConcurrentModification,
            StoreError::Timeout => LeaveError::Timeout,
            StoreError::Backend(inner) => LeaveError::Storage(inner),
        }
    }
}

pub type LeaveResult<T> = Result<T, LeaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_displays_both_quantities() {
        let error = LeaveError::InsufficientBalance {
            requested: Decimal::from(26),
            remaining: Decimal::from(15),
        };
        assert_eq!(
            error.to_string(),
            "insufficient balance: requested 26 days, 15 remaining"
        );
    }

    #[test]
    fn invalid_range_displays_dates() {
        let error = LeaveError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
        };
        assert_eq!(error.to_string(), "invalid date range: 2026-03-10 to 2026-03-05");
    }

    #[test]
    fn store_conflict_becomes_concurrent_modification() {
        let translated = LeaveError::from(StoreError::Conflict);
        assert!(matches!(translated, LeaveError::ConcurrentModification));
        assert!(translated.is_retryable());
    }

    #[test]
    fn store_timeout_becomes_timeout() {
        let translated = LeaveError::from(StoreError::Timeout);
        assert!(matches!(translated, LeaveError::Timeout));
        assert!(translated.is_retryable());
    }

    #[test]
    fn validation_kinds_are_not_retryable() {
        let error = LeaveError::RequestNotFound { id: 7 };
        assert_eq!(error.kind(), "RequestNotFound");
        assert!(!error.is_retryable());
    }
}
