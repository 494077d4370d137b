use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use strum_macros::{Display, EnumDiscriminants, EnumString};

use crate::error::LeaveError;
use crate::model::leave_type::LeaveType;

pub const MAX_REASON_CHARS: usize = 500;
pub const MAX_SPAN_DAYS: i64 = 365;

/// Workflow status of a leave request.
///
/// Decision data lives on the variant that requires it, so a pending
/// request cannot carry an approver and a rejection cannot lose its reason.
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(LeaveStatusKind))]
#[strum_discriminants(derive(Display, EnumString, Hash))]
#[strum_discriminants(strum(serialize_all = "lowercase"))]
pub enum LeaveStatus {
    Pending,
    Approved {
        approver_id: u64,
        decided_at: DateTime<Utc>,
    },
    Rejected {
        approver_id: u64,
        decided_at: DateTime<Utc>,
        reason: String,
    },
    Cancelled {
        cancelled_at: DateTime<Utc>,
    },
}

impl LeaveStatus {
    pub fn kind(&self) -> LeaveStatusKind {
        LeaveStatusKind::from(self)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    pub fn approver_id(&self) -> Option<u64> {
        match self {
            LeaveStatus::Approved { approver_id, .. }
            | LeaveStatus::Rejected { approver_id, .. } => Some(*approver_id),
            _ => None,
        }
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        match self {
            LeaveStatus::Approved { decided_at, .. }
            | LeaveStatus::Rejected { decided_at, .. } => Some(*decided_at),
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            LeaveStatus::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            LeaveStatus::Cancelled { cancelled_at } => Some(*cancelled_at),
            _ => None,
        }
    }
}

/// A persisted leave request. Immutable once created apart from the
/// transition methods below.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive span minus any half-day adjustments. Always > 0 and <= 365.
    pub day_count: Decimal,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A request as handed to the store for insertion. The store assigns the
/// id and row timestamps; status starts out `Pending`.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_count: Decimal,
    pub reason: Option<String>,
}

impl LeaveRequest {
    pub fn status_kind(&self) -> LeaveStatusKind {
        self.status.kind()
    }

    /// The ledger year this request draws on: the year its range starts in.
    pub fn ledger_year(&self) -> i32 {
        use chrono::Datelike;
        self.start_date.year()
    }

    /// `Pending -> Approved`. The approver must be someone other than the
    /// requesting employee.
    pub fn approve(&mut self, approver_id: u64, at: DateTime<Utc>) -> Result<(), LeaveError> {
        self.ensure_pending("approve")?;
        if approver_id == self.employee_id {
            return Err(LeaveError::SelfApprovalForbidden { approver_id });
        }
        self.status = LeaveStatus::Approved {
            approver_id,
            decided_at: at,
        };
        self.updated_at = at;
        Ok(())
    }

    /// `Pending -> Rejected`. Requires a non-blank reason.
    pub fn reject(
        &mut self,
        approver_id: u64,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LeaveError> {
        self.ensure_pending("reject")?;
        if approver_id == self.employee_id {
            return Err(LeaveError::SelfApprovalForbidden { approver_id });
        }
        let reason = validate_reason(reason)?;
        self.status = LeaveStatus::Rejected {
            approver_id,
            decided_at: at,
            reason,
        };
        self.updated_at = at;
        Ok(())
    }

    /// `Pending -> Cancelled`. Releases the reserved days; the coordinator
    /// restricts this to the requesting employee.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), LeaveError> {
        self.ensure_pending("cancel")?;
        self.status = LeaveStatus::Cancelled { cancelled_at: at };
        self.updated_at = at;
        Ok(())
    }

    fn ensure_pending(&self, action: &'static str) -> Result<(), LeaveError> {
        if self.status_kind() == LeaveStatusKind::Pending {
            Ok(())
        } else {
            Err(LeaveError::InvalidTransition {
                from: self.status_kind(),
                action,
            })
        }
    }
}

/// Reason text constraint shared by submissions and rejections:
/// 1-500 characters, not blank.
pub fn validate_reason(reason: &str) -> Result<String, LeaveError> {
    if reason.trim().is_empty() {
        return Err(LeaveError::InvalidReason {
            detail: "reason must not be blank",
        });
    }
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(LeaveError::InvalidReason {
            detail: "reason exceeds 500 characters",
        });
    }
    Ok(reason.to_string())
}
