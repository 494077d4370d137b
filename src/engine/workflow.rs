//! Workflow coordinator: the engine's entry point for submitting and
//! deciding leave requests.
//!
//! Each operation validates before touching storage, then runs its
//! read-check-write sequence inside one unit of work and commits at the
//! end; any failure before commit rolls back and leaves no partial state.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::engine::authority::DecisionAuthority;
use crate::engine::authorize::check_sufficiency;
use crate::engine::dates::days_between;
use crate::engine::overlap::{find_overlap, BLOCKING_STATUSES};
use crate::error::LeaveError;
use crate::model::leave_balance::{BalanceEvent, LeaveBalance};
use crate::model::leave_request::{
    validate_reason, LeaveRequest, LeaveStatusKind, NewLeaveRequest, MAX_SPAN_DAYS,
};
use crate::model::leave_type::LeaveType;
use crate::store::{LeaveStore, LeaveUnitOfWork};

const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5

/// A submission command, as assembled by the controller layer.
#[derive(Debug, Clone)]
pub struct SubmitLeave {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Each flag shortens the span by half a day.
    pub half_day_start: bool,
    pub half_day_end: bool,
    pub reason: Option<String>,
    /// Explicit capability to record leave starting in the past.
    /// Granted by the controller to HR/Admin identities only.
    pub backfill: bool,
}

pub struct LeaveService<S, A> {
    store: S,
    authority: A,
}

impl<S, A> LeaveService<S, A>
where
    S: LeaveStore,
    A: DecisionAuthority,
{
    pub fn new(store: S, authority: A) -> Self {
        Self { store, authority }
    }

    /// Submits a new leave request, reserving its days against the
    /// employee's balance.
    pub async fn submit(&self, cmd: SubmitLeave) -> Result<LeaveRequest, LeaveError> {
        let span = days_between(cmd.start_date, cmd.end_date)?;
        if cmd.start_date < Utc::now().date_naive() && !cmd.backfill {
            return Err(LeaveError::PastDate {
                start: cmd.start_date,
            });
        }
        if span > MAX_SPAN_DAYS {
            return Err(LeaveError::RangeTooLarge { days: span });
        }
        let reason = match cmd.reason.as_deref() {
            Some(text) => Some(validate_reason(text)?),
            None => None,
        };

        let mut day_count = Decimal::from(span);
        if cmd.half_day_start {
            day_count -= HALF_DAY;
        }
        if cmd.half_day_end {
            day_count -= HALF_DAY;
        }
        if day_count <= Decimal::ZERO {
            return Err(LeaveError::InvalidRange {
                start: cmd.start_date,
                end: cmd.end_date,
            });
        }

        let mut uow = self.store.begin().await?;
        match self.submit_in_uow(&mut uow, &cmd, day_count, reason).await {
            Ok(request) => {
                uow.commit().await?;
                info!(
                    request_id = request.id,
                    employee_id = request.employee_id,
                    day_count = %request.day_count,
                    "leave request submitted"
                );
                Ok(request)
            }
            Err(err) => {
                Self::roll_back(uow).await;
                Err(err)
            }
        }
    }

    async fn submit_in_uow(
        &self,
        uow: &mut S::Uow,
        cmd: &SubmitLeave,
        day_count: Decimal,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let existing = uow
            .requests_by_status(cmd.employee_id, &BLOCKING_STATUSES)
            .await?;
        if let Some(conflict) = find_overlap(cmd.start_date, cmd.end_date, &existing) {
            return Err(LeaveError::OverlappingRequest {
                conflicting_id: conflict.id,
            });
        }

        let year = cmd.start_date.year();
        let balance = if cmd.leave_type.is_accrual() {
            uow.balance_for_update(cmd.employee_id, cmd.leave_type, year)
                .await?
        } else {
            None
        };
        check_sufficiency(
            balance.as_ref(),
            cmd.employee_id,
            cmd.leave_type,
            year,
            day_count,
        )?;
        if let Some(balance) = balance {
            let reserved = balance.apply(BalanceEvent::Reserve(day_count))?;
            uow.update_balance(&reserved).await?;
        }

        let request = uow
            .insert_request(NewLeaveRequest {
                employee_id: cmd.employee_id,
                leave_type: cmd.leave_type,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                day_count,
                reason,
            })
            .await?;
        Ok(request)
    }

    /// Approves a pending request, committing its reserved days.
    pub async fn approve(
        &self,
        request_id: u64,
        approver_id: u64,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut uow = self.store.begin().await?;
        match self.decide_in_uow(&mut uow, request_id, approver_id, None).await {
            Ok(request) => {
                uow.commit().await?;
                info!(request_id, approver_id, "leave request approved");
                Ok(request)
            }
            Err(err) => {
                Self::roll_back(uow).await;
                Err(err)
            }
        }
    }

    /// Rejects a pending request, releasing its reserved days. The reason
    /// is validated before any transaction is opened.
    pub async fn reject(
        &self,
        request_id: u64,
        approver_id: u64,
        reason: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        validate_reason(reason)?;

        let mut uow = self.store.begin().await?;
        match self
            .decide_in_uow(&mut uow, request_id, approver_id, Some(reason))
            .await
        {
            Ok(request) => {
                uow.commit().await?;
                info!(request_id, approver_id, "leave request rejected");
                Ok(request)
            }
            Err(err) => {
                Self::roll_back(uow).await;
                Err(err)
            }
        }
    }

    /// Shared approve/reject path; `rejection_reason` selects the branch.
    async fn decide_in_uow(
        &self,
        uow: &mut S::Uow,
        request_id: u64,
        approver_id: u64,
        rejection_reason: Option<&str>,
    ) -> Result<LeaveRequest, LeaveError> {
        let action: &'static str = if rejection_reason.is_some() {
            "reject"
        } else {
            "approve"
        };

        let mut request = uow
            .request_for_update(request_id)
            .await?
            .ok_or(LeaveError::RequestNotFound { id: request_id })?;
        if request.status_kind() != LeaveStatusKind::Pending {
            return Err(LeaveError::InvalidTransition {
                from: request.status_kind(),
                action,
            });
        }
        if approver_id == request.employee_id {
            return Err(LeaveError::SelfApprovalForbidden { approver_id });
        }
        if !self
            .authority
            .can_decide(approver_id, request.employee_id)
            .await?
        {
            return Err(LeaveError::Unauthorized {
                actor_id: approver_id,
                employee_id: request.employee_id,
            });
        }

        let now = Utc::now();
        let event = match rejection_reason {
            Some(reason) => {
                request.reject(approver_id, reason, now)?;
                BalanceEvent::Release(request.day_count)
            }
            None => {
                request.approve(approver_id, now)?;
                BalanceEvent::Commit(request.day_count)
            }
        };
        self.settle_balance(uow, &request, event).await?;
        uow.update_request(&request).await?;
        Ok(request)
    }

    /// Cancels the employee's own pending request, releasing its days.
    pub async fn cancel(
        &self,
        request_id: u64,
        employee_id: u64,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut uow = self.store.begin().await?;
        match self.cancel_in_uow(&mut uow, request_id, employee_id).await {
            Ok(request) => {
                uow.commit().await?;
                info!(request_id, employee_id, "leave request cancelled");
                Ok(request)
            }
            Err(err) => {
                Self::roll_back(uow).await;
                Err(err)
            }
        }
    }

    async fn cancel_in_uow(
        &self,
        uow: &mut S::Uow,
        request_id: u64,
        employee_id: u64,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut request = uow
            .request_for_update(request_id)
            .await?
            .ok_or(LeaveError::RequestNotFound { id: request_id })?;
        if request.employee_id != employee_id {
            return Err(LeaveError::Unauthorized {
                actor_id: employee_id,
                employee_id: request.employee_id,
            });
        }

        let now = Utc::now();
        request.cancel(now)?;
        self.settle_balance(uow, &request, BalanceEvent::Release(request.day_count))
            .await?;
        uow.update_request(&request).await?;
        Ok(request)
    }

    /// Applies a ledger event for the request's balance scope. Non-accrual
    /// categories carry no ledger row and are skipped.
    async fn settle_balance(
        &self,
        uow: &mut S::Uow,
        request: &LeaveRequest,
        event: BalanceEvent,
    ) -> Result<(), LeaveError> {
        if !request.leave_type.is_accrual() {
            return Ok(());
        }
        let balance = uow
            .balance_for_update(request.employee_id, request.leave_type, request.ledger_year())
            .await?
            .ok_or_else(|| LeaveError::LedgerInvariant {
                detail: format!(
                    "request {} has reserved days but no {} balance row for employee {} in {}",
                    request.id,
                    request.leave_type,
                    request.employee_id,
                    request.ledger_year()
                ),
            })?;
        let settled = balance.apply(event)?;
        uow.update_balance(&settled).await?;
        Ok(())
    }

    /// Fetches one request by id.
    pub async fn get(&self, request_id: u64) -> Result<LeaveRequest, LeaveError> {
        self.store
            .fetch_request(request_id)
            .await?
            .ok_or(LeaveError::RequestNotFound { id: request_id })
    }

    /// Lists an employee's requests, optionally filtered by status.
    pub async fn list_for_employee(
        &self,
        employee_id: u64,
        statuses: Option<&[LeaveStatusKind]>,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        Ok(self
            .store
            .requests_for_employee(employee_id, statuses)
            .await?)
    }

    /// Fetches the balance row for (employee, leave type, year).
    pub async fn balance(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<LeaveBalance, LeaveError> {
        self.store
            .fetch_balance(employee_id, leave_type, year)
            .await?
            .ok_or(LeaveError::BalanceNotProvisioned {
                employee_id,
                leave_type,
                year,
            })
    }

    async fn roll_back(uow: S::Uow) {
        if let Err(err) = uow.rollback().await {
            warn!(error = %err, "rollback after failed leave operation also failed");
        }
    }
}
