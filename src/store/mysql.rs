//! MySQL persistence adapter.
//!
//! Uses the runtime-bound query API throughout (the service runs against
//! an already-migrated schema, see `schema.sql`). Locked reads issue
//! `SELECT ... FOR UPDATE` inside the transaction; InnoDB error numbers
//! are translated into the store error classification so the engine never
//! sees a raw driver error.

use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::engine::authority::DecisionAuthority;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, LeaveStatusKind, NewLeaveRequest,
};
use crate::model::leave_type::LeaveType;

use super::{LeaveStore, LeaveUnitOfWork, StoreError};

// InnoDB error numbers the engine cares about.
const ER_DUP_ENTRY: u32 = 1062;
const ER_LOCK_WAIT_TIMEOUT: u32 = 1205;
const ER_LOCK_DEADLOCK: u32 = 1213;

const REQUEST_COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, day_count, \
     reason, status, approver_id, decided_at, rejection_reason, cancelled_at, \
     created_at, updated_at";

const BALANCE_COLUMNS: &str =
    "employee_id, leave_type, year, total_days, used_days, pending_days";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

pub struct MySqlUnitOfWork {
    tx: Transaction<'static, MySql>,
}

#[derive(sqlx::FromRow)]
struct LeaveRequestRow {
    id: u64,
    employee_id: u64,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    day_count: Decimal,
    reason: Option<String>,
    status: String,
    approver_id: Option<u64>,
    decided_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LeaveRequestRow {
    fn into_domain(self) -> Result<LeaveRequest, StoreError> {
        let leave_type = LeaveType::from_str(&self.leave_type)
            .map_err(|_| corrupt_row(self.id, "unknown leave_type"))?;
        let kind = LeaveStatusKind::from_str(&self.status)
            .map_err(|_| corrupt_row(self.id, "unknown status"))?;
        let status = match kind {
            LeaveStatusKind::Pending => LeaveStatus::Pending,
            LeaveStatusKind::Approved => LeaveStatus::Approved {
                approver_id: self
                    .approver_id
                    .ok_or_else(|| corrupt_row(self.id, "approved row without approver_id"))?,
                decided_at: self
                    .decided_at
                    .ok_or_else(|| corrupt_row(self.id, "approved row without decided_at"))?,
            },
            LeaveStatusKind::Rejected => LeaveStatus::Rejected {
                approver_id: self
                    .approver_id
                    .ok_or_else(|| corrupt_row(self.id, "rejected row without approver_id"))?,
                decided_at: self
                    .decided_at
                    .ok_or_else(|| corrupt_row(self.id, "rejected row without decided_at"))?,
                reason: self.rejection_reason.ok_or_else(|| {
                    corrupt_row(self.id, "rejected row without rejection_reason")
                })?,
            },
            LeaveStatusKind::Cancelled => LeaveStatus::Cancelled {
                cancelled_at: self
                    .cancelled_at
                    .ok_or_else(|| corrupt_row(self.id, "cancelled row without cancelled_at"))?,
            },
        };
        Ok(LeaveRequest {
            id: self.id,
            employee_id: self.employee_id,
            leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            day_count: self.day_count,
            reason: self.reason,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LeaveBalanceRow {
    employee_id: u64,
    leave_type: String,
    year: i32,
    total_days: Decimal,
    used_days: Decimal,
    pending_days: Decimal,
}

impl LeaveBalanceRow {
    fn into_domain(self) -> Result<LeaveBalance, StoreError> {
        let leave_type = LeaveType::from_str(&self.leave_type).map_err(|_| {
            StoreError::Backend(anyhow!(
                "unknown leave_type in balance row for employee {}",
                self.employee_id
            ))
        })?;
        Ok(LeaveBalance {
            employee_id: self.employee_id,
            leave_type,
            year: self.year,
            total_days: self.total_days,
            used_days: self.used_days,
            pending_days: self.pending_days,
        })
    }
}

fn corrupt_row(id: u64, detail: &str) -> StoreError {
    StoreError::Backend(anyhow!("corrupt leave_requests row {id}: {detail}"))
}

/// Classifies driver errors: deadlock victims and duplicate keys are
/// retryable conflicts, lock waits and pool exhaustion are timeouts.
fn translate(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Database(db) => {
            let number = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|mysql| u32::from(mysql.number()));
            match number {
                Some(ER_LOCK_DEADLOCK) | Some(ER_DUP_ENTRY) => StoreError::Conflict,
                Some(ER_LOCK_WAIT_TIMEOUT) => StoreError::Timeout,
                _ => StoreError::Backend(anyhow::Error::new(sqlx::Error::Database(db))),
            }
        }
        other => StoreError::Backend(anyhow::Error::new(other)),
    }
}

/// Flattens a status into its storage columns:
/// (status, approver_id, decided_at, rejection_reason, cancelled_at).
fn status_columns(
    status: &LeaveStatus,
) -> (
    String,
    Option<u64>,
    Option<DateTime<Utc>>,
    Option<&str>,
    Option<DateTime<Utc>>,
) {
    (
        status.kind().to_string(),
        status.approver_id(),
        status.decided_at(),
        status.rejection_reason(),
        status.cancelled_at(),
    )
}

impl LeaveStore for MySqlStore {
    type Uow = MySqlUnitOfWork;

    async fn begin(&self) -> Result<Self::Uow, StoreError> {
        let tx = self.pool.begin().await.map_err(translate)?;
        Ok(MySqlUnitOfWork { tx })
    }

    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(translate)?;
        row.map(LeaveRequestRow::into_domain).transpose()
    }

    async fn requests_for_employee(
        &self,
        employee_id: u64,
        statuses: Option<&[LeaveStatusKind]>,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = ?");
        if let Some(statuses) = statuses {
            if statuses.is_empty() {
                return Ok(Vec::new());
            }
            push_status_filter(&mut sql, statuses.len());
        }
        sql.push_str(" ORDER BY start_date, id");

        let mut query = sqlx::query_as::<_, LeaveRequestRow>(&sql).bind(employee_id);
        if let Some(statuses) = statuses {
            for status in statuses {
                query = query.bind(status.to_string());
            }
        }
        let rows = query.fetch_all(&self.pool).await.map_err(translate)?;
        rows.into_iter().map(LeaveRequestRow::into_domain).collect()
    }

    async fn fetch_balance(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, StoreError> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balances \
             WHERE employee_id = ? AND leave_type = ? AND year = ?"
        );
        let row = sqlx::query_as::<_, LeaveBalanceRow>(&sql)
            .bind(employee_id)
            .bind(leave_type.as_str())
            .bind(year)
            .fetch_optional(&self.pool)
            .await
            .map_err(translate)?;
        row.map(LeaveBalanceRow::into_domain).transpose()
    }
}

impl LeaveUnitOfWork for MySqlUnitOfWork {
    async fn request_for_update(&mut self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ? FOR UPDATE");
        let row = sqlx::query_as::<_, LeaveRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(translate)?;
        row.map(LeaveRequestRow::into_domain).transpose()
    }

    async fn requests_by_status(
        &mut self,
        employee_id: u64,
        statuses: &[LeaveStatusKind],
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = ?");
        push_status_filter(&mut sql, statuses.len());
        sql.push_str(" ORDER BY start_date, id FOR UPDATE");

        let mut query = sqlx::query_as::<_, LeaveRequestRow>(&sql).bind(employee_id);
        for status in statuses {
            query = query.bind(status.to_string());
        }
        let rows = query
            .fetch_all(&mut *self.tx)
            .await
            .map_err(translate)?;
        rows.into_iter().map(LeaveRequestRow::into_domain).collect()
    }

    async fn balance_for_update(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, StoreError> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balances \
             WHERE employee_id = ? AND leave_type = ? AND year = ? FOR UPDATE"
        );
        let row = sqlx::query_as::<_, LeaveBalanceRow>(&sql)
            .bind(employee_id)
            .bind(leave_type.as_str())
            .bind(year)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(translate)?;
        row.map(LeaveBalanceRow::into_domain).transpose()
    }

    async fn insert_request(
        &mut self,
        request: NewLeaveRequest,
    ) -> Result<LeaveRequest, StoreError> {
        let now = Utc::now();
        let pending = LeaveStatusKind::Pending.to_string();
        let result = sqlx::query(
            "INSERT INTO leave_requests \
             (employee_id, leave_type, start_date, end_date, day_count, reason, status, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.employee_id)
        .bind(request.leave_type.as_str())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.day_count)
        .bind(request.reason.as_deref())
        .bind(&pending)
        .bind(now)
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(translate)?;

        Ok(LeaveRequest {
            id: result.last_insert_id(),
            employee_id: request.employee_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            day_count: request.day_count,
            reason: request.reason,
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_request(&mut self, request: &LeaveRequest) -> Result<(), StoreError> {
        let (status, approver_id, decided_at, rejection_reason, cancelled_at) =
            status_columns(&request.status);
        let result = sqlx::query(
            "UPDATE leave_requests \
             SET status = ?, approver_id = ?, decided_at = ?, rejection_reason = ?, \
                 cancelled_at = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(status)
        .bind(approver_id)
        .bind(decided_at)
        .bind(rejection_reason)
        .bind(cancelled_at)
        .bind(request.updated_at)
        .bind(request.id)
        .execute(&mut *self.tx)
        .await
        .map_err(translate)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn update_balance(&mut self, balance: &LeaveBalance) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE leave_balances \
             SET total_days = ?, used_days = ?, pending_days = ? \
             WHERE employee_id = ? AND leave_type = ? AND year = ?",
        )
        .bind(balance.total_days)
        .bind(balance.used_days)
        .bind(balance.pending_days)
        .bind(balance.employee_id)
        .bind(balance.leave_type.as_str())
        .bind(balance.year)
        .execute(&mut *self.tx)
        .await
        .map_err(translate)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(translate)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(translate)
    }
}

fn push_status_filter(sql: &mut String, count: usize) {
    sql.push_str(" AND status IN (");
    for i in 0..count {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('?');
    }
    sql.push(')');
}

/// Answers the manager relation from the employees table.
pub struct SqlAuthority {
    pool: MySqlPool,
}

impl SqlAuthority {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl DecisionAuthority for SqlAuthority {
    async fn can_decide(&self, approver_id: u64, employee_id: u64) -> Result<bool, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE id = ? AND manager_id = ?")
                .bind(employee_id)
                .bind(approver_id)
                .fetch_one(&self.pool)
                .await
                .map_err(translate)?;
        Ok(count > 0)
    }
}
