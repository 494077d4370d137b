//! Transactional persistence interface consumed by the workflow engine.
//!
//! Every submit/approve/reject/cancel runs its read-check-write sequence
//! inside one [`LeaveUnitOfWork`]. Implementations must make the unit of
//! work all-or-nothing and serialize concurrent units touching the same
//! employee's rows: the MySQL adapter locks rows with `SELECT ... FOR
//! UPDATE`, the in-memory adapter holds a store-wide async mutex for the
//! lifetime of the unit of work.

use thiserror::Error;

use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatusKind, NewLeaveRequest};
use crate::model::leave_type::LeaveType;

pub mod memory;
pub mod mysql;

/// Storage-layer failure, already classified for the engine's taxonomy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lost a race against a concurrent unit of work (deadlock victim,
    /// duplicate key, row changed underneath). Retrying the whole
    /// operation is safe.
    #[error("conflicting concurrent update")]
    Conflict,

    #[error("storage operation timed out")]
    Timeout,

    /// Anything else: connectivity, corrupt rows, unexpected driver
    /// errors. Not retryable without operator attention.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[allow(async_fn_in_trait)]
pub trait LeaveStore {
    type Uow: LeaveUnitOfWork;

    /// Opens an atomic unit of work.
    async fn begin(&self) -> Result<Self::Uow, StoreError>;

    /// Point read without locking, for the query surface.
    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// An employee's requests, optionally restricted to a status set,
    /// ordered by start date.
    async fn requests_for_employee(
        &self,
        employee_id: u64,
        statuses: Option<&[LeaveStatusKind]>,
    ) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Point read of a balance row without locking.
    async fn fetch_balance(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait LeaveUnitOfWork {
    /// Loads a request and locks its row for the rest of the unit of work.
    async fn request_for_update(&mut self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// Loads and locks an employee's requests in the given statuses, the
    /// set the overlap check scans.
    async fn requests_by_status(
        &mut self,
        employee_id: u64,
        statuses: &[LeaveStatusKind],
    ) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Loads and locks the balance row for (employee, leave type, year).
    async fn balance_for_update(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, StoreError>;

    /// Inserts a new `Pending` request and returns it with its assigned id
    /// and row timestamps.
    async fn insert_request(&mut self, request: NewLeaveRequest)
        -> Result<LeaveRequest, StoreError>;

    async fn update_request(&mut self, request: &LeaveRequest) -> Result<(), StoreError>;

    async fn update_balance(&mut self, balance: &LeaveBalance) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
