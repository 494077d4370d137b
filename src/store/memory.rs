//! In-memory persistence adapter.
//!
//! Used by the test suite and local development. A unit of work takes the
//! store-wide async mutex for its whole lifetime, which serializes
//! concurrent units the same way the MySQL adapter's row locks do, and
//! stages its writes so that nothing becomes visible before `commit`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveStatusKind, NewLeaveRequest};
use crate::model::leave_type::LeaveType;

use super::{LeaveStore, LeaveUnitOfWork, StoreError};

type BalanceKey = (u64, LeaveType, i32);

#[derive(Debug, Default)]
struct MemoryState {
    requests: HashMap<u64, LeaveRequest>,
    balances: HashMap<BalanceKey, LeaveBalance>,
    last_request_id: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a balance row, standing in for the external provisioning job.
    pub async fn provision_balance(&self, balance: LeaveBalance) {
        let mut state = self.state.lock().await;
        state.balances.insert(
            (balance.employee_id, balance.leave_type, balance.year),
            balance,
        );
    }
}

enum StagedWrite {
    UpsertRequest(LeaveRequest),
    UpsertBalance(LeaveBalance),
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: Vec<StagedWrite>,
}

impl LeaveStore for InMemoryStore {
    type Uow = InMemoryUnitOfWork;

    async fn begin(&self) -> Result<Self::Uow, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(InMemoryUnitOfWork {
            guard,
            staged: Vec::new(),
        })
    }

    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.requests.get(&id).cloned())
    }

    async fn requests_for_employee(
        &self,
        employee_id: u64,
        statuses: Option<&[LeaveStatusKind]>,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let state = self.state.lock().await;
        Ok(collect_requests(&state, employee_id, statuses))
    }

    async fn fetch_balance(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.balances.get(&(employee_id, leave_type, year)).cloned())
    }
}

impl LeaveUnitOfWork for InMemoryUnitOfWork {
    async fn request_for_update(&mut self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.guard.requests.get(&id).cloned())
    }

    async fn requests_by_status(
        &mut self,
        employee_id: u64,
        statuses: &[LeaveStatusKind],
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        Ok(collect_requests(&self.guard, employee_id, Some(statuses)))
    }

    async fn balance_for_update(
        &mut self,
        employee_id: u64,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Option<LeaveBalance>, StoreError> {
        Ok(self
            .guard
            .balances
            .get(&(employee_id, leave_type, year))
            .cloned())
    }

    async fn insert_request(
        &mut self,
        request: NewLeaveRequest,
    ) -> Result<LeaveRequest, StoreError> {
        self.guard.last_request_id += 1;
        let now = Utc::now();
        let request = LeaveRequest {
            id: self.guard.last_request_id,
            employee_id: request.employee_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            day_count: request.day_count,
            reason: request.reason,
            status: LeaveStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.staged.push(StagedWrite::UpsertRequest(request.clone()));
        Ok(request)
    }

    async fn update_request(&mut self, request: &LeaveRequest) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::UpsertRequest(request.clone()));
        Ok(())
    }

    async fn update_balance(&mut self, balance: &LeaveBalance) -> Result<(), StoreError> {
        self.staged
            .push(StagedWrite::UpsertBalance(balance.clone()));
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        for write in self.staged.drain(..) {
            match write {
                StagedWrite::UpsertRequest(request) => {
                    self.guard.requests.insert(request.id, request);
                }
                StagedWrite::UpsertBalance(balance) => {
                    self.guard.balances.insert(
                        (balance.employee_id, balance.leave_type, balance.year),
                        balance,
                    );
                }
            }
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        // Staged writes are simply dropped with the lock.
        Ok(())
    }
}

fn collect_requests(
    state: &MemoryState,
    employee_id: u64,
    statuses: Option<&[LeaveStatusKind]>,
) -> Vec<LeaveRequest> {
    let mut requests: Vec<LeaveRequest> = state
        .requests
        .values()
        .filter(|request| request.employee_id == employee_id)
        .filter(|request| {
            statuses
                .map(|set| set.contains(&request.status_kind()))
                .unwrap_or(true)
        })
        .cloned()
        .collect();
    requests.sort_by_key(|request| (request.start_date, request.id));
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn new_request(employee_id: u64, day: u32) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2030, 3, day).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2030, 3, day + 1).unwrap(),
            day_count: Decimal::from(2),
            reason: None,
        }
    }

    #[tokio::test]
    async fn committed_writes_become_visible() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let inserted = uow.insert_request(new_request(1000, 10)).await.unwrap();
        uow.commit().await.unwrap();

        let fetched = store.fetch_request(inserted.id).await.unwrap();
        assert_eq!(fetched, Some(inserted));
    }

    #[tokio::test]
    async fn rolled_back_writes_are_dropped() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let inserted = uow.insert_request(new_request(1000, 10)).await.unwrap();
        uow.rollback().await.unwrap();

        assert_eq!(store.fetch_request(inserted.id).await.unwrap(), None);
        assert!(store
            .requests_for_employee(1000, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn balance_updates_stage_until_commit() {
        let store = InMemoryStore::new();
        store
            .provision_balance(LeaveBalance::new(
                1000,
                LeaveType::Annual,
                2030,
                Decimal::from(20),
            ))
            .await;

        let mut uow = store.begin().await.unwrap();
        let mut balance = uow
            .balance_for_update(1000, LeaveType::Annual, 2030)
            .await
            .unwrap()
            .unwrap();
        balance.pending_days = Decimal::from(5);
        uow.update_balance(&balance).await.unwrap();
        uow.commit().await.unwrap();

        let stored = store
            .fetch_balance(1000, LeaveType::Annual, 2030)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.pending_days, Decimal::from(5));
    }

    #[tokio::test]
    async fn request_ids_are_monotonic() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let first = uow.insert_request(new_request(1000, 10)).await.unwrap();
        let second = uow.insert_request(new_request(1000, 20)).await.unwrap();
        uow.commit().await.unwrap();

        assert!(second.id > first.id);
    }
}
