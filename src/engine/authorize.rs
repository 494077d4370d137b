//! Balance sufficiency decision for a requested day count.

use rust_decimal::Decimal;

use crate::error::LeaveError;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_type::LeaveType;

/// Decides whether `requested` days fit the remaining capacity.
///
/// Non-accrual categories are unbounded and always sufficient; for them
/// `balance` is expected to be `None`. Accrual categories require a
/// provisioned balance row, read with a row lock by the caller inside the
/// unit of work that will mutate it.
pub fn check_sufficiency(
    balance: Option<&LeaveBalance>,
    employee_id: u64,
    leave_type: LeaveType,
    year: i32,
    requested: Decimal,
) -> Result<(), LeaveError> {
    if !leave_type.is_accrual() {
        return Ok(());
    }
    let balance = balance.ok_or(LeaveError::BalanceNotProvisioned {
        employee_id,
        leave_type,
        year,
    })?;
    if balance.remaining() < requested {
        return Err(LeaveError::InsufficientBalance {
            requested,
            remaining: balance.remaining(),
        });
    }
    Ok(())
}
