use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::AppLeaveService;
use crate::auth::AuthUser;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_type::LeaveType;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    #[schema(example = 1000)]
    /// Employee to look up (HR/Admin only; defaults to the caller)
    pub employee_id: Option<u64>,
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = 2026)]
    /// Ledger year; defaults to the current year
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = "20", value_type = String)]
    pub total_days: Decimal,
    #[schema(example = "5", value_type = String)]
    pub used_days: Decimal,
    #[schema(example = "0", value_type = String)]
    pub pending_days: Decimal,
    #[schema(example = "15", value_type = String)]
    pub remaining_days: Decimal,
}

impl From<LeaveBalance> for BalanceResponse {
    fn from(balance: LeaveBalance) -> Self {
        let remaining_days = balance.remaining();
        Self {
            employee_id: balance.employee_id,
            leave_type: balance.leave_type.as_str().to_string(),
            year: balance.year,
            total_days: balance.total_days,
            used_days: balance.used_days,
            pending_days: balance.pending_days,
            remaining_days,
        }
    }
}

/// Swagger doc for get_balance endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balance found", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No balance provisioned for that scope")
    ),
    tag = "Leave"
)]
pub async fn get_balance(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = query.employee_id.unwrap_or(auth.employee_id);
    if employee_id != auth.employee_id {
        auth.require_hr_or_admin()?;
    }

    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let balance = service.balance(employee_id, query.leave_type, year).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(balance)))
}
