use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppLeaveService;
use crate::auth::AuthUser;
use crate::engine::workflow::SubmitLeave;
use crate::model::leave_request::{LeaveRequest, LeaveStatusKind};
use crate::model::leave_type::LeaveType;
use rust_decimal::Decimal;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Employee to file for. HR/Admin only; defaults to the caller.
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-09-07", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Take only the afternoon of the first day.
    #[serde(default)]
    #[schema(example = false)]
    pub half_day_start: bool,
    /// Take only the morning of the last day.
    #[serde(default)]
    #[schema(example = false)]
    pub half_day_end: bool,
    #[schema(example = "family trip", nullable = true)]
    pub reason: Option<String>,
    /// Record leave starting in the past (HR/Admin only).
    #[serde(default)]
    #[schema(example = false)]
    pub backfill: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "coverage gap that week")]
    pub reason: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    /// leave application id
    pub id: u64,
    /// employee id for whom the leave is applied
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = "2026-09-07", format = "date", value_type = String)]
    /// leave start date
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-11", format = "date", value_type = String)]
    /// leave end date
    pub end_date: NaiveDate,
    #[schema(example = "5", value_type = String)]
    /// accounted days, half-day granularity
    pub day_count: Decimal,
    #[schema(example = "family trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = 2000, nullable = true)]
    pub approver_id: Option<u64>,
    #[schema(example = "2026-09-01T10:30:00Z", format = "date-time", value_type = String, nullable = true)]
    pub decided_at: Option<DateTime<Utc>>,
    #[schema(example = "coverage gap that week", nullable = true)]
    pub rejection_reason: Option<String>,
    #[schema(example = "2026-09-01T10:30:00Z", format = "date-time", value_type = String, nullable = true)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-09-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-09-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<LeaveRequest> for LeaveResponse {
    fn from(request: LeaveRequest) -> Self {
        Self {
            id: request.id,
            employee_id: request.employee_id,
            leave_type: request.leave_type.as_str().to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            day_count: request.day_count,
            reason: request.reason.clone(),
            status: request.status.kind().to_string(),
            approver_id: request.status.approver_id(),
            decided_at: request.status.decided_at(),
            rejection_reason: request.status.rejection_reason().map(str::to_string),
            cancelled_at: request.status.cancelled_at(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: usize,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 1000)]
    /// Filter by employee ID (HR/Admin only; defaults to the caller)
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

/* =========================
Submit leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "Invalid range, past date, oversized span or bad reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No balance provisioned for the requested year"),
        (status = 422, description = "Overlapping request or insufficient balance")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<HttpResponse> {
    let payload = payload.into_inner();

    let employee_id = payload.employee_id.unwrap_or(auth.employee_id);
    if employee_id != auth.employee_id {
        auth.require_hr_or_admin()?;
    }
    if payload.backfill && !auth.can_backfill() {
        return Err(actix_web::error::ErrorForbidden(
            "Backfill requires HR/Admin",
        ));
    }

    let request = service
        .submit(SubmitLeave {
            employee_id,
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            half_day_start: payload.half_day_start,
            half_day_end: payload.half_day_end,
            reason: payload.reason,
            backfill: payload.backfill,
        })
        .await?;

    Ok(HttpResponse::Created().json(LeaveResponse::from(request)))
}

/* =========================
Approve leave
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Self-approval or no decision authority"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already decided")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();
    let request = service.approve(leave_id, auth.employee_id).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/* =========================
Reject leave
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(
        content = RejectLeave,
        description = "Rejection reason",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveResponse),
        (status = 400, description = "Blank or oversized reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Self-rejection or no decision authority"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already decided")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    path: web::Path<u64>,
    payload: web::Json<RejectLeave>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();
    let request = service
        .reject(leave_id, auth.employee_id, &payload.reason)
        .await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/* =========================
Cancel own pending leave
========================= */
/// Swagger doc for cancel_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the requesting employee"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already decided")
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();
    let request = service.cancel(leave_id, auth.employee_id).await?;
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();
    let request = service.get(leave_id).await?;
    if auth.is_employee() && request.employee_id != auth.employee_id {
        return Err(actix_web::error::ErrorForbidden("Not your leave request"));
    }
    Ok(HttpResponse::Ok().json(LeaveResponse::from(request)))
}

/// for listing leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = query.employee_id.unwrap_or(auth.employee_id);
    if employee_id != auth.employee_id {
        auth.require_hr_or_admin()?;
    }

    let status_filter = match query.status.as_deref() {
        Some(raw) => match LeaveStatusKind::from_str(raw) {
            Ok(kind) => Some(vec![kind]),
            Err(_) => {
                return Err(actix_web::error::ErrorBadRequest(
                    "Invalid status filter. Allowed: pending, approved, rejected, cancelled",
                ));
            }
        },
        None => None,
    };

    let requests = service
        .list_for_employee(employee_id, status_filter.as_deref())
        .await?;

    let per_page = query.per_page.unwrap_or(10).min(100).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let total = requests.len();
    let data: Vec<LeaveResponse> = requests
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .map(LeaveResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
