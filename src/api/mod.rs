//! HTTP controller layer: DTOs, handlers, and the mapping of the engine's
//! error taxonomy onto status codes.

pub mod leave_balance;
pub mod leave_request;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::engine::workflow::LeaveService;
use crate::error::LeaveError;
use crate::store::mysql::{MySqlStore, SqlAuthority};

/// The concrete service the handlers are wired against.
pub type AppLeaveService = LeaveService<MySqlStore, SqlAuthority>;

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidRange { .. }
            | LeaveError::PastDate { .. }
            | LeaveError::RangeTooLarge { .. }
            | LeaveError::InvalidReason { .. } => StatusCode::BAD_REQUEST,
            LeaveError::OverlappingRequest { .. } | LeaveError::InsufficientBalance { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            LeaveError::RequestNotFound { .. } | LeaveError::BalanceNotProvisioned { .. } => {
                StatusCode::NOT_FOUND
            }
            LeaveError::SelfApprovalForbidden { .. } | LeaveError::Unauthorized { .. } => {
                StatusCode::FORBIDDEN
            }
            LeaveError::InvalidTransition { .. } | LeaveError::ConcurrentModification => {
                StatusCode::CONFLICT
            }
            LeaveError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            LeaveError::LedgerInvariant { .. } | LeaveError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "leave operation failed");
            return HttpResponse::build(status).json(serde_json::json!({
                "message": "Internal Server Error"
            }));
        }
        HttpResponse::build(status).json(serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn taxonomy_maps_to_documented_status_codes() {
        let cases: Vec<(LeaveError, StatusCode)> = vec![
            (
                LeaveError::PastDate {
                    start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LeaveError::OverlappingRequest { conflicting_id: 1 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LeaveError::InsufficientBalance {
                    requested: Decimal::from(26),
                    remaining: Decimal::from(15),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LeaveError::RequestNotFound { id: 9 },
                StatusCode::NOT_FOUND,
            ),
            (
                LeaveError::SelfApprovalForbidden { approver_id: 1 },
                StatusCode::FORBIDDEN,
            ),
            (LeaveError::ConcurrentModification, StatusCode::CONFLICT),
            (LeaveError::Timeout, StatusCode::GATEWAY_TIMEOUT),
        ];
        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{}", error.kind());
        }
    }
}
