//! Resolved-identity extraction.
//!
//! Authentication lives in the gateway in front of this service; by the
//! time a request arrives here the caller is known, and the gateway
//! forwards the employee id and role as trusted headers. This module only
//! turns those headers into a typed identity.

use actix_web::error::{ErrorForbidden, ErrorUnauthorized};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

pub const EMPLOYEE_ID_HEADER: &str = "X-Employee-Id";
pub const ROLE_HEADER: &str = "X-Employee-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

pub struct AuthUser {
    pub employee_id: u64,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let employee_id = match req
            .headers()
            .get(EMPLOYEE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(id) => id,
            None => return ready(Err(ErrorUnauthorized("Missing employee identity"))),
        };

        let role = match req
            .headers()
            .get(ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| Role::from_str(v).ok())
        {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Missing or invalid role"))),
        };

        ready(Ok(AuthUser { employee_id, role }))
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(ErrorForbidden("HR/Admin only"))
        }
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }

    /// Backfill (past-dated submission) is an HR/Admin capability.
    pub fn can_backfill(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr)
    }
}
