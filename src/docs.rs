use crate::api::leave_balance::{BalanceQuery, BalanceResponse};
use crate::api::leave_request::{
    CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse, RejectLeave,
};
use crate::model::leave_type::LeaveType;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave Service API",
        version = "1.0.0",
        description = r#"
## Leave Management Service

Leave request workflow and balance accounting for the HRM system.

### 🔹 Key Features
- **Leave Requests**
  - Submit, cancel, and track leave requests with half-day granularity
- **Approval Workflow**
  - Managers approve or reject pending requests; one-way decisions
- **Balance Accounting**
  - Per employee/category/year ledgers of total, used and pending days

### 🔐 Identity
The gateway in front of this service authenticates callers and forwards
the resolved identity in the `X-Employee-Id` and `X-Employee-Role`
headers. Employees act on their own requests; **HR** and **Admin** can
act for any employee and may backfill past-dated leave.

### 📦 Response Format
- JSON-based RESTful responses
- Errors carry a machine-readable `kind` plus a human-readable `message`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::leave_balance::get_balance,
    ),
    components(
        schemas(
            LeaveType,
            CreateLeave,
            RejectLeave,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            BalanceQuery,
            BalanceResponse
        )
    ),
    tags(
        (name = "Leave", description = "Leave workflow and balance APIs"),
    )
)]
pub struct ApiDoc;
