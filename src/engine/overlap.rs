//! Overlap detection among one employee's leave requests.

use chrono::NaiveDate;

use crate::engine::dates::overlaps;
use crate::model::leave_request::{LeaveRequest, LeaveStatusKind};

/// Statuses that reserve the employee's calendar. A pending request blocks
/// so that its eventual approval cannot double-book the employee; rejected
/// and cancelled requests never block a resubmission.
pub const BLOCKING_STATUSES: [LeaveStatusKind; 2] =
    [LeaveStatusKind::Pending, LeaveStatusKind::Approved];

/// Returns the first existing request whose range intersects the candidate
/// range, considering only blocking statuses.
pub fn find_overlap<'a>(
    start: NaiveDate,
    end: NaiveDate,
    existing: &'a [LeaveRequest],
) -> Option<&'a LeaveRequest> {
    existing.iter().find(|request| {
        BLOCKING_STATUSES.contains(&request.status_kind())
            && overlaps(start, end, request.start_date, request.end_date)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveStatus;
    use crate::model::leave_type::LeaveType;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, d).unwrap()
    }

    fn request(id: u64, start: u32, end: u32, status: LeaveStatus) -> LeaveRequest {
        let now = Utc::now();
        LeaveRequest {
            id,
            employee_id: 1000,
            leave_type: LeaveType::Annual,
            start_date: date(start),
            end_date: date(end),
            day_count: Decimal::from((end - start + 1) as i64),
            reason: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn rejected() -> LeaveStatus {
        LeaveStatus::Rejected {
            approver_id: 2000,
            decided_at: Utc::now(),
            reason: "no".to_string(),
        }
    }

    #[test]
    fn pending_request_blocks_intersection() {
        let existing = vec![request(1, 10, 14, LeaveStatus::Pending)];
        let conflict = find_overlap(date(12), date(16), &existing);
        assert_eq!(conflict.map(|r| r.id), Some(1));
    }

    #[test]
    fn approved_request_blocks_intersection() {
        let existing = vec![request(
            1,
            10,
            14,
            LeaveStatus::Approved {
                approver_id: 2000,
                decided_at: Utc::now(),
            },
        )];
        assert!(find_overlap(date(14), date(20), &existing).is_some());
    }

    #[test]
    fn rejected_request_never_blocks() {
        let existing = vec![request(1, 10, 14, rejected())];
        assert!(find_overlap(date(10), date(14), &existing).is_none());
    }

    #[test]
    fn cancelled_request_never_blocks() {
        let existing = vec![request(
            1,
            10,
            14,
            LeaveStatus::Cancelled {
                cancelled_at: Utc::now(),
            },
        )];
        assert!(find_overlap(date(10), date(14), &existing).is_none());
    }

    #[test]
    fn adjacent_range_is_not_a_conflict() {
        let existing = vec![request(1, 10, 14, LeaveStatus::Pending)];
        assert!(find_overlap(date(15), date(16), &existing).is_none());
    }

    #[test]
    fn first_conflicting_request_is_reported() {
        let existing = vec![
            request(1, 1, 2, LeaveStatus::Pending),
            request(2, 10, 14, LeaveStatus::Pending),
            request(3, 12, 18, LeaveStatus::Pending),
        ];
        let conflict = find_overlap(date(13), date(13), &existing);
        assert_eq!(conflict.map(|r| r.id), Some(2));
    }
}
