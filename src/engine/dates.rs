//! Inclusive date-range arithmetic used by the leave workflow.

use chrono::NaiveDate;

use crate::error::LeaveError;

/// Inclusive day count of `[start, end]`: `(end - start) + 1`.
///
/// `days_between(d, d)` is 1. Fails with `InvalidRange` when `end < start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Result<i64, LeaveError> {
    if end < start {
        return Err(LeaveError::InvalidRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Whether the closed intervals `[a_start, a_end]` and `[b_start, b_end]`
/// share at least one calendar day. Adjacent ranges do not overlap.
pub fn overlaps(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_counts_as_one() {
        let d = date(2030, 3, 10);
        assert_eq!(days_between(d, d).unwrap(), 1);
    }

    #[test]
    fn count_is_inclusive_of_both_endpoints() {
        assert_eq!(
            days_between(date(2030, 3, 10), date(2030, 3, 14)).unwrap(),
            5
        );
    }

    #[test]
    fn count_crosses_month_and_year_boundaries() {
        assert_eq!(
            days_between(date(2030, 12, 30), date(2031, 1, 2)).unwrap(),
            4
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = days_between(date(2030, 3, 14), date(2030, 3, 10)).unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange { .. }));
    }

    #[test]
    fn intersecting_ranges_overlap() {
        assert!(overlaps(
            date(2030, 3, 10),
            date(2030, 3, 14),
            date(2030, 3, 12),
            date(2030, 3, 16),
        ));
    }

    #[test]
    fn containment_overlaps() {
        assert!(overlaps(
            date(2030, 3, 10),
            date(2030, 3, 20),
            date(2030, 3, 12),
            date(2030, 3, 13),
        ));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        assert!(!overlaps(
            date(2030, 3, 10),
            date(2030, 3, 14),
            date(2030, 3, 15),
            date(2030, 3, 16),
        ));
    }

    #[test]
    fn shared_single_day_overlaps() {
        assert!(overlaps(
            date(2030, 3, 10),
            date(2030, 3, 14),
            date(2030, 3, 14),
            date(2030, 3, 20),
        ));
    }
}
