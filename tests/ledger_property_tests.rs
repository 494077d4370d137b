//! Property-based tests for the balance ledger and date arithmetic.
//!
//! These verify the invariants that must hold for all inputs, not just
//! the specific scenarios covered elsewhere: the inclusive day-count
//! formula, overlap symmetry and adjacency, and the ledger bounds
//! `0 <= used`, `0 <= pending`, `used + pending <= total` under arbitrary
//! event sequences.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use hrm_leave::engine::dates::{days_between, overlaps};
use hrm_leave::error::LeaveError;
use hrm_leave::model::leave_balance::{BalanceEvent, LeaveBalance};
use hrm_leave::model::leave_type::LeaveType;

// PROPERTY TEST STRATEGIES

/// Strategy to generate an arbitrary valid date
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2035, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// Strategy to generate a day quantity in half-day steps (0.5 to 20.0)
fn half_day_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=40).prop_map(|halves| Decimal::new(halves * 5, 1))
}

/// Strategy to generate a random ledger event
fn event_strategy() -> impl Strategy<Value = BalanceEvent> {
    (0u8..=2, half_day_quantity_strategy()).prop_map(|(kind, days)| match kind {
        0 => BalanceEvent::Reserve(days),
        1 => BalanceEvent::Commit(days),
        _ => BalanceEvent::Release(days),
    })
}

fn ledger_invariants_hold(balance: &LeaveBalance) -> bool {
    balance.used_days >= Decimal::ZERO
        && balance.pending_days >= Decimal::ZERO
        && balance.used_days + balance.pending_days <= balance.total_days
}

// PROPERTY TESTS

proptest! {
    /// Property: for any start date and span, the inclusive count is
    /// (end - start) + 1, and a single day counts as 1.
    #[test]
    fn days_between_matches_inclusive_formula(start in date_strategy(), span in 0i64..400) {
        let end = start + Duration::days(span);
        prop_assert_eq!(days_between(start, end).unwrap(), span + 1);
        prop_assert_eq!(days_between(start, start).unwrap(), 1);
    }

    /// Property: an inverted range is always rejected.
    #[test]
    fn days_between_rejects_inverted_ranges(start in date_strategy(), span in 1i64..400) {
        let end = start + Duration::days(span);
        let is_invalid_range = matches!(
            days_between(end, start),
            Err(LeaveError::InvalidRange { .. })
        );
        prop_assert!(is_invalid_range);
    }

    /// Property: overlap is symmetric in its two ranges.
    #[test]
    fn overlap_is_symmetric(
        a_start in date_strategy(),
        a_span in 0i64..60,
        b_start in date_strategy(),
        b_span in 0i64..60,
    ) {
        let a_end = a_start + Duration::days(a_span);
        let b_end = b_start + Duration::days(b_span);
        prop_assert_eq!(
            overlaps(a_start, a_end, b_start, b_end),
            overlaps(b_start, b_end, a_start, a_end)
        );
    }

    /// Property: a range never overlaps the range starting the day after
    /// it ends, but always overlaps one starting on its last day.
    #[test]
    fn adjacency_is_not_overlap(start in date_strategy(), span in 0i64..60, tail in 0i64..60) {
        let end = start + Duration::days(span);
        prop_assert!(!overlaps(start, end, end + Duration::days(1), end + Duration::days(1 + tail)));
        prop_assert!(overlaps(start, end, end, end + Duration::days(tail)));
    }

    /// Property: whatever sequence of events is applied, a ledger that
    /// starts consistent stays consistent; rejected events change nothing
    /// (apply is pure, so the prior balance is simply kept).
    #[test]
    fn ledger_invariants_survive_any_event_sequence(
        total in 0i64..60,
        events in prop::collection::vec(event_strategy(), 1..40),
    ) {
        let mut balance = LeaveBalance::new(1000, LeaveType::Annual, 2030, Decimal::from(total));
        prop_assert!(ledger_invariants_hold(&balance));

        for event in events {
            match balance.apply(event) {
                Ok(next) => {
                    prop_assert!(ledger_invariants_hold(&next));
                    balance = next;
                }
                Err(LeaveError::InsufficientBalance { .. }) => {
                    prop_assert!(matches!(event, BalanceEvent::Reserve(_)));
                }
                Err(LeaveError::LedgerInvariant { .. }) => {
                    prop_assert!(matches!(
                        event,
                        BalanceEvent::Commit(_) | BalanceEvent::Release(_)
                    ));
                }
                Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
            }
        }
    }

    /// Property: reserve-then-commit moves exactly the reserved quantity
    /// from pending to used; reserve-then-release restores the original
    /// balance.
    #[test]
    fn reserve_commit_and_release_conserve_days(
        total_halves in 2i64..=120,
        quantity in half_day_quantity_strategy(),
    ) {
        let total = Decimal::new(total_halves * 5, 1);
        prop_assume!(quantity <= total);
        let balance = LeaveBalance::new(1000, LeaveType::Annual, 2030, total);

        let reserved = balance.apply(BalanceEvent::Reserve(quantity)).unwrap();
        prop_assert_eq!(reserved.pending_days, quantity);
        prop_assert_eq!(reserved.remaining(), total - quantity);

        let committed = reserved.apply(BalanceEvent::Commit(quantity)).unwrap();
        prop_assert_eq!(committed.used_days, quantity);
        prop_assert_eq!(committed.pending_days, Decimal::ZERO);
        // Committing does not change the reserved capacity.
        prop_assert_eq!(committed.remaining(), reserved.remaining());

        let released = reserved.apply(BalanceEvent::Release(quantity)).unwrap();
        prop_assert_eq!(released.used_days, balance.used_days);
        prop_assert_eq!(released.pending_days, balance.pending_days);
        prop_assert_eq!(released.remaining(), balance.remaining());
    }
}
