//! Property-based tests for the result-grouping fold
//!
//! For any row sequence sorted by title then start, grouping must be a
//! lossless partition: titles strictly increasing and unique, showtimes
//! preserved in order, and re-grouping the flattened output a fixed point.

use chrono::{Days, NaiveDate, NaiveTime};
use marquee_core::query::group_rows;
use marquee_core::ShowtimeRow;
use proptest::prelude::*;

// ========== Generators ==========

// Strategy for titles drawn from a small pool so collisions are common
fn arb_title() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Alien",
        "Blade Runner",
        "Dune",
        "Elio",
        "Paddington",
        "Up",
    ])
    .prop_map(str::to_string)
}

// Strategy for screening dates within a season
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..120)
        .prop_map(|offset| NaiveDate::from_ymd_opt(2024, 9, 1).unwrap() + Days::new(offset))
}

// Strategy for start times on minute boundaries
fn arb_time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

// Strategy for a row set sorted the way the store returns it
fn arb_sorted_rows() -> impl Strategy<Value = Vec<ShowtimeRow>> {
    prop::collection::vec((arb_title(), arb_date(), arb_time()), 0..40).prop_map(|mut rows| {
        rows.sort();
        rows.into_iter()
            .map(|(title, show_date, show_time)| ShowtimeRow {
                title,
                show_date,
                show_time,
            })
            .collect()
    })
}

// ========== Properties ==========

proptest! {
    #[test]
    fn grouping_is_a_lossless_partition(rows in arb_sorted_rows()) {
        let listing = group_rows(rows.clone());
        prop_assert_eq!(listing.flatten(), rows);
    }

    #[test]
    fn titles_are_strictly_increasing_and_unique(rows in arb_sorted_rows()) {
        let listing = group_rows(rows);
        let titles: Vec<&str> = listing.iter().map(|g| g.title.as_str()).collect();
        for pair in titles.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn grouping_is_idempotent_under_flatten_then_regroup(rows in arb_sorted_rows()) {
        let once = group_rows(rows);
        let again = group_rows(once.flatten());
        prop_assert_eq!(once, again);
    }

    #[test]
    fn no_group_is_empty(rows in arb_sorted_rows()) {
        let listing = group_rows(rows);
        for group in &listing {
            prop_assert!(!group.showtimes.is_empty());
        }
    }

    #[test]
    fn group_count_equals_distinct_title_count(rows in arb_sorted_rows()) {
        let mut distinct: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let listing = group_rows(rows.clone());
        prop_assert_eq!(listing.len(), distinct.len());
    }
}

#[test]
fn empty_rows_group_to_an_empty_listing() {
    assert!(group_rows(Vec::new()).is_empty());
}
