//! Property-based tests for engine invariants.
//!
//! - A quote is exactly what issuance produces at the same instant
//! - Bucket lending plus hourly lending always equals total lending
//! - Withdrawing every matured bond returns lending to the hourly balance

mod common;

use common::{Harness, THIRTY_DAYS};
use lendcurve_core::types::{DAY, HOUR};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Issue { runtime_days: u64, amount: u128 },
    BuyHourly { amount: u128 },
    Advance { seconds: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (30u64..=365, 1u128..50_000).prop_map(|(runtime_days, amount)| Op::Issue {
            runtime_days,
            amount
        }),
        (1u128..50_000).prop_map(|amount| Op::BuyHourly { amount }),
        (1u64..(3 * DAY)).prop_map(|seconds| Op::Advance { seconds }),
    ]
}

fn assert_lending_adds_up(h: &Harness) -> Result<(), TestCaseError> {
    let meta = h.engine.lending_metadata(&h.dai).unwrap();
    let buckets: u128 = h
        .engine
        .bucket_metadata(&h.dai)
        .unwrap()
        .iter()
        .map(|b| b.total_lending)
        .sum();
    let hourly = h.engine.hourly_market(&h.dai).unwrap().total_lending;
    prop_assert_eq!(buckets + hourly, meta.total_lending);
    prop_assert!(meta.is_solvent());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn property_quote_matches_issue(
        runtime_days in 30u64..=365,
        amount in 1u128..100_000,
        warmup_hours in 0u64..200,
    ) {
        let h = Harness::new();
        h.issue_reference_bond();
        h.advance(warmup_hours * HOUR);

        let runtime = runtime_days * DAY;
        let quote = h.engine.quote_bond(&h.dai, runtime, amount).unwrap();
        let id = h
            .engine
            .issue_bond(&h.alice, &h.dai, runtime, amount, quote.return_amount)
            .unwrap();
        prop_assert!(id.is_some());

        let bond = h.engine.bond(id.unwrap()).unwrap();
        prop_assert_eq!(bond.return_amount, quote.return_amount);
        prop_assert_eq!(bond.bucket_index, quote.bucket_index);
        prop_assert!(bond.return_amount >= amount);
    }

    #[test]
    fn property_lending_totals_add_up(ops in prop::collection::vec(op(), 1..12)) {
        let h = Harness::new();
        for op in ops {
            match op {
                Op::Issue { runtime_days, amount } => {
                    h.engine
                        .issue_bond(&h.alice, &h.dai, runtime_days * DAY, amount, 0)
                        .unwrap();
                }
                Op::BuyHourly { amount } => {
                    h.engine.buy_hourly_bond(&h.bob, &h.dai, amount).unwrap();
                }
                Op::Advance { seconds } => {
                    h.advance(seconds);
                }
            }
            assert_lending_adds_up(&h)?;
        }

        h.advance(366 * DAY);
        for bond in h.engine.bonds_of(&h.alice) {
            h.engine.withdraw_bond(&h.alice, bond.id).unwrap();
            assert_lending_adds_up(&h)?;
        }
        let buckets_empty = h
            .engine
            .bucket_metadata(&h.dai)
            .unwrap()
            .iter()
            .all(|b| b.total_lending == 0);
        prop_assert!(buckets_empty);
    }

    #[test]
    fn property_maturity_is_issue_time_plus_runtime(extra_hours in 0u64..(335 * 24)) {
        let h = Harness::new();
        let runtime = THIRTY_DAYS + extra_hours * HOUR;
        let id = h
            .engine
            .issue_bond(&h.alice, &h.dai, runtime, 1_000, 0)
            .unwrap()
            .unwrap();
        prop_assert_eq!(h.engine.bond(id).unwrap().maturity, common::START + runtime);
    }
}
