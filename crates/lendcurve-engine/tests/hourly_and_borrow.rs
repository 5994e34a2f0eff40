//! Hourly bond market and borrow-side accounting.

mod common;

use common::Harness;
use lendcurve_core::types::HOUR;
use lendcurve_core::{InstrumentId, FP32};
use lendcurve_engine::ErrorKind;
use lendcurve_traits::Fund;
use rust_decimal_macros::dec;

// =============================================================================
// HOURLY BONDS
// =============================================================================

#[test]
fn test_hourly_interest_compounds() {
    let h = Harness::new();
    let fp = h
        .engine
        .set_hourly_yield_apr(&h.activator, &h.dai, dec!(8760))
        .unwrap();
    assert_eq!(fp, FP32 + 42_949_672);

    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000_000).unwrap();
    h.advance(2 * HOUR);

    // Two hours at (almost) 1% per hour.
    let balance = h.engine.view_hourly_bond_amount(&h.alice, &h.dai).unwrap();
    assert!((1_020_090..=1_020_100).contains(&balance), "balance {balance}");
}

#[test]
fn test_hourly_buy_updates_totals() {
    let h = Harness::new();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 5_000).unwrap();
    h.engine.buy_hourly_bond(&h.bob, &h.dai, 3_000).unwrap();

    assert_eq!(h.engine.lending_metadata(&h.dai).unwrap().total_lending, 8_000);
    assert_eq!(h.engine.hourly_market(&h.dai).unwrap().total_lending, 8_000);
    assert_eq!(h.fund.balance(&h.dai), 8_000);
    assert_eq!(h.events.count("hourly_bond_bought"), 2);
}

#[test]
fn test_hourly_buy_opens_new_instrument() {
    let h = Harness::new();
    let usdc = InstrumentId::new("USDC");
    h.instruments.activate(usdc.clone());
    h.fund.fund_wallet(&h.alice, &usdc, 2_000);

    // Borrowing against an instrument nobody has lent is refused outright.
    let err = h.engine.register_borrow(&h.borrower, &usdc, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
    assert!(h.engine.lending_metadata(&usdc).is_err());

    h.engine.buy_hourly_bond(&h.alice, &usdc, 2_000).unwrap();
    assert_eq!(h.engine.lending_metadata(&usdc).unwrap().total_lending, 2_000);
    assert_eq!(h.fund.balance(&usdc), 2_000);
    assert!(h.engine.bucket_metadata(&usdc).unwrap().is_empty());
}

#[test]
fn test_hourly_withdrawal_window() {
    let h = Harness::new();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000).unwrap();

    h.advance(30 * 60);
    let err = h
        .engine
        .withdraw_hourly_bond(&h.alice, &h.dai, 400)
        .unwrap_err();
    assert!(err.to_string().contains("window"));

    // Ten seconds past the first anniversary.
    h.advance(30 * 60 + 10);
    h.engine.withdraw_hourly_bond(&h.alice, &h.dai, 400).unwrap();
    assert_eq!(h.engine.view_hourly_bond_amount(&h.alice, &h.dai).unwrap(), 600);
    assert_eq!(h.fund.wallet_balance(&h.alice, &h.dai), 999_400);
    assert_eq!(h.engine.lending_metadata(&h.dai).unwrap().total_lending, 600);
}

#[test]
fn test_hourly_overdraw_rejected() {
    let h = Harness::new();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000).unwrap();
    let err = h
        .engine
        .withdraw_hourly_bond(&h.alice, &h.dai, 1_001)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
    assert_eq!(h.engine.view_hourly_bond_amount(&h.alice, &h.dai).unwrap(), 1_000);
}

#[test]
fn test_hourly_withdrawal_keeps_borrowing_covered() {
    let h = Harness::new();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000).unwrap();
    h.engine.register_borrow(&h.borrower, &h.dai, 800).unwrap();

    let err = h
        .engine
        .withdraw_hourly_bond(&h.alice, &h.dai, 500)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);
    assert_eq!(h.fund.balance(&h.dai), 1_000);

    h.engine.withdraw_hourly_bond(&h.alice, &h.dai, 200).unwrap();
    assert_eq!(h.engine.lending_metadata(&h.dai).unwrap().total_lending, 800);
}

#[test]
fn test_hourly_cap() {
    let h = Harness::new();
    h.engine.set_lending_cap(&h.activator, &h.dai, 1_500).unwrap();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000).unwrap();
    let err = h.engine.buy_hourly_bond(&h.bob, &h.dai, 600).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapExceeded);
    assert_eq!(h.fund.wallet_balance(&h.bob, &h.dai), 1_000_000);
}

// =============================================================================
// BORROWING
// =============================================================================

#[test]
fn test_borrow_needs_lending() {
    let h = Harness::new();
    let err = h
        .engine
        .register_borrow(&h.borrower, &h.dai, 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);

    let err = h.engine.register_borrow(&h.alice, &h.dai, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn test_borrow_rate_has_floor() {
    let h = Harness::new();
    let params = h.engine.rate_parameters();
    assert_eq!(
        h.engine.borrow_hourly_yield_fp(&h.dai).unwrap(),
        params.borrow_min_hourly_yield_fp
    );

    let hourly = h
        .engine
        .set_hourly_yield_apr(&h.activator, &h.dai, dec!(50))
        .unwrap();
    assert_eq!(
        h.engine.borrow_hourly_yield_fp(&h.dai).unwrap(),
        hourly + params.borrowing_markup_fp
    );
}

#[test]
fn test_borrow_interest_is_booked() {
    let h = Harness::new();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000_000).unwrap();
    let quotient = h
        .engine
        .register_borrow(&h.borrower, &h.dai, 100_000)
        .unwrap();
    h.advance(100 * HOUR);

    let viewed = h
        .engine
        .view_borrow_interest(&h.dai, 100_000, quotient)
        .unwrap();
    let applied = h
        .engine
        .apply_borrow_interest(&h.borrower, &h.dai, 100_000, quotient)
        .unwrap();
    assert_eq!(applied.balance, viewed);
    assert!(applied.balance > 100_000);
    assert!(applied.yield_quotient_fp > quotient);

    let meta = h.engine.lending_metadata(&h.dai).unwrap();
    assert_eq!(meta.total_borrowed, applied.balance);

    // Applying again at the same time books nothing more.
    let again = h
        .engine
        .apply_borrow_interest(&h.borrower, &h.dai, applied.balance, applied.yield_quotient_fp)
        .unwrap();
    assert_eq!(again.balance, applied.balance);
}

#[test]
fn test_pay_off_clears_at_most_outstanding() {
    let h = Harness::new();
    h.engine.buy_hourly_bond(&h.alice, &h.dai, 1_000).unwrap();
    h.engine.register_borrow(&h.borrower, &h.dai, 500).unwrap();
    h.engine.pay_off(&h.borrower, &h.dai, 800).unwrap();

    assert_eq!(h.engine.lending_metadata(&h.dai).unwrap().total_borrowed, 0);
    assert_eq!(h.events.count("borrow_repaid"), 1);
}

#[test]
fn test_rate_tuning() {
    let h = Harness::new();
    let err = h.engine.set_max_hourly_yield_fp(&h.owner, FP32 - 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    h.engine.set_max_hourly_yield_fp(&h.owner, FP32 * 2).unwrap();
    h.engine.set_yield_change_per_hour_fp(&h.owner, 0).unwrap();
    h.engine.set_withdrawal_window(&h.owner, 600).unwrap();

    let params = h.engine.rate_parameters();
    assert_eq!(params.max_hourly_yield_fp, FP32 * 2);
    assert_eq!(params.yield_change_per_hour_fp, 0);
    assert_eq!(params.withdrawal_window, 600);
    assert_eq!(h.events.count("rate_parameter_set"), 3);

    let err = h.engine.set_withdrawal_window(&h.owner, HOUR + 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}
