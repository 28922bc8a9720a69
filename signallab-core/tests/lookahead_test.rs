//! Look-ahead contamination tests for indicators, generators and the simulator.
//!
//! Invariant: nothing at bar t may depend on price data from bar t+1 or later,
//! and the position held over bar t may not depend on bar t's own close.
//!
//! Method: run on a truncated series (bars 0..k) and the full series and
//! assert the overlapping prefix is identical; then replace one close with an
//! extreme outlier and assert the position on that bar is unchanged.

use chrono::NaiveDate;
use signallab_core::domain::{Bar, PriceSeries};
use signallab_core::engine::{run_ma_strategy, run_rsi_strategy, SimulationBundle};
use signallab_core::indicators::{Indicator, Rsi, Sma};

/// Deterministic pseudo-random walk using a simple LCG.
fn make_closes(n: usize) -> Vec<f64> {
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);
            price
        })
        .collect()
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), closes).unwrap()
}

fn bars(closes: &[f64]) -> Vec<Bar> {
    series(closes).bars().to_vec()
}

fn assert_indicator_prefix(indicator: &dyn Indicator, full: &[Bar], k: usize) {
    let a = indicator.compute(&full[..k]);
    let b = indicator.compute(full);
    assert_eq!(a.len(), k, "{}: truncated length", indicator.name());
    for i in 0..k {
        if a[i].is_nan() && b[i].is_nan() {
            continue;
        }
        assert_eq!(
            a[i].to_bits(),
            b[i].to_bits(),
            "{}: look-ahead at bar {i} (truncated={}, full={})",
            indicator.name(),
            a[i],
            b[i]
        );
    }
}

fn assert_bundle_prefix(truncated: &SimulationBundle, full: &SimulationBundle) {
    let k = truncated.len();
    assert_eq!(truncated.warmup, full.warmup);
    assert_eq!(truncated.signals[..], full.signals[..k]);
    assert_eq!(truncated.positions[..], full.positions[..k]);
    assert_eq!(truncated.trades[..], full.trades[..k]);
    assert_eq!(truncated.strategy_returns[..], full.strategy_returns[..k]);
    assert_eq!(truncated.benchmark[..], full.benchmark[..k]);
    for (name, col) in &truncated.indicators {
        assert_eq!(col[..], full.indicators[name][..k], "column {name}");
    }
}

#[test]
fn sma_no_lookahead() {
    let full = bars(&make_closes(300));
    for period in [1, 2, 10, 50, 200] {
        assert_indicator_prefix(&Sma::new(period), &full, 150);
        assert_indicator_prefix(&Sma::new(period), &full, 250);
    }
}

#[test]
fn rsi_no_lookahead() {
    let full = bars(&make_closes(300));
    for period in [1, 2, 14, 30] {
        assert_indicator_prefix(&Rsi::new(period), &full, 100);
        assert_indicator_prefix(&Rsi::new(period), &full, 299);
    }
}

#[test]
fn ma_bundle_prefix_matches() {
    let closes = make_closes(400);
    let full = run_ma_strategy(&series(&closes), 10, 50).unwrap();
    for k in [60, 123, 399] {
        let truncated = run_ma_strategy(&series(&closes[..k]), 10, 50).unwrap();
        assert_bundle_prefix(&truncated, &full);
    }
}

#[test]
fn rsi_bundle_prefix_matches() {
    let closes = make_closes(400);
    let full = run_rsi_strategy(&series(&closes), 14, 30.0, 70.0, 10.0).unwrap();
    for k in [20, 200, 399] {
        let truncated = run_rsi_strategy(&series(&closes[..k]), 14, 30.0, 70.0, 10.0).unwrap();
        assert_bundle_prefix(&truncated, &full);
    }
}

#[test]
fn outlier_close_never_moves_same_bar_position_ma() {
    let closes = make_closes(200);
    let base = run_ma_strategy(&series(&closes), 5, 20).unwrap();
    for t in [base.warmup + 1, base.warmup + 37, closes.len() - 1] {
        for outlier in [1e-3, 1e6] {
            let mut shocked = closes.clone();
            shocked[t] = outlier;
            let b = run_ma_strategy(&series(&shocked), 5, 20).unwrap();
            let j = t - b.warmup;
            assert_eq!(
                b.positions[j], base.positions[j],
                "position at bar {t} reacted to its own close"
            );
        }
    }
}

#[test]
fn outlier_close_never_moves_same_bar_position_rsi() {
    let closes = make_closes(200);
    let base = run_rsi_strategy(&series(&closes), 14, 30.0, 70.0, 10.0).unwrap();
    for t in [base.warmup + 1, base.warmup + 50, closes.len() - 1] {
        for outlier in [1e-3, 1e6] {
            let mut shocked = closes.clone();
            shocked[t] = outlier;
            let b = run_rsi_strategy(&series(&shocked), 14, 30.0, 70.0, 10.0).unwrap();
            let j = t - b.warmup;
            assert_eq!(b.positions[j], base.positions[j]);
        }
    }
}
