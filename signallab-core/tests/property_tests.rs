//! Property tests for simulator invariants.
//!
//! Uses proptest to verify:
//! 1. Constant prices: zero returns, flat growth, no trades, for every strategy
//! 2. MA trimming: output length is n - (long_window - 1), no NaN survives
//! 3. Position lag: Position[t] = Signal[t-1] for t >= 1
//! 4. Trade bounds: MA trades in {-2, 0, 2}, RSI never flips without passing Flat
//! 5. Growth anchors: S[0] = B[0] = 1, B[last] = close[last] / close[0]

use chrono::NaiveDate;
use proptest::prelude::*;
use signallab_core::domain::{Direction, PriceSeries};
use signallab_core::engine::{run_ma_strategy, run_rsi_strategy, SimulationBundle};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..160)
}

fn arb_ma_windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..20).prop_flat_map(|s| (Just(s), (s + 1)..40))
}

fn arb_rsi() -> impl Strategy<Value = (usize, f64, f64, f64)> {
    (1usize..30, 5.0..45.0_f64, 55.0..95.0_f64, 0.0..10.0_f64)
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), closes).unwrap()
}

fn assert_lagged(b: &SimulationBundle) {
    assert_eq!(b.positions[0], b.signals[0]);
    for t in 1..b.len() {
        assert_eq!(b.positions[t], b.signals[t - 1], "lag broken at {t}");
    }
}

// ── 1. Constant prices ───────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_price_ma_is_inert(
        price in 1.0..1000.0_f64,
        n in 40usize..120,
        (short, long) in arb_ma_windows(),
    ) {
        let b = run_ma_strategy(&series(&vec![price; n]), short, long).unwrap();
        prop_assert!(b.returns.iter().all(|r| *r == 0.0));
        prop_assert!(b.strategy_returns.iter().all(|s| *s == 1.0));
        prop_assert!(b.trades.iter().all(|t| *t == 0));
    }

    #[test]
    fn constant_price_rsi_is_inert(
        price in 1.0..1000.0_f64,
        n in 30usize..120,
        (period, lower, upper, buffer) in arb_rsi(),
    ) {
        let b = run_rsi_strategy(&series(&vec![price; n]), period, lower, upper, buffer).unwrap();
        prop_assert!(b.strategy_returns.iter().all(|s| *s == 1.0));
        prop_assert!(b.trades.iter().all(|t| *t == 0));
        // no losses → RSI pinned at 100 → short from the first bar
        prop_assert!(b.positions.iter().all(|p| *p == Direction::Short));
    }
}

// ── 2. MA trimming ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn ma_trimmed_length(closes in arb_closes(40), (short, long) in arb_ma_windows()) {
        let b = run_ma_strategy(&series(&closes), short, long).unwrap();
        prop_assert_eq!(b.len(), closes.len() - (long - 1));
        prop_assert_eq!(b.prices.first().close, closes[long - 1]);
        for col in b.indicators.values() {
            prop_assert_eq!(col.len(), b.len());
            prop_assert!(col.iter().all(|v| v.is_finite()));
        }
        prop_assert!(b.signals.iter().all(|s| *s != Direction::Flat));
    }
}

// ── 3–5. Lag, trade bounds, growth anchors ───────────────────────────

proptest! {
    #[test]
    fn ma_lag_and_trade_bounds(closes in arb_closes(40), (short, long) in arb_ma_windows()) {
        let b = run_ma_strategy(&series(&closes), short, long).unwrap();
        assert_lagged(&b);
        prop_assert_eq!(b.trades[0], 0);
        prop_assert!(b.trades.iter().all(|t| matches!(t, -2 | 0 | 2)));
    }

    #[test]
    fn rsi_lag_and_no_direct_flip(closes in arb_closes(30), (period, lower, upper, buffer) in arb_rsi()) {
        let b = run_rsi_strategy(&series(&closes), period, lower, upper, buffer).unwrap();
        assert_lagged(&b);
        prop_assert!(b.trades.iter().all(|t| (-1..=1).contains(t)));
        let readings = &b.indicators[&format!("rsi_{period}")];
        prop_assert!(readings.iter().all(|r| (0.0..=100.0).contains(r)));
    }

    #[test]
    fn growth_curves_are_anchored(closes in arb_closes(40), (short, long) in arb_ma_windows()) {
        let b = run_ma_strategy(&series(&closes), short, long).unwrap();
        prop_assert_eq!(b.strategy_returns[0], 1.0);
        prop_assert_eq!(b.benchmark[0], 1.0);
        prop_assert_eq!(b.returns[0], 0.0);
        let expected = b.prices.last().close / b.prices.first().close;
        prop_assert!((b.final_benchmark_level() - expected).abs() < 1e-9 * expected.max(1.0));
    }
}
