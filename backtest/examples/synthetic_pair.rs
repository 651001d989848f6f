//! Runs the full pairs backtest on a generated mean-reverting pair

use backtest::PairsBacktest;
use common::{NaiveDate, PairPrices, PairsConfig};

fn main() -> anyhow::Result<()> {
    println!("=== Synthetic Pairs Backtest ===\n");

    // Leg B wanders, leg A tracks it plus an oscillating spread
    let days = 500;
    let mut level = 100.0;
    let mut prices_a = Vec::with_capacity(days);
    let mut prices_b = Vec::with_capacity(days);
    for t in 0..days {
        let t = t as f64;
        level += 0.4 * (t * 0.7).sin() + 0.3 * (t * 0.13).cos();
        let spread = 5.0 + 3.0 * (t * 0.21).sin() + 0.5 * (t * 1.9).cos();
        prices_b.push(level);
        prices_a.push(level + spread);
    }

    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap_or(NaiveDate::MIN);
    let prices = PairPrices::with_daily_index(start, "LEG-A", prices_a, "LEG-B", prices_b)?;

    let mut config = PairsConfig::default();
    config.tickers = ["LEG-A".to_string(), "LEG-B".to_string()];

    let report = PairsBacktest::new(config)?.run(&prices)?;

    if let Some(coint) = &report.cointegration {
        println!("Cointegration:");
        println!("  p-value:      {:.4}", coint.p_value);
        println!("  hedge ratio:  {:.4}", coint.hedge_ratio);
        println!("  cointegrated: {}\n", report.cointegrated);
    }

    let counts = report.signal_counts;
    println!("Signals: {} long, {} short, {} exit\n", counts.longs, counts.shorts, counts.exits);

    let summary = &report.summary;
    println!("Performance:");
    println!("  Total return:      ${:.2}", summary.total_amount_return);
    println!("  Percentage return: {:.2}%", summary.percentage_return);
    println!("  Annualized return: {:.2}%", summary.annualized_return);
    println!("  Sharpe ratio:      {:.2}", summary.sharpe_ratio);
    println!("  Max drawdown:      {:.2}%", report.risk.max_drawdown * 100.0);

    Ok(())
}
