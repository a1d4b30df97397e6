use clap::Parser;

use trendbot::api::{BarSource, BybitClient};
use trendbot::backtest::BacktestRunner;
use trendbot::indicators::{
    detect_double_top, detect_head_and_shoulders, IndicatorConfig, IndicatorFrame,
};
use trendbot::models::validate_bar_sequence;
use trendbot::strategy::{generate_signals, SignalConfig};
use trendbot::Result;

/// Replay the crossover strategy over historical klines without placing
/// orders.
#[derive(Debug, Parser)]
#[command(name = "backtest", version, about)]
struct Cli {
    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    /// Bar interval, e.g. 1h or 1d.
    #[arg(long, default_value = "1d")]
    timeframe: String,

    #[arg(long, default_value_t = 365)]
    limit: usize,

    /// Starting quote balance for the simulation.
    #[arg(long, default_value_t = 1000.0)]
    initial_balance: f64,

    #[arg(long, default_value_t = 0.05)]
    stop_loss_pct: f64,

    #[arg(long, default_value_t = 0.10)]
    take_profit_pct: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendbot=info,backtest=info")),
        )
        .init();

    let cli = Cli::parse();

    let client = BybitClient::new();
    let bars = client
        .fetch_bars(&cli.symbol, &cli.timeframe, cli.limit)
        .await?;
    validate_bar_sequence(&bars)?;
    tracing::info!("Fetched {} {} bars for {}", bars.len(), cli.timeframe, cli.symbol);

    let frame = IndicatorFrame::compute(&bars, &IndicatorConfig::default());
    // The historical replay trades the raw crossover; the momentum filter
    // is a live-trading refinement.
    let signals = generate_signals(
        &frame,
        &SignalConfig {
            confirm_with_momentum: false,
            ..SignalConfig::default()
        },
    );

    let hs_count = detect_head_and_shoulders(&bars).iter().filter(|f| **f).count();
    let dt_count = detect_double_top(&bars).iter().filter(|f| **f).count();
    tracing::info!("Patterns seen: {hs_count} head-and-shoulders, {dt_count} double tops");

    let report = BacktestRunner::new(cli.initial_balance, cli.stop_loss_pct, cli.take_profit_pct)
        .run(&bars, &signals)?;

    tracing::info!("📈 Backtest report for {}:", cli.symbol);
    tracing::info!("  Final balance: {:.2} USDT", report.final_balance);
    tracing::info!("  Total return: {:.2}%", report.total_return_pct);
    tracing::info!("  Max drawdown: {:.2}%", report.max_drawdown_pct);
    tracing::info!("  Completed trades: {}", report.trades);
    if report.ended_long {
        tracing::info!("  Position still open at the last bar");
    }

    Ok(())
}
