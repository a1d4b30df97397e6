use clap::Parser;

use trendbot::api::{BarSource, BybitClient};
use trendbot::config::BotConfig;
use trendbot::execution::{RiskManagedOrderExecutor, TradeRunner};
use trendbot::indicators::{IndicatorConfig, IndicatorFrame};
use trendbot::models::validate_bar_sequence;
use trendbot::strategy::{generate_signals, SignalConfig};
use trendbot::timesync::{self, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_RETRIES};
use trendbot::Result;

/// Single-asset trend bot: SMA-crossover signals turned into bracketed
/// orders on Bybit.
#[derive(Debug, Parser)]
#[command(name = "trendbot", version, about)]
struct Cli {
    /// Trade against the Bybit testnet instead of production.
    #[arg(long)]
    testnet: bool,

    /// Generate signals and log decisions without placing any orders.
    #[arg(long)]
    dry_run: bool,

    /// Override TRADE_SYMBOL from the environment.
    #[arg(long)]
    symbol: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let mut config = BotConfig::from_env();
    if let Some(symbol) = cli.symbol {
        config.symbol = symbol;
    }

    tracing::info!("🚀 TrendBot starting");
    tracing::info!("📊 Configuration:");
    tracing::info!("  Symbol: {}", config.symbol);
    tracing::info!("  Timeframe: {} x {} bars", config.timeframe, config.bar_limit);
    tracing::info!("  Order quantity: {}", config.order_quantity);
    tracing::info!(
        "  Bracket: -{:.1}% stop / +{:.1}% target",
        config.stop_loss_pct * 100.0,
        config.take_profit_pct * 100.0
    );

    let client = if cli.testnet {
        BybitClient::testnet()
    } else {
        BybitClient::new()
    };

    // Best-effort venue clock sync; a zero offset just means we trust the
    // local clock for recvWindow stamping.
    let offset = timesync::sync_clock_offset(&client, DEFAULT_MAX_RETRIES, DEFAULT_BACKOFF_SECS).await;
    let client = client.with_time_offset(offset);

    let bars = client
        .fetch_bars(&config.symbol, &config.timeframe, config.bar_limit)
        .await?;
    validate_bar_sequence(&bars)?;

    let frame = IndicatorFrame::compute(&bars, &IndicatorConfig::default());
    let signals = generate_signals(&frame, &SignalConfig::default());

    if cli.dry_run {
        let buys = signals.iter().filter(|s| **s == trendbot::Signal::Buy).count();
        let sells = signals.iter().filter(|s| **s == trendbot::Signal::Sell).count();
        tracing::info!(
            "🔍 Dry run: {} bars, {} buy and {} sell signals, no orders placed",
            bars.len(),
            buys,
            sells
        );
        return Ok(());
    }

    let executor = RiskManagedOrderExecutor::new(
        client,
        &config.symbol,
        config.order_quantity,
        config.stop_loss_pct,
        config.take_profit_pct,
    );
    let mut runner = TradeRunner::new(config.stop_loss_pct, config.take_profit_pct);

    let summary = runner.run(&bars, &signals, &executor).await?;

    tracing::info!("✅ Run complete:");
    tracing::info!("  Bars processed: {}", summary.bars_processed);
    tracing::info!("  Entries: {}", summary.entries);
    tracing::info!("  Exits: {}", summary.exits);
    if summary.partial_brackets > 0 {
        tracing::warn!(
            "  ⚠️  Partial brackets: {} (place missing protective orders manually)",
            summary.partial_brackets
        );
    }
    if summary.ended_long {
        tracing::info!("  Position left open at end of run");
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendbot=info")),
        )
        .init();
}
