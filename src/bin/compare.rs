//! Compare - execution quality of each strategy on the same market.
//!
//! Every strategy gets a fresh engine with the same seed: a thin ladder of
//! expensive passive liquidity plus a market maker refilling the touch
//! every tick. Writes one CSV row per strategy.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use csv::Writer as CsvWriter;
use lob_harness::strategies::{
    AdaptiveSplittingBot, AdaptiveSplittingConfig, GreedyAdaptiveBot, GreedyAdaptiveConfig, GreedyLookaheadBot,
    GreedyLookaheadConfig, MarketMaker, MarketMakerConfig, SplittingBot, SplittingConfig,
};
use lob_harness::{run_execution, Engine, EngineConfig, ExecutionReport, ExecutionStrategy, OrderRequest, Side};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(about = "Compare execution strategies against a replenishing market maker")]
struct Args {
    /// Maximum ticks per strategy
    #[arg(long, default_value_t = 60)]
    ticks: usize,

    /// Parent order size
    #[arg(long, default_value_t = 6.0)]
    total: f64,

    /// Parent order side (buy/bid or sell/ask)
    #[arg(long, default_value = "buy")]
    side: Side,

    /// Standard deviation of the reference walk per tick
    #[arg(long, default_value_t = 0.0)]
    volatility: f64,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// CSV output path; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

type BoxError = Box<dyn std::error::Error>;

/// Engine with the seeded reference walk, the passive ladder and a market maker.
fn scenario(args: &Args) -> Result<Engine, BoxError> {
    let config = EngineConfig {
        initial_value: 100.0,
        volatility: args.volatility,
        seed: Some(args.seed),
    };
    let mut engine = Engine::new(&config)?;

    let passive = args.side.opposite();
    for (offset, size) in [(5.0, 1.0), (6.0, 2.0), (7.0, 3.0)] {
        let price = match passive {
            Side::Sell => config.initial_value + offset,
            Side::Buy => config.initial_value - offset,
        };
        engine.place(OrderRequest::new(passive, price, size))?;
    }

    let maker = MarketMakerConfig { jitter: 0.0, ..MarketMakerConfig::default() };
    engine.register(MarketMaker::new(maker, Some(args.seed))?);
    Ok(engine)
}

fn run<S>(args: &Args, label: &str, strategy: S) -> Result<ExecutionReport, BoxError>
where
    S: ExecutionStrategy + 'static,
{
    let mut engine = scenario(args)?;
    let mut report = run_execution(&mut engine, strategy, args.side, args.total, args.ticks);
    report.strategy = label.to_string();
    Ok(report)
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!(?args, "comparing strategies");

    let reports = vec![
        run(
            &args,
            "immediate",
            SplittingBot::new(SplittingConfig { slice_size: Some(args.total) })?,
        )?,
        run(&args, "splitting", SplittingBot::new(SplittingConfig::default())?)?,
        run(
            &args,
            "adaptive",
            AdaptiveSplittingBot::new(AdaptiveSplittingConfig { max_slice: 2.0, ..AdaptiveSplittingConfig::default() })?,
        )?,
        run(&args, "greedy", GreedyAdaptiveBot::new(GreedyAdaptiveConfig::default())?)?,
        run(&args, "lookahead", GreedyLookaheadBot::new(GreedyLookaheadConfig::default())?)?,
    ];

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    let mut wtr = CsvWriter::from_writer(out);
    for report in &reports {
        wtr.serialize(report)?;
    }
    wtr.flush()?;

    if let Some(path) = &args.output {
        eprintln!("Wrote {} rows to {}", reports.len(), path.display());
    }
    Ok(())
}
