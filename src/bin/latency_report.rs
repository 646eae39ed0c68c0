use hdrhistogram::Histogram;
use lob_harness::strategies::{
    InformedTrader, InformedTraderConfig, MarketMaker, MarketMakerConfig, NoiseTrader, NoiseTraderConfig,
};
use lob_harness::{Engine, EngineConfig};
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Preparing Tick Latency Benchmark...");

    // Setup: a reproducible market with makers, noise and occasional sweeps
    let config = EngineConfig { seed: Some(1), ..EngineConfig::default() };
    let mut engine = Engine::new(&config)?;
    engine.register(MarketMaker::new(MarketMakerConfig::default(), Some(2))?);
    engine.register(MarketMaker::new(MarketMakerConfig { spread: 1.2, ..MarketMakerConfig::default() }, Some(3))?);
    engine.register(NoiseTrader::new(NoiseTraderConfig::default(), Some(4))?);
    engine.register(InformedTrader::new(InformedTraderConfig::default(), Some(5))?);

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3)?;

    const ITERATIONS: u64 = 20_000;

    println!("Running {} ticks...", ITERATIONS);

    let mut total_duration = std::time::Duration::new(0, 0);
    let mut failures = 0usize;

    for _ in 0..ITERATIONS {
        // Critical measurement section
        let start = Instant::now();
        let report = std::hint::black_box(engine.step());
        let elapsed = start.elapsed();

        failures += report.failures.len();
        // Outliers above the histogram bound are dropped
        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total_duration += elapsed;
    }

    println!("\n=== Tick Latency Report (ns) ===");
    println!("Total Ticks:  {}", ITERATIONS);
    println!("Throughput:   {:.2} ticks/sec", ITERATIONS as f64 / total_duration.as_secs_f64());
    println!("Trades:       {}", engine.trades().len());
    println!("Resting:      {}", engine.market.book().order_count());
    println!("Failures:     {}", failures);
    println!("--------------------------------");
    println!("Min:    {:8} ns", histogram.min());
    println!("P50:    {:8} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:8} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:8} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:8} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:8} ns", histogram.max());
    println!("--------------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(1_000, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:8} ns: {:10} count", v.value_iterated_to(), count);
        }
    }

    Ok(())
}
