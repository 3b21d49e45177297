//! HashStream driver
//!
//! Run with: `cargo run --bin hashstream -- tweets.txt degrees.txt`
//!
//! Reads line-delimited JSON posts, builds the trailing-window hashtag graph
//! after every post, and writes the mean degree of each window graph.

use hashstream::statistics::{ComponentCount, EdgeCount, NodeCount};
use hashstream::{
    read_events_from_path, GraphStream, HashStreamConfig, MeanDegree, SqliteSink,
    StatisticsEngine, StatsSink, TextSink,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=hashstream=debug for per-window output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = HashStreamConfig::from_env_and_args()?;
    let window = config.window()?;

    tracing::info!(
        input = %config.input_path.display(),
        window_secs = config.window_secs,
        "starting pass"
    );

    let report = read_events_from_path(&config.input_path)?;
    if let Some((first, last)) = report.log.time_span() {
        tracing::info!(first = %first, last = %last, "input time span");
    }
    let stream = GraphStream::with_range(&report.log, window, config.range());

    let engine = StatisticsEngine::new()
        .with(MeanDegree)
        .with(NodeCount)
        .with(EdgeCount)
        .with(ComponentCount);
    let matrix = engine.compute(stream)?;

    if let Some(path) = &config.output_path {
        // the text file keeps only the mean degree column
        if let Some(degrees) = matrix.select(&["mean_degree"]) {
            TextSink::create(path)?.write_matrix(&degrees)?;
        }
    }

    if let Some(path) = &config.database_path {
        let mut sink = SqliteSink::new(path)?;
        sink.write_matrix(&matrix)?;
    }

    println!(
        "{} events ({} dropped), {} window graphs",
        report.log.len(),
        report.dropped,
        matrix.len()
    );
    if let Some(degrees) = matrix.column("mean_degree") {
        if let Some(last) = degrees.last() {
            println!("latest mean degree: {:.2}", last);
        }
    }

    Ok(())
}
