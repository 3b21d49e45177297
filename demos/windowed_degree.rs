//! Windowed Degree Example
//!
//! This example demonstrates the GraphStream by:
//! 1. Building a small, partly out-of-order event log
//! 2. Streaming the trailing-window co-occurrence graphs
//! 3. Computing mean degree and component count for every window
//!
//! Run with: cargo run --example windowed_degree

use chrono::{Duration, TimeZone, Utc};
use hashstream::statistics::{ComponentCount, MeanDegree, StatisticsEngine};
use hashstream::{rolled_graphs, EventLog, GraphStream, WindowConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    println!("=== Windowed Hashtag Graph: Mean Degree ===\n");

    let start = Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 0).unwrap();
    let posts: Vec<(i64, Vec<&str>)> = vec![
        (1, vec!["Spark", "Apache"]),
        (30, vec!["Apache", "Hadoop", "Storm"]),
        (55, vec!["Flink"]),
        (56, vec!["Flink", "Spark"]),
        (50, vec!["HBase", "Spark"]),
        (65, vec!["Hadoop", "Apache"]),
        (120, vec!["Kafka", "Storm"]),
    ];

    let log: EventLog = posts
        .into_iter()
        .map(|(offset, tags)| (start + Duration::seconds(offset), tags))
        .collect();
    println!("Created {} events", log.len());

    let window = WindowConfig::from_secs(60)?;
    let engine = StatisticsEngine::new().with(MeanDegree).with(ComponentCount);
    let matrix = engine.compute(GraphStream::new(&log, window))?;

    println!("\n{:<10} {:>12} {:>12}", "time", "mean_degree", "components");
    for (time, row) in matrix.times().iter().zip(matrix.rows()) {
        println!(
            "{:<10} {:>12.2} {:>12}",
            time.format("%H:%M:%S"),
            row[0],
            row[1]
        );
    }

    println!("\n{} of {} windows had more than one node", matrix.len(), log.len());

    if let Some(latest) = rolled_graphs(&log, window).last() {
        println!("Storm co-occurs with {:?} in the last window", latest.neighbors("Storm"));
    }
    Ok(())
}
