//! Graph Statistics
//!
//! This module turns a sequence of windowed graphs into a numeric time series.
//! Every statistic is a pure `TagGraph -> f64` function; the engine applies all
//! of them to every graph and produces one row per graph, one column per
//! statistic. The first failing statistic aborts the computation.

pub mod functions;
pub mod sink;

use crate::graph::TagGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub use functions::{
    mean_degree, statistic, ComponentCount, Density, EdgeCount, FnStatistic, GraphStatistic,
    MeanDegree, NodeCount,
};
pub use sink::{SinkError, SqliteSink, StatsSink, TextSink};

/// Error types for statistics computation
#[derive(Debug)]
pub enum StatisticsError {
    /// Statistic is undefined on a graph with no nodes
    EmptyGraph,
    /// A statistic reported its own error
    Failed(String),
    /// A statistic returned an error
    StatisticFailed {
        statistic: String,
        row: usize,
        message: String,
    },
    /// No statistic was registered
    NoStatistics,
    /// Two registered statistics share a name
    DuplicateStatistic(String),
    /// Writing the result to a sink failed
    Sink(SinkError),
}

impl std::fmt::Display for StatisticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatisticsError::EmptyGraph => write!(f, "Statistic undefined on empty graph"),
            StatisticsError::Failed(msg) => write!(f, "{}", msg),
            StatisticsError::StatisticFailed {
                statistic,
                row,
                message,
            } => write!(
                f,
                "Statistic '{}' failed on graph {}: {}",
                statistic, row, message
            ),
            StatisticsError::NoStatistics => write!(f, "No statistics registered"),
            StatisticsError::DuplicateStatistic(name) => {
                write!(f, "Statistic '{}' registered more than once", name)
            }
            StatisticsError::Sink(err) => write!(f, "Sink error: {}", err),
        }
    }
}

impl std::error::Error for StatisticsError {}

impl From<SinkError> for StatisticsError {
    fn from(err: SinkError) -> Self {
        StatisticsError::Sink(err)
    }
}

/// Time series of statistic values, aligned with the input graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatMatrix {
    columns: Vec<String>,
    times: Vec<DateTime<Utc>>,
    rows: Vec<Vec<f64>>,
}

impl StatMatrix {
    /// Creates an empty matrix with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        StatMatrix {
            columns,
            times: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, graph_time: DateTime<Utc>, row: Vec<f64>) {
        self.times.push(graph_time);
        self.rows.push(row);
    }

    /// Statistic names, in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `graph_time` of the graph behind each row.
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// One row per graph, one value per column.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Values of one graph, in column order.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// All values of the named statistic.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Projection onto the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Option<StatMatrix> {
        let indices = names
            .iter()
            .map(|name| self.columns.iter().position(|column| column == name))
            .collect::<Option<Vec<usize>>>()?;

        Some(StatMatrix {
            columns: names.iter().map(|name| name.to_string()).collect(),
            times: self.times.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&index| row[index]).collect())
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Applies a fixed set of statistics to graph sequences.
///
/// # Example
///
/// ```
/// use hashstream::{EventLog, GraphStream, WindowConfig};
/// use hashstream::statistics::{MeanDegree, NodeCount, StatisticsEngine};
/// use chrono::{TimeZone, Utc};
///
/// let mut log = EventLog::new();
/// log.push(Utc.with_ymd_and_hms(2015, 10, 29, 17, 0, 0).unwrap(), vec!["a", "b", "c"]);
///
/// let engine = StatisticsEngine::new().with(MeanDegree).with(NodeCount);
/// let matrix = engine.compute(GraphStream::new(&log, WindowConfig::default())).unwrap();
///
/// assert_eq!(matrix.row(0), Some(&[2.0, 3.0][..]));
/// ```
#[derive(Default)]
pub struct StatisticsEngine {
    statistics: Vec<Box<dyn GraphStatistic>>,
}

impl StatisticsEngine {
    /// Creates an engine with no statistics.
    pub fn new() -> Self {
        StatisticsEngine {
            statistics: Vec::new(),
        }
    }

    /// Adds a statistic as the next column.
    ///
    /// Names must be unique; a repeated name is reported by
    /// [`compute`](Self::compute).
    pub fn with<S: GraphStatistic + 'static>(mut self, statistic: S) -> Self {
        self.statistics.push(Box::new(statistic));
        self
    }

    /// Adds a boxed statistic as the next column.
    pub fn push(&mut self, statistic: Box<dyn GraphStatistic>) -> &mut Self {
        self.statistics.push(statistic);
        self
    }

    /// Column names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.statistics
            .iter()
            .map(|statistic| statistic.name().to_string())
            .collect()
    }

    fn check_names(&self) -> Result<(), StatisticsError> {
        if self.statistics.is_empty() {
            return Err(StatisticsError::NoStatistics);
        }
        let mut seen = HashSet::new();
        for statistic in &self.statistics {
            if !seen.insert(statistic.name()) {
                return Err(StatisticsError::DuplicateStatistic(
                    statistic.name().to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Consumes `graphs` once and evaluates every statistic on every graph.
    ///
    /// # Errors
    /// Returns `StatisticsError::NoStatistics` if nothing is registered,
    /// `StatisticsError::DuplicateStatistic` if two statistics share a name,
    /// and `StatisticsError::StatisticFailed` for the first statistic that
    /// fails; no partial matrix is returned in that case.
    pub fn compute<I>(&self, graphs: I) -> Result<StatMatrix, StatisticsError>
    where
        I: IntoIterator<Item = TagGraph>,
    {
        self.check_names()?;

        let mut matrix = StatMatrix::new(self.names());

        for (row_index, graph) in graphs.into_iter().enumerate() {
            let row = self
                .statistics
                .iter()
                .map(|statistic| {
                    statistic
                        .compute(&graph)
                        .map_err(|err| StatisticsError::StatisticFailed {
                            statistic: statistic.name().to_string(),
                            row: row_index,
                            message: err.to_string(),
                        })
                })
                .collect::<Result<Vec<f64>, StatisticsError>>()?;
            matrix.push_row(graph.graph_time(), row);
        }

        tracing::debug!(
            rows = matrix.len(),
            columns = matrix.columns().len(),
            "statistics computed"
        );

        Ok(matrix)
    }

    /// Computes the matrix and, when `savename` is given, writes it as text.
    ///
    /// With `savename == None` this is identical to [`compute`](Self::compute).
    ///
    /// # Errors
    /// Besides the errors of `compute`, returns `StatisticsError::Sink` if the
    /// file cannot be created or written.
    pub fn compute_and_save<I>(
        &self,
        graphs: I,
        savename: Option<&Path>,
    ) -> Result<StatMatrix, StatisticsError>
    where
        I: IntoIterator<Item = TagGraph>,
    {
        let matrix = self.compute(graphs)?;
        if let Some(path) = savename {
            let mut sink = TextSink::create(path)?;
            sink.write_matrix(&matrix)?;
        }
        Ok(matrix)
    }

    /// Computes the matrix and forwards it to an arbitrary sink.
    pub fn compute_into<I>(
        &self,
        graphs: I,
        sink: &mut dyn StatsSink,
    ) -> Result<StatMatrix, StatisticsError>
    where
        I: IntoIterator<Item = TagGraph>,
    {
        let matrix = self.compute(graphs)?;
        sink.write_matrix(&matrix)?;
        Ok(matrix)
    }
}

impl std::fmt::Debug for StatisticsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsEngine")
            .field("statistics", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::graph::clique;
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::rc::Rc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 29, 17, 0, 0).unwrap()
    }

    fn triangle() -> TagGraph {
        clique(&Event::new(0, t0(), vec!["a", "b", "c"]))
    }

    #[test]
    fn test_matrix_has_one_row_per_graph_and_column_per_statistic() {
        let engine = StatisticsEngine::new()
            .with(MeanDegree)
            .with(NodeCount)
            .with(EdgeCount);
        let graphs = vec![triangle(), triangle()];
        let matrix = engine.compute(graphs).unwrap();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.columns(), &["mean_degree", "node_count", "edge_count"]);
        assert_eq!(matrix.row(1), Some(&[2.0, 3.0, 3.0][..]));
        assert_eq!(matrix.times(), &[t0(), t0()]);
        assert_eq!(matrix.column("node_count"), Some(vec![3.0, 3.0]));
        assert!(matrix.column("missing").is_none());

        let projected = matrix.select(&["edge_count", "mean_degree"]).unwrap();
        assert_eq!(projected.row(0), Some(&[3.0, 2.0][..]));
        assert!(matrix.select(&["missing"]).is_none());
    }

    #[test]
    fn test_no_statistics_is_rejected() {
        let engine = StatisticsEngine::new();
        assert!(matches!(
            engine.compute(vec![triangle()]),
            Err(StatisticsError::NoStatistics)
        ));
    }

    #[test]
    fn test_failure_aborts_immediately() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let counting = statistic("fails_on_second", move |_graph: &TagGraph| {
            counter.set(counter.get() + 1);
            if counter.get() == 2 {
                Err("boom")
            } else {
                Ok(1.0)
            }
        });
        let mut engine = StatisticsEngine::new().with(MeanDegree);
        engine.push(Box::new(counting));

        let err = engine
            .compute(vec![triangle(), triangle(), triangle()])
            .unwrap_err();
        match err {
            StatisticsError::StatisticFailed {
                statistic,
                row,
                message,
            } => {
                assert_eq!(statistic, "fails_on_second");
                assert_eq!(row, 1);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_empty_graph_failure_names_statistic() {
        let engine = StatisticsEngine::new().with(MeanDegree);
        let err = engine.compute(vec![TagGraph::new(t0())]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Statistic 'mean_degree' failed on graph 0: Statistic undefined on empty graph"
        );
    }

    #[test]
    fn test_compute_and_save_without_path_has_no_side_effect() {
        let engine = StatisticsEngine::new().with(MeanDegree);
        let matrix = engine.compute_and_save(vec![triangle()], None).unwrap();
        assert_eq!(matrix.rows(), &[vec![2.0]]);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let engine = StatisticsEngine::new()
            .with(MeanDegree)
            .with(statistic("mean_degree", |graph: &TagGraph| {
                Ok::<f64, String>(graph.node_count() as f64)
            }));

        let err = engine.compute(vec![triangle()]).unwrap_err();
        assert!(matches!(
            &err,
            StatisticsError::DuplicateStatistic(name) if name == "mean_degree"
        ));
        assert_eq!(
            err.to_string(),
            "Statistic 'mean_degree' registered more than once"
        );
    }

    #[test]
    fn test_duplicate_names_never_reach_sink() {
        let engine = StatisticsEngine::new().with(NodeCount).with(NodeCount);
        let mut sink = SqliteSink::new_in_memory().unwrap();

        let result = engine.compute_into(vec![triangle()], &mut sink);
        assert!(matches!(result, Err(StatisticsError::DuplicateStatistic(_))));
        assert_eq!(sink.latest_run().unwrap(), None);
    }

    #[test]
    fn test_save_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let engine = StatisticsEngine::new().with(MeanDegree);

        // the target is a directory, so the file cannot be created
        let result = engine.compute_and_save(vec![triangle()], Some(dir.path()));
        assert!(matches!(
            result,
            Err(StatisticsError::Sink(SinkError::Io(_)))
        ));
    }
}
