use crate::graph::TagGraph;
use crate::statistics::StatisticsError;
use petgraph::algo::connected_components;

/// A named, pure function of a graph.
///
/// # Arguments
/// * `graph` - Window graph to evaluate
///
/// # Errors
/// Implementations return a `StatisticsError` when the value is undefined for
/// `graph`; the engine stops at the first one.
pub trait GraphStatistic {
    /// Column name; unique within one engine.
    fn name(&self) -> &str;
    /// Evaluates the statistic on one graph.
    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError>;
}

/// Average number of edges per node: `2|E| / |N|`.
///
/// # Errors
/// Returns `StatisticsError::EmptyGraph` for a graph with no nodes.
pub fn mean_degree(graph: &TagGraph) -> Result<f64, StatisticsError> {
    if graph.is_empty() {
        return Err(StatisticsError::EmptyGraph);
    }
    Ok(2.0 * graph.edge_count() as f64 / graph.node_count() as f64)
}

/// [`mean_degree`] as a column named `mean_degree`.
pub struct MeanDegree;

impl GraphStatistic for MeanDegree {
    fn name(&self) -> &str {
        "mean_degree"
    }

    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError> {
        mean_degree(graph)
    }
}

/// Number of tags in the window.
pub struct NodeCount;

impl GraphStatistic for NodeCount {
    fn name(&self) -> &str {
        "node_count"
    }

    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError> {
        Ok(graph.node_count() as f64)
    }
}

/// Number of distinct co-occurring pairs in the window.
pub struct EdgeCount;

impl GraphStatistic for EdgeCount {
    fn name(&self) -> &str {
        "edge_count"
    }

    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError> {
        Ok(graph.edge_count() as f64)
    }
}

/// Fraction of possible edges that are present; 0 for graphs under two nodes.
pub struct Density;

impl GraphStatistic for Density {
    fn name(&self) -> &str {
        "density"
    }

    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError> {
        let n = graph.node_count() as f64;
        if graph.node_count() < 2 {
            return Ok(0.0);
        }
        Ok(2.0 * graph.edge_count() as f64 / (n * (n - 1.0)))
    }
}

/// Number of connected components.
pub struct ComponentCount;

impl GraphStatistic for ComponentCount {
    fn name(&self) -> &str {
        "component_count"
    }

    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError> {
        Ok(connected_components(&graph.to_petgraph()) as f64)
    }
}

/// Adapter that turns a closure into a [`GraphStatistic`].
pub struct FnStatistic<F> {
    name: String,
    func: F,
}

impl<F, E> GraphStatistic for FnStatistic<F>
where
    F: Fn(&TagGraph) -> Result<f64, E>,
    E: std::fmt::Display,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, graph: &TagGraph) -> Result<f64, StatisticsError> {
        (self.func)(graph).map_err(|err| StatisticsError::Failed(err.to_string()))
    }
}

/// Wraps a fallible closure as a named statistic.
pub fn statistic<F, E>(name: impl Into<String>, func: F) -> FnStatistic<F>
where
    F: Fn(&TagGraph) -> Result<f64, E>,
    E: std::fmt::Display,
{
    FnStatistic {
        name: name.into(),
        func,
    }
}
