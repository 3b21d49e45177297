//! Tag Co-occurrence Graphs
//!
//! This module defines the simple, undirected graph used throughout the crate:
//! nodes are tags, and an edge marks that two tags appeared together in at
//! least one event. Cliques for single events are built in [`clique`], and
//! graphs are merged in [`compose`].

pub mod clique;
pub mod compose;

use chrono::{DateTime, Utc};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use clique::clique;
pub use compose::{compose, compose_into};

/// Error types for graph mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Edge endpoint is not a node of the graph
    MissingEndpoint(String),
    /// Both endpoints are the same tag
    SelfLoop(String),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::MissingEndpoint(tag) => write!(f, "Edge endpoint not in graph: {}", tag),
            GraphError::SelfLoop(tag) => write!(f, "Self-loop on tag: {}", tag),
        }
    }
}

impl std::error::Error for GraphError {}

/// A tag node. Identity is the tag; `last_seen` is an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Tag string
    pub tag: String,
    /// Timestamp of the event that last supplied this node
    pub last_seen: DateTime<Utc>,
}

impl Node {
    /// Creates a node for `tag`.
    pub fn new(tag: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Node {
            tag: tag.into(),
            last_seen,
        }
    }
}

/// Unordered pair of distinct tags.
///
/// Endpoints are stored sorted, so `{a, b}` and `{b, a}` compare equal.
/// Serialized as a `[low, high]` pair; deserialization re-sorts it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(String, String)", into = "(String, String)")]
pub struct Edge {
    low: String,
    high: String,
}

impl Edge {
    /// Creates an edge, or `None` when both endpoints are the same tag.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Edge { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Edge { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Both endpoints, smaller tag first.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }

    /// Whether `tag` is one of the endpoints.
    pub fn touches(&self, tag: &str) -> bool {
        self.low == tag || self.high == tag
    }

    /// The endpoint opposite `tag`, if `tag` is an endpoint.
    pub fn other(&self, tag: &str) -> Option<&str> {
        if self.low == tag {
            Some(&self.high)
        } else if self.high == tag {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl TryFrom<(String, String)> for Edge {
    type Error = GraphError;

    fn try_from((a, b): (String, String)) -> Result<Self, Self::Error> {
        let tag = a.clone();
        Edge::new(a, b).ok_or(GraphError::SelfLoop(tag))
    }
}

impl From<Edge> for (String, String) {
    fn from(edge: Edge) -> Self {
        (edge.low, edge.high)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}--{}", self.low, self.high)
    }
}

/// Simple undirected co-occurrence graph labelled with an "as-of" time.
///
/// Deserialized graphs are rebuilt through [`TagGraph::add_edge`], so every
/// edge endpoint is a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord")]
pub struct TagGraph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeSet<Edge>,
    graph_time: DateTime<Utc>,
}

#[derive(Deserialize)]
struct GraphRecord {
    nodes: BTreeMap<String, Node>,
    edges: BTreeSet<Edge>,
    graph_time: DateTime<Utc>,
}

impl TryFrom<GraphRecord> for TagGraph {
    type Error = GraphError;

    fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
        let mut graph = TagGraph::new(record.graph_time);
        for node in record.nodes.into_values() {
            graph.add_node(node.tag, node.last_seen);
        }
        for edge in &record.edges {
            let (a, b) = edge.endpoints();
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }
}

impl TagGraph {
    /// Creates an empty graph labelled with `graph_time`.
    pub fn new(graph_time: DateTime<Utc>) -> Self {
        TagGraph {
            nodes: BTreeMap::new(),
            edges: BTreeSet::new(),
            graph_time,
        }
    }

    /// The "as-of" time of the graph.
    pub fn graph_time(&self) -> DateTime<Utc> {
        self.graph_time
    }

    /// Relabels the graph; nodes and edges are unchanged.
    pub fn set_graph_time(&mut self, graph_time: DateTime<Utc>) {
        self.graph_time = graph_time;
    }

    /// Nodes keyed by tag.
    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    /// Edges in sorted order.
    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    /// Node for `tag`, if present.
    pub fn node(&self, tag: &str) -> Option<&Node> {
        self.nodes.get(tag)
    }

    /// Whether `tag` is a node.
    pub fn contains_node(&self, tag: &str) -> bool {
        self.nodes.contains_key(tag)
    }

    /// Whether `a` and `b` are adjacent, in either order.
    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        Edge::new(a, b).is_some_and(|edge| self.edges.contains(&edge))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts a node, overwriting `last_seen` if the tag already exists.
    pub fn add_node(&mut self, tag: impl Into<String>, last_seen: DateTime<Utc>) {
        let tag = tag.into();
        match self.nodes.get_mut(&tag) {
            Some(node) => node.last_seen = last_seen,
            None => {
                self.nodes.insert(tag.clone(), Node::new(tag, last_seen));
            }
        }
    }

    /// Inserts an edge between two existing nodes.
    ///
    /// Returns `Ok(true)` if the edge is new and `Ok(false)` if it was already
    /// present.
    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<bool, GraphError> {
        for tag in [a, b] {
            if !self.nodes.contains_key(tag) {
                return Err(GraphError::MissingEndpoint(tag.to_string()));
            }
        }
        let edge = Edge::new(a, b).ok_or_else(|| GraphError::SelfLoop(a.to_string()))?;
        Ok(self.edges.insert(edge))
    }

    /// Number of edges incident to `tag` (0 for unknown tags).
    pub fn degree(&self, tag: &str) -> usize {
        self.edges.iter().filter(|edge| edge.touches(tag)).count()
    }

    /// Degree of every node, keyed by tag.
    pub fn degrees(&self) -> BTreeMap<&str, usize> {
        let mut degrees: BTreeMap<&str, usize> =
            self.nodes.keys().map(|tag| (tag.as_str(), 0)).collect();
        for edge in &self.edges {
            let (a, b) = edge.endpoints();
            for tag in [a, b] {
                if let Some(count) = degrees.get_mut(tag) {
                    *count += 1;
                }
            }
        }
        degrees
    }

    /// Tags adjacent to `tag`, sorted.
    pub fn neighbors(&self, tag: &str) -> Vec<&str> {
        self.edges.iter().filter_map(|edge| edge.other(tag)).collect()
    }

    /// Converts the graph into a petgraph `UnGraph` weighted by tag.
    pub fn to_petgraph(&self) -> UnGraph<String, ()> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.nodes.len());

        for tag in self.nodes.keys() {
            indices.insert(tag.as_str(), graph.add_node(tag.clone()));
        }
        for edge in &self.edges {
            let (a, b) = edge.endpoints();
            if let (Some(&ia), Some(&ib)) = (indices.get(a), indices.get(b)) {
                graph.add_edge(ia, ib, ());
            }
        }

        graph
    }
}
