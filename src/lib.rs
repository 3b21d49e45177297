pub mod event;
pub mod graph;
pub mod window;
pub mod stream;
pub mod statistics;
pub mod ingest;
pub mod config;


pub use event::{Event, EventLog, SequenceRange};
pub use graph::{clique, compose, compose_into, Edge, GraphError, Node, TagGraph};
pub use window::{WindowConfig, WindowEngine, WindowError, DEFAULT_WINDOW_SECS};
pub use stream::{rolled_graphs, GraphStream};
pub use statistics::{
    mean_degree, GraphStatistic, MeanDegree, SinkError, SqliteSink, StatMatrix,
    StatisticsEngine, StatisticsError, StatsSink, TextSink,
};
pub use ingest::{read_events, read_events_from_path, IngestError, IngestReport};
pub use config::{ConfigError, HashStreamConfig};
