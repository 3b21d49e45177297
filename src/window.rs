//! Trailing-Window Engine
//!
//! The engine keeps a logical clock equal to the largest timestamp observed so
//! far and, for every processed event, builds the co-occurrence graph of all
//! events whose timestamp lies in `[current_time - window_length,
//! current_time]` and that arrived no later than the triggering event.
//!
//! Retained events are indexed by `(timestamp, sequence_index)`. Because the
//! clock never moves backwards, anything older than the window's lower bound
//! can never be selected again and is evicted as soon as the clock passes it.

use crate::event::Event;
use crate::graph::{clique, compose_into, TagGraph};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Error types for window operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// Window length is zero or negative
    NonPositiveWindow(Duration),
    /// Event arrived with a sequence index not after the last processed one
    OutOfSequence {
        sequence_index: usize,
        last_processed: usize,
    },
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::NonPositiveWindow(length) => {
                write!(
                    f,
                    "Window length must be positive, got {}ms",
                    length.num_milliseconds()
                )
            }
            WindowError::OutOfSequence {
                sequence_index,
                last_processed,
            } => write!(
                f,
                "Event {} arrived after event {} was already processed",
                sequence_index, last_processed
            ),
        }
    }
}

impl std::error::Error for WindowError {}

/// Window parameters, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    window_length: Duration,
}

impl WindowConfig {
    /// Creates a window configuration.
    ///
    /// # Errors
    /// Returns `WindowError::NonPositiveWindow` if `window_length` is zero or
    /// negative.
    pub fn new(window_length: Duration) -> Result<Self, WindowError> {
        if window_length <= Duration::zero() {
            return Err(WindowError::NonPositiveWindow(window_length));
        }
        Ok(WindowConfig { window_length })
    }

    /// Shorthand for [`WindowConfig::new`] with whole seconds.
    pub fn from_secs(seconds: i64) -> Result<Self, WindowError> {
        Self::new(Duration::seconds(seconds))
    }

    /// Length `w` of the trailing window.
    pub fn window_length(&self) -> Duration {
        self.window_length
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            window_length: Duration::seconds(DEFAULT_WINDOW_SECS),
        }
    }
}

/// Stateful windowed graph builder.
///
/// Events are borrowed from an immutable [`EventLog`](crate::event::EventLog),
/// so the engine holds references rather than copies.
///
/// # Example
///
/// ```
/// use hashstream::{EventLog, WindowConfig, WindowEngine};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let t0 = Utc.with_ymd_and_hms(2015, 10, 29, 17, 0, 0).unwrap();
/// let mut log = EventLog::new();
/// log.push(t0, vec!["a", "b"]);
/// log.push(t0 + Duration::seconds(100), vec!["b", "c"]);
///
/// let mut engine = WindowEngine::new(WindowConfig::default());
/// engine.process(log.get(0).unwrap()).unwrap();
/// let graph = engine.process(log.get(1).unwrap()).unwrap();
///
/// assert_eq!(graph.node_count(), 2);
/// assert!(graph.contains_edge("b", "c"));
/// ```
#[derive(Debug, Clone)]
pub struct WindowEngine<'a> {
    config: WindowConfig,
    /// Logical clock: max timestamp observed so far
    current_time: Option<DateTime<Utc>>,
    last_sequence: Option<usize>,
    /// Events still inside the trailing window
    retained: BTreeMap<(DateTime<Utc>, usize), &'a Event>,
    observed: usize,
}

impl<'a> WindowEngine<'a> {
    /// Creates an engine with an empty history and no clock yet.
    pub fn new(config: WindowConfig) -> Self {
        WindowEngine {
            config,
            current_time: None,
            last_sequence: None,
            retained: BTreeMap::new(),
            observed: 0,
        }
    }

    /// Window parameters in use.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Current logical time, or `None` before the first event.
    pub fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current_time
    }

    /// Number of events observed so far.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Number of events currently retained in the window index.
    pub fn retained(&self) -> usize {
        self.retained.len()
    }

    /// Lower bound of the current window.
    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        self.current_time.map(|now| {
            now.checked_sub_signed(self.config.window_length)
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        })
    }

    /// Records an event and advances the clock without building a graph.
    ///
    /// # Errors
    /// Returns `WindowError::OutOfSequence` if the event's sequence index is
    /// not strictly greater than the last one seen.
    pub fn observe(&mut self, event: &'a Event) -> Result<(), WindowError> {
        self.check_sequence(event)?;
        self.record(event);
        Ok(())
    }

    /// Records an event and returns the co-occurrence graph of its window.
    ///
    /// The returned graph is labelled with the logical clock, not with the
    /// event's own timestamp.
    ///
    /// # Errors
    /// Returns `WindowError::OutOfSequence` if the event's sequence index is
    /// not strictly greater than the last one seen.
    pub fn process(&mut self, event: &'a Event) -> Result<TagGraph, WindowError> {
        self.check_sequence(event)?;
        Ok(self.record_and_build(event))
    }

    /// Events in the current window visible to `sequence_index`, in arrival order.
    pub fn window_events(&self, sequence_index: usize) -> Vec<&'a Event> {
        let (Some(now), Some(start)) = (self.current_time, self.window_start()) else {
            return Vec::new();
        };

        let mut events: Vec<&'a Event> = self
            .retained
            .range((start, 0)..=(now, usize::MAX))
            .map(|(_, event)| *event)
            .filter(|event| event.sequence_index <= sequence_index)
            .collect();
        events.sort_by_key(|event| event.sequence_index);
        events
    }

    pub(crate) fn record_and_build(&mut self, event: &'a Event) -> TagGraph {
        self.record(event);
        self.build(event.sequence_index)
    }

    pub(crate) fn record(&mut self, event: &'a Event) {
        self.last_sequence = Some(event.sequence_index);
        self.observed += 1;

        let now = match self.current_time {
            Some(now) if now >= event.timestamp => now,
            _ => event.timestamp,
        };
        self.current_time = Some(now);

        self.retained
            .insert((event.timestamp, event.sequence_index), event);
        self.evict();
    }

    fn build(&self, sequence_index: usize) -> TagGraph {
        let Some(now) = self.current_time else {
            return TagGraph::new(DateTime::<Utc>::MIN_UTC);
        };

        let events = self.window_events(sequence_index);
        let mut graph = TagGraph::new(now);
        let mut folded = 0usize;
        for event in events.iter().filter(|event| event.has_co_occurrence()) {
            compose_into(&mut graph, &clique(event));
            folded += 1;
        }
        graph.set_graph_time(now);

        debug!(
            sequence_index,
            current_time = %now,
            window_events = events.len(),
            cliques = folded,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "window graph built"
        );

        graph
    }

    fn evict(&mut self) {
        let Some(start) = self.window_start() else {
            return;
        };
        let before = self.retained.len();
        self.retained = self.retained.split_off(&(start, 0));
        let evicted = before - self.retained.len();
        if evicted > 0 {
            trace!(evicted, window_start = %start, "evicted expired events");
        }
    }

    fn check_sequence(&self, event: &Event) -> Result<(), WindowError> {
        match self.last_sequence {
            Some(last) if event.sequence_index <= last => Err(WindowError::OutOfSequence {
                sequence_index: event.sequence_index,
                last_processed: last,
            }),
            _ => Ok(()),
        }
    }
}
