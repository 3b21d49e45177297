//! Lazy sequence of windowed graphs.
//!
//! [`GraphStream`] walks an [`EventLog`] in arrival order, feeds each event to
//! a [`WindowEngine`], and yields the resulting graph when it has more than one
//! node. Nothing is computed until the consumer asks for the next element.

use crate::event::{EventLog, SequenceRange};
use crate::graph::TagGraph;
use crate::window::{WindowConfig, WindowEngine};
use std::iter::FusedIterator;
use tracing::trace;

/// Pull iterator over windowed co-occurrence graphs.
///
/// The stream is single-pass: it owns its engine and a cursor into the
/// borrowed log, and yields owned graphs.
#[derive(Debug, Clone)]
pub struct GraphStream<'a> {
    log: &'a EventLog,
    engine: WindowEngine<'a>,
    range: SequenceRange,
    cursor: usize,
    suppressed: usize,
}

impl<'a> GraphStream<'a> {
    /// Creates a stream over every event in `log`.
    pub fn new(log: &'a EventLog, config: WindowConfig) -> Self {
        Self::with_range(log, config, SequenceRange::full())
    }

    /// Creates a stream whose triggering events are limited to `range`.
    ///
    /// Events before `range.start` are still observed, so they advance the
    /// clock and remain visible to the lookback window. Events at or past
    /// `range.stop` are never read.
    pub fn with_range(log: &'a EventLog, config: WindowConfig, range: SequenceRange) -> Self {
        GraphStream {
            log,
            engine: WindowEngine::new(config),
            range,
            cursor: 0,
            suppressed: 0,
        }
    }

    /// Read-only view of the underlying engine (clock, retained events).
    pub fn engine(&self) -> &WindowEngine<'a> {
        &self.engine
    }

    /// Number of windows dropped because they had at most one node.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    fn end(&self) -> usize {
        self.range.stop.min(self.log.len())
    }
}

impl<'a> Iterator for GraphStream<'a> {
    type Item = TagGraph;

    fn next(&mut self) -> Option<TagGraph> {
        let log: &'a EventLog = self.log;
        let end = self.end();

        while self.cursor < end {
            let event = &log.events()[self.cursor];
            self.cursor += 1;

            if !self.range.contains(event.sequence_index) {
                self.engine.record(event);
                continue;
            }

            let graph = self.engine.record_and_build(event);
            if graph.node_count() > 1 {
                return Some(graph);
            }

            self.suppressed += 1;
            trace!(
                sequence_index = event.sequence_index,
                nodes = graph.node_count(),
                "suppressed degenerate window"
            );
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end().saturating_sub(self.cursor)))
    }
}

impl<'a> FusedIterator for GraphStream<'a> {}

/// Convenience: collects every windowed graph of `log` into a vector.
pub fn rolled_graphs(log: &EventLog, config: WindowConfig) -> Vec<TagGraph> {
    GraphStream::new(log, config).collect()
}
