use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single tagged event (one post and its hashtags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position of the event in arrival order
    pub sequence_index: usize,
    /// Timestamp carried by the event itself
    pub timestamp: DateTime<Utc>,
    /// Distinct tags, in first-seen order
    pub tags: Vec<String>,
}

impl Event {
    /// Creates a new Event.
    ///
    /// Repeated tags are collapsed so that the tag list only holds distinct
    /// strings; the first occurrence keeps its position.
    pub fn new<I, S>(sequence_index: usize, timestamp: DateTime<Utc>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut distinct: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !distinct.contains(&tag) {
                distinct.push(tag);
            }
        }

        Event {
            sequence_index,
            timestamp,
            tags: distinct,
        }
    }

    /// Whether the event can contribute an edge to a co-occurrence graph.
    pub fn has_co_occurrence(&self) -> bool {
        self.tags.len() >= 2
    }
}

/// Half-open range of sequence indices `[start, stop)` used to bound a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRange {
    /// First sequence index that may trigger an output (inclusive)
    pub start: usize,
    /// Sequence index at which reading stops (exclusive)
    pub stop: usize,
}

impl SequenceRange {
    /// Creates a new SequenceRange.
    pub fn new(start: usize, stop: usize) -> Self {
        SequenceRange { start, stop }
    }

    /// Range covering every event.
    pub fn full() -> Self {
        SequenceRange {
            start: 0,
            stop: usize::MAX,
        }
    }

    /// Creates a SequenceRange from a standard Range.
    pub fn from_range(range: Range<usize>) -> Self {
        SequenceRange {
            start: range.start,
            stop: range.end,
        }
    }

    /// Whether `sequence_index` lies in `[start, stop)`.
    pub fn contains(&self, sequence_index: usize) -> bool {
        self.start <= sequence_index && sequence_index < self.stop
    }
}

impl Default for SequenceRange {
    fn default() -> Self {
        Self::full()
    }
}

/// Immutable, arrival-ordered log of events.
///
/// The log is produced once by ingestion and then handed to the window
/// engine by reference. Sequence indices are assigned here, so they are
/// always contiguous and strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates a new empty event log.
    pub fn new() -> Self {
        EventLog { events: Vec::new() }
    }

    /// Appends a record and returns the sequence index it was given.
    pub fn push<I, S>(&mut self, timestamp: DateTime<Utc>, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sequence_index = self.events.len();
        self.events.push(Event::new(sequence_index, timestamp, tags));
        sequence_index
    }

    /// All events, in arrival order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event with the given sequence index.
    pub fn get(&self, sequence_index: usize) -> Option<&Event> {
        self.events.get(sequence_index)
    }

    /// Iterates in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Earliest and latest timestamps in the log, if any.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.events.first()?.timestamp;
        Some(self.events.iter().fold((first, first), |(lo, hi), event| {
            (lo.min(event.timestamp), hi.max(event.timestamp))
        }))
    }
}

impl<S: Into<String>> FromIterator<(DateTime<Utc>, Vec<S>)> for EventLog {
    fn from_iter<T: IntoIterator<Item = (DateTime<Utc>, Vec<S>)>>(iter: T) -> Self {
        let mut log = EventLog::new();
        for (timestamp, tags) in iter {
            log.push(timestamp, tags);
        }
        log
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
