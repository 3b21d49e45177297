//! Complete graph over a single event's tags.

use crate::event::Event;
use crate::graph::{Edge, TagGraph};

/// Builds the clique for one event.
///
/// Every tag becomes a node stamped with the event's timestamp, and every
/// unordered pair of distinct tags becomes an edge. Events with fewer than two
/// tags yield an edgeless graph with zero or one node.
pub fn clique(event: &Event) -> TagGraph {
    let mut graph = TagGraph::new(event.timestamp);

    for tag in &event.tags {
        graph.add_node(tag.as_str(), event.timestamp);
    }

    for (i, a) in event.tags.iter().enumerate() {
        for b in &event.tags[i + 1..] {
            // duplicate tags collapse to None here
            if let Some(edge) = Edge::new(a.as_str(), b.as_str()) {
                graph.edges.insert(edge);
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_clique_is_complete() {
        let ts = Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 0).unwrap();
        let event = Event::new(0, ts, vec!["a", "b", "c", "d"]);
        let graph = clique(&event);

        assert_eq!(graph.node_count(), 4);
        // k(k-1)/2
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.graph_time(), ts);
        assert!(graph.nodes().values().all(|node| node.last_seen == ts));
    }

    #[test]
    fn test_clique_of_single_tag_has_no_edges() {
        let ts = Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 0).unwrap();
        let graph = clique(&Event::new(0, ts, vec!["solo"]));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);

        let empty = clique(&Event::new(1, ts, Vec::<String>::new()));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_clique_ignores_repeated_tags_in_raw_event() {
        let ts = Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 0).unwrap();
        let event = Event {
            sequence_index: 0,
            timestamp: ts,
            tags: vec!["a".to_string(), "a".to_string(), "b".to_string()],
        };
        let graph = clique(&event);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
