//! Graph composition.
//!
//! Composition is the union of node and edge sets. When a tag is present in
//! both graphs, the node from the right-hand graph wins, whatever its
//! timestamp. The `graph_time` label is left untouched; callers set it.

use crate::graph::TagGraph;

/// Returns the composition of `g` and `h`.
pub fn compose(g: &TagGraph, h: &TagGraph) -> TagGraph {
    let mut composed = g.clone();
    compose_into(&mut composed, h);
    composed
}

/// Folds `h` into `g` in place, with the same semantics as [`compose`].
pub fn compose_into(g: &mut TagGraph, h: &TagGraph) {
    for node in h.nodes.values() {
        g.add_node(node.tag.as_str(), node.last_seen);
    }
    for edge in &h.edges {
        if !g.edges.contains(edge) {
            g.edges.insert(edge.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::graph::clique;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 29, 17, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    #[test]
    fn test_compose_unions_nodes_and_edges() {
        let g = clique(&Event::new(0, t(0), vec!["a", "b"]));
        let h = clique(&Event::new(1, t(5), vec!["b", "c"]));
        let composed = compose(&g, &h);

        assert_eq!(composed.node_count(), 3);
        assert_eq!(composed.edge_count(), 2);
        assert!(composed.contains_edge("a", "b"));
        assert!(composed.contains_edge("b", "c"));
        assert!(!composed.contains_edge("a", "c"));
    }

    #[test]
    fn test_compose_with_self_is_idempotent() {
        let g = clique(&Event::new(0, t(0), vec!["a", "b", "c"]));
        let composed = compose(&g, &g);
        assert_eq!(composed.nodes(), g.nodes());
        assert_eq!(composed.edges(), g.edges());
    }

    #[test]
    fn test_right_hand_last_seen_wins_even_if_earlier() {
        let g = clique(&Event::new(0, t(30), vec!["a", "b"]));
        let h = clique(&Event::new(1, t(10), vec!["b", "c"]));
        let composed = compose(&g, &h);

        assert_eq!(composed.node("b").unwrap().last_seen, t(10));
        assert_eq!(composed.node("a").unwrap().last_seen, t(30));
    }

    #[test]
    fn test_compose_keeps_left_graph_time() {
        let g = clique(&Event::new(0, t(30), vec!["a", "b"]));
        let h = clique(&Event::new(1, t(60), vec!["c", "d"]));
        assert_eq!(compose(&g, &h).graph_time(), t(30));
    }
}
