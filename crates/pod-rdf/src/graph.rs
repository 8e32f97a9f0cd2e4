//! Moving between quad lists and in-memory graphs.
//!
//! Representations carry quads, the patch engine works on an [`oxrdf::Graph`].
//! Only the default graph is stored, so graph names are dropped on the way in.

use oxrdf::{Graph, GraphName, Quad, Triple, TripleRef};

/// Collect quads into a set of triples. Duplicates collapse.
pub fn graph_from_quads(quads: impl IntoIterator<Item = Quad>) -> Graph {
    let mut graph = Graph::new();
    for quad in quads {
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    graph
}

/// The graph's triples as default-graph quads.
pub fn quads_from_graph(graph: &Graph) -> Vec<Quad> {
    graph.iter().map(triple_quad).collect()
}

/// A triple placed in the default graph.
pub fn triple_quad(triple: TripleRef<'_>) -> Quad {
    let triple = triple.into_owned();
    Quad::new(
        triple.subject,
        triple.predicate,
        triple.object,
        GraphName::DefaultGraph,
    )
}
