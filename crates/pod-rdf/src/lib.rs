//! RDF plumbing for the pod server.
//!
//! The term model is [`oxrdf`]'s; Turtle and N-Triples are read and written
//! with [`oxttl`], and SPARQL Update requests are decoded by [`spargebra`].
//! On top of those this crate adds what the pod needs: default-graph quad
//! lists, triple patterns with variable bindings, and a single error type.
//!
//! # Key Types
//!
//! - [`Term`] / [`Literal`] / [`Quad`] -- the data model, re-exported from oxrdf
//! - [`Graph`] -- a set of triples; inserting a duplicate is a no-op
//! - [`TermPattern`] / [`TriplePattern`] -- terms and triples that may hold variables
//! - [`Update`] -- the decoded update algebra produced by [`parse_update`]

pub mod error;
pub mod graph;
pub mod pattern;
pub mod sparql;
pub mod turtle;

pub use oxrdf::vocab::{rdf, xsd};
pub use oxrdf::{
    BlankNode, Graph, GraphName, Literal, NamedNode, Quad, Subject, Term, Triple, TripleRef,
};

pub use error::{RdfError, RdfResult};
pub use graph::{graph_from_quads, quads_from_graph, triple_quad};
pub use pattern::{Bindings, TermPattern, TriplePattern};
pub use sparql::{parse_update, GraphUpdateOperation, Update};
pub use turtle::{parse_ntriples, parse_turtle, write_ntriples, write_turtle};
