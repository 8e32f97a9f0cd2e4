//! Representation conversion.
//!
//! Converters are [`AsyncHandler`](pod_handler::AsyncHandler)s over
//! [`ConverterArgs`]. Typed converters declare weighted input and output
//! media types, which lets [`ChainedConverter`] compose them into multi-hop
//! pipelines.
//!
//! # Key Types
//!
//! - [`TypedConverter`] -- converter with declared input/output types
//! - [`ChainedConverter`] -- picks the best intermediate type between each pair
//! - [`QuadToRdfConverter`] / [`RdfToQuadConverter`] -- `internal/quads` to and from Turtle / N-Triples

pub mod chained;
pub mod converter;
pub mod rdf;

pub use chained::ChainedConverter;
pub use converter::{check_typed, ConverterArgs, RepresentationConverter, TypedConverter};
pub use rdf::{QuadToRdfConverter, RdfToQuadConverter};
