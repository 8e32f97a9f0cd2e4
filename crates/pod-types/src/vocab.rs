//! Vocabulary and content type constants.

pub use pod_rdf::{rdf, xsd};

/// Linked Data Platform.
pub mod ldp {
    pub const NS: &str = "http://www.w3.org/ns/ldp#";
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
}

/// Dublin Core terms.
pub mod dcterms {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
}

/// POSIX stat vocabulary.
pub mod posix {
    pub const NS: &str = "http://www.w3.org/ns/posix/stat#";
    pub const MTIME: &str = "http://www.w3.org/ns/posix/stat#mtime";
    pub const SIZE: &str = "http://www.w3.org/ns/posix/stat#size";
}

/// Media types the core knows by name.
pub mod content_type {
    /// The in-memory graph format: the payload is a list of quads.
    pub const INTERNAL_QUADS: &str = "internal/quads";
    pub const TURTLE: &str = "text/turtle";
    pub const N_TRIPLES: &str = "application/n-triples";
    pub const SPARQL_UPDATE: &str = "application/sparql-update";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const TEXT_PLAIN: &str = "text/plain";
}
