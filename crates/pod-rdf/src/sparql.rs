//! SPARQL Update decoding.
//!
//! Requests are parsed by [`spargebra`] into its update algebra. The parser
//! accepts every SPARQL 1.1 Update form, so callers inspect the algebra and
//! reject what they do not support. `DELETE WHERE` and `WITH` arrive already
//! desugared into [`GraphUpdateOperation::DeleteInsert`].

pub use spargebra::algebra::GraphPattern;
pub use spargebra::term::{
    GraphName as UpdateGraphName, GraphNamePattern, GroundQuad, GroundQuadPattern, GroundSubject,
    GroundTerm, GroundTermPattern, NamedNodePattern, Quad as UpdateQuad, QuadPattern,
    TermPattern as SparqlTermPattern, TriplePattern as SparqlTriplePattern,
};
pub use spargebra::{GraphUpdateOperation, Update};

use crate::error::{RdfError, RdfResult};

/// Parse a SPARQL Update request. An empty request yields an update with no
/// operations. Relative IRIs resolve against `base`.
pub fn parse_update(input: &str, base: Option<&str>) -> RdfResult<Update> {
    Update::parse(input, base).map_err(|e| RdfError::syntax("SPARQL Update", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "PREFIX : <http://example.org/>\n";

    #[test]
    fn empty_request_has_no_operations() {
        assert!(parse_update("", None).unwrap().operations.is_empty());
        assert!(parse_update(PREFIX, None).unwrap().operations.is_empty());
    }

    #[test]
    fn operations_keep_their_order() {
        let update = parse_update(
            &format!("{PREFIX}INSERT DATA {{ :a :b :c }} ; DELETE DATA {{ :a :b :c }}"),
            None,
        )
        .unwrap();
        assert!(matches!(
            update.operations.as_slice(),
            [
                GraphUpdateOperation::InsertData { .. },
                GraphUpdateOperation::DeleteData { .. }
            ]
        ));
    }

    #[test]
    fn delete_where_is_desugared() {
        let update = parse_update(&format!("{PREFIX}DELETE WHERE {{ :a :b ?o }}"), None).unwrap();
        let [GraphUpdateOperation::DeleteInsert { delete, insert, .. }] = update.operations.as_slice()
        else {
            panic!("expected one DELETE/INSERT, got {:?}", update.operations);
        };
        assert_eq!(delete.len(), 1);
        assert!(insert.is_empty());
    }

    #[test]
    fn relative_iris_resolve_against_base() {
        let update = parse_update("INSERT DATA { <#a> <#b> <c> }", Some("http://pod.test/doc")).unwrap();
        let [GraphUpdateOperation::InsertData { data }] = update.operations.as_slice() else {
            panic!("expected INSERT DATA");
        };
        assert_eq!(data[0].predicate.as_str(), "http://pod.test/doc#b");
        assert_eq!(data[0].object.to_string(), "<http://pod.test/c>");
    }

    #[test]
    fn malformed_requests_are_syntax_errors() {
        for text in ["INSERT DATA { :a :b :c }", "INSERT DATA { <http://a> <http://b> }", "FROB"] {
            assert!(
                matches!(parse_update(text, None), Err(RdfError::Syntax { .. })),
                "{text}"
            );
        }
    }
}
