//! Turtle and N-Triples reading and writing.
//!
//! Readers produce default-graph quads. Writers only emit the default graph
//! view of each quad: graph names are dropped.

use std::fmt::Write as _;

use oxrdf::{GraphName, Quad, Triple, TripleRef};
use oxttl::{NTriplesParser, TurtleParser, TurtleSerializer};

use crate::error::{RdfError, RdfResult};

const TURTLE: &str = "Turtle";
const N_TRIPLES: &str = "N-Triples";

/// Parse a Turtle document into default-graph quads.
///
/// Relative IRIs are resolved against `base` when one is given, or against a
/// `@base` declared in the document.
pub fn parse_turtle(input: &str, base: Option<&str>) -> RdfResult<Vec<Quad>> {
    let mut parser = TurtleParser::new();
    if let Some(base) = base {
        parser = parser.with_base_iri(base).map_err(|e| RdfError::BaseIri {
            iri: base.to_string(),
            message: e.to_string(),
        })?;
    }
    parser
        .for_reader(input.as_bytes())
        .map(|triple| {
            triple
                .map(default_graph)
                .map_err(|e| RdfError::syntax(TURTLE, e))
        })
        .collect()
}

/// Parse an N-Triples document. Every IRI must already be absolute.
pub fn parse_ntriples(input: &str) -> RdfResult<Vec<Quad>> {
    NTriplesParser::new()
        .for_reader(input.as_bytes())
        .map(|triple| {
            triple
                .map(default_graph)
                .map_err(|e| RdfError::syntax(N_TRIPLES, e))
        })
        .collect()
}

fn default_graph(triple: Triple) -> Quad {
    Quad::new(
        triple.subject,
        triple.predicate,
        triple.object,
        GraphName::DefaultGraph,
    )
}

/// Serialise quads as N-Triples, one line per quad.
pub fn write_ntriples<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> String {
    let mut out = String::new();
    for quad in quads {
        let _ = writeln!(out, "{} {} {} .", quad.subject, quad.predicate, quad.object);
    }
    out
}

/// Serialise quads as Turtle. Consecutive quads with the same subject share
/// one statement.
pub fn write_turtle<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> RdfResult<String> {
    let mut serializer = TurtleSerializer::new().for_writer(Vec::new());
    for quad in quads {
        serializer
            .serialize_triple(TripleRef::new(&quad.subject, &quad.predicate, &quad.object))
            .map_err(|e| RdfError::write(TURTLE, e))?;
    }
    let bytes = serializer.finish().map_err(|e| RdfError::write(TURTLE, e))?;
    String::from_utf8(bytes).map_err(|e| RdfError::write(TURTLE, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rdf, xsd};
    use oxrdf::{BlankNode, Literal, NamedNode, Term};
    use proptest::prelude::*;

    const EX: &str = "http://example.org/";

    fn ex(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{EX}{local}"))
    }

    fn quad(s: NamedNode, p: NamedNode, o: impl Into<Term>) -> Quad {
        Quad::new(s, p, o, GraphName::DefaultGraph)
    }

    #[test]
    fn parses_prefixes_and_lists() {
        let doc = r#"
            @prefix : <http://example.org/> .
            PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
            :s a :Thing ;
               :name "x"@en, "y" ;
               :count 3 ;
               :when "2020-01-01"^^xsd:date .
        "#;
        let quads = parse_turtle(doc, None).unwrap();
        assert_eq!(quads.len(), 5);
        assert_eq!(quads[0], quad(ex("s"), rdf::TYPE.into_owned(), ex("Thing")));
        assert_eq!(
            quads[1].object,
            Literal::new_language_tagged_literal_unchecked("x", "en").into()
        );
        assert_eq!(quads[2].object, Literal::new_simple_literal("y").into());
        assert_eq!(quads[3].object, Literal::new_typed_literal("3", xsd::INTEGER).into());
    }

    #[test]
    fn resolves_relative_iris_against_base() {
        let quads = parse_turtle("<a> <b> <#c> .", Some("http://example.org/dir/")).unwrap();
        assert_eq!(
            quads[0],
            quad(
                NamedNode::new_unchecked("http://example.org/dir/a"),
                NamedNode::new_unchecked("http://example.org/dir/b"),
                NamedNode::new_unchecked("http://example.org/dir/#c"),
            )
        );
    }

    #[test]
    fn relative_iri_without_base_fails() {
        assert!(matches!(
            parse_turtle("<a> <b> <c> .", None),
            Err(RdfError::Syntax { .. })
        ));
        assert!(matches!(
            parse_turtle("<a> <b> <c> .", Some("not absolute")),
            Err(RdfError::BaseIri { .. })
        ));
    }

    #[test]
    fn blank_node_property_list() {
        let quads = parse_turtle("<http://s> <http://p> [ <http://q> \"v\" ] .", None).unwrap();
        assert_eq!(quads.len(), 2);
        let blank = quads
            .iter()
            .find(|q| q.predicate.as_str() == "http://p")
            .map(|q| q.object.clone())
            .unwrap();
        assert!(blank.is_blank_node());
        assert!(quads
            .iter()
            .any(|q| Term::from(q.subject.clone()) == blank && q.predicate.as_str() == "http://q"));
    }

    #[test]
    fn collections_expand_to_lists() {
        let quads = parse_turtle("<http://s> <http://p> (1 2) .", None).unwrap();
        let firsts = quads.iter().filter(|q| q.predicate.as_ref() == rdf::FIRST).count();
        assert_eq!(firsts, 2);
    }

    #[test]
    fn undefined_prefix_fails() {
        assert!(matches!(
            parse_turtle("ex:a ex:b ex:c .", None),
            Err(RdfError::Syntax { format: "Turtle", .. })
        ));
    }

    #[test]
    fn missing_dot_is_a_syntax_error() {
        assert!(matches!(
            parse_turtle("<http://s> <http://p> <http://o>", None),
            Err(RdfError::Syntax { .. })
        ));
    }

    #[test]
    fn turtle_output_reads_back() {
        let quads = vec![
            quad(ex("s1"), ex("p"), ex("o1")),
            quad(ex("s1"), ex("q"), Literal::new_simple_literal("two\nlines")),
            quad(ex("s2"), ex("p"), Literal::new_typed_literal("1", xsd::INTEGER)),
        ];
        let text = write_turtle(&quads).unwrap();
        assert_eq!(parse_turtle(&text, None).unwrap(), quads);
    }

    #[test]
    fn ntriples_output_is_line_based() {
        let quads = vec![quad(ex("s"), ex("p"), BlankNode::new_unchecked("b0"))];
        let text = write_ntriples(&quads);
        assert_eq!(text, "<http://example.org/s> <http://example.org/p> _:b0 .\n");
        assert_eq!(parse_ntriples(&text).unwrap(), quads);
    }

    #[test]
    fn ntriples_rejects_turtle_shorthand() {
        assert!(matches!(
            parse_ntriples("<http://s> a <http://o> ."),
            Err(RdfError::Syntax { format: "N-Triples", .. })
        ));
    }

    #[test]
    fn empty_input_yields_no_quads() {
        assert!(parse_turtle("", None).unwrap().is_empty());
        assert!(parse_turtle("# only a comment\n", None).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn any_string_literal_survives_turtle(value in "\\PC*") {
            let quads = vec![quad(ex("s"), ex("p"), Literal::new_simple_literal(value))];
            let text = write_turtle(&quads).unwrap();
            prop_assert_eq!(parse_turtle(&text, None).unwrap(), quads);
        }
    }
}
