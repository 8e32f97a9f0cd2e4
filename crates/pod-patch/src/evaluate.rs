//! Validation and evaluation of the supported SPARQL Update subset.
//!
//! Supported: `INSERT DATA`, `DELETE DATA`, `DELETE WHERE` and
//! `DELETE { } INSERT { } WHERE { }` whose WHERE clause is a plain basic graph
//! pattern over the default graph. Everything else is not implemented.
//!
//! The parsed algebra is first lowered into [`Step`]s. Lowering is where the
//! subset is enforced, so an update is either rejected as a whole or applied
//! as a whole.

use pod_rdf::sparql::{
    GraphNamePattern, GraphPattern, GroundQuad, GroundQuadPattern, GroundSubject, GroundTerm,
    GroundTermPattern, NamedNodePattern, QuadPattern, SparqlTermPattern, SparqlTriplePattern,
    UpdateGraphName, UpdateQuad,
};
use pod_rdf::{
    Bindings, Graph, GraphUpdateOperation, Subject, Term, TermPattern, Triple, TriplePattern,
    TripleRef, Update,
};
use pod_types::{HttpError, HttpResult};

/// One lowered update operation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Insert(Vec<Triple>),
    Delete(Vec<Triple>),
    Modify {
        patterns: Vec<TriplePattern>,
        delete: Vec<TriplePattern>,
        insert: Vec<TriplePattern>,
    },
}

/// Check that every operation stays inside the supported subset.
pub fn validate(update: &Update) -> HttpResult<()> {
    lower(update).map(|_| ())
}

/// Apply every operation to `graph` in order. Nothing is changed when any
/// operation is outside the supported subset.
pub fn apply(graph: &mut Graph, update: &Update) -> HttpResult<()> {
    for step in lower(update)? {
        match step {
            Step::Insert(triples) => {
                for triple in &triples {
                    graph.insert(triple);
                }
            }
            Step::Delete(triples) => {
                for triple in &triples {
                    graph.remove(triple);
                }
            }
            Step::Modify {
                patterns,
                delete,
                insert,
            } => modify(graph, &patterns, &delete, &insert),
        }
    }
    Ok(())
}

fn lower(update: &Update) -> HttpResult<Vec<Step>> {
    update.operations.iter().map(lower_operation).collect()
}

fn lower_operation(operation: &GraphUpdateOperation) -> HttpResult<Step> {
    match operation {
        GraphUpdateOperation::InsertData { data } => {
            data.iter().map(data_triple).collect::<HttpResult<Vec<_>>>().map(Step::Insert)
        }
        GraphUpdateOperation::DeleteData { data } => {
            data.iter().map(ground_triple).collect::<HttpResult<Vec<_>>>().map(Step::Delete)
        }
        GraphUpdateOperation::DeleteInsert {
            delete,
            insert,
            using,
            pattern,
            ..
        } => {
            if using.is_some() {
                return Err(named_graphs());
            }
            Ok(Step::Modify {
                patterns: basic_graph_pattern(pattern)?,
                delete: delete.iter().map(delete_template).collect::<HttpResult<Vec<_>>>()?,
                insert: insert.iter().map(insert_template).collect::<HttpResult<Vec<_>>>()?,
            })
        }
        GraphUpdateOperation::Load { .. } => Err(only_insert_delete("LOAD")),
        GraphUpdateOperation::Clear { .. } => Err(only_insert_delete("CLEAR")),
        GraphUpdateOperation::Create { .. } => Err(only_insert_delete("CREATE")),
        GraphUpdateOperation::Drop { .. } => Err(only_insert_delete("DROP")),
    }
}

fn only_insert_delete(keyword: &str) -> HttpError {
    HttpError::not_implemented(format!(
        "Only INSERT and DELETE updates are supported, not {keyword}."
    ))
}

fn named_graphs() -> HttpError {
    HttpError::not_implemented("GRAPH statements are not supported.")
}

fn quoted_triples() -> HttpError {
    HttpError::not_implemented("Quoted triples are not supported.")
}

fn default_graph(name: &UpdateGraphName) -> HttpResult<()> {
    match name {
        UpdateGraphName::DefaultGraph => Ok(()),
        UpdateGraphName::NamedNode(_) => Err(named_graphs()),
    }
}

fn default_graph_pattern(name: &GraphNamePattern) -> HttpResult<()> {
    match name {
        GraphNamePattern::DefaultGraph => Ok(()),
        _ => Err(named_graphs()),
    }
}

fn data_triple(quad: &UpdateQuad) -> HttpResult<Triple> {
    default_graph(&quad.graph_name)?;
    Ok(Triple::new(
        quad.subject.clone(),
        quad.predicate.clone(),
        quad.object.clone(),
    ))
}

fn ground_triple(quad: &GroundQuad) -> HttpResult<Triple> {
    default_graph(&quad.graph_name)?;
    Ok(Triple::new(
        ground_subject(&quad.subject)?,
        quad.predicate.clone(),
        ground_term(&quad.object)?,
    ))
}

// The wildcard arms below only match quoted triples, which exist when the
// `rdf-star` feature of the algebra crate is enabled.

#[allow(unreachable_patterns)]
fn ground_subject(subject: &GroundSubject) -> HttpResult<Subject> {
    match subject {
        GroundSubject::NamedNode(node) => Ok(node.clone().into()),
        _ => Err(quoted_triples()),
    }
}

#[allow(unreachable_patterns)]
fn ground_term(term: &GroundTerm) -> HttpResult<Term> {
    match term {
        GroundTerm::NamedNode(node) => Ok(node.clone().into()),
        GroundTerm::Literal(literal) => Ok(literal.clone().into()),
        _ => Err(quoted_triples()),
    }
}

#[allow(unreachable_patterns)]
fn term_pattern(term: &SparqlTermPattern) -> HttpResult<TermPattern> {
    match term {
        SparqlTermPattern::NamedNode(node) => Ok(node.clone().into()),
        SparqlTermPattern::BlankNode(node) => Ok(node.clone().into()),
        SparqlTermPattern::Literal(literal) => Ok(literal.clone().into()),
        SparqlTermPattern::Variable(var) => Ok(TermPattern::var(var.as_str())),
        _ => Err(quoted_triples()),
    }
}

#[allow(unreachable_patterns)]
fn ground_term_pattern(term: &GroundTermPattern) -> HttpResult<TermPattern> {
    match term {
        GroundTermPattern::NamedNode(node) => Ok(node.clone().into()),
        GroundTermPattern::Literal(literal) => Ok(literal.clone().into()),
        GroundTermPattern::Variable(var) => Ok(TermPattern::var(var.as_str())),
        _ => Err(quoted_triples()),
    }
}

fn predicate_pattern(predicate: &NamedNodePattern) -> TermPattern {
    match predicate {
        NamedNodePattern::NamedNode(node) => node.clone().into(),
        NamedNodePattern::Variable(var) => TermPattern::var(var.as_str()),
    }
}

fn delete_template(quad: &GroundQuadPattern) -> HttpResult<TriplePattern> {
    default_graph_pattern(&quad.graph_name)?;
    Ok(TriplePattern::new(
        ground_term_pattern(&quad.subject)?,
        predicate_pattern(&quad.predicate),
        ground_term_pattern(&quad.object)?,
    ))
}

fn insert_template(quad: &QuadPattern) -> HttpResult<TriplePattern> {
    default_graph_pattern(&quad.graph_name)?;
    Ok(TriplePattern::new(
        term_pattern(&quad.subject)?,
        predicate_pattern(&quad.predicate),
        term_pattern(&quad.object)?,
    ))
}

fn triple_pattern(pattern: &SparqlTriplePattern) -> HttpResult<TriplePattern> {
    Ok(TriplePattern::new(
        term_pattern(&pattern.subject)?,
        predicate_pattern(&pattern.predicate),
        term_pattern(&pattern.object)?,
    ))
}

/// Flatten a WHERE clause into its triple patterns, rejecting anything that
/// is not a basic graph pattern.
pub fn basic_graph_pattern(pattern: &GraphPattern) -> HttpResult<Vec<TriplePattern>> {
    let mut triples = Vec::new();
    collect_bgp(pattern, &mut triples)?;
    Ok(triples)
}

fn collect_bgp(pattern: &GraphPattern, triples: &mut Vec<TriplePattern>) -> HttpResult<()> {
    let unsupported = |keyword: &str| {
        Err(HttpError::not_implemented(format!(
            "{keyword} is not supported in WHERE clauses."
        )))
    };
    match pattern {
        GraphPattern::Bgp { patterns } => {
            for pattern in patterns {
                triples.push(triple_pattern(pattern)?);
            }
            Ok(())
        }
        GraphPattern::Join { left, right } => {
            collect_bgp(left, triples)?;
            collect_bgp(right, triples)
        }
        GraphPattern::Graph { .. } => Err(named_graphs()),
        GraphPattern::Union { .. } => Err(HttpError::not_implemented("UNION is not supported.")),
        GraphPattern::Filter { .. } => Err(HttpError::not_implemented("FILTER is not supported.")),
        GraphPattern::LeftJoin { .. } => unsupported("OPTIONAL"),
        GraphPattern::Minus { .. } => unsupported("MINUS"),
        GraphPattern::Extend { .. } => unsupported("BIND"),
        GraphPattern::Values { .. } => unsupported("VALUES"),
        GraphPattern::Service { .. } => unsupported("SERVICE"),
        GraphPattern::Path { .. } => unsupported("A property path"),
        _ => unsupported("A subquery"),
    }
}

/// Evaluate `patterns` against the graph as it is now, then delete and insert
/// the instantiated templates for every solution.
fn modify(
    graph: &mut Graph,
    patterns: &[TriplePattern],
    delete: &[TriplePattern],
    insert: &[TriplePattern],
) {
    let solutions = solutions(graph, patterns);
    for bindings in &solutions {
        for template in delete {
            if let Some(triple) = with_blank_variables(template).instantiate(bindings) {
                graph.remove(&triple);
            }
        }
    }
    for bindings in &solutions {
        for template in insert {
            if let Some(triple) = template.instantiate(bindings) {
                graph.insert(&triple);
            }
        }
    }
}

/// All bindings under which every pattern matches. No patterns yield one
/// empty solution.
pub fn solutions(graph: &Graph, patterns: &[TriplePattern]) -> Vec<Bindings> {
    let triples: Vec<Triple> = graph.iter().map(TripleRef::into_owned).collect();
    let mut solutions = vec![Bindings::new()];
    for pattern in patterns {
        let pattern = with_blank_variables(pattern);
        let mut next = Vec::new();
        for bindings in &solutions {
            next.extend(triples.iter().filter_map(|triple| pattern.matches(triple, bindings)));
        }
        solutions = next;
        if solutions.is_empty() {
            break;
        }
    }
    solutions
}

/// Blank nodes in a pattern match anything, consistently within one
/// evaluation.
fn with_blank_variables(pattern: &TriplePattern) -> TriplePattern {
    let convert = |p: &TermPattern| match p {
        TermPattern::Term(Term::BlankNode(node)) => TermPattern::var(format!("_:{}", node.as_str())),
        other => other.clone(),
    };
    TriplePattern {
        subject: convert(&pattern.subject),
        predicate: convert(&pattern.predicate),
        object: convert(&pattern.object),
    }
}
