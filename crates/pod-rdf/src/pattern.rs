//! Terms and triples that may contain variables.

use std::collections::BTreeMap;
use std::fmt;

use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};

/// Variable bindings produced while matching patterns.
pub type Bindings = BTreeMap<String, Term>;

/// A term position in a pattern: a concrete term or a named variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TermPattern {
    Term(Term),
    Variable(String),
}

impl TermPattern {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Substitute bindings. Returns `None` if a variable is unbound.
    pub fn instantiate(&self, bindings: &Bindings) -> Option<Term> {
        match self {
            Self::Term(term) => Some(term.clone()),
            Self::Variable(name) => bindings.get(name).cloned(),
        }
    }

    /// Match against a concrete term, extending `bindings` on success.
    fn unify(&self, term: &Term, bindings: &mut Bindings) -> bool {
        match self {
            Self::Term(t) => t == term,
            Self::Variable(name) => match bindings.get(name) {
                Some(bound) => bound == term,
                None => {
                    bindings.insert(name.clone(), term.clone());
                    true
                }
            },
        }
    }
}

impl From<Term> for TermPattern {
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

impl From<NamedNode> for TermPattern {
    fn from(node: NamedNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<BlankNode> for TermPattern {
    fn from(node: BlankNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<Literal> for TermPattern {
    fn from(literal: Literal) -> Self {
        Self::Term(literal.into())
    }
}

impl fmt::Display for TermPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(term) => write!(f, "{term}"),
            Self::Variable(name) => write!(f, "?{name}"),
        }
    }
}

/// A subject / predicate / object pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: TermPattern,
    pub predicate: TermPattern,
    pub object: TermPattern,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<TermPattern>,
        predicate: impl Into<TermPattern>,
        object: impl Into<TermPattern>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Build a triple from the pattern.
    ///
    /// Returns `None` when a variable is unbound or the result would not be a
    /// valid triple (a literal subject, or a predicate that is not an IRI).
    pub fn instantiate(&self, bindings: &Bindings) -> Option<Triple> {
        let subject: Subject = match self.subject.instantiate(bindings)? {
            Term::NamedNode(node) => node.into(),
            Term::BlankNode(node) => node.into(),
            _ => return None,
        };
        let predicate = match self.predicate.instantiate(bindings)? {
            Term::NamedNode(node) => node,
            _ => return None,
        };
        let object = self.object.instantiate(bindings)?;
        Some(Triple::new(subject, predicate, object))
    }

    /// Try to match a triple, returning the extended bindings on success.
    pub fn matches(&self, triple: &Triple, bindings: &Bindings) -> Option<Bindings> {
        let mut out = bindings.clone();
        (self.subject.unify(&triple.subject.clone().into(), &mut out)
            && self.predicate.unify(&triple.predicate.clone().into(), &mut out)
            && self.object.unify(&triple.object, &mut out))
        .then_some(out)
    }

    /// Returns `true` if no position is a variable.
    pub fn is_ground(&self) -> bool {
        !(self.subject.is_variable() || self.predicate.is_variable() || self.object.is_variable())
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
