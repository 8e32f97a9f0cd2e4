//! Operations flowing from the transport into the handlers.

use http::Method;
use pod_rdf::Update;

use crate::identifier::ResourceIdentifier;
use crate::preferences::RepresentationPreferences;
use crate::representation::Representation;

/// A representation whose payload has also been decoded into an update
/// algebra.
#[derive(Debug)]
pub struct Patch {
    /// `None` when the body could not be decoded as a supported update.
    pub algebra: Option<Update>,
    /// The original request body.
    pub representation: Representation,
}

/// A request body.
#[derive(Debug)]
pub enum Body {
    Representation(Representation),
    Patch(Patch),
}

/// A single request against the resource space.
#[derive(Debug)]
pub struct Operation {
    pub method: Method,
    pub target: ResourceIdentifier,
    pub preferences: RepresentationPreferences,
    pub body: Option<Body>,
}

impl Operation {
    pub fn new(method: Method, target: impl Into<ResourceIdentifier>) -> Self {
        Self {
            method,
            target: target.into(),
            preferences: RepresentationPreferences::default(),
            body: None,
        }
    }

    pub fn with_preferences(mut self, preferences: RepresentationPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
