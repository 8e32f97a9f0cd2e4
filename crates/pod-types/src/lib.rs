//! Shared types for the pod server.
//!
//! Every other pod crate builds on these: the error taxonomy, identifiers,
//! representations, preferences and operations.
//!
//! # Key Types
//!
//! - [`HttpError`] -- classified failure, maps directly to a status code
//! - [`ResourceIdentifier`] -- absolute URI; containers end in `/`
//! - [`Representation`] -- single-pass payload plus [`RepresentationMetadata`]
//! - [`RepresentationPreferences`] -- weighted media types, charsets, languages, encodings
//! - [`Operation`] -- method, target, preferences and optional [`Body`]
//! - [`Diagnostics`] -- the tracing sink handed to each component

pub mod diagnostics;
pub mod error;
pub mod identifier;
pub mod operation;
pub mod preferences;
pub mod representation;
pub mod vocab;

pub use diagnostics::Diagnostics;
pub use error::{HttpError, HttpResult};
pub use identifier::{ensure_trailing_slash, trim_trailing_slashes, ResourceIdentifier};
pub use operation::{Body, Operation, Patch};
pub use preferences::{RepresentationPreferences, WeightedTypes};
pub use representation::{ByteStream, Data, DataType, Representation, RepresentationMetadata};
