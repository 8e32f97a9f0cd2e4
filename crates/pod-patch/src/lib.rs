//! Patch engine for the pod server.
//!
//! PATCH requests carry SPARQL Update. The engine reads the target's current
//! graph through a converter, applies the update in memory and writes the
//! result back with `set_representation`, so any store that can hold bytes
//! can be patched.
//!
//! # Key Types
//!
//! - [`SparqlUpdatePatchHandler`] -- read, modify, write for one patch
//! - [`PatchingStore`] -- store wrapper routing `modify_resource` to a handler
//! - [`PatchHandlerInput`] -- source store, target and patch

pub mod evaluate;
pub mod handler;
pub mod store;

pub use evaluate::{apply, solutions, validate};
pub use handler::{PatchHandlerInput, SparqlUpdatePatchHandler};
pub use store::{PatchHandler, PatchingStore};
