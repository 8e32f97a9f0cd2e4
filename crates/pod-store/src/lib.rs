//! Resource storage for the pod server.
//!
//! # Key Types
//!
//! - [`ResourceStore`] -- the async storage contract every layer implements
//! - [`FileResourceStore`] -- containers as directories, resources as files
//! - [`InteractionController`] -- container decisions and member naming
//! - [`RepresentationConvertingStore`] -- converts payloads around another store
//!
//! Stores compose by wrapping: the server stacks a patching store over a
//! converting store over the file store, and each layer only overrides the
//! operations it cares about.

pub mod converting;
pub mod file;
pub mod interaction;
pub mod mime;
pub mod store;

pub use converting::RepresentationConvertingStore;
pub use file::FileResourceStore;
pub use interaction::{is_reserved_name, InteractionController};
pub use mime::content_type_for;
pub use store::ResourceStore;
