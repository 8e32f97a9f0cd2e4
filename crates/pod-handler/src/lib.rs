//! Capability-checked handlers and composite dispatch.
//!
//! Everywhere the server needs to "try handlers until one applies" it builds
//! one of the composites in this crate over [`AsyncHandler`]s.
//!
//! # Key Types
//!
//! - [`AsyncHandler`] -- `can_handle` / `handle` contract
//! - [`WaterfallHandler`] -- first accepting handler wins
//! - [`RecursiveHandler`] -- like waterfall, with nested composites resolved in one pass
//! - [`Member`] -- a recursive handler entry, tagged leaf or composite
//!
//! When no handler accepts, the rejections are combined by
//! [`aggregate_errors`] into a single classified error.

pub mod aggregate;
pub mod handler;
pub mod recursive;
pub mod waterfall;

#[cfg(test)]
mod testing;

pub use aggregate::aggregate_errors;
pub use handler::AsyncHandler;
pub use recursive::{Composite, Member, RecursiveHandler};
pub use waterfall::WaterfallHandler;
