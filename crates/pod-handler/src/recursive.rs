use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{Diagnostics, HttpResult};
use tracing::debug;

use crate::aggregate::aggregate_errors;
use crate::handler::AsyncHandler;

/// A handler that chooses among other handlers instead of doing the work.
///
/// `select` returns the leaf that should handle the input, so a parent
/// composite can dispatch straight to it without a second discovery pass.
#[async_trait]
pub trait Composite<I, O>: AsyncHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    async fn select(&self, input: &I) -> HttpResult<Arc<dyn AsyncHandler<I, O>>>;
}

/// An entry in a [`RecursiveHandler`], tagged when it is built.
pub enum Member<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    Leaf(Arc<dyn AsyncHandler<I, O>>),
    Composite(Arc<dyn Composite<I, O>>),
}

impl<I, O> Member<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    pub fn leaf(handler: impl AsyncHandler<I, O> + 'static) -> Self {
        Self::Leaf(Arc::new(handler))
    }

    pub fn composite(handler: impl Composite<I, O> + 'static) -> Self {
        Self::Composite(Arc::new(handler))
    }

    fn name(&self) -> &str {
        match self {
            Self::Leaf(h) => h.name(),
            Self::Composite(c) => c.name(),
        }
    }
}

impl<I, O> Clone for Member<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(h) => Self::Leaf(Arc::clone(h)),
            Self::Composite(c) => Self::Composite(Arc::clone(c)),
        }
    }
}

/// Like [`WaterfallHandler`](crate::WaterfallHandler), but members may be
/// composites themselves.
///
/// A composite member is asked to `select` its own leaf; the leaf it returns
/// is used directly. Every leaf in the tree therefore sees at most one
/// `can_handle` call per dispatch, however deep the nesting.
pub struct RecursiveHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    name: String,
    members: Vec<Member<I, O>>,
    diagnostics: Diagnostics,
}

impl<I, O> RecursiveHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    pub fn new(members: Vec<Member<I, O>>) -> Self {
        Self {
            name: "recursive".to_string(),
            members,
            diagnostics: Diagnostics::current(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[async_trait]
impl<I, O> Composite<I, O> for RecursiveHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    async fn select(&self, input: &I) -> HttpResult<Arc<dyn AsyncHandler<I, O>>> {
        let mut errors = Vec::new();
        for member in &self.members {
            let selected = match member {
                Member::Leaf(handler) => handler
                    .can_handle(input)
                    .await
                    .map(|()| Arc::clone(handler)),
                Member::Composite(composite) => composite.select(input).await,
            };
            match selected {
                Ok(handler) => {
                    self.diagnostics.in_scope(|| {
                        debug!(
                            composite = %self.name,
                            member = member.name(),
                            handler = handler.name(),
                            "handler selected"
                        )
                    });
                    return Ok(handler);
                }
                Err(err) => errors.push(err),
            }
        }
        Err(aggregate_errors(&errors))
    }
}

#[async_trait]
impl<I, O> AsyncHandler<I, O> for RecursiveHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_handle(&self, input: &I) -> HttpResult<()> {
        self.select(input).await.map(|_| ())
    }

    async fn handle(&self, input: I) -> HttpResult<O> {
        let handler = self.select(&input).await?;
        handler.handle(input).await
    }

    async fn handle_safe(&self, input: I) -> HttpResult<O> {
        self.handle(input).await
    }
}
