use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{Diagnostics, HttpResult};
use tracing::{debug, warn};

use crate::aggregate::aggregate_errors;
use crate::handler::AsyncHandler;
use crate::recursive::Composite;

/// Tries handlers in order and hands the input to the first that accepts it.
///
/// Handlers are checked in list order, so specific handlers should come
/// before catch-alls. If none accepts, the rejections are aggregated with
/// [`aggregate_errors`](crate::aggregate_errors).
pub struct WaterfallHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    name: String,
    handlers: Vec<Arc<dyn AsyncHandler<I, O>>>,
    diagnostics: Diagnostics,
}

impl<I, O> WaterfallHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    pub fn new(handlers: Vec<Arc<dyn AsyncHandler<I, O>>>) -> Self {
        Self {
            name: "waterfall".to_string(),
            handlers,
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

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The first handler whose `can_handle` accepts `input`.
    pub async fn find_handler(&self, input: &I) -> HttpResult<Arc<dyn AsyncHandler<I, O>>> {
        let mut errors = Vec::new();
        for handler in &self.handlers {
            match handler.can_handle(input).await {
                Ok(()) => {
                    self.diagnostics.in_scope(|| {
                        debug!(composite = %self.name, handler = handler.name(), "handler selected")
                    });
                    return Ok(Arc::clone(handler));
                }
                Err(err) => errors.push(err),
            }
        }
        Err(aggregate_errors(&errors))
    }
}

#[async_trait]
impl<I, O> AsyncHandler<I, O> for WaterfallHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_handle(&self, input: &I) -> HttpResult<()> {
        self.find_handler(input).await.map(|_| ())
    }

    async fn handle(&self, input: I) -> HttpResult<O> {
        let handler = self.find_handler(&input).await.inspect_err(|err| {
            self.diagnostics.in_scope(|| {
                warn!(
                    composite = %self.name,
                    error = %err,
                    "all handlers failed; this might be the consequence of calling handle before can_handle"
                )
            })
        })?;
        handler.handle(input).await
    }

    async fn handle_safe(&self, input: I) -> HttpResult<O> {
        let handler = self.find_handler(&input).await?;
        handler.handle(input).await
    }
}

#[async_trait]
impl<I, O> Composite<I, O> for WaterfallHandler<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    async fn select(&self, input: &I) -> HttpResult<Arc<dyn AsyncHandler<I, O>>> {
        self.find_handler(input).await
    }
}
