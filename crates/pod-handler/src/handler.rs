use async_trait::async_trait;
use pod_types::HttpResult;

/// A capability-checked async handler.
///
/// `can_handle` reports whether this handler accepts the input, with the
/// rejection reason as a classified error. Callers are expected to call it
/// before `handle`; [`AsyncHandler::handle_safe`] does both.
///
/// The trait is object-safe so handlers can be held as
/// `Arc<dyn AsyncHandler<I, O>>` by the composites in this crate.
#[async_trait]
pub trait AsyncHandler<I, O>: Send + Sync
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Check whether `input` is supported.
    async fn can_handle(&self, input: &I) -> HttpResult<()>;

    /// Handle `input`. Behaviour is unspecified if `can_handle` would reject it.
    async fn handle(&self, input: I) -> HttpResult<O>;

    /// `can_handle` followed by `handle`.
    async fn handle_safe(&self, input: I) -> HttpResult<O> {
        self.can_handle(&input).await?;
        self.handle(input).await
    }
}
