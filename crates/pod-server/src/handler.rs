//! LDP operation handlers.
//!
//! One handler per method, tried in order by a waterfall. Each accepts only
//! its own method, so a method nobody handles surfaces as not implemented.

use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use pod_handler::{AsyncHandler, WaterfallHandler};
use pod_store::ResourceStore;
use pod_types::{
    Body, HttpError, HttpResult, Operation, Patch, Representation, RepresentationMetadata,
    ResourceIdentifier,
};

/// What the transport should send back.
#[derive(Debug)]
pub struct ResponseDescription {
    pub status: StatusCode,
    pub location: Option<ResourceIdentifier>,
    pub metadata: Option<RepresentationMetadata>,
    pub body: Option<Representation>,
}

impl ResponseDescription {
    pub fn ok(representation: Representation) -> Self {
        Self {
            status: StatusCode::OK,
            location: None,
            metadata: Some(representation.metadata.clone()),
            body: Some(representation),
        }
    }

    pub fn created(location: ResourceIdentifier) -> Self {
        Self {
            status: StatusCode::CREATED,
            location: Some(location),
            metadata: None,
            body: None,
        }
    }

    pub fn reset() -> Self {
        Self {
            status: StatusCode::RESET_CONTENT,
            location: None,
            metadata: None,
            body: None,
        }
    }
}

pub type OperationHandler = dyn AsyncHandler<Operation, ResponseDescription>;

fn only(method: &Method, operation: &Operation) -> HttpResult<()> {
    if operation.method == *method {
        Ok(())
    } else {
        Err(HttpError::not_implemented(format!(
            "This handler only supports {method} operations."
        )))
    }
}

fn representation_body(operation: Operation) -> HttpResult<(ResourceIdentifier, Representation)> {
    let method = operation.method.clone();
    match operation.body {
        Some(Body::Representation(representation)) => Ok((operation.target, representation)),
        Some(Body::Patch(_)) => Err(HttpError::UnsupportedMediaType(format!(
            "{method} operations do not accept update bodies."
        ))),
        None => Err(HttpError::bad_request(format!("{method} operations require a body."))),
    }
}

/// GET: the representation in the requested type.
pub struct GetOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl GetOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

/// HEAD: GET without the body.
pub struct HeadOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl HeadOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

/// POST: create a member of the target container.
pub struct PostOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl PostOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

/// PUT: create or replace the target.
pub struct PutOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl PutOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

/// DELETE: remove the target.
pub struct DeleteOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl DeleteOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

/// PATCH: apply a SPARQL Update to the target.
pub struct PatchOperationHandler {
    store: Arc<dyn ResourceStore>,
}

impl PatchOperationHandler {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AsyncHandler<Operation, ResponseDescription> for GetOperationHandler {
    fn name(&self) -> &str {
        "get operation handler"
    }

    async fn can_handle(&self, operation: &Operation) -> HttpResult<()> {
        only(&Method::GET, operation)
    }

    async fn handle(&self, operation: Operation) -> HttpResult<ResponseDescription> {
        let representation = self
            .store
            .get_representation(&operation.target, &operation.preferences)
            .await?;
        Ok(ResponseDescription::ok(representation))
    }
}

#[async_trait]
impl AsyncHandler<Operation, ResponseDescription> for HeadOperationHandler {
    fn name(&self) -> &str {
        "head operation handler"
    }

    async fn can_handle(&self, operation: &Operation) -> HttpResult<()> {
        only(&Method::HEAD, operation)
    }

    async fn handle(&self, operation: Operation) -> HttpResult<ResponseDescription> {
        let representation = self
            .store
            .get_representation(&operation.target, &operation.preferences)
            .await?;
        let mut response = ResponseDescription::ok(representation);
        response.body = None;
        Ok(response)
    }
}

#[async_trait]
impl AsyncHandler<Operation, ResponseDescription> for PostOperationHandler {
    fn name(&self) -> &str {
        "post operation handler"
    }

    async fn can_handle(&self, operation: &Operation) -> HttpResult<()> {
        only(&Method::POST, operation)
    }

    async fn handle(&self, operation: Operation) -> HttpResult<ResponseDescription> {
        let (container, representation) = representation_body(operation)?;
        let created = self.store.add_resource(&container, representation).await?;
        Ok(ResponseDescription::created(created))
    }
}

#[async_trait]
impl AsyncHandler<Operation, ResponseDescription> for PutOperationHandler {
    fn name(&self) -> &str {
        "put operation handler"
    }

    async fn can_handle(&self, operation: &Operation) -> HttpResult<()> {
        only(&Method::PUT, operation)
    }

    async fn handle(&self, operation: Operation) -> HttpResult<ResponseDescription> {
        let (target, representation) = representation_body(operation)?;
        self.store.set_representation(&target, representation).await?;
        Ok(ResponseDescription::reset())
    }
}

#[async_trait]
impl AsyncHandler<Operation, ResponseDescription> for DeleteOperationHandler {
    fn name(&self) -> &str {
        "delete operation handler"
    }

    async fn can_handle(&self, operation: &Operation) -> HttpResult<()> {
        only(&Method::DELETE, operation)
    }

    async fn handle(&self, operation: Operation) -> HttpResult<ResponseDescription> {
        self.store.delete_resource(&operation.target).await?;
        Ok(ResponseDescription::reset())
    }
}

#[async_trait]
impl AsyncHandler<Operation, ResponseDescription> for PatchOperationHandler {
    fn name(&self) -> &str {
        "patch operation handler"
    }

    async fn can_handle(&self, operation: &Operation) -> HttpResult<()> {
        only(&Method::PATCH, operation)
    }

    async fn handle(&self, operation: Operation) -> HttpResult<ResponseDescription> {
        let patch: Patch = match operation.body {
            Some(Body::Patch(patch)) => patch,
            Some(Body::Representation(_)) => {
                return Err(HttpError::not_implemented(
                    "Only SPARQL update patch operations are supported",
                ))
            }
            None => return Err(HttpError::bad_request("PATCH operations require a body.")),
        };
        self.store.modify_resource(&operation.target, patch).await?;
        Ok(ResponseDescription::reset())
    }
}

/// All operation handlers over one store, in a waterfall.
pub fn operation_handlers(store: Arc<dyn ResourceStore>) -> WaterfallHandler<Operation, ResponseDescription> {
    WaterfallHandler::new(vec![
        Arc::new(GetOperationHandler::new(store.clone())) as Arc<OperationHandler>,
        Arc::new(HeadOperationHandler::new(store.clone())),
        Arc::new(PostOperationHandler::new(store.clone())),
        Arc::new(PutOperationHandler::new(store.clone())),
        Arc::new(DeleteOperationHandler::new(store.clone())),
        Arc::new(PatchOperationHandler::new(store)),
    ])
    .named("operation handlers")
}
