//! A store that applies patches itself.

use std::sync::Arc;

use async_trait::async_trait;
use pod_handler::AsyncHandler;
use pod_store::ResourceStore;
use pod_types::{
    HttpResult, Patch, Representation, RepresentationPreferences, ResourceIdentifier,
};

use crate::handler::PatchHandlerInput;

/// Handler applying patches on behalf of a [`PatchingStore`].
pub type PatchHandler = dyn AsyncHandler<PatchHandlerInput, ()>;

/// Delegates everything to `source` except [`ResourceStore::modify_resource`],
/// which goes through the patch handler with `source` as the store to read
/// from and write to.
pub struct PatchingStore<S> {
    source: Arc<S>,
    patcher: Arc<PatchHandler>,
}

impl<S: ResourceStore + 'static> PatchingStore<S> {
    pub fn new(source: Arc<S>, patcher: Arc<PatchHandler>) -> Self {
        Self { source, patcher }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}

#[async_trait]
impl<S: ResourceStore + 'static> ResourceStore for PatchingStore<S> {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> HttpResult<Representation> {
        self.source.get_representation(identifier, preferences).await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<()> {
        self.source.set_representation(identifier, representation).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<ResourceIdentifier> {
        self.source.add_resource(container, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HttpResult<()> {
        self.source.delete_resource(identifier).await
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: Patch) -> HttpResult<()> {
        let source: Arc<dyn ResourceStore> = self.source.clone();
        self.patcher
            .handle_safe(PatchHandlerInput {
                source,
                identifier: identifier.clone(),
                patch,
            })
            .await
    }

    async fn resource_exists(&self, identifier: &ResourceIdentifier) -> HttpResult<bool> {
        self.source.resource_exists(identifier).await
    }
}
