use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{HttpResult, Patch, Representation, RepresentationPreferences, ResourceIdentifier};

/// The contract every resource store fulfils.
///
/// Implementations must satisfy these invariants:
/// - Identifiers outside the store's base URI are not found, never corrected.
/// - Identifiers ending in `/` name containers; everything else is a resource.
/// - Failures are classified [`HttpError`](pod_types::HttpError)s so the
///   transport can map them to status codes directly.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read the current representation of `identifier`.
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> HttpResult<Representation>;

    /// Create or replace `identifier`.
    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<()>;

    /// Create a new member of `container` and return its identifier.
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<ResourceIdentifier>;

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HttpResult<()>;

    /// Apply a patch in place.
    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: Patch) -> HttpResult<()>;

    /// Whether `identifier` currently exists. Identifiers outside the store
    /// simply do not exist.
    async fn resource_exists(&self, identifier: &ResourceIdentifier) -> HttpResult<bool>;
}

#[async_trait]
impl<T: ResourceStore + ?Sized> ResourceStore for Arc<T> {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> HttpResult<Representation> {
        (**self).get_representation(identifier, preferences).await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<()> {
        (**self).set_representation(identifier, representation).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<ResourceIdentifier> {
        (**self).add_resource(container, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HttpResult<()> {
        (**self).delete_resource(identifier).await
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: Patch) -> HttpResult<()> {
        (**self).modify_resource(identifier, patch).await
    }

    async fn resource_exists(&self, identifier: &ResourceIdentifier) -> HttpResult<bool> {
        (**self).resource_exists(identifier).await
    }
}
