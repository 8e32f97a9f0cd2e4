//! A store wrapper that converts representations on the way in and out.

use std::sync::Arc;

use async_trait::async_trait;
use pod_convert::{ConverterArgs, RepresentationConverter};
use pod_handler::AsyncHandler;
use pod_http::weight_of;
use pod_types::vocab::content_type::TURTLE;
use pod_types::{
    DataType, Diagnostics, HttpResult, Patch, Representation, RepresentationPreferences,
    ResourceIdentifier,
};
use tracing::debug;

use crate::store::ResourceStore;

/// Wraps a store so callers can read in any type the converters reach and
/// write graphs to a store that only keeps bytes.
///
/// Outgoing representations pass through untouched when they already satisfy
/// the caller's preferences. Quad payloads never do, so they are always
/// serialised. Incoming quad payloads are serialised to the native type
/// (`text/turtle` unless configured); binary payloads are stored as sent.
pub struct RepresentationConvertingStore<S> {
    source: S,
    in_converter: Option<Arc<RepresentationConverter>>,
    out_converter: Option<Arc<RepresentationConverter>>,
    in_type: String,
    diagnostics: Diagnostics,
}

impl<S: ResourceStore> RepresentationConvertingStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            in_converter: None,
            out_converter: None,
            in_type: TURTLE.to_string(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_in_converter(mut self, converter: Arc<RepresentationConverter>) -> Self {
        self.in_converter = Some(converter);
        self
    }

    pub fn with_out_converter(mut self, converter: Arc<RepresentationConverter>) -> Self {
        self.out_converter = Some(converter);
        self
    }

    /// The type incoming graphs are stored as.
    pub fn with_in_type(mut self, in_type: impl Into<String>) -> Self {
        self.in_type = in_type.into();
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn incoming(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<Representation> {
        let Some(converter) = &self.in_converter else {
            return Ok(representation);
        };
        if representation.data_type == DataType::Binary {
            return Ok(representation);
        }
        self.diagnostics
            .in_scope(|| debug!(identifier = %identifier, to = %self.in_type, "converting incoming"));
        let preferences = RepresentationPreferences::for_type(self.in_type.clone());
        converter
            .handle_safe(ConverterArgs::new(identifier.clone(), representation, preferences))
            .await
    }
}

fn satisfies(representation: &Representation, preferences: &RepresentationPreferences) -> bool {
    if representation.data_type != DataType::Binary {
        return false;
    }
    match representation.content_type() {
        Some(content_type) => weight_of(&preferences.media_types, content_type) > 0.0,
        None => true,
    }
}

#[async_trait]
impl<S: ResourceStore> ResourceStore for RepresentationConvertingStore<S> {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> HttpResult<Representation> {
        let representation = self.source.get_representation(identifier, preferences).await?;
        let Some(converter) = &self.out_converter else {
            return Ok(representation);
        };
        if satisfies(&representation, preferences) {
            return Ok(representation);
        }
        self.diagnostics.in_scope(|| {
            debug!(
                identifier = %identifier,
                from = representation.content_type().unwrap_or("unknown"),
                "converting outgoing"
            )
        });
        converter
            .handle_safe(ConverterArgs::new(
                identifier.clone(),
                representation,
                preferences.clone(),
            ))
            .await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<()> {
        let representation = self.incoming(identifier, representation).await?;
        self.source.set_representation(identifier, representation).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> HttpResult<ResourceIdentifier> {
        let representation = self.incoming(container, representation).await?;
        self.source.add_resource(container, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> HttpResult<()> {
        self.source.delete_resource(identifier).await
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: Patch) -> HttpResult<()> {
        self.source.modify_resource(identifier, patch).await
    }

    async fn resource_exists(&self, identifier: &ResourceIdentifier) -> HttpResult<bool> {
        self.source.resource_exists(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_convert::{ChainedConverter, QuadToRdfConverter, RdfToQuadConverter, TypedConverter};
    use pod_handler::WaterfallHandler;
    use pod_rdf::{parse_turtle, GraphName, Literal, NamedNode, Quad};
    use pod_types::vocab::content_type::N_TRIPLES;
    use pod_types::{HttpError, RepresentationMetadata, WeightedTypes};

    use crate::file::FileResourceStore;

    const BASE: &str = "http://test.com/";

    fn out_converter() -> Arc<RepresentationConverter> {
        let chain = ChainedConverter::new(vec![
            Arc::new(RdfToQuadConverter::new()) as Arc<dyn TypedConverter>,
            Arc::new(QuadToRdfConverter::new()),
        ])
        .unwrap();
        Arc::new(WaterfallHandler::new(vec![
            Arc::new(QuadToRdfConverter::new()) as Arc<RepresentationConverter>,
            Arc::new(chain),
        ]))
    }

    fn converting(dir: &tempfile::TempDir) -> RepresentationConvertingStore<FileResourceStore> {
        RepresentationConvertingStore::new(FileResourceStore::new(BASE, dir.path()))
            .with_in_converter(Arc::new(QuadToRdfConverter::new()))
            .with_out_converter(out_converter())
            .with_diagnostics(Diagnostics::none())
    }

    fn prefs(media_type: &str) -> RepresentationPreferences {
        RepresentationPreferences::with_media_types(WeightedTypes::single(media_type))
    }

    #[tokio::test]
    async fn containers_are_serialised_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = converting(&dir);
        let rep = store
            .get_representation(&ResourceIdentifier::new(BASE), &RepresentationPreferences::default())
            .await
            .unwrap();
        assert_eq!(rep.content_type(), Some(TURTLE));
        let text = String::from_utf8(rep.into_bytes().await.unwrap().to_vec()).unwrap();
        assert!(!parse_turtle(&text, None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn matching_binary_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = converting(&dir);
        let id = ResourceIdentifier::new("http://test.com/doc.ttl");
        let body = "@prefix : <http://e/> . :s :p :o .";
        store
            .set_representation(&id, Representation::from_bytes(body, TURTLE))
            .await
            .unwrap();

        let rep = store.get_representation(&id, &prefs(TURTLE)).await.unwrap();
        assert_eq!(&rep.into_bytes().await.unwrap()[..], body.as_bytes());
    }

    #[tokio::test]
    async fn turtle_is_converted_to_requested_ntriples() {
        let dir = tempfile::tempdir().unwrap();
        let store = converting(&dir);
        let id = ResourceIdentifier::new("http://test.com/doc.ttl");
        store
            .set_representation(&id, Representation::from_bytes("<http://s> <http://p> <http://o> .", TURTLE))
            .await
            .unwrap();

        let rep = store.get_representation(&id, &prefs(N_TRIPLES)).await.unwrap();
        assert_eq!(rep.content_type(), Some(N_TRIPLES));
        assert_eq!(
            &rep.into_bytes().await.unwrap()[..],
            b"<http://s> <http://p> <http://o> .\n"
        );
    }

    #[tokio::test]
    async fn unconvertible_request_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let store = converting(&dir);
        let id = ResourceIdentifier::new("http://test.com/image.png");
        store
            .set_representation(&id, Representation::from_bytes(vec![0u8, 1, 2], "image/png"))
            .await
            .unwrap();
        let err = store.get_representation(&id, &prefs(TURTLE)).await.unwrap_err();
        assert!(matches!(err, HttpError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn incoming_quads_are_stored_as_turtle() {
        let dir = tempfile::tempdir().unwrap();
        let store = converting(&dir);
        let id = ResourceIdentifier::new("http://test.com/graph");
        let quad = Quad::new(
            NamedNode::new_unchecked("http://s"),
            NamedNode::new_unchecked("http://p"),
            Literal::new_simple_literal("o"),
            GraphName::DefaultGraph,
        );
        store
            .set_representation(&id, Representation::quads(vec![quad.clone()], RepresentationMetadata::default()))
            .await
            .unwrap();

        let stored = std::fs::read_to_string(dir.path().join("graph")).unwrap();
        assert_eq!(parse_turtle(&stored, None).unwrap(), vec![quad]);
    }
}
