//! The SPARQL Update patch handler.

use std::sync::Arc;

use async_trait::async_trait;
use pod_convert::{ConverterArgs, RepresentationConverter};
use pod_handler::AsyncHandler;
use pod_rdf::{graph_from_quads, quads_from_graph, Graph};
use pod_store::ResourceStore;
use pod_types::vocab::content_type::{INTERNAL_QUADS, TURTLE};
use pod_types::{
    DataType, Diagnostics, HttpError, HttpResult, Patch, Representation,
    RepresentationMetadata, RepresentationPreferences, ResourceIdentifier,
};
use tracing::{debug, info};

use crate::evaluate::{apply, validate};

/// Everything a patch handler needs: where to read and write, what to
/// change, and how.
pub struct PatchHandlerInput {
    pub source: Arc<dyn ResourceStore>,
    pub identifier: ResourceIdentifier,
    pub patch: Patch,
}

/// Applies SPARQL Update patches as read, modify, write against a store.
///
/// The current representation is read as stored and converted to quads. The
/// result is serialised back in the type it was read in, or in the default
/// type when the resource is new or its type is unknown.
pub struct SparqlUpdatePatchHandler {
    converter: Arc<RepresentationConverter>,
    default_type: String,
    diagnostics: Diagnostics,
}

impl SparqlUpdatePatchHandler {
    /// `converter` must reach `internal/quads` from the stored types and
    /// back.
    pub fn new(converter: Arc<RepresentationConverter>) -> Self {
        Self {
            converter,
            default_type: TURTLE.to_string(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_default_type(mut self, default_type: impl Into<String>) -> Self {
        self.default_type = default_type.into();
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The current graph and the metadata it was stored with. A missing
    /// resource is an empty graph.
    async fn read_graph(
        &self,
        source: &dyn ResourceStore,
        identifier: &ResourceIdentifier,
    ) -> HttpResult<(Graph, RepresentationMetadata)> {
        let mut representation = match source
            .get_representation(identifier, &RepresentationPreferences::default())
            .await
        {
            Ok(representation) => representation,
            Err(HttpError::NotFound(_)) => {
                self.diagnostics
                    .in_scope(|| debug!(identifier = %identifier, "patching a new resource"));
                let metadata = RepresentationMetadata::with_content_type(self.default_type.clone());
                return Ok((Graph::new(), metadata));
            }
            Err(err) => return Err(err),
        };

        if representation.data_type == DataType::Quad {
            let metadata = RepresentationMetadata::with_content_type(self.default_type.clone());
            return Ok((graph_from_quads(representation.into_quads()?), metadata));
        }
        if representation.metadata.content_type.is_none() {
            representation.metadata.content_type = Some(self.default_type.clone());
        }
        let metadata = representation.metadata.clone();
        let quads = self
            .converter
            .handle_safe(ConverterArgs::new(
                identifier.clone(),
                representation,
                RepresentationPreferences::for_type(INTERNAL_QUADS),
            ))
            .await?
            .into_quads()?;
        Ok((graph_from_quads(quads), metadata))
    }
}

#[async_trait]
impl AsyncHandler<PatchHandlerInput, ()> for SparqlUpdatePatchHandler {
    fn name(&self) -> &str {
        "sparql update patch handler"
    }

    async fn can_handle(&self, input: &PatchHandlerInput) -> HttpResult<()> {
        match input.patch.algebra {
            Some(_) => Ok(()),
            None => Err(HttpError::not_implemented(
                "Only SPARQL update patch operations are supported",
            )),
        }
    }

    async fn handle(&self, input: PatchHandlerInput) -> HttpResult<()> {
        let PatchHandlerInput {
            source,
            identifier,
            patch,
        } = input;
        let update = patch.algebra.ok_or_else(|| {
            HttpError::not_implemented("Only SPARQL update patch operations are supported")
        })?;

        if update.operations.is_empty() {
            self.diagnostics
                .in_scope(|| debug!(identifier = %identifier, "empty update, nothing to do"));
            return Ok(());
        }
        validate(&update)?;

        let (mut graph, metadata) = self.read_graph(source.as_ref(), &identifier).await?;
        let before = graph.len();
        apply(&mut graph, &update)?;

        let target_type = metadata
            .content_type
            .clone()
            .unwrap_or_else(|| self.default_type.clone());
        let quads = Representation::quads(quads_from_graph(&graph), metadata);
        let serialised = self
            .converter
            .handle_safe(ConverterArgs::new(
                identifier.clone(),
                quads,
                RepresentationPreferences::for_type(target_type),
            ))
            .await?;
        source.set_representation(&identifier, serialised).await?;

        self.diagnostics.in_scope(|| {
            info!(
                identifier = %identifier,
                operations = update.operations.len(),
                before,
                "applied update"
            )
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use pod_convert::{ChainedConverter, QuadToRdfConverter, RdfToQuadConverter, TypedConverter};
    use pod_handler::WaterfallHandler;
    use pod_rdf::{parse_turtle, parse_update, GraphName, NamedNode, Quad};
    use pod_types::vocab::content_type::{N_TRIPLES, SPARQL_UPDATE};

    const TARGET: &str = "http://test.com/doc";

    /// In-memory store counting reads and writes.
    #[derive(Default)]
    struct MemoryStore {
        data: Mutex<HashMap<String, (Option<String>, Vec<u8>)>>,
        reads: AtomicUsize,
        writes: AtomicUsize,
        read_error: Option<HttpError>,
    }

    impl MemoryStore {
        fn with(identifier: &str, content_type: Option<&str>, body: &str) -> Self {
            let store = Self::default();
            store.data.lock().unwrap().insert(
                identifier.to_string(),
                (content_type.map(str::to_string), body.as_bytes().to_vec()),
            );
            store
        }

        fn body(&self, identifier: &str) -> (Option<String>, String) {
            let data = self.data.lock().unwrap();
            let (content_type, bytes) = data.get(identifier).cloned().unwrap();
            (content_type, String::from_utf8(bytes).unwrap())
        }
    }

    #[async_trait]
    impl ResourceStore for MemoryStore {
        async fn get_representation(
            &self,
            identifier: &ResourceIdentifier,
            _preferences: &RepresentationPreferences,
        ) -> HttpResult<Representation> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.read_error {
                return Err(err.clone());
            }
            let data = self.data.lock().unwrap();
            let (content_type, bytes) = data
                .get(identifier.path())
                .cloned()
                .ok_or_else(|| HttpError::not_found("missing"))?;
            let mut representation = Representation::from_bytes(bytes, "unset");
            representation.metadata.content_type = content_type;
            Ok(representation)
        }

        async fn set_representation(
            &self,
            identifier: &ResourceIdentifier,
            representation: Representation,
        ) -> HttpResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let content_type = representation.metadata.content_type.clone();
            let bytes = representation.into_bytes().await?;
            self.data
                .lock()
                .unwrap()
                .insert(identifier.path().to_string(), (content_type, bytes.to_vec()));
            Ok(())
        }

        async fn add_resource(
            &self,
            _container: &ResourceIdentifier,
            _representation: Representation,
        ) -> HttpResult<ResourceIdentifier> {
            Err(HttpError::not_implemented("add"))
        }

        async fn delete_resource(&self, _identifier: &ResourceIdentifier) -> HttpResult<()> {
            Err(HttpError::not_implemented("delete"))
        }

        async fn modify_resource(&self, _identifier: &ResourceIdentifier, _patch: Patch) -> HttpResult<()> {
            Err(HttpError::not_implemented("modify"))
        }

        async fn resource_exists(&self, identifier: &ResourceIdentifier) -> HttpResult<bool> {
            Ok(self.data.lock().unwrap().contains_key(identifier.path()))
        }
    }

    fn handler() -> SparqlUpdatePatchHandler {
        let chain = ChainedConverter::new(vec![
            Arc::new(RdfToQuadConverter::new()) as Arc<dyn TypedConverter>,
            Arc::new(QuadToRdfConverter::new()),
        ])
        .unwrap();
        let converter = WaterfallHandler::new(vec![
            Arc::new(QuadToRdfConverter::new()) as Arc<RepresentationConverter>,
            Arc::new(RdfToQuadConverter::new()),
            Arc::new(chain),
        ]);
        SparqlUpdatePatchHandler::new(Arc::new(converter)).with_diagnostics(Diagnostics::none())
    }

    fn input(source: &Arc<MemoryStore>, update: &str) -> PatchHandlerInput {
        let source: Arc<dyn ResourceStore> = source.clone();
        PatchHandlerInput {
            source,
            identifier: ResourceIdentifier::new(TARGET),
            patch: Patch {
                algebra: Some(parse_update(update, Some(TARGET)).unwrap()),
                representation: Representation::from_bytes(update.to_string(), SPARQL_UPDATE),
            },
        }
    }

    fn ex(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{local}"))
    }

    fn quad(s: &str, p: &str, o: &str) -> Quad {
        Quad::new(ex(s), ex(p), ex(o), GraphName::DefaultGraph)
    }

    fn stored_quads(store: &MemoryStore) -> Vec<Quad> {
        parse_turtle(&store.body(TARGET).1, Some(TARGET)).unwrap()
    }

    const INSERT: &str = "PREFIX : <http://example.org/> INSERT DATA { :s1 :p1 :o1 }";

    #[tokio::test]
    async fn insert_into_missing_resource() {
        let store = Arc::new(MemoryStore::default());
        handler().handle(input(&store, INSERT)).await.unwrap();

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.body(TARGET).0.as_deref(), Some(TURTLE));
        assert_eq!(stored_quads(&store), vec![quad("s1", "p1", "o1")]);
    }

    #[tokio::test]
    async fn insert_twice_keeps_one_triple() {
        let store = Arc::new(MemoryStore::default());
        let handler = handler();
        handler.handle(input(&store, INSERT)).await.unwrap();
        handler.handle(input(&store, INSERT)).await.unwrap();
        assert_eq!(stored_quads(&store).len(), 1);
    }

    #[tokio::test]
    async fn empty_update_touches_nothing() {
        let store = Arc::new(MemoryStore::default());
        handler().handle(input(&store, "")).await.unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn graph_blocks_are_rejected_before_reading() {
        let store = Arc::new(MemoryStore::default());
        let update = "PREFIX : <http://example.org/> INSERT DATA { GRAPH :g { :s :p :o } }";
        let err = handler().handle(input(&store, update)).await.unwrap_err();
        assert!(matches!(err, HttpError::NotImplemented(_)));
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_of_absent_triple_preserves_others() {
        let store = Arc::new(MemoryStore::with(
            TARGET,
            Some(TURTLE),
            "<http://example.org/a> <http://example.org/b> <http://example.org/c> .",
        ));
        let update = "PREFIX : <http://example.org/> DELETE DATA { :x :y :z }";
        handler().handle(input(&store, update)).await.unwrap();
        assert_eq!(stored_quads(&store), vec![quad("a", "b", "c")]);
    }

    #[tokio::test]
    async fn composite_update_is_one_read_and_one_write() {
        let store = Arc::new(MemoryStore::with(
            TARGET,
            Some(TURTLE),
            "<http://example.org/a> <http://example.org/b> <http://example.org/c> .",
        ));
        let update = "PREFIX : <http://example.org/>\n\
            DELETE DATA { :a :b :c } ;\n\
            INSERT DATA { :a :b :c . :x :y :z } ;\n\
            DELETE WHERE { :x ?p ?o }";
        handler().handle(input(&store, update)).await.unwrap();

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(stored_quads(&store), vec![quad("a", "b", "c")]);
    }

    #[tokio::test]
    async fn stored_type_is_kept() {
        let store = Arc::new(MemoryStore::with(
            TARGET,
            Some(N_TRIPLES),
            "<http://example.org/a> <http://example.org/b> <http://example.org/c> .\n",
        ));
        handler().handle(input(&store, INSERT)).await.unwrap();
        let (content_type, body) = store.body(TARGET);
        assert_eq!(content_type.as_deref(), Some(N_TRIPLES));
        assert_eq!(body.lines().count(), 2);
    }

    #[tokio::test]
    async fn untyped_resources_are_read_as_default_type() {
        let store = Arc::new(MemoryStore::with(
            TARGET,
            None,
            "@prefix : <http://example.org/> . :a :b :c .",
        ));
        handler().handle(input(&store, INSERT)).await.unwrap();
        assert_eq!(stored_quads(&store).len(), 2);
    }

    #[tokio::test]
    async fn other_read_failures_propagate() {
        let store = Arc::new(MemoryStore {
            read_error: Some(HttpError::internal("disk on fire")),
            ..MemoryStore::default()
        });
        let err = handler().handle(input(&store, INSERT)).await.unwrap_err();
        assert_eq!(err, HttpError::internal("disk on fire"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn patches_without_algebra_are_refused() {
        let store: Arc<dyn ResourceStore> = Arc::new(MemoryStore::default());
        let input = PatchHandlerInput {
            source: store,
            identifier: ResourceIdentifier::new(TARGET),
            patch: Patch {
                algebra: None,
                representation: Representation::from_bytes("{}", "application/json"),
            },
        };
        let err = handler().handle_safe(input).await.unwrap_err();
        assert!(matches!(err, HttpError::NotImplemented(_)));
    }
}
