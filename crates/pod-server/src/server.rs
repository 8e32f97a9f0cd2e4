use std::sync::Arc;

use pod_convert::{
    ChainedConverter, QuadToRdfConverter, RdfToQuadConverter, RepresentationConverter,
    TypedConverter,
};
use pod_handler::WaterfallHandler;
use pod_patch::{PatchingStore, SparqlUpdatePatchHandler};
use pod_store::{FileResourceStore, RepresentationConvertingStore, ResourceStore};
use pod_types::Diagnostics;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::operation_handlers;
use crate::router::{build_router, AppState};

/// The pod server: a file store behind conversion and patching layers,
/// exposed over HTTP.
pub struct PodServer {
    config: ServerConfig,
    diagnostics: Diagnostics,
}

impl PodServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// RDF to RDF through quads.
    fn chain(&self) -> ServerResult<Arc<RepresentationConverter>> {
        let d = &self.diagnostics;
        let chain = ChainedConverter::new(vec![
            Arc::new(RdfToQuadConverter::new().with_diagnostics(d.clone())) as Arc<dyn TypedConverter>,
            Arc::new(QuadToRdfConverter::new().with_diagnostics(d.clone())),
        ])?
        .with_diagnostics(d.clone());
        Ok(Arc::new(chain))
    }

    /// Converters for outgoing representations: quads to RDF, or RDF to
    /// another RDF type through `chain`.
    fn output_converters(&self, chain: Arc<RepresentationConverter>) -> Arc<RepresentationConverter> {
        let d = &self.diagnostics;
        let converters = WaterfallHandler::new(vec![
            Arc::new(QuadToRdfConverter::new().with_diagnostics(d.clone()))
                as Arc<RepresentationConverter>,
            chain,
        ])
        .named("output converters")
        .with_diagnostics(d.clone());
        Arc::new(converters)
    }

    /// Converters for the patch engine: stored RDF to quads and back, falling
    /// back to `chain`.
    fn patch_converters(&self, chain: Arc<RepresentationConverter>) -> Arc<RepresentationConverter> {
        let d = &self.diagnostics;
        let converters = WaterfallHandler::new(vec![
            Arc::new(RdfToQuadConverter::new().with_diagnostics(d.clone()))
                as Arc<RepresentationConverter>,
            Arc::new(QuadToRdfConverter::new().with_diagnostics(d.clone())),
            chain,
        ])
        .named("patch converters")
        .with_diagnostics(d.clone());
        Arc::new(converters)
    }

    /// Assemble the store stack: patching over converting over files.
    pub fn store(&self) -> ServerResult<Arc<dyn ResourceStore>> {
        let d = &self.diagnostics;
        let files = FileResourceStore::new(&self.config.base_url, &self.config.root_path)
            .with_diagnostics(d.clone());
        let chain = self.chain()?;

        let converting = RepresentationConvertingStore::new(files)
            .with_in_converter(Arc::new(QuadToRdfConverter::new().with_diagnostics(d.clone())))
            .with_out_converter(self.output_converters(chain.clone()))
            .with_in_type(self.config.default_rdf_type.clone())
            .with_diagnostics(d.clone());

        let patcher = SparqlUpdatePatchHandler::new(self.patch_converters(chain))
            .with_default_type(self.config.default_rdf_type.clone())
            .with_diagnostics(d.clone());

        Ok(Arc::new(PatchingStore::new(Arc::new(converting), Arc::new(patcher))))
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> ServerResult<axum::Router> {
        let handlers = operation_handlers(self.store()?).with_diagnostics(self.diagnostics.clone());
        Ok(build_router(AppState {
            base_url: self.config.base_url.clone(),
            max_body_size: self.config.max_body_size,
            handler: Arc::new(handlers),
            diagnostics: self.diagnostics.clone(),
        }))
    }

    /// Start serving requests.
    pub async fn serve(mut self) -> ServerResult<()> {
        self.config.validate()?;
        tokio::fs::create_dir_all(&self.config.root_path).await?;
        let app = self.router()?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.diagnostics.in_scope(|| {
            info!(
                addr = %self.config.bind_addr,
                base_url = %self.config.base_url,
                root = %self.config.root_path.display(),
                "pod server listening"
            )
        });
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_convert::ConverterArgs;
    use pod_handler::AsyncHandler;
    use pod_types::vocab::content_type::{INTERNAL_QUADS, N_TRIPLES, TURTLE};
    use pod_types::{HttpResult, Representation, RepresentationPreferences, ResourceIdentifier};

    async fn convert(
        converters: &RepresentationConverter,
        representation: Representation,
        to: &str,
    ) -> HttpResult<Representation> {
        converters
            .handle_safe(ConverterArgs::new(
                ResourceIdentifier::new("http://pod.test/doc"),
                representation,
                RepresentationPreferences::for_type(to),
            ))
            .await
    }

    #[test]
    fn server_construction() {
        let server = PodServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:3000".parse().unwrap());
    }

    #[tokio::test]
    async fn patch_converters_include_the_chain() {
        let server = PodServer::new(ServerConfig::default()).with_diagnostics(Diagnostics::none());
        let converters = server.patch_converters(server.chain().unwrap());
        let turtle = "<http://s> <http://p> <http://o> .";

        let quads = convert(&*converters, Representation::from_bytes(turtle, TURTLE), INTERNAL_QUADS)
            .await
            .unwrap();
        assert_eq!(quads.content_type(), Some(INTERNAL_QUADS));

        let written = convert(&*converters, quads, TURTLE).await.unwrap();
        assert_eq!(written.content_type(), Some(TURTLE));

        let chained = convert(&*converters, Representation::from_bytes(turtle, TURTLE), N_TRIPLES)
            .await
            .unwrap();
        assert_eq!(
            &chained.into_bytes().await.unwrap()[..],
            b"<http://s> <http://p> <http://o> .\n"
        );
    }

    #[test]
    fn router_builds() {
        let server = PodServer::new(ServerConfig::default()).with_diagnostics(Diagnostics::none());
        assert!(server.router().is_ok());
    }
}
