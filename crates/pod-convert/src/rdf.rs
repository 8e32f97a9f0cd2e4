//! Converters between serialised RDF and the in-memory quad format.

use std::io::Cursor;

use async_trait::async_trait;
use pod_handler::AsyncHandler;
use pod_http::preferred_type;
use pod_rdf::{parse_ntriples, parse_turtle, write_ntriples, write_turtle};
use pod_types::vocab::content_type::{INTERNAL_QUADS, N_TRIPLES, TURTLE};
use pod_types::{Diagnostics, HttpError, HttpResult, Representation, WeightedTypes};
use tracing::debug;

use crate::converter::{check_typed, ConverterArgs, TypedConverter};

/// Serialises `internal/quads` as Turtle or N-Triples.
#[derive(Debug, Default)]
pub struct QuadToRdfConverter {
    diagnostics: Diagnostics,
}

impl QuadToRdfConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[async_trait]
impl AsyncHandler<ConverterArgs, Representation> for QuadToRdfConverter {
    fn name(&self) -> &str {
        "quad to rdf converter"
    }

    async fn can_handle(&self, args: &ConverterArgs) -> HttpResult<()> {
        check_typed(self, args)
    }

    async fn handle(&self, args: ConverterArgs) -> HttpResult<Representation> {
        let target = preferred_type(&args.preferences.media_types, &self.output_types())
            .ok_or_else(|| HttpError::UnsupportedMediaType("no acceptable RDF serialisation".into()))?;
        let mut metadata = args.representation.metadata.clone();
        let quads = args.representation.into_quads()?;

        let text = if target == N_TRIPLES {
            write_ntriples(&quads)
        } else {
            write_turtle(&quads)?
        };
        self.diagnostics.in_scope(|| {
            debug!(identifier = %args.identifier, quads = quads.len(), to = %target, "serialised quads")
        });

        metadata.content_type = Some(target);
        metadata.byte_size = Some(text.len() as u64);
        Ok(Representation::binary(Cursor::new(text.into_bytes()), metadata))
    }
}

impl TypedConverter for QuadToRdfConverter {
    fn input_types(&self) -> WeightedTypes {
        WeightedTypes::single(INTERNAL_QUADS)
    }

    fn output_types(&self) -> WeightedTypes {
        [(TURTLE, 1.0), (N_TRIPLES, 0.9)].into_iter().collect()
    }
}

/// Parses Turtle or N-Triples into `internal/quads`. Relative IRIs in Turtle
/// resolve against the resource identifier.
#[derive(Debug, Default)]
pub struct RdfToQuadConverter {
    diagnostics: Diagnostics,
}

impl RdfToQuadConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[async_trait]
impl AsyncHandler<ConverterArgs, Representation> for RdfToQuadConverter {
    fn name(&self) -> &str {
        "rdf to quad converter"
    }

    async fn can_handle(&self, args: &ConverterArgs) -> HttpResult<()> {
        check_typed(self, args)
    }

    async fn handle(&self, args: ConverterArgs) -> HttpResult<Representation> {
        let metadata = args.representation.metadata.clone();
        let ntriples = metadata.content_type.as_deref() == Some(N_TRIPLES);
        let bytes = args.representation.into_bytes().await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|err| HttpError::BadRequest(format!("RDF body is not UTF-8: {err}")))?;
        let quads = if ntriples {
            parse_ntriples(text)?
        } else {
            parse_turtle(text, Some(args.identifier.path()))?
        };
        self.diagnostics.in_scope(|| {
            debug!(identifier = %args.identifier, quads = quads.len(), "parsed RDF body")
        });
        Ok(Representation::quads(quads, metadata))
    }
}

impl TypedConverter for RdfToQuadConverter {
    fn input_types(&self) -> WeightedTypes {
        [(TURTLE, 1.0), (N_TRIPLES, 1.0)].into_iter().collect()
    }

    fn output_types(&self) -> WeightedTypes {
        WeightedTypes::single(INTERNAL_QUADS)
    }
}
