//! Representations: a single-pass payload plus its metadata.

use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use pod_rdf::Quad;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{HttpError, HttpResult};
use crate::vocab::content_type;

/// A boxed byte source, read at most once.
pub type ByteStream = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// What kind of payload a representation carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Binary,
    Quad,
}

/// The payload itself.
pub enum Data {
    Binary(ByteStream),
    Quads(Vec<Quad>),
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(_) => f.write_str("Binary(..)"),
            Self::Quads(quads) => f.debug_tuple("Quads").field(&quads.len()).finish(),
        }
    }
}

/// Everything known about a representation besides its payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepresentationMetadata {
    pub content_type: Option<String>,
    pub byte_size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    /// Supplementary quads stored alongside the resource.
    pub raw: Vec<Quad>,
    /// `Link: <...>; rel="type"` values sent with a request.
    pub link_types: Vec<String>,
    /// Client-suggested name for a new resource.
    pub slug: Option<String>,
}

impl RepresentationMetadata {
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }
}

/// A payload plus metadata.
///
/// The payload can be taken exactly once; later attempts fail with an
/// internal error.
pub struct Representation {
    pub metadata: RepresentationMetadata,
    pub data_type: DataType,
    data: Option<Data>,
}

impl Representation {
    pub fn binary(
        stream: impl AsyncRead + Send + Sync + Unpin + 'static,
        metadata: RepresentationMetadata,
    ) -> Self {
        Self {
            metadata,
            data_type: DataType::Binary,
            data: Some(Data::Binary(Box::new(stream))),
        }
    }

    /// A binary representation over an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let mut metadata = RepresentationMetadata::with_content_type(content_type);
        metadata.byte_size = Some(bytes.len() as u64);
        Self::binary(Cursor::new(bytes), metadata)
    }

    /// A quad representation. The content type is forced to
    /// `internal/quads`.
    pub fn quads(quads: Vec<Quad>, mut metadata: RepresentationMetadata) -> Self {
        metadata.content_type = Some(content_type::INTERNAL_QUADS.to_string());
        Self {
            metadata,
            data_type: DataType::Quad,
            data: Some(Data::Quads(quads)),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.metadata.content_type.as_deref()
    }

    pub fn is_consumed(&self) -> bool {
        self.data.is_none()
    }

    /// Take the payload out.
    pub fn take_data(&mut self) -> HttpResult<Data> {
        self.data
            .take()
            .ok_or_else(|| HttpError::internal("representation data already consumed"))
    }

    /// Drain a binary payload into memory.
    pub async fn into_bytes(mut self) -> HttpResult<Bytes> {
        match self.take_data()? {
            Data::Binary(mut stream) => {
                let mut buf = Vec::new();
                stream.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
            Data::Quads(_) => Err(HttpError::internal(
                "expected a binary representation, got quads",
            )),
        }
    }

    pub fn into_quads(mut self) -> HttpResult<Vec<Quad>> {
        match self.take_data()? {
            Data::Quads(quads) => Ok(quads),
            Data::Binary(_) => Err(HttpError::internal(
                "expected a quad representation, got binary data",
            )),
        }
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("metadata", &self.metadata)
            .field("data_type", &self.data_type)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_rdf::{GraphName, Literal, NamedNode};

    #[tokio::test]
    async fn bytes_are_read_once() {
        let mut rep = Representation::from_bytes("hello", "text/plain");
        assert_eq!(rep.metadata.byte_size, Some(5));
        let _ = rep.take_data().unwrap();
        assert!(rep.is_consumed());
        assert_eq!(
            rep.take_data().unwrap_err(),
            HttpError::Internal("representation data already consumed".into())
        );
    }

    #[tokio::test]
    async fn into_bytes_drains_stream() {
        let rep = Representation::from_bytes(b"abc".to_vec(), "text/plain");
        assert_eq!(rep.into_bytes().await.unwrap(), Bytes::from_static(b"abc"));
    }

    #[test]
    fn quads_force_internal_type() {
        let quad = Quad::new(
            NamedNode::new_unchecked("http://s"),
            NamedNode::new_unchecked("http://p"),
            Literal::new_simple_literal("o"),
            GraphName::DefaultGraph,
        );
        let rep = Representation::quads(
            vec![quad.clone()],
            RepresentationMetadata::with_content_type("text/turtle"),
        );
        assert_eq!(rep.content_type(), Some(content_type::INTERNAL_QUADS));
        assert_eq!(rep.data_type, DataType::Quad);
        assert_eq!(rep.into_quads().unwrap(), vec![quad]);
    }

    #[tokio::test]
    async fn wrong_payload_kind_is_internal() {
        let rep = Representation::quads(Vec::new(), RepresentationMetadata::default());
        assert!(matches!(rep.into_bytes().await, Err(HttpError::Internal(_))));
    }
}
