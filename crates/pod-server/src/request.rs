//! Turning HTTP requests into operations.

use axum::body::{to_bytes, Body as HttpBody};
use axum::extract::Request;
use http::header::{CONTENT_TYPE, LINK};
use http::{HeaderMap, Method};
use pod_http::preferences_from_headers;
use pod_rdf::parse_update;
use pod_types::vocab::content_type::SPARQL_UPDATE;
use pod_types::{
    trim_trailing_slashes, Body, HttpError, HttpResult, Operation, Patch, Representation,
    RepresentationMetadata, ResourceIdentifier,
};

/// Build an [`Operation`] from a request.
///
/// The target is the base URL plus the request path. A body is attached when
/// the request has content or declares a Content-Type. PATCH bodies always
/// become a [`Patch`]; only SPARQL Update is decoded into an algebra.
pub async fn parse_request(
    request: Request,
    base_url: &str,
    max_body_size: usize,
) -> HttpResult<Operation> {
    let (parts, body) = request.into_parts();
    let target = ResourceIdentifier::new(format!(
        "{}{}",
        trim_trailing_slashes(base_url),
        parts.uri.path()
    ));
    let preferences = preferences_from_headers(&parts.headers)?;
    let mut operation = Operation::new(parts.method.clone(), target).with_preferences(preferences);

    let bytes = read_body(body, max_body_size).await?;
    let content_type = content_type(&parts.headers)?;
    if bytes.is_empty() && content_type.is_none() {
        return Ok(operation);
    }

    let metadata = RepresentationMetadata {
        content_type: content_type.clone(),
        byte_size: Some(bytes.len() as u64),
        link_types: link_types(&parts.headers),
        slug: header_str(&parts.headers, "slug")?.map(str::to_string),
        ..RepresentationMetadata::default()
    };

    let is_update = content_type.as_deref() == Some(SPARQL_UPDATE);
    let algebra = if parts.method == Method::PATCH && is_update {
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| HttpError::bad_request("SPARQL Update bodies must be UTF-8"))?;
        Some(parse_update(text, Some(operation.target.path()))?)
    } else {
        None
    };

    let mut representation = Representation::from_bytes(bytes, "");
    representation.metadata = metadata;
    let body = if parts.method == Method::PATCH {
        Body::Patch(Patch {
            algebra,
            representation,
        })
    } else {
        Body::Representation(representation)
    };
    Ok(operation.with_body(body))
}

async fn read_body(body: HttpBody, limit: usize) -> HttpResult<bytes::Bytes> {
    to_bytes(body, limit)
        .await
        .map_err(|e| HttpError::bad_request(format!("unreadable request body: {e}")))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> HttpResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| HttpError::bad_request(format!("invalid {name} header")))
        })
        .transpose()
}

/// The media type of the body without parameters, lowercased.
fn content_type(headers: &HeaderMap) -> HttpResult<Option<String>> {
    Ok(header_str(headers, CONTENT_TYPE.as_str())?
        .map(|value| value.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty()))
}

/// Targets of `Link: <...>; rel="type"` headers.
pub fn link_types(headers: &HeaderMap) -> Vec<String> {
    let mut types = Vec::new();
    for value in headers.get_all(LINK) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for link in value.split(',') {
            let mut parts = link.split(';');
            let Some(target) = parts
                .next()
                .map(str::trim)
                .and_then(|t| t.strip_prefix('<'))
                .and_then(|t| t.strip_suffix('>'))
            else {
                continue;
            };
            let is_type = parts.any(|param| {
                let Some((name, value)) = param.split_once('=') else {
                    return false;
                };
                name.trim().eq_ignore_ascii_case("rel")
                    && value
                        .trim()
                        .trim_matches('"')
                        .split_whitespace()
                        .any(|rel| rel == "type")
            });
            if is_type {
                types.push(target.to_string());
            }
        }
    }
    types
}
