//! Matching preferences against available media types.

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use pod_types::{HttpError, HttpResult, RepresentationPreferences, WeightedTypes};

use crate::parse::{parse_accept, parse_accept_charset, parse_accept_encoding, parse_accept_language};

/// Whether two media ranges overlap. `*/*` matches anything and `type/*`
/// matches any subtype of `type`, on either side. Parameters are ignored.
pub fn matches_media_type(left: &str, right: &str) -> bool {
    let essence = |s: &str| s.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let (left, right) = (essence(left), essence(right));
    let (Some((lt, ls)), Some((rt, rs))) = (left.split_once('/'), right.split_once('/')) else {
        return false;
    };
    let types_match = lt == "*" || rt == "*" || lt == rt;
    let subtypes_match = ls == "*" || rs == "*" || ls == rs;
    types_match && subtypes_match
}

/// Weight `preferences` give to `media_type`: the highest weight among the
/// ranges it matches, 0 if none, and 1 when there are no preferences.
pub fn weight_of(preferences: &WeightedTypes, media_type: &str) -> f64 {
    if preferences.is_empty() {
        return 1.0;
    }
    preferences
        .iter()
        .filter(|(range, _)| matches_media_type(range, media_type))
        .map(|(_, weight)| weight)
        .fold(0.0, f64::max)
}

/// The available type with the best combined weight, first one winning ties.
/// `None` if nothing available is acceptable.
pub fn preferred_type(preferences: &WeightedTypes, available: &WeightedTypes) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for (media_type, weight) in available.iter() {
        let score = weight * weight_of(preferences, media_type);
        if score > best.map_or(0.0, |(_, w)| w) {
            best = Some((media_type, score));
        }
    }
    best.map(|(media_type, _)| media_type.to_string())
}

/// Whether any available type is acceptable.
pub fn supports(preferences: &WeightedTypes, available: &WeightedTypes) -> bool {
    preferred_type(preferences, available).is_some()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> HttpResult<Option<&'a str>> {
    let values: Vec<&HeaderValue> = headers.get_all(name).iter().collect();
    match values.as_slice() {
        [] => Ok(None),
        [value] => value
            .to_str()
            .map(Some)
            .map_err(|_| HttpError::BadRequest(format!("Invalid {name} header value"))),
        _ => Err(HttpError::BadRequest(format!(
            "Multiple {name} headers are not supported"
        ))),
    }
}

/// Build preferences from the `Accept`, `Accept-Charset`, `Accept-Encoding`
/// and `Accept-Language` request headers.
pub fn preferences_from_headers(headers: &HeaderMap) -> HttpResult<RepresentationPreferences> {
    let mut preferences = RepresentationPreferences::default();
    if let Some(value) = header_str(headers, &header::ACCEPT)? {
        for accept in parse_accept(value)? {
            preferences.media_types.insert(accept.range, accept.weight);
        }
    }
    if let Some(value) = header_str(headers, &header::ACCEPT_CHARSET)? {
        for entry in parse_accept_charset(value)? {
            preferences.charsets.insert(entry.range, entry.weight);
        }
    }
    if let Some(value) = header_str(headers, &header::ACCEPT_ENCODING)? {
        for entry in parse_accept_encoding(value)? {
            preferences.encodings.insert(entry.range, entry.weight);
        }
    }
    if let Some(value) = header_str(headers, &header::ACCEPT_LANGUAGE)? {
        for entry in parse_accept_language(value)? {
            preferences.languages.insert(entry.range, entry.weight);
        }
    }
    Ok(preferences)
}

/// Append a header value, keeping any values already present.
pub fn add_header(headers: &mut HeaderMap, name: HeaderName, value: HeaderValue) {
    headers.append(name, value);
}
