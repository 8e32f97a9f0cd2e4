//! HTTP preference negotiation.
//!
//! Parses the Accept-family request headers into weighted preferences and
//! matches those against the media types a component can produce.
//!
//! # Key Functions
//!
//! - [`parse_accept`] and friends -- strict RFC 7231 grammar, sorted by weight
//! - [`preferences_from_headers`] -- all four headers into [`RepresentationPreferences`]
//! - [`matches_media_type`] / [`preferred_type`] -- range matching with wildcards
//!
//! [`RepresentationPreferences`]: pod_types::RepresentationPreferences

pub mod negotiate;
pub mod parse;

pub use negotiate::{
    add_header, matches_media_type, preferences_from_headers, preferred_type, supports, weight_of,
};
pub use parse::{
    parse_accept, parse_accept_charset, parse_accept_encoding, parse_accept_language,
    parse_parameters, split_and_clean, transform_quoted_strings, Accept, AcceptCharset,
    AcceptEncoding, AcceptHeader, AcceptLanguage, QuotedStrings,
};
