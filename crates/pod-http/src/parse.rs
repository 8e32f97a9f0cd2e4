//! Accept-family header grammars (RFC 7231 section 5.3).
//!
//! ```text
//! Accept          = #( media-range [ accept-params ] )
//! Accept-Charset  = 1#( ( charset / "*" ) [ weight ] )
//! Accept-Encoding = #( codings [ weight ] )
//! Accept-Language = 1#( language-range [ weight ] )
//!
//! media-range     = ( "*/*" / ( type "/" "*" ) / ( type "/" subtype ) )
//!                   *( OWS ";" OWS parameter )
//! accept-params   = weight *( accept-ext )
//! accept-ext      = OWS ";" OWS token [ "=" ( token / quoted-string ) ]
//! weight          = OWS ";" OWS "q=" qvalue
//! qvalue          = ( "0" [ "." 0*3DIGIT ] ) / ( "1" [ "." 0*3("0") ] )
//! language-range  = ( 1*8ALPHA *( "-" 1*8alphanum ) ) / "*"
//! ```
//!
//! Every violation is a [`HttpError::BadRequest`] naming the offending
//! fragment. Results are sorted by descending weight; equal weights keep
//! their order in the header.

use std::collections::{BTreeMap, HashMap};

use pod_types::{HttpError, HttpResult};

/// A range with its weight, as found in the parameterless headers.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptHeader {
    pub range: String,
    pub weight: f64,
}

pub type AcceptCharset = AcceptHeader;
pub type AcceptEncoding = AcceptHeader;
pub type AcceptLanguage = AcceptHeader;

/// One media range of an `Accept` header.
#[derive(Clone, Debug, PartialEq)]
pub struct Accept {
    pub range: String,
    pub weight: f64,
    /// Parameters before `q`.
    pub media_type_params: BTreeMap<String, String>,
    /// Parameters after `q`. Values may be empty.
    pub extension_params: BTreeMap<String, String>,
}

/// A header with its quoted strings swapped for numbered placeholders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuotedStrings {
    pub result: String,
    /// Placeholder (`"0"`, `"1"`, ...) to unquoted original content.
    pub replacements: HashMap<String, String>,
}

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

fn is_qdtext(c: char) -> bool {
    matches!(c, '\t' | ' ' | '!' | '\u{23}'..='\u{5B}' | '\u{5D}'..='\u{7E}' | '\u{80}'..='\u{FF}')
}

fn is_quoted_pair_char(c: char) -> bool {
    matches!(c, '\t' | '\u{20}'..='\u{7E}' | '\u{80}'..='\u{FF}')
}

fn is_placeholder(s: &str) -> bool {
    s.len() > 2
        && s.starts_with('"')
        && s.ends_with('"')
        && s[1..s.len() - 1].chars().all(|c| c.is_ascii_digit())
}

fn reject(message: String) -> HttpError {
    HttpError::BadRequest(message)
}

/// Replace every double-quoted string with `"0"`, `"1"`, ... so the header
/// can be split on commas and semicolons safely.
pub fn transform_quoted_strings(input: &str) -> HttpResult<QuotedStrings> {
    let mut out = QuotedStrings::default();
    let mut rest = input;

    while let Some(open) = rest.find('"') {
        out.result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = closing_quote(after) else {
            // No terminator: leave it for the token checks to reject.
            out.result.push_str(&rest[open..]);
            return Ok(out);
        };
        let content = &after[..close];
        validate_quoted(content)?;

        let placeholder = format!("\"{}\"", out.replacements.len());
        out.result.push_str(&placeholder);
        out.replacements.insert(placeholder, content.to_string());
        rest = &after[close + 1..];
    }
    out.result.push_str(rest);
    Ok(out)
}

/// Byte index of the unescaped `"` ending a quoted string.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn validate_quoted(content: &str) -> HttpResult<()> {
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        let valid = if c == '\\' {
            chars.next().is_some_and(is_quoted_pair_char)
        } else {
            is_qdtext(c)
        };
        if !valid {
            return Err(reject(format!(
                "Invalid quoted string in header: \"{content}\""
            )));
        }
    }
    Ok(())
}

/// Split on commas, trim, and drop empty parts.
pub fn split_and_clean(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn test_qvalue(qvalue: &str) -> HttpResult<f64> {
    let valid = match qvalue.split_once('.') {
        None => qvalue == "0" || qvalue == "1",
        Some(("0", frac)) => frac.len() <= 3 && frac.chars().all(|c| c.is_ascii_digit()),
        Some(("1", frac)) => frac.len() <= 3 && frac.chars().all(|c| c == '0'),
        Some(_) => false,
    };
    if !valid {
        return Err(reject(format!(
            "Invalid q value: {qvalue} does not match \
             ( \"0\" [ \".\" 0*3DIGIT ] ) / ( \"1\" [ \".\" 0*3(\"0\") ] )."
        )));
    }
    qvalue
        .parse::<f64>()
        .map_err(|_| reject(format!("Invalid q value: {qvalue}")))
}

/// Parse `token [ "=" ( token / quoted-string ) ]` parameters, putting the
/// original quoted content back in place of placeholders.
pub fn parse_parameters(
    parameters: &[&str],
    replacements: &HashMap<String, String>,
) -> HttpResult<Vec<(String, String)>> {
    parameters
        .iter()
        .map(|param| {
            let (name, raw) = match param.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (param.trim(), ""),
            };
            let value_ok = raw.is_empty() || is_placeholder(raw) || is_token(raw);
            if !is_token(name) || !value_ok {
                let shown = replacements.get(raw).map(String::as_str).unwrap_or(raw);
                return Err(reject(format!(
                    "Invalid parameter value: {name}={shown} \
                     does not match (token ( \"=\" ( token / quoted-string ))?)."
                )));
            }
            let value = replacements.get(raw).cloned().unwrap_or_else(|| raw.to_string());
            Ok((name.to_string(), value))
        })
        .collect()
}

fn parse_accept_part(part: &str, replacements: &HashMap<String, String>) -> HttpResult<Accept> {
    let mut pieces = part.split(';').map(str::trim);
    let range = pieces.next().unwrap_or_default();
    let parameters: Vec<&str> = pieces.collect();

    let valid_range = match range.split_once('/') {
        Some((ty, subtype)) => is_token(ty) && is_token(subtype),
        None => false,
    };
    if !valid_range {
        return Err(reject(format!(
            "Invalid Accept range: {range} does not match \
             ( \"*/*\" / ( token \"/\" \"*\" ) / ( token \"/\" token ) )"
        )));
    }

    let mut accept = Accept {
        range: range.to_string(),
        weight: 1.0,
        media_type_params: BTreeMap::new(),
        extension_params: BTreeMap::new(),
    };
    let mut after_q = false;
    for (name, value) in parse_parameters(&parameters, replacements)? {
        if name == "q" {
            after_q = true;
            accept.weight = test_qvalue(&value)?;
        } else if after_q {
            accept.extension_params.insert(name, value);
        } else if value.is_empty() {
            return Err(reject(format!(
                "Invalid Accept parameter {name}: \
                 Accept parameter values are not optional when preceding the q value"
            )));
        } else {
            accept.media_type_params.insert(name, value);
        }
    }
    Ok(accept)
}

/// Parse an `Accept` header.
pub fn parse_accept(input: &str) -> HttpResult<Vec<Accept>> {
    let quoted = transform_quoted_strings(input)?;
    let mut parts = split_and_clean(&quoted.result)
        .into_iter()
        .map(|part| parse_accept_part(part, &quoted.replacements))
        .collect::<HttpResult<Vec<_>>>()?;
    parts.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    Ok(parts)
}

/// Headers whose entries are a range and an optional `q` only.
fn parse_no_parameters(input: &str) -> HttpResult<Vec<AcceptHeader>> {
    let mut results = split_and_clean(input)
        .into_iter()
        .map(|part| {
            let mut pieces = part.split(';').map(str::trim);
            let range = pieces.next().unwrap_or_default().to_string();
            let mut weight = 1.0;
            for param in pieces {
                let Some(value) = param.strip_prefix("q=") else {
                    return Err(reject(format!("Only q parameters are allowed in {input}")));
                };
                weight = test_qvalue(value)?;
            }
            Ok(AcceptHeader { range, weight })
        })
        .collect::<HttpResult<Vec<_>>>()?;
    results.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    Ok(results)
}

/// Parse an `Accept-Charset` header.
pub fn parse_accept_charset(input: &str) -> HttpResult<Vec<AcceptCharset>> {
    let results = parse_no_parameters(input)?;
    if let Some(bad) = results.iter().find(|r| !is_token(&r.range)) {
        return Err(reject(format!(
            "Invalid Accept-Charset range: {} does not match (charset / \"*\")",
            bad.range
        )));
    }
    Ok(results)
}

/// Parse an `Accept-Encoding` header.
pub fn parse_accept_encoding(input: &str) -> HttpResult<Vec<AcceptEncoding>> {
    let results = parse_no_parameters(input)?;
    if let Some(bad) = results.iter().find(|r| !is_token(&r.range)) {
        return Err(reject(format!(
            "Invalid Accept-Encoding range: {} does not match \
             (content-coding / \"identity\" / \"*\")",
            bad.range
        )));
    }
    Ok(results)
}

fn is_language_range(range: &str) -> bool {
    if range == "*" {
        return true;
    }
    let mut subtags = range.split('-');
    let primary_ok = subtags
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok
        && subtags.all(|s| (1..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Parse an `Accept-Language` header.
pub fn parse_accept_language(input: &str) -> HttpResult<Vec<AcceptLanguage>> {
    let results = parse_no_parameters(input)?;
    if let Some(bad) = results.iter().find(|r| !is_language_range(&r.range)) {
        return Err(reject(format!(
            "Invalid Accept-Language range: {} does not match \
             ((1*8ALPHA *(\"-\" 1*8alphanum)) / \"*\")",
            bad.range
        )));
    }
    Ok(results)
}
