// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flat form decoding.
//
// Values are kept as raw bytes: `file_data` carries a binary document and
// must reach disk unchanged, so no UTF-8 decoding happens here. Malformed
// escapes fail the request.

use axum::http::Method;
use percent_encoding::percent_decode;

use printgate_core::error::{PrintgateError, Result};

/// Form content type whose body is decoded alongside the query string.
const URLENCODED: &str = "application/x-www-form-urlencoded";

/// Ordered `(name, value)` pairs, duplicates preserved.
pub type FormPairs = Vec<(String, Vec<u8>)>;

/// Gather the form of one request: the urlencoded body (for methods that
/// carry one) followed by the query string.
pub fn collect(
    method: &Method,
    content_type: Option<&str>,
    query: Option<&str>,
    body: &[u8],
) -> Result<FormPairs> {
    let mut pairs = FormPairs::new();
    let has_form_body = matches!(*method, Method::POST | Method::PUT | Method::PATCH)
        && content_type.is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(URLENCODED))
        });
    if has_form_body {
        pairs.extend(parse_urlencoded(body)?);
    }
    if let Some(query) = query {
        pairs.extend(parse_urlencoded(query.as_bytes())?);
    }
    Ok(pairs)
}

/// Decode `a=1&b=2` style input. `+` is a space; a `%` not followed by two
/// hex digits rejects the whole form.
pub fn parse_urlencoded(input: &[u8]) -> Result<FormPairs> {
    input
        .split(|&b| b == b'&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| -> Result<(String, Vec<u8>)> {
            let (name, value) = match piece.iter().position(|&b| b == b'=') {
                Some(idx) => (&piece[..idx], &piece[idx + 1..]),
                None => (piece, &piece[piece.len()..]),
            };
            Ok((
                String::from_utf8_lossy(&decode_component(name)?).into_owned(),
                decode_component(value)?,
            ))
        })
        .collect()
}

fn decode_component(raw: &[u8]) -> Result<Vec<u8>> {
    if let Some(idx) = bad_escape(raw) {
        let end = (idx + 3).min(raw.len());
        return Err(PrintgateError::MalformedForm(format!(
            "invalid URL escape \"{}\"",
            String::from_utf8_lossy(&raw[idx..end])
        )));
    }
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    Ok(percent_decode(&spaced).collect())
}

/// Offset of the first `%` that does not start a two-digit hex escape.
fn bad_escape(raw: &[u8]) -> Option<usize> {
    raw.iter().enumerate().find_map(|(idx, &b)| {
        let valid = raw
            .get(idx + 1..idx + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        (b == b'%' && !valid).then_some(idx)
    })
}
