//! Response header parsing and validator formatting.

/// Headers of interest from the final response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    /// `ETag` value. Strong tags are stored without quotes; weak tags verbatim.
    pub etag: Option<String>,
}

/// Parse collected header lines into ResponseHeaders.
///
/// With redirects followed, libcurl reports the headers of every hop; each
/// status line starts a new block and only the last block is kept.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("etag") {
                out.etag = normalize_etag(value);
            }
        }
    }

    out
}

fn normalize_etag(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    if value.starts_with("W/") {
        return Some(value.to_string());
    }
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// Format a stored validator for an `If-None-Match` request header.
pub(crate) fn if_none_match_value(validator: &str) -> String {
    if validator.starts_with("W/") || validator.starts_with('"') {
        validator.to_string()
    } else {
        format!("\"{}\"", validator)
    }
}
