//! Multipart form data parser.
//!
//! Parses `multipart/form-data` bodies into a named field map. This is a
//! synchronous parser driven by an explicit scanner state machine over the
//! already-collected body bytes. Parsing is fail-soft: a malformed part is
//! skipped and scanning resumes at the next boundary.

use std::collections::HashMap;

use bytes::Bytes;

/// A single parsed multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    /// A plain form field, decoded as UTF-8 (lossy).
    Text(String),
    /// A file upload, kept as raw bytes.
    File(FilePart),
}

impl MultipartValue {
    /// The text value, if this is a plain field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    /// The file payload, if this is a file field.
    #[must_use]
    pub fn as_file(&self) -> Option<&FilePart> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) => None,
        }
    }
}

/// An uploaded file field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// The client-supplied filename.
    pub filename: String,
    /// The Content-Type of the part, if specified.
    pub content_type: Option<String>,
    /// The raw file bytes.
    pub data: Bytes,
}

/// Scanner position within the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for the next boundary delimiter.
    SeekingBoundary,
    /// Consuming part headers up to the blank line.
    InHeaders,
    /// Accumulating part data up to the next delimiter.
    InData,
}

/// Extract the boundary string from a `Content-Type` header value.
///
/// Returns `None` when the header is not `multipart/form-data` or carries
/// no boundary parameter.
#[must_use]
pub fn extract_boundary(content_type: &str) -> Option<String> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return None;
    }
    for part in content_type.split(';') {
        if let Some(val) = part.trim().strip_prefix("boundary=") {
            let boundary = val.trim_matches('"');
            if !boundary.is_empty() {
                return Some(boundary.to_owned());
            }
        }
    }
    None
}

/// Parse a multipart/form-data body into a field map.
///
/// Fields carrying a `filename` parameter become [`MultipartValue::File`];
/// everything else is decoded as text. Field order in the body does not
/// matter. Parts without a `name` parameter are dropped.
#[must_use]
pub fn parse(body: &[u8], boundary: &str) -> HashMap<String, MultipartValue> {
    let delimiter = format!("--{boundary}");

    let mut fields = HashMap::new();
    let mut state = ScanState::SeekingBoundary;
    let mut remaining = body;
    let mut headers: &[u8] = &[];

    loop {
        match state {
            ScanState::SeekingBoundary => {
                let Some(pos) = find_bytes(remaining, delimiter.as_bytes()) else {
                    break;
                };
                remaining = skip_crlf(&remaining[pos + delimiter.len()..]);
                if remaining.starts_with(b"--") {
                    break;
                }
                state = ScanState::InHeaders;
            }
            ScanState::InHeaders => {
                // Headers end at the first blank line; a part without one
                // is malformed, so resync at the next boundary.
                let Some(pos) = find_bytes(remaining, b"\r\n\r\n") else {
                    state = ScanState::SeekingBoundary;
                    continue;
                };
                headers = &remaining[..pos];
                remaining = &remaining[pos + 4..];
                state = ScanState::InData;
            }
            ScanState::InData => {
                let end = find_bytes(remaining, delimiter.as_bytes()).unwrap_or(remaining.len());
                let data = strip_trailing_crlf(&remaining[..end]);
                if let Some((name, value)) = build_field(headers, data) {
                    fields.insert(name, value);
                }
                remaining = &remaining[end..];
                state = ScanState::SeekingBoundary;
            }
        }
    }

    fields
}

/// Turn a part's headers and data into a named field.
fn build_field(headers: &[u8], data: &[u8]) -> Option<(String, MultipartValue)> {
    let disposition = parse_content_disposition(headers);
    let name = disposition.name?;
    let value = if let Some(filename) = disposition.filename {
        MultipartValue::File(FilePart {
            filename,
            content_type: parse_part_content_type(headers),
            data: Bytes::copy_from_slice(data),
        })
    } else {
        MultipartValue::Text(String::from_utf8_lossy(data).into_owned())
    };
    Some((name, value))
}

/// Parsed Content-Disposition header fields.
struct ContentDisposition {
    name: Option<String>,
    filename: Option<String>,
}

fn parse_content_disposition(headers: &[u8]) -> ContentDisposition {
    let headers_str = String::from_utf8_lossy(headers);
    let mut name = None;
    let mut filename = None;

    for line in headers_str.split("\r\n") {
        if !line
            .to_ascii_lowercase()
            .starts_with("content-disposition:")
        {
            continue;
        }
        if let Some(n) = extract_quoted_param(line, "name") {
            name = Some(n);
        }
        if let Some(f) = extract_quoted_param(line, "filename") {
            filename = Some(f);
        }
    }

    ContentDisposition { name, filename }
}

/// Extract the Content-Type from a part's headers section.
fn parse_part_content_type(headers: &[u8]) -> Option<String> {
    let headers_str = String::from_utf8_lossy(headers);
    for line in headers_str.split("\r\n") {
        if let Some(rest) = line.to_ascii_lowercase().strip_prefix("content-type:") {
            return Some(rest.trim().to_owned());
        }
    }
    None
}

/// Extract a `param="value"` (or unquoted `param=value`) from a header line.
fn extract_quoted_param(header_line: &str, param_name: &str) -> Option<String> {
    let quoted_pattern = format!("{param_name}=\"");
    let unquoted_pattern = format!("{param_name}=");
    let lower_line = header_line.to_ascii_lowercase();

    if let Some(pos) = lower_line.find(&quoted_pattern) {
        let rest = &header_line[pos + quoted_pattern.len()..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_owned());
        }
    }

    if let Some(pos) = lower_line.find(&unquoted_pattern) {
        let rest = &header_line[pos + unquoted_pattern.len()..];
        let end = rest.find(';').unwrap_or(rest.len());
        let val = rest[..end].trim().to_owned();
        if !val.is_empty() {
            return Some(val);
        }
    }

    None
}

/// Find the position of a needle in a haystack.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Skip leading \r\n.
fn skip_crlf(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\r\n").unwrap_or(data)
}

/// Strip trailing \r\n.
fn strip_trailing_crlf(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n").unwrap_or(data)
}
