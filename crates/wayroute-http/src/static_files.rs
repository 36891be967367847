//! Static-mount resolution and the extension-based content-type table.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use http::StatusCode;
use percent_encoding::percent_decode_str;
use wayroute_model::RouteError;

use crate::response::RouteResponse;

/// File-extension to content-type table for static responses.
#[derive(Debug, Clone)]
pub struct MimeTypes {
    by_ext: HashMap<String, String>,
    default_type: String,
}

impl MimeTypes {
    /// A table seeded with the common web extensions.
    #[must_use]
    pub fn new(default_type: impl Into<String>) -> Self {
        let mut table = Self {
            by_ext: HashMap::new(),
            default_type: default_type.into(),
        };
        table.insert("html", mime::TEXT_HTML.as_ref());
        table.insert("htm", mime::TEXT_HTML.as_ref());
        table.insert("css", mime::TEXT_CSS.as_ref());
        table.insert("js", mime::TEXT_JAVASCRIPT.as_ref());
        table.insert("json", mime::APPLICATION_JSON.as_ref());
        table.insert("txt", mime::TEXT_PLAIN.as_ref());
        table.insert("xml", mime::TEXT_XML.as_ref());
        table.insert("csv", mime::TEXT_CSV.as_ref());
        table.insert("png", mime::IMAGE_PNG.as_ref());
        table.insert("jpg", mime::IMAGE_JPEG.as_ref());
        table.insert("jpeg", mime::IMAGE_JPEG.as_ref());
        table.insert("gif", mime::IMAGE_GIF.as_ref());
        table.insert("svg", mime::IMAGE_SVG.as_ref());
        table.insert("ico", "image/x-icon");
        table.insert("pdf", mime::APPLICATION_PDF.as_ref());
        table.insert("wasm", "application/wasm");
        table.insert("woff", mime::FONT_WOFF.as_ref());
        table.insert("woff2", mime::FONT_WOFF2.as_ref());
        table
    }

    /// Register or override an extension mapping.
    pub fn insert(&mut self, ext: &str, content_type: &str) {
        self.by_ext
            .insert(ext.to_ascii_lowercase(), content_type.to_owned());
    }

    /// Content type for a file path, by extension.
    #[must_use]
    pub fn lookup(&self, path: &Path) -> &str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_ext.get(&ext.to_ascii_lowercase()))
            .map_or(&self.default_type, String::as_str)
    }
}

impl Default for MimeTypes {
    fn default() -> Self {
        Self::new(mime::TEXT_PLAIN.as_ref())
    }
}

/// Serve a file under a static mount.
///
/// `rest` is the request-path remainder after the mount prefix. It is
/// percent-decoded and joined to `root` component by component; anything
/// that is not a plain path segment (`..`, absolute components) is
/// rejected. Misses and traversal attempts both surface as not-found, so
/// probing cannot distinguish them.
///
/// # Errors
///
/// Returns a not-found error when the path escapes the mount or the file
/// cannot be read.
pub fn serve(root: &Path, rest: &str, mime_types: &MimeTypes) -> Result<RouteResponse, RouteError> {
    let not_found = || RouteError::not_found(format!("Static File: {rest}"));

    let decoded = percent_decode_str(rest)
        .decode_utf8()
        .map_err(|_| not_found())?;
    let relative = Path::new(decoded.as_ref());
    let mut full = PathBuf::from(root);
    for component in relative.components() {
        match component {
            Component::Normal(segment) => full.push(segment),
            Component::CurDir => {}
            _ => return Err(not_found()),
        }
    }

    let data = std::fs::read(&full).map_err(|_| not_found())?;
    Ok(RouteResponse {
        status: StatusCode::OK,
        content_type: Some(mime_types.lookup(&full).to_owned()),
        headers: http::HeaderMap::new(),
        body: Bytes::from(data),
    })
}
