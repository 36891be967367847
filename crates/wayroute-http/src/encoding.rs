//! `Accept-Encoding` negotiation and response compression.

use std::io::Write;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use http::HeaderMap;
use http::header::ACCEPT_ENCODING;
use wayroute_model::ContentEncoding;

/// Pick the response encoding from the request's `Accept-Encoding` header.
///
/// Deflate wins over gzip when the client accepts both; anything else
/// falls back to identity.
#[must_use]
pub fn negotiate(headers: &HeaderMap) -> ContentEncoding {
    let accept = headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    let accept = accept.to_ascii_lowercase();
    if accept.contains("deflate") {
        ContentEncoding::Deflate
    } else if accept.contains("gzip") {
        ContentEncoding::Gzip
    } else {
        ContentEncoding::Identity
    }
}

/// Compress a body with the negotiated encoding.
///
/// Identity returns the input unchanged. Deflate produces the zlib
/// format, matching what browsers expect for `Content-Encoding: deflate`.
///
/// # Errors
///
/// Propagates I/O errors from the underlying encoder.
pub fn encode(body: &[u8], encoding: ContentEncoding) -> std::io::Result<Bytes> {
    match encoding {
        ContentEncoding::Identity => Ok(Bytes::copy_from_slice(body)),
        ContentEncoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(body)?;
            Ok(Bytes::from(encoder.finish()?))
        }
        ContentEncoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(body)?;
            Ok(Bytes::from(encoder.finish()?))
        }
    }
}
