//! Request cookies and queued `Set-Cookie` mutations.
//!
//! The jar parses the incoming `Cookie` header(s) once per request.
//! Mutations (`set`/`clear`) only queue header strings; the router flushes
//! them as `Set-Cookie` response headers during finalization — the
//! response sink is never patched.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use http::header::COOKIE;
use percent_encoding::percent_decode_str;

/// HTTP-date format used for the `expires` attribute.
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Attributes for a queued cookie.
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    /// Absolute expiry. Takes precedence over `lifetime`.
    pub expires: Option<DateTime<Utc>>,
    /// Relative expiry in seconds from now; negative values expire the
    /// cookie immediately.
    pub lifetime: Option<i64>,
    /// Path attribute.
    pub path: Option<String>,
    /// Domain attribute.
    pub domain: Option<String>,
}

impl CookieOptions {
    /// Options that keep the cookie alive for `lifetime`.
    #[must_use]
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            lifetime: Some(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX)),
            ..Self::default()
        }
    }
}

/// Parsed request cookies plus pending `Set-Cookie` headers.
#[derive(Debug, Default)]
pub struct CookieJar {
    values: HashMap<String, String>,
    pending: Vec<String>,
}

impl CookieJar {
    /// Parse the `Cookie` header(s) of a request. Malformed pairs are
    /// skipped; repeated names keep the last occurrence.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for pair in header.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let (Ok(name), Ok(value)) = (
                    percent_decode_str(name).decode_utf8(),
                    percent_decode_str(value).decode_utf8(),
                ) else {
                    continue;
                };
                values.insert(name.into_owned(), value.into_owned());
            }
        }
        Self {
            values,
            pending: Vec::new(),
        }
    }

    /// A cookie sent by the client.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Queue a `Set-Cookie` header. Values are emitted as given — callers
    /// are trusted to keep them header-safe.
    pub fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let mut cookie = format!("{name}={value}");
        let expires = options.expires.or_else(|| {
            options
                .lifetime
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
        });
        if let Some(expires) = expires {
            cookie.push_str("; expires=");
            cookie.push_str(&expires.format(HTTP_DATE).to_string());
        }
        if let Some(path) = &options.path {
            cookie.push_str("; path=");
            cookie.push_str(path);
        }
        if let Some(domain) = &options.domain {
            cookie.push_str("; domain=");
            cookie.push_str(domain);
        }
        self.pending.push(cookie);
    }

    /// Queue an expired `Set-Cookie` header so the client drops the cookie.
    pub fn clear(&mut self, name: &str) {
        self.set(
            name,
            "",
            &CookieOptions {
                lifetime: Some(-1000),
                ..CookieOptions::default()
            },
        );
    }

    /// The queued `Set-Cookie` header values, flush order.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }
}
