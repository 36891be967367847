//! Per-request parameter namespaces.

use std::collections::HashMap;

use wayroute_core::Session;
use wayroute_model::ParamValue;

use crate::cookie::CookieJar;
use crate::multipart::MultipartValue;

/// The parsed request body.
#[derive(Debug, Default)]
pub enum PostBody {
    /// No body.
    #[default]
    None,
    /// Form-encoded pairs, in body order.
    Form(Vec<(String, String)>),
    /// Multipart field map.
    Multipart(HashMap<String, MultipartValue>),
}

impl PostBody {
    /// First form value for `name`, if this is a form body.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match self {
            Self::Form(pairs) => pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Multipart field for `name`, if this is a multipart body.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&MultipartValue> {
        match self {
            Self::Multipart(fields) => fields.get(name),
            _ => None,
        }
    }
}

/// The five per-request namespaces: `route`, `get`, `post`, `cookie`,
/// `session`. Request-local; never shared across concurrent requests.
#[derive(Debug, Default)]
pub struct RequestParams {
    /// Typed path-placeholder values.
    pub route: HashMap<String, ParamValue>,
    /// Query-string pairs, in query order.
    pub query: Vec<(String, String)>,
    /// Parsed body.
    pub post: PostBody,
    /// Request cookies plus queued `Set-Cookie` mutations.
    pub cookies: CookieJar,
    /// The mutable session; persisted at finalization only once it
    /// carries at least one data key.
    pub session: Session,
}

impl RequestParams {
    /// First query value for `name`.
    #[must_use]
    pub fn query_first(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse a query string (or form-encoded body) into decoded pairs.
#[must_use]
pub fn parse_pairs(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}
