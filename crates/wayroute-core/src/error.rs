//! Registration-time errors.

/// Errors raised while building a router: registering placeholder types,
/// compiling route templates, or declaring exception kinds.
///
/// These are distinct from request-time [`RouteError`](wayroute_model::RouteError)s:
/// a build error means the program is misconfigured, not that a request failed.
#[derive(Debug, thiserror::Error)]
pub enum RouterBuildError {
    /// A placeholder type with this name already exists.
    #[error("placeholder type '{0}' is already registered")]
    DuplicateConverter(String),

    /// The pattern fragment does not compile as a regular expression.
    #[error("placeholder type '{name}' has an invalid pattern fragment")]
    InvalidFragment {
        /// The placeholder type name.
        name: String,
        /// The regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// A route template must begin with `/`.
    #[error("route template '{0}' must begin with '/'")]
    InvalidTemplate(String),

    /// The assembled route regex failed to compile (bad literal text).
    #[error("route template '{template}' does not compile as a matcher")]
    TemplateRegex {
        /// The offending template.
        template: String,
        /// The regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// An exception kind with this name already exists.
    #[error("exception kind '{0}' is already registered")]
    DuplicateException(String),

    /// A callback was registered for an exception kind that does not exist.
    #[error("unknown exception kind '{0}'")]
    UnknownException(String),
}
