//! Route template compilation.
//!
//! A template like `/user/<int:id>/file<path:rest>` is scanned left to
//! right for `<...>` placeholder groups. Each group contributes a capturing
//! group holding its type's pattern fragment (or `.*` for untyped or
//! unknown type names); literal text outside placeholders is inserted
//! verbatim — template authors are trusted. The whole result is anchored
//! `^...$` and compiled once, at registration time.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::RouterBuildError;
use crate::registry::{Converter, ConverterRegistry};

/// Matches `<name>` or `<type:name>` placeholder groups.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:([^:>]+):)?([^>]+)>").expect("placeholder regex"));

/// One placeholder of a compiled template, in template order.
#[derive(Debug, Clone)]
pub struct PatternArg {
    /// The argument name exposed in the route parameter map.
    pub name: String,
    /// The declared type, or `None` for untyped / unknown type names.
    pub converter: Option<Arc<Converter>>,
}

/// A route template compiled into an anchored matcher plus argument
/// metadata. Immutable after creation.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The original template string.
    pub template: String,
    /// The anchored matcher.
    pub regex: Regex,
    /// Placeholders in template order, parallel to the capture groups.
    pub args: Vec<PatternArg>,
}

impl CompiledPattern {
    /// The literal text before the first placeholder.
    ///
    /// For static-file mounts this is the mount prefix: everything the
    /// placeholders matched past it is resolved against the root directory.
    #[must_use]
    pub fn literal_prefix(&self) -> &str {
        match PLACEHOLDER.find(&self.template) {
            Some(m) => &self.template[..m.start()],
            None => &self.template,
        }
    }
}

/// Compile a route template against the placeholder-type registry.
///
/// # Errors
///
/// [`RouterBuildError::InvalidTemplate`] if the template does not start
/// with `/`; [`RouterBuildError::TemplateRegex`] if the assembled pattern
/// fails to compile (malformed literal text).
pub fn compile_template(
    template: &str,
    registry: &ConverterRegistry,
) -> Result<CompiledPattern, RouterBuildError> {
    if !template.starts_with('/') {
        return Err(RouterBuildError::InvalidTemplate(template.to_owned()));
    }

    let mut args = Vec::new();
    let mut pattern = String::from("^");
    let mut last_end = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).expect("capture 0 always present");
        pattern.push_str(&template[last_end..whole.start()]);
        last_end = whole.end();

        let converter = caps
            .get(1)
            .and_then(|type_name| registry.lookup(type_name.as_str()));
        let fragment = converter
            .as_ref()
            .map_or(".*", |converter| converter.fragment());
        // Arguments map to captures positionally, one group per
        // placeholder. A fragment carrying its own capturing group (the
        // built-in list_int repetition does) shifts every capture after
        // it; custom fragments that need grouping must use `(?:...)`,
        // and a group-bearing placeholder belongs last in its template.
        pattern.push('(');
        pattern.push_str(fragment);
        pattern.push(')');

        args.push(PatternArg {
            name: caps
                .get(2)
                .expect("placeholder name group")
                .as_str()
                .to_owned(),
            converter,
        });
    }
    pattern.push_str(&template[last_end..]);
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|source| RouterBuildError::TemplateRegex {
        template: template.to_owned(),
        source,
    })?;

    tracing::debug!(template, pattern, args = args.len(), "compiled route template");
    Ok(CompiledPattern {
        template: template.to_owned(),
        regex,
        args,
    })
}
