//! Typed-placeholder registry.
//!
//! A [`Converter`] pairs a regex fragment (what the placeholder is allowed
//! to look like in the path) with an optional parser (what value it turns
//! into). The parser contract: given the raw, percent-decoded substring
//! matched for the placeholder, return the converted value, or `None` to
//! abort — "the pattern matched textually, but the value is semantically
//! invalid" — which makes the matcher skip the whole route and keep
//! searching.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use wayroute_model::ParamValue;

use crate::error::RouterBuildError;

/// A placeholder value parser. `None` is the abort signal.
pub type ParamParser = Arc<dyn Fn(&str) -> Option<ParamValue> + Send + Sync>;

/// A named placeholder grammar: regex fragment plus optional value parser.
#[derive(Clone)]
pub struct Converter {
    name: String,
    fragment: String,
    parser: Option<ParamParser>,
}

impl Converter {
    /// The registered type name (`int`, `float`, ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The regex fragment substituted into compiled route patterns.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Convert a raw decoded capture into a typed value.
    ///
    /// Without a parser the raw string is used verbatim. `None` aborts the
    /// route.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<ParamValue> {
        match &self.parser {
            Some(parser) => parser(raw),
            None => Some(ParamValue::Str(raw.to_owned())),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("fragment", &self.fragment)
            .field("parser", &self.parser.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Registry of placeholder types, keyed by name.
///
/// Constructed with the built-in types installed; hosts extend it through
/// [`ConverterRegistry::register`]. Names are unique — re-registering an
/// existing name is rejected.
#[derive(Debug)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<Converter>>,
}

impl ConverterRegistry {
    /// Create a registry with the built-in placeholder types.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            converters: HashMap::new(),
        };
        registry.install_builtins();
        registry
    }

    /// Register a placeholder type.
    ///
    /// # Errors
    ///
    /// [`RouterBuildError::DuplicateConverter`] if the name is taken,
    /// [`RouterBuildError::InvalidFragment`] if the fragment does not
    /// compile as a regular expression.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        fragment: impl Into<String>,
        parser: Option<ParamParser>,
    ) -> Result<(), RouterBuildError> {
        let name = name.into();
        let fragment = fragment.into();

        if self.converters.contains_key(&name) {
            return Err(RouterBuildError::DuplicateConverter(name));
        }
        if let Err(source) = Regex::new(&fragment) {
            return Err(RouterBuildError::InvalidFragment { name, source });
        }

        tracing::debug!(name, fragment, "registered placeholder type");
        self.converters.insert(
            name.clone(),
            Arc::new(Converter {
                name,
                fragment,
                parser,
            }),
        );
        Ok(())
    }

    /// Look up a placeholder type by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<Converter>> {
        self.converters.get(name).cloned()
    }

    fn install_builtins(&mut self) {
        // Built-in registrations use fixed names and valid fragments, so
        // none of these can fail.
        let builtin = [
            (
                "int",
                "[0-9]+",
                Some(Arc::new(|raw: &str| raw.parse::<i64>().ok().map(ParamValue::Int))
                    as ParamParser),
            ),
            (
                "float",
                "[0-9]+[.]?[0-9]*",
                Some(
                    Arc::new(|raw: &str| raw.parse::<f64>().ok().map(ParamValue::Float))
                        as ParamParser,
                ),
            ),
            ("alnum", "[a-zA-Z0-9]+", None),
            ("hexa", "[0-9A-F]+", None),
            ("path", ".*", None),
            (
                "list_int",
                "[0-9]+([,][0-9]+)*",
                Some(Arc::new(parse_int_list) as ParamParser),
            ),
        ];
        for (name, fragment, parser) in builtin {
            self.register(name, fragment, parser)
                .unwrap_or_else(|e| unreachable!("builtin converter: {e}"));
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser for `list_int`: comma-separated integers. An empty list aborts.
fn parse_int_list(raw: &str) -> Option<ParamValue> {
    if raw.is_empty() {
        return None;
    }
    let values = raw
        .split(',')
        .map(str::parse::<i64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    Some(ParamValue::IntList(values))
}
