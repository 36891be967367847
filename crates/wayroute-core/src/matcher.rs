//! Path matching against the sorted route table.

use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use wayroute_model::ParamValue;

use crate::route::{CompiledRoute, RouteTable};

/// A successful match: the route plus its decoded, type-converted
/// arguments.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    /// The matched route.
    pub route: &'a Arc<CompiledRoute<H>>,
    /// Placeholder name → typed value.
    pub params: HashMap<String, ParamValue>,
}

impl<H> RouteTable<H> {
    /// Find the first route matching `path`, most specific first.
    ///
    /// One anchored regex attempt per route. On a regex hit, each capture
    /// is percent-decoded and run through its type's parser; a parser abort
    /// (or undecodable capture) turns the hit into a miss and the walk
    /// continues — other candidate splits of the same route are not
    /// retried. `None` when the table is exhausted; the caller treats that
    /// as `NotFound`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_, H>> {
        'routes: for route in &self.routes {
            let Some(captures) = route.pattern.regex.captures(path) else {
                continue;
            };

            let mut params = HashMap::with_capacity(route.pattern.args.len());
            for (idx, arg) in route.pattern.args.iter().enumerate() {
                // idx + 1 relies on each placeholder contributing exactly
                // one capture group; see compile_template.
                let raw = captures
                    .get(idx + 1)
                    .map(|capture| capture.as_str())
                    .unwrap_or_default();
                let Ok(decoded) = percent_decode_str(raw).decode_utf8() else {
                    tracing::debug!(
                        template = route.pattern.template,
                        arg = arg.name,
                        "capture is not valid UTF-8 after decoding; skipping route"
                    );
                    continue 'routes;
                };

                let value = match &arg.converter {
                    Some(converter) => match converter.parse(&decoded) {
                        Some(value) => value,
                        None => {
                            tracing::debug!(
                                template = route.pattern.template,
                                arg = arg.name,
                                "parser aborted; skipping route"
                            );
                            continue 'routes;
                        }
                    },
                    None => ParamValue::Str(decoded.into_owned()),
                };
                params.insert(arg.name.clone(), value);
            }

            tracing::debug!(template = route.pattern.template, path, "matched route");
            return Some(RouteMatch { route, params });
        }
        None
    }
}
