//! Route compilation, matching, and shared router state.
//!
//! This crate is the engine underneath the wayroute HTTP layer:
//!
//! - **Converters** ([`registry`]): named placeholder grammars (`int`,
//!   `float`, `list_int`, ...) with optional value parsers. A parser
//!   returning `None` is the abort signal that makes the matcher skip the
//!   route instead of failing the lookup.
//!
//! - **Pattern compilation** ([`pattern`]): `/user/<int:id>` templates are
//!   compiled once, at registration time, into anchored regexes with
//!   per-placeholder argument metadata.
//!
//! - **Route table** ([`route`]): compiled routes kept sorted by
//!   specificity, so the most constrained template is always attempted
//!   first and ambiguous templates resolve deterministically.
//!
//! - **Matching** ([`matcher`]): walks the sorted table, one anchored regex
//!   attempt per route, decoding and type-converting captures.
//!
//! - **Response cache** ([`cache`]) and **sessions** ([`session`],
//!   [`sweeper`]): the two process-wide shared maps, both safe for
//!   concurrent use.
//!
//! Registration is a startup-time activity: the route table is read-only
//! during dispatch, and adding routes while serving is outside the usage
//! contract.

mod cache;
mod config;
mod error;
mod matcher;
mod pattern;
mod registry;
mod route;
mod session;
mod sweeper;

pub use cache::{CacheEntry, ResponseCache};
pub use config::RouterConfig;
pub use error::RouterBuildError;
pub use matcher::RouteMatch;
pub use pattern::{CompiledPattern, PatternArg, compile_template};
pub use registry::{Converter, ConverterRegistry, ParamParser};
pub use route::{CacheKey, CompiledRoute, RouteOptions, RouteTable, RouteTarget};
pub use session::{Session, SessionStore};
pub use sweeper::SessionSweeper;
