//! # routecore
//!
//! **routecore** is the route-matching and dispatch core of a minimalist HTTP
//! micro-framework: it decides *which* registered target serves a request and
//! *which* fault handler applies to an error, and nothing else.
//!
//! ## Overview
//!
//! The HTTP server, request/response objects and handler invocation live in the
//! embedding framework. routecore gives it:
//!
//! - **[`router`]** - path patterns with `:param` segments and a trailing
//!   `*wildcard`, Accept-header negotiation, an ordered route registry and the
//!   resolver ([`Router`])
//! - **[`fault`]** - error-type to handler resolution with an ancestor walk and a
//!   memoized lookup cache ([`FaultRegistry`])
//! - **[`method`]** - the HTTP verbs plus the `before`/`after` filter pseudo-methods
//! - **[`table`]** - YAML/JSON/TOML route tables registered through the same
//!   validation path as code registrations
//! - **[`runtime_config`]** and **[`logging`]** - environment-driven knobs and
//!   `tracing` subscriber setup
//!
//! ### Request Flow
//!
//! ```text
//! request ──▶ Router::find_targets(Before, path, accept)   every matching filter
//!         ──▶ Router::find_target(method, path, accept)    one handler or none
//!         ──▶ Router::find_targets(After, path, accept)    every matching filter
//! handler error ──▶ FaultRegistry::resolve(error_type)     nearest registered ancestor
//! ```
//!
//! [`Router::plan`] performs the three router lookups in one call.
//!
//! ## Quick Start
//!
//! ```rust
//! use routecore::{HttpMethod, Router};
//!
//! let mut router = Router::new();
//! router.add_filter(HttpMethod::Before, None, "auth").unwrap();
//! router.add_route(HttpMethod::Get, "/hello/:name", None, "hello").unwrap();
//!
//! let plan = router.plan(HttpMethod::Get, "/hello/world", Some("text/html"));
//! assert_eq!(plan.before.len(), 1);
//!
//! let handler = plan.resolution.into_match().unwrap();
//! assert_eq!(*handler.target, "hello");
//! assert_eq!(handler.get_path_param("name"), Some("world"));
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut self` and happens during setup. Lookups take `&self`
//! and are safe to run from many threads once setup is complete;
//! [`FaultRegistry`] fills its cache through a concurrent map so racing lookups
//! of the same error type all observe the same result.

pub mod fault;
pub mod logging;
pub mod method;
pub mod router;
pub mod runtime_config;
pub mod table;

pub use fault::{Classified, ErrorType, Fault, FaultRegistry};
pub use method::HttpMethod;
pub use router::{DispatchPlan, Resolution, RouteError, RouteMatch, Router};
pub use table::load_route_table;
