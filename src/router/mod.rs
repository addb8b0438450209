//! # Router Module
//!
//! Path matching, Accept-type negotiation and route resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Storing route entries in registration order ([`RouteRegistry`])
//! - Matching request paths against `:param` / `*wildcard` patterns ([`path`])
//! - Negotiating between routes that differ only by accept type ([`mime`])
//! - Resolving a request to one handler, or collecting every applicable
//!   filter ([`Router`])
//!
//! ## Resolution
//!
//! 1. **Filter**: keep the entries registered for the request method whose
//!    pattern matches the path, in registration order.
//! 2. **Negotiate**: keep the first entry per distinct accept type and ask the
//!    negotiator which accept type best serves the request's `Accept` header.
//! 3. **Bind**: extract the path parameters of the winning entry.
//!
//! Filters (`before`/`after`) skip step 2: every filter whose own accept type
//! is compatible with the header applies, in registration order.
//!
//! ## Example
//!
//! ```rust
//! use routecore::{HttpMethod, router::Router};
//!
//! let mut router = Router::new();
//! router.add_route(HttpMethod::Get, "/a", Some("text/html"), "html").unwrap();
//! router.add_route(HttpMethod::Get, "/a", None, "any").unwrap();
//!
//! let m = router.find_target(HttpMethod::Get, "/a", Some("text/html")).unwrap();
//! assert_eq!(*m.target, "html");
//! let m = router.find_target(HttpMethod::Get, "/a", Some("application/json")).unwrap();
//! assert_eq!(*m.target, "any");
//! ```

mod core;
mod error;
pub mod mime;
pub mod path;
mod registry;

pub use core::{DispatchPlan, Resolution, RouteMatch, Router};
pub use error::RouteError;
pub use path::{extract_params, matches, ParamVec, PathPattern, ALL_PATHS, MAX_INLINE_PARAMS};
pub use registry::{RouteEntry, RouteRegistry, DEFAULT_ACCEPT_TYPE};
