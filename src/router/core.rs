//! Router core module - hot path for request routing.
//!
//! Resolution never mutates the router, so a fully registered `Router` can be
//! shared (e.g. behind an `Arc`) by any number of request threads.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use smallvec::SmallVec;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::mime;
use super::path::{ParamVec, ALL_PATHS, WILDCARD_PARAM};
use super::registry::{RouteEntry, RouteRegistry};
use super::RouteError;
use crate::method::HttpMethod;
use crate::runtime_config::RuntimeConfig;

/// Result of successfully matching a request to a route entry
///
/// Borrows the target and pattern from the router; the requested path and
/// parameter values belong to the match.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The matched entry's handler
    pub target: &'a T,
    /// Method the matched entry is registered under
    pub method: HttpMethod,
    /// The pattern that matched (e.g. `/users/:id`)
    pub matched_path: &'a str,
    /// The accept type the matched entry was registered with
    pub accept_type: &'a str,
    /// The literal request path
    pub requested_path: String,
    /// Parameters bound by the pattern, in path order
    pub path_params: ParamVec,
}

impl<T> Clone for RouteMatch<'_, T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            method: self.method,
            matched_path: self.matched_path,
            accept_type: self.accept_type,
            requested_path: self.requested_path.clone(),
            path_params: self.path_params.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for RouteMatch<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.method == other.method
            && self.matched_path == other.matched_path
            && self.accept_type == other.accept_type
            && self.requested_path == other.requested_path
            && self.path_params == other.path_params
    }
}

impl<'a, T> RouteMatch<'a, T> {
    fn from_entry(entry: &'a RouteEntry<T>, path: &str) -> Self {
        Self {
            target: entry.target(),
            method: entry.method(),
            matched_path: entry.path().as_str(),
            accept_type: entry.accept_type(),
            requested_path: path.to_string(),
            path_params: entry.path().captures(path).unwrap_or_default(),
        }
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value bound by the pattern's trailing wildcard, whatever it is named
    #[must_use]
    pub fn splat(&self) -> Option<&str> {
        let wildcard = self.matched_path.rsplit('/').next()?.strip_prefix('*')?;
        let name = if wildcard.is_empty() {
            WILDCARD_PARAM
        } else {
            wildcard
        };
        self.get_path_param(name)
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Outcome of [`Router::resolve`]
///
/// Separates "nothing is registered here" from "something is registered here
/// but not for this accept header" so the boundary layer can answer 404 or
/// 406 respectively.
#[derive(Debug, Clone)]
pub enum Resolution<'a, T> {
    Matched(RouteMatch<'a, T>),
    NotFound,
    NotAcceptable,
}

impl<'a, T> Resolution<'a, T> {
    /// The match, if any
    #[must_use]
    pub fn into_match(self) -> Option<RouteMatch<'a, T>> {
        match self {
            Resolution::Matched(m) => Some(m),
            Resolution::NotFound | Resolution::NotAcceptable => None,
        }
    }

    /// Suggested HTTP status for the boundary layer
    #[must_use]
    pub fn status(&self) -> http::StatusCode {
        match self {
            Resolution::Matched(_) => http::StatusCode::OK,
            Resolution::NotFound => http::StatusCode::NOT_FOUND,
            Resolution::NotAcceptable => http::StatusCode::NOT_ACCEPTABLE,
        }
    }
}

/// Everything that runs for one request: before filters, the handler
/// resolution, after filters. Filters are in registration order.
#[derive(Debug, Clone)]
pub struct DispatchPlan<'a, T> {
    pub before: Vec<RouteMatch<'a, T>>,
    pub resolution: Resolution<'a, T>,
    pub after: Vec<RouteMatch<'a, T>>,
}

/// Router that resolves requests against an ordered route registry
///
/// Entries are scanned in registration order: O(n) in the number of routes,
/// with no allocation for non-matching entries.
#[derive(Debug, Clone)]
pub struct Router<T> {
    registry: RouteRegistry<T>,
    config: RuntimeConfig,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Create an empty router with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create an empty router with an explicit configuration
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            registry: RouteRegistry::new(),
            config,
        }
    }

    /// The router's configuration
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The underlying registry
    #[must_use]
    pub fn registry(&self) -> &RouteRegistry<T> {
        &self.registry
    }

    /// Register a route. `accept_type` of `None` uses the configured default.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the registration is malformed; the error is
    /// also logged and the router is left unchanged.
    pub fn add_route(
        &mut self,
        method: HttpMethod,
        path: &str,
        accept_type: Option<&str>,
        target: T,
    ) -> Result<(), RouteError> {
        let accept = accept_type
            .unwrap_or(&self.config.default_accept_type)
            .to_string();
        let result = self.registry.add(method, path, &accept, target);
        if let Err(e) = &result {
            log_rejected(method, path, &accept, e);
        }
        result
    }

    /// Register a route from its textual form (`get '/hello'`), logging and
    /// skipping it if malformed. Returns whether the route was registered.
    pub fn process_route(&mut self, route: &str, accept_type: Option<&str>, target: T) -> bool {
        let accept = accept_type
            .unwrap_or(&self.config.default_accept_type)
            .to_string();
        self.registry.process_route(route, &accept, target)
    }

    /// Register a filter for every path.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add_filter`].
    pub fn add_filter(
        &mut self,
        method: HttpMethod,
        accept_type: Option<&str>,
        target: T,
    ) -> Result<(), RouteError> {
        let accept = accept_type
            .unwrap_or(&self.config.default_accept_type)
            .to_string();
        let result = self.registry.add_filter(method, &accept, target);
        if let Err(e) = &result {
            log_rejected(method, ALL_PATHS, &accept, e);
        }
        result
    }

    /// Find the single best target for a request.
    ///
    /// Candidates are the entries registered for `method` whose pattern
    /// matches `path`. Without an accept header the first candidate wins.
    /// Otherwise the first candidate for each distinct accept type is kept
    /// (later entries repeating an accept type are ignored) and the accept
    /// types are negotiated against the header.
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - the winning entry and its bound parameters
    /// * `None` - no route matched, or none was acceptable
    #[must_use]
    pub fn find_target(
        &self,
        method: HttpMethod,
        path: &str,
        accept: Option<&str>,
    ) -> Option<RouteMatch<'_, T>> {
        self.resolve(method, path, accept).into_match()
    }

    /// Like [`Router::find_target`] but reports why nothing was found.
    #[must_use]
    pub fn resolve(
        &self,
        method: HttpMethod,
        path: &str,
        accept: Option<&str>,
    ) -> Resolution<'_, T> {
        // RT1: Route match attempt
        debug!(
            method = %method,
            path = %path,
            accept = ?accept,
            "Route match attempt"
        );
        let match_start = Instant::now();

        let candidates: SmallVec<[&RouteEntry<T>; 8]> =
            self.registry.entries_for(method, path).collect();

        let resolution = if candidates.is_empty() {
            Resolution::NotFound
        } else {
            match select_candidate(&candidates, accept) {
                Some(entry) => Resolution::Matched(RouteMatch::from_entry(entry, path)),
                None => Resolution::NotAcceptable,
            }
        };

        self.log_resolution(method, path, accept, &resolution, match_start.elapsed());
        resolution
    }

    /// Find every entry for `method` and `path` whose own accept type is
    /// compatible with `accept`, in registration order.
    ///
    /// Used to collect filters. With `accept` of `None` every method+path
    /// match is returned.
    #[must_use]
    pub fn find_targets(
        &self,
        method: HttpMethod,
        path: &str,
        accept: Option<&str>,
    ) -> Vec<RouteMatch<'_, T>> {
        let matches: Vec<_> = self
            .registry
            .entries_for(method, path)
            .filter(|e| accept.map_or(true, |h| mime::is_acceptable(e.accept_type(), h)))
            .map(|e| RouteMatch::from_entry(e, path))
            .collect();

        debug!(
            method = %method,
            path = %path,
            accept = ?accept,
            matched_count = matches.len(),
            "Collected route targets"
        );
        matches
    }

    /// Build the dispatch plan for a request: before filters, the handler
    /// resolution for `method`, after filters.
    #[must_use]
    pub fn plan(
        &self,
        method: HttpMethod,
        path: &str,
        accept: Option<&str>,
    ) -> DispatchPlan<'_, T> {
        DispatchPlan {
            before: self.find_targets(HttpMethod::Before, path, accept),
            resolution: self.resolve(method, path, accept),
            after: self.find_targets(HttpMethod::After, path, accept),
        }
    }

    /// Print all registered routes to stdout
    ///
    /// Useful for debugging and verifying that routes are loaded correctly.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.registry.len());
        for entry in self.registry.entries() {
            println!("[route] {entry}");
        }
    }

    /// Log a summary of the routing table, as done once after setup.
    pub fn log_summary(&self) {
        let routes_summary: Vec<String> = self
            .registry
            .entries()
            .take(10)
            .map(ToString::to_string)
            .collect();
        info!(
            routes_count = self.registry.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
    }

    fn log_resolution(
        &self,
        method: HttpMethod,
        path: &str,
        accept: Option<&str>,
        resolution: &Resolution<'_, T>,
        duration: Duration,
    ) {
        let duration_us = duration.as_micros();
        match resolution {
            Resolution::Matched(m) => {
                if duration > self.config.slow_match_threshold {
                    warn!(
                        method = %method,
                        path = %path,
                        route_pattern = %m.matched_path,
                        accept_type = %m.accept_type,
                        path_params = ?m.path_params,
                        duration_us = duration_us,
                        "Slow route matching detected"
                    );
                } else {
                    // RT3: Route matched
                    debug!(
                        method = %method,
                        path = %path,
                        route_pattern = %m.matched_path,
                        accept_type = %m.accept_type,
                        path_params = ?m.path_params,
                        duration_us = duration_us,
                        "Route matched"
                    );
                }
            }
            // RT4: No route found (404)
            Resolution::NotFound => debug!(
                method = %method,
                path = %path,
                duration_us = duration_us,
                "No route matched"
            ),
            Resolution::NotAcceptable => debug!(
                method = %method,
                path = %path,
                accept = ?accept,
                duration_us = duration_us,
                "No route accepts the requested type"
            ),
        }
    }
}

fn log_rejected(method: HttpMethod, path: &str, accept_type: &str, e: &RouteError) {
    error!(
        method = %method,
        path = %path,
        accept_type = %accept_type,
        error = %e,
        "Route registration skipped"
    );
}

/// Pick the winning candidate. `candidates` is non-empty and in registration order.
fn select_candidate<'a, T>(
    candidates: &[&'a RouteEntry<T>],
    accept: Option<&str>,
) -> Option<&'a RouteEntry<T>> {
    let Some(header) = accept else {
        return candidates.first().copied();
    };

    // First-seen entry per distinct accept type, in first-seen order
    let mut distinct: SmallVec<[&'a RouteEntry<T>; 8]> = SmallVec::new();
    let mut offered: SmallVec<[&'a str; 8]> = SmallVec::new();
    for &entry in candidates {
        let accept_type: &'a str = entry.accept_type();
        if !offered.contains(&accept_type) {
            offered.push(accept_type);
            distinct.push(entry);
        }
    }

    let winner = mime::best_match(offered.as_slice(), header)?;
    let index = offered.iter().position(|a| *a == winner)?;
    distinct.get(index).copied()
}
