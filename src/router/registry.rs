//! Ordered, append-only storage of route entries.
//!
//! Registration order is significant: it decides which entry wins when two
//! entries for the same method and path offer the same accept type, and it
//! is the order in which filters run.

use std::fmt;
use tracing::{debug, error};

use super::mime::MediaRange;
use super::path::{PathPattern, ALL_PATHS};
use super::RouteError;
use crate::method::HttpMethod;

/// Accept type used when a registration does not name one.
pub const DEFAULT_ACCEPT_TYPE: &str = "*/*";

/// A registered (method, path pattern, accept type, target) tuple.
///
/// Entries are immutable once registered. The target is owned by the
/// registry and only ever handed out by reference.
#[derive(Debug, Clone)]
pub struct RouteEntry<T> {
    method: HttpMethod,
    path: PathPattern,
    accept_type: String,
    target: T,
}

impl<T> RouteEntry<T> {
    #[inline]
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn accept_type(&self) -> &str {
        &self.accept_type
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    /// `true` if this entry is registered for `method` and its pattern matches `path`
    #[inline]
    #[must_use]
    pub fn matches(&self, method: HttpMethod, path: &str) -> bool {
        self.method == method && self.path.matches(path)
    }
}

impl<T> fmt::Display for RouteEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.method, self.path, self.accept_type)
    }
}

/// Ordered collection of [`RouteEntry`] values.
///
/// Never deduplicates and never replaces: every successful `add` appends.
#[derive(Debug, Clone)]
pub struct RouteRegistry<T> {
    entries: Vec<RouteEntry<T>>,
}

impl<T> Default for RouteRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for an empty or unparsable accept type or a
    /// malformed path pattern; the registry is left unchanged.
    pub fn add(
        &mut self,
        method: HttpMethod,
        path: &str,
        accept_type: &str,
        target: T,
    ) -> Result<(), RouteError> {
        let accept_type = accept_type.trim();
        if accept_type.is_empty() {
            return Err(RouteError::EmptyAcceptType);
        }
        if MediaRange::parse(accept_type).is_none() {
            return Err(RouteError::InvalidAcceptType {
                accept_type: accept_type.to_string(),
            });
        }
        let path = PathPattern::parse(path.trim())?;

        let entry = RouteEntry {
            method,
            path,
            accept_type: accept_type.to_string(),
            target,
        };
        debug!(
            route = %entry,
            position = self.entries.len(),
            "Route registered"
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Register a route from its textual form, e.g. `get '/hello/:name'`.
    ///
    /// The method token is case-insensitive and the path must be enclosed in
    /// single quotes. Malformed input is logged and skipped; this never
    /// panics. Returns whether the route was registered.
    pub fn process_route(&mut self, route: &str, accept_type: &str, target: T) -> bool {
        let result = parse_route_text(route)
            .and_then(|(method, path)| self.add(method, path, accept_type, target));
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(route = %route, accept_type = %accept_type, error = %e, "Route registration skipped");
                false
            }
        }
    }

    /// Register a filter that applies to every path.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidMethod`] if `method` is not `Before` or `After`,
    /// [`RouteError::EmptyAcceptType`] for an empty accept type.
    pub fn add_filter(
        &mut self,
        method: HttpMethod,
        accept_type: &str,
        target: T,
    ) -> Result<(), RouteError> {
        if !method.is_filter() {
            return Err(RouteError::InvalidMethod {
                token: method.to_string(),
            });
        }
        self.add(method, ALL_PATHS, accept_type, target)
    }

    /// All entries in registration order
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry<T>> {
        self.entries.iter()
    }

    /// Entries registered for `method` whose pattern matches `path`, in
    /// registration order
    pub fn entries_for<'a, 'p>(
        &'a self,
        method: HttpMethod,
        path: &'p str,
    ) -> impl Iterator<Item = &'a RouteEntry<T>> + 'p
    where
        'a: 'p,
    {
        self.entries.iter().filter(move |e| e.matches(method, path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split `get '/path'` into its method and the quoted path.
pub(crate) fn parse_route_text(route: &str) -> Result<(HttpMethod, &str), RouteError> {
    let malformed = || RouteError::MalformedRoute {
        route: route.to_string(),
    };
    let (method, rest) = route.split_once('\'').ok_or_else(malformed)?;
    let path = rest.trim_end().strip_suffix('\'').ok_or_else(malformed)?;
    let method = method.parse::<HttpMethod>()?;
    Ok((method, path.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends_in_order_without_dedup() {
        let mut reg = RouteRegistry::new();
        reg.add(HttpMethod::Get, "/a", "text/html", 1).unwrap();
        reg.add(HttpMethod::Get, "/a", "text/html", 2).unwrap();
        reg.add(HttpMethod::Post, "/a", "*/*", 3).unwrap();
        let targets: Vec<i32> = reg.entries().map(|e| *e.target()).collect();
        assert_eq!(targets, vec![1, 2, 3]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_add_rejects_malformed() {
        let mut reg: RouteRegistry<()> = RouteRegistry::new();
        assert_eq!(
            reg.add(HttpMethod::Get, "", "*/*", ()),
            Err(RouteError::EmptyPath)
        );
        assert_eq!(
            reg.add(HttpMethod::Get, "/a", "  ", ()),
            Err(RouteError::EmptyAcceptType)
        );
        assert!(reg.add(HttpMethod::Get, "/*x/y", "*/*", ()).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_add_rejects_unparsable_accept_type() {
        let mut reg: RouteRegistry<()> = RouteRegistry::new();
        for accept in ["json", "text/", "/html", ";q=0.5"] {
            assert_eq!(
                reg.add(HttpMethod::Get, "/j", accept, ()),
                Err(RouteError::InvalidAcceptType {
                    accept_type: accept.to_string(),
                }),
                "{accept}"
            );
        }
        assert!(!reg.process_route("get '/j'", "json", ()));
        assert!(reg.is_empty());

        // A bare `*` reads as `*/*` and parameters are allowed
        reg.add(HttpMethod::Get, "/j", "*", ()).unwrap();
        reg.add(HttpMethod::Get, "/j", "text/html; charset=utf-8", ())
            .unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_entries_for_outlive_request_path() {
        let mut reg = RouteRegistry::new();
        reg.add(HttpMethod::Get, "/users/:id", "*/*", "user").unwrap();

        let hits: Vec<&RouteEntry<&str>> = {
            let requested = format!("/users/{}", 42);
            reg.entries_for(HttpMethod::Get, &requested).collect()
        };
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0].target(), "user");
    }

    #[test]
    fn test_entries_for_filters_by_method_and_path() {
        let mut reg = RouteRegistry::new();
        reg.add(HttpMethod::Get, "/users/:id", "*/*", "first").unwrap();
        reg.add(HttpMethod::Post, "/users/:id", "*/*", "post").unwrap();
        reg.add(HttpMethod::Get, "/users/me", "*/*", "me").unwrap();
        reg.add(HttpMethod::Get, "/users/:id", "text/html", "second").unwrap();

        let hits: Vec<&str> = reg
            .entries_for(HttpMethod::Get, "/users/me")
            .map(|e| *e.target())
            .collect();
        assert_eq!(hits, vec!["first", "me", "second"]);
    }

    #[test]
    fn test_process_route_parses_text_form() {
        let mut reg = RouteRegistry::new();
        assert!(reg.process_route("GET '/hello/:name'", "*/*", "hello"));
        assert!(reg.process_route("  before '/admin/*'  ", "text/html", "guard"));

        let entry = reg.entries().next().unwrap();
        assert_eq!(entry.method(), HttpMethod::Get);
        assert_eq!(entry.path().as_str(), "/hello/:name");
        assert_eq!(entry.to_string(), "get /hello/:name [*/*]");
    }

    #[test]
    fn test_process_route_skips_bad_input() {
        let mut reg = RouteRegistry::new();
        assert!(!reg.process_route("fetch '/x'", "*/*", 1));
        assert!(!reg.process_route("get /x", "*/*", 2));
        assert!(!reg.process_route("get '/x", "*/*", 3));
        assert!(!reg.process_route("get '/x'", "", 4));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_add_filter_only_accepts_filter_methods() {
        let mut reg = RouteRegistry::new();
        reg.add_filter(HttpMethod::Before, DEFAULT_ACCEPT_TYPE, "log").unwrap();
        assert!(reg.add_filter(HttpMethod::Get, DEFAULT_ACCEPT_TYPE, "nope").is_err());
        let entry = reg.entries().next().unwrap();
        assert!(entry.path().is_all_paths());
        assert!(entry.matches(HttpMethod::Before, "/anything/at/all"));
        assert!(!entry.matches(HttpMethod::After, "/anything"));
    }
}
