//! # Fault Module
//!
//! Maps error types to recovery handlers.
//!
//! ## Error Types
//!
//! Error types form an explicit hierarchy of [`ErrorType`] tags, each holding a
//! pointer to its parent. Declaring the hierarchy as statics keeps the ancestor
//! chain finite and known at compile time:
//!
//! ```rust
//! use routecore::fault::{ErrorType, Fault, FaultRegistry};
//!
//! static EXCEPTION: ErrorType = ErrorType::root("Exception");
//! static IO_ERROR: ErrorType = ErrorType::child("IoError", &EXCEPTION);
//! static TIMEOUT: ErrorType = ErrorType::child("Timeout", &IO_ERROR);
//!
//! let mut faults = FaultRegistry::new();
//! faults.register(Fault::new(&IO_ERROR, "io_handler"));
//!
//! // Timeout has no handler of its own; IoError's handler is used and cached.
//! let fault = faults.resolve(&TIMEOUT).unwrap();
//! assert_eq!(*fault.handler(), "io_handler");
//! ```
//!
//! A handler registered for a root type that every other type descends from
//! acts as a catch-all.
//!
//! ## Caching
//!
//! A type resolved through an ancestor, or resolved to nothing, is cached and
//! never walked again. Registrations made afterwards for that exact type do
//! not change its cached result. Direct registrations are not cached, so
//! overwriting a handler for a type that has one takes effect immediately.
//!
//! ## Thread Safety
//!
//! Registration takes `&mut self` and belongs to application setup. Resolution
//! takes `&self`; the cache is a [`DashMap`], so concurrent first lookups of
//! the same type are safe. Both compute the same value and the first write wins.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on ancestor-chain length, guarding against cyclic statics.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Tag identifying an error type and its parent.
///
/// Two tags are equal when their names are equal; names are expected to be
/// unique across the hierarchy.
#[derive(Debug)]
pub struct ErrorType {
    name: &'static str,
    parent: Option<&'static ErrorType>,
}

impl ErrorType {
    /// A type without a parent
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A type deriving from `parent`
    #[must_use]
    pub const fn child(name: &'static str, parent: &'static ErrorType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&'static ErrorType> {
        self.parent
    }

    /// Ancestors from nearest to farthest, excluding `self`
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent,
            remaining: MAX_HIERARCHY_DEPTH,
        }
    }

    /// `true` if `self` is `other` or descends from it
    #[must_use]
    pub fn is_a(&self, other: &ErrorType) -> bool {
        self == other || self.ancestors().any(|a| a == other)
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ErrorType {}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over an [`ErrorType`]'s ancestor chain
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<&'static ErrorType>,
    remaining: usize,
}

impl Iterator for Ancestors {
    type Item = &'static ErrorType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

/// Errors that know their [`ErrorType`]
pub trait Classified {
    fn error_type(&self) -> &'static ErrorType;
}

/// Recovery handler bound to an error type.
pub struct Fault<H> {
    error_type: &'static ErrorType,
    handler: H,
}

impl<H> Fault<H> {
    #[must_use]
    pub fn new(error_type: &'static ErrorType, handler: H) -> Self {
        Self {
            error_type,
            handler,
        }
    }

    #[inline]
    #[must_use]
    pub fn error_type(&self) -> &'static ErrorType {
        self.error_type
    }

    #[inline]
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Invoke the handler for an error raised while serving `request`.
    pub fn handle<E: ?Sized, R: ?Sized>(&self, error: &E, request: &R)
    where
        H: Fn(&E, &R),
    {
        (self.handler)(error, request)
    }
}

impl<H> fmt::Debug for Fault<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("error_type", &self.error_type.name)
            .finish_non_exhaustive()
    }
}

/// Registry of [`Fault`]s with inheritance-aware, memoized lookup.
pub struct FaultRegistry<H> {
    faults: HashMap<&'static str, Arc<Fault<H>>>,
    cache: DashMap<&'static str, Option<Arc<Fault<H>>>>,
}

impl<H> Default for FaultRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for FaultRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultRegistry")
            .field("registered", &self.faults.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<H> FaultRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            faults: HashMap::new(),
            cache: DashMap::new(),
        }
    }

    /// Store `fault` under its error type, replacing any earlier handler for
    /// that exact type.
    pub fn register(&mut self, fault: Fault<H>) {
        let name = fault.error_type.name;
        if self.faults.insert(name, Arc::new(fault)).is_some() {
            warn!(error_type = name, "Replaced existing fault handler");
        } else {
            debug!(
                error_type = name,
                total_faults = self.faults.len(),
                "Fault handler registered"
            );
        }
    }

    /// Find the handler for `error_type`.
    ///
    /// Checks the cache, then a direct registration, then the ancestors from
    /// nearest to farthest. Inherited and missing results are cached under
    /// `error_type`. Never panics; `None` means the error should propagate.
    #[must_use]
    pub fn resolve(&self, error_type: &'static ErrorType) -> Option<Arc<Fault<H>>> {
        let name = error_type.name;

        if let Some(cached) = self.cache.get(name) {
            debug!(error_type = name, found = cached.is_some(), "Fault cache hit");
            return cached.value().clone();
        }

        if let Some(direct) = self.faults.get(name) {
            return Some(Arc::clone(direct));
        }

        let inherited = error_type
            .ancestors()
            .find_map(|ancestor| self.faults.get(ancestor.name))
            .map(Arc::clone);

        debug!(
            error_type = name,
            handled_by = inherited.as_ref().map(|f| f.error_type.name),
            "Fault resolved through hierarchy"
        );

        self.cache
            .entry(name)
            .or_insert(inherited)
            .value()
            .clone()
    }

    /// Find the handler for an error value.
    #[must_use]
    pub fn resolve_for<E: Classified + ?Sized>(&self, error: &E) -> Option<Arc<Fault<H>>> {
        self.resolve(error.error_type())
    }

    /// Number of registered handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.faults.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Number of memoized resolutions
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    static EXCEPTION: ErrorType = ErrorType::root("Exception");
    static RUNTIME: ErrorType = ErrorType::child("RuntimeException", &EXCEPTION);
    static ILLEGAL_ARG: ErrorType = ErrorType::child("IllegalArgumentException", &RUNTIME);
    static NUMBER_FORMAT: ErrorType =
        ErrorType::child("NumberFormatException", &ILLEGAL_ARG);
    static OTHER_ROOT: ErrorType = ErrorType::root("Unrelated");

    #[test]
    fn test_ancestors_nearest_first() {
        let chain: Vec<&str> = NUMBER_FORMAT.ancestors().map(ErrorType::name).collect();
        assert_eq!(
            chain,
            vec!["IllegalArgumentException", "RuntimeException", "Exception"]
        );
        assert!(NUMBER_FORMAT.is_a(&RUNTIME));
        assert!(!RUNTIME.is_a(&NUMBER_FORMAT));
        assert_eq!(EXCEPTION.ancestors().count(), 0);
    }

    #[test]
    fn test_direct_registration() {
        let mut faults = FaultRegistry::new();
        faults.register(Fault::new(&RUNTIME, 1));
        assert_eq!(*faults.resolve(&RUNTIME).unwrap().handler(), 1);
        assert_eq!(faults.cached_len(), 0);
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let mut faults = FaultRegistry::new();
        faults.register(Fault::new(&EXCEPTION, "exception"));
        faults.register(Fault::new(&ILLEGAL_ARG, "illegal_arg"));
        let fault = faults.resolve(&NUMBER_FORMAT).unwrap();
        assert_eq!(*fault.handler(), "illegal_arg");
        assert_eq!(fault.error_type(), &ILLEGAL_ARG);
    }

    #[test]
    fn test_missing_handler_is_cached_as_none() {
        let mut faults: FaultRegistry<&str> = FaultRegistry::new();
        faults.register(Fault::new(&RUNTIME, "runtime"));
        assert!(faults.resolve(&OTHER_ROOT).is_none());
        assert_eq!(faults.cached_len(), 1);

        // Registered after the first lookup: the cached "none" stays
        faults.register(Fault::new(&OTHER_ROOT, "late"));
        assert!(faults.resolve(&OTHER_ROOT).is_none());
    }

    #[test]
    fn test_overwrite_direct_registration() {
        let mut faults = FaultRegistry::new();
        faults.register(Fault::new(&RUNTIME, "old"));
        assert_eq!(*faults.resolve(&RUNTIME).unwrap().handler(), "old");
        faults.register(Fault::new(&RUNTIME, "new"));
        assert_eq!(faults.len(), 1);
        assert_eq!(*faults.resolve(&RUNTIME).unwrap().handler(), "new");
    }

    #[test]
    fn test_handle_invokes_closure() {
        struct BadInput;
        impl Classified for BadInput {
            fn error_type(&self) -> &'static ErrorType {
                &ILLEGAL_ARG
            }
        }

        let seen = RefCell::new(Vec::new());
        let mut faults = FaultRegistry::new();
        faults.register(Fault::new(&RUNTIME, |_err: &BadInput, req: &str| {
            seen.borrow_mut().push(req.to_string());
        }));

        let fault = faults.resolve_for(&BadInput).unwrap();
        fault.handle(&BadInput, "/users/abc");
        assert_eq!(seen.borrow().as_slice(), ["/users/abc".to_string()]);
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        static LOOP_A: ErrorType = ErrorType::child("LoopA", &LOOP_B);
        static LOOP_B: ErrorType = ErrorType::child("LoopB", &LOOP_A);
        assert_eq!(LOOP_A.ancestors().count(), MAX_HIERARCHY_DEPTH);

        let faults: FaultRegistry<()> = FaultRegistry::new();
        assert!(faults.resolve(&LOOP_A).is_none());
    }

    #[test]
    fn test_debug_output_names_type() {
        let fault = Fault::new(&RUNTIME, ());
        assert!(format!("{fault:?}").contains("RuntimeException"));
    }
}
