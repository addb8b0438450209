//! Path pattern compilation and matching
//!
//! Patterns are split into `/`-delimited segments and compared one segment at
//! a time against the request path. There is no backtracking: a path either
//! matches a pattern or it does not, and a match has exactly one binding.
//!
//! ## Pattern Syntax
//!
//! - `users` - literal segment, compared case-sensitively
//! - `:name` - binds exactly one non-empty path segment under `name`
//! - `*rest` - final segment only; binds the (non-empty) remainder of the path,
//!   including any `/` separators, under `rest`. A bare `*` binds under `*`.
//! - [`ALL_PATHS`] - matches every path, used for filters registered without one
//!
//! The leading `/` of a pattern is optional (`users/:id` is `/users/:id`).
//! A trailing `/` is significant: `/users` does not match `/users/`.
//!
//! ## Example
//!
//! ```rust
//! use routecore::router::PathPattern;
//!
//! let pattern = PathPattern::parse("/files/:owner/*rest").unwrap();
//! let params = pattern.captures("/files/ana/docs/cv.pdf").unwrap();
//! assert_eq!(params[0].1, "ana");
//! assert_eq!(params[1].1, "docs/cv.pdf");
//! assert!(!pattern.matches("/files/ana"));
//! ```

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::RouteError;

/// Sentinel pattern that matches every request path.
pub const ALL_PATHS: &str = "+/*paths";

/// Parameter name used for an anonymous `*` wildcard.
pub const WILDCARD_PARAM: &str = "*";

/// Maximum number of path parameters before heap allocation.
/// Most routes bind ≤4 params (e.g., `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the match hot path.
///
/// Param names are `Arc<str>` shared with the compiled pattern, so binding a
/// parameter costs an atomic increment for the name and one allocation for
/// the value taken from the request path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(Box<str>),
    Param(Arc<str>),
    Wildcard(Arc<str>),
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    all_paths: bool,
}

impl PathPattern {
    /// Compile a pattern, validating its syntax.
    ///
    /// # Errors
    ///
    /// - [`RouteError::EmptyPath`] for an empty pattern
    /// - [`RouteError::EmptyParamName`] for a bare `:` segment
    /// - [`RouteError::WildcardNotLast`] for a `*` segment that is not final
    /// - [`RouteError::DuplicateParam`] when a name is bound twice
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        if pattern.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        if pattern == ALL_PATHS {
            return Ok(Self {
                source: pattern.to_string(),
                segments: Vec::new(),
                all_paths: true,
            });
        }

        let raw: Vec<&str> = strip_root(pattern).split('/').collect();
        let last = raw.len() - 1;
        let mut segments = Vec::with_capacity(raw.len());
        let mut names: SmallVec<[&str; MAX_INLINE_PARAMS]> = SmallVec::new();

        for (i, seg) in raw.iter().enumerate() {
            let (name, segment) = if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouteError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
                (name, Segment::Param(Arc::from(name)))
            } else if let Some(name) = seg.strip_prefix('*') {
                if i != last {
                    return Err(RouteError::WildcardNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                let name = if name.is_empty() { WILDCARD_PARAM } else { name };
                (name, Segment::Wildcard(Arc::from(name)))
            } else {
                segments.push(Segment::Static(Box::from(*seg)));
                continue;
            };

            if names.contains(&name) {
                return Err(RouteError::DuplicateParam {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
            names.push(name);
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
            all_paths: false,
        })
    }

    /// Pattern text as registered
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `true` for the [`ALL_PATHS`] sentinel
    #[inline]
    #[must_use]
    pub fn is_all_paths(&self) -> bool {
        self.all_paths
    }

    /// `true` when the pattern ends in a `*` wildcard
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }

    /// Names bound by this pattern, in path order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Wildcard(name) => Some(name.as_ref()),
            Segment::Static(_) => None,
        })
    }

    /// Check whether `path` matches without collecting parameters.
    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.bind(path, None)
    }

    /// Match `path` and return the parameter bindings in path order.
    ///
    /// Returns `None` when the path does not match. A matching pattern without
    /// parameters yields an empty vector.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        self.bind(path, Some(&mut params)).then_some(params)
    }

    fn bind(&self, path: &str, mut out: Option<&mut ParamVec>) -> bool {
        if self.all_paths {
            return true;
        }

        // Unconsumed part of the path; `None` once every segment is used up.
        let mut cursor = Some(strip_root(path));

        for segment in &self.segments {
            let Some(current) = cursor else {
                return false;
            };

            if let Segment::Wildcard(name) = segment {
                if current.is_empty() {
                    return false;
                }
                if let Some(out) = out.as_deref_mut() {
                    out.push((Arc::clone(name), current.to_string()));
                }
                return true;
            }

            let (part, next) = match current.split_once('/') {
                Some((part, next)) => (part, Some(next)),
                None => (current, None),
            };

            match segment {
                Segment::Static(literal) => {
                    if part != literal.as_ref() {
                        return false;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return false;
                    }
                    if let Some(out) = out.as_deref_mut() {
                        out.push((Arc::clone(name), part.to_string()));
                    }
                }
                Segment::Wildcard(_) => {}
            }
            cursor = next;
        }

        cursor.is_none()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Check `path` against an uncompiled `pattern`.
///
/// Malformed patterns never match.
#[must_use]
pub fn matches(pattern: &str, path: &str) -> bool {
    PathPattern::parse(pattern).is_ok_and(|p| p.matches(path))
}

/// Extract the parameters `pattern` binds in `path`.
///
/// Returns `None` if the pattern is malformed or does not match.
#[must_use]
pub fn extract_params(pattern: &str, path: &str) -> Option<ParamVec> {
    PathPattern::parse(pattern).ok()?.captures(path)
}

#[inline]
fn strip_root(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
