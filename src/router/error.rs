use std::fmt;

/// Route registration error
///
/// Returned by [`Router::add_route`](super::Router::add_route) and
/// [`PathPattern::parse`](super::PathPattern::parse) when a registration is
/// malformed. The entry is not stored; nothing else in the router changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The method token is not one of the known methods or filter kinds
    InvalidMethod {
        /// The offending token
        token: String,
    },
    /// A textual route (`get '/path'`) could not be split into method and path
    MalformedRoute {
        /// The full route text
        route: String,
    },
    /// The path pattern is empty
    EmptyPath,
    /// The accept type is empty
    EmptyAcceptType,
    /// The accept type is not a `type/subtype` media range
    InvalidAcceptType {
        /// The offending accept type
        accept_type: String,
    },
    /// A `:` parameter segment has no name
    EmptyParamName {
        /// The pattern containing the segment
        pattern: String,
    },
    /// A `*` wildcard segment appears before the last segment
    WildcardNotLast {
        /// The pattern containing the wildcard
        pattern: String,
    },
    /// The same parameter name is bound twice in one pattern
    DuplicateParam {
        /// The pattern
        pattern: String,
        /// The repeated name
        name: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidMethod { token } => {
                write!(f, "route error: invalid HTTP method '{}'", token)
            }
            RouteError::MalformedRoute { route } => {
                write!(
                    f,
                    "route error: '{}' is not in the form <method> '<path>'",
                    route
                )
            }
            RouteError::EmptyPath => write!(f, "route error: path pattern must not be empty"),
            RouteError::EmptyAcceptType => {
                write!(f, "route error: accept type must not be empty")
            }
            RouteError::InvalidAcceptType { accept_type } => {
                write!(
                    f,
                    "route error: accept type '{}' is not of the form type/subtype",
                    accept_type
                )
            }
            RouteError::EmptyParamName { pattern } => {
                write!(f, "route error: unnamed ':' parameter in '{}'", pattern)
            }
            RouteError::WildcardNotLast { pattern } => {
                write!(
                    f,
                    "route error: wildcard must be the final segment of '{}'",
                    pattern
                )
            }
            RouteError::DuplicateParam { pattern, name } => {
                write!(
                    f,
                    "route error: parameter '{}' is bound more than once in '{}'",
                    name, pattern
                )
            }
        }
    }
}

impl std::error::Error for RouteError {}
