//! HTTP methods understood by the router, including the `before`/`after`
//! pseudo-methods used to register filters.

use std::fmt;
use std::str::FromStr;

use crate::router::RouteError;

/// Method a route entry is registered under.
///
/// Besides the regular request methods there are two filter pseudo-methods:
/// [`HttpMethod::Before`] and [`HttpMethod::After`]. Filters are looked up with
/// [`Router::find_targets`](crate::router::Router::find_targets) and run around
/// the matched handler in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Trace,
    Connect,
    Options,
    /// Filter executed before the handler
    Before,
    /// Filter executed after the handler
    After,
}

impl HttpMethod {
    /// Every method, in declaration order
    pub const ALL: [HttpMethod; 11] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Trace,
        HttpMethod::Connect,
        HttpMethod::Options,
        HttpMethod::Before,
        HttpMethod::After,
    ];

    /// Lowercase token, as accepted by [`HttpMethod::from_str`]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
            HttpMethod::Connect => "connect",
            HttpMethod::Options => "options",
            HttpMethod::Before => "before",
            HttpMethod::After => "after",
        }
    }

    /// `true` for the `before`/`after` filter pseudo-methods
    #[inline]
    #[must_use]
    pub fn is_filter(&self) -> bool {
        matches!(self, HttpMethod::Before | HttpMethod::After)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RouteError;

    /// Parses a method token case-insensitively; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| RouteError::InvalidMethod {
                token: token.to_string(),
            })
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = RouteError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        match *method {
            http::Method::GET => Ok(HttpMethod::Get),
            http::Method::POST => Ok(HttpMethod::Post),
            http::Method::PUT => Ok(HttpMethod::Put),
            http::Method::PATCH => Ok(HttpMethod::Patch),
            http::Method::DELETE => Ok(HttpMethod::Delete),
            http::Method::HEAD => Ok(HttpMethod::Head),
            http::Method::TRACE => Ok(HttpMethod::Trace),
            http::Method::CONNECT => Ok(HttpMethod::Connect),
            http::Method::OPTIONS => Ok(HttpMethod::Options),
            _ => Err(RouteError::InvalidMethod {
                token: method.as_str().to_string(),
            }),
        }
    }
}

impl TryFrom<http::Method> for HttpMethod {
    type Error = RouteError;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        HttpMethod::try_from(&method)
    }
}
