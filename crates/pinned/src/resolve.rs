//! Selecting the version a request is pinned to.
//!
//! A request may name a version in a query parameter, in a header, or both.
//! Each supplied value must exist in the catalog; when both are valid the
//! more recent date wins, with no precedence between the two sources.

use std::borrow::Cow;

use http::request::Parts;
use http::{HeaderMap, Request, Uri};
use tracing::debug;

use crate::error::{Error, Result};
use crate::manager::{ResolverConfig, VersionManager};
use crate::version::Version;

/// Anything that can hand the resolver its two candidate version strings.
pub trait VersionSource {
    /// Value of the query parameter named `name`, if present.
    fn query_value(&self, name: &str) -> Option<Cow<'_, str>>;
    /// Value of the header named `name`, if present.
    fn header_value(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Candidate versions supplied directly rather than through a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    pub query: Option<String>,
    pub header: Option<String>,
}

impl Candidates {
    pub fn query(date: impl Into<String>) -> Self {
        Self {
            query: Some(date.into()),
            header: None,
        }
    }

    pub fn header(date: impl Into<String>) -> Self {
        Self {
            query: None,
            header: Some(date.into()),
        }
    }

    pub fn both(query: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            header: Some(header.into()),
        }
    }
}

impl VersionSource for Candidates {
    fn query_value(&self, _name: &str) -> Option<Cow<'_, str>> {
        self.query.as_deref().map(Cow::Borrowed)
    }

    fn header_value(&self, _name: &str) -> Option<Cow<'_, str>> {
        self.header.as_deref().map(Cow::Borrowed)
    }
}

impl VersionSource for Parts {
    fn query_value(&self, name: &str) -> Option<Cow<'_, str>> {
        query_param(&self.uri, name)
    }

    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        header(&self.headers, name)
    }
}

impl<B> VersionSource for Request<B> {
    fn query_value(&self, name: &str) -> Option<Cow<'_, str>> {
        query_param(self.uri(), name)
    }

    fn header_value(&self, name: &str) -> Option<Cow<'_, str>> {
        header(self.headers(), name)
    }
}

/// First value of `name` in the URI query string, percent-decoded.
///
/// Keys and values that decode to invalid UTF-8 are kept with replacement
/// characters, so a present but garbled value still fails the catalog lookup
/// instead of vanishing.
fn query_param<'a>(uri: &'a Uri, name: &str) -> Option<Cow<'a, str>> {
    uri.query()?
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| percent_decode(key) == name)
        .map(|(_, value)| percent_decode(value))
}

fn percent_decode(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(raw.as_bytes()) {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Value of header `name`; non-ASCII bytes are decoded lossily.
fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    let value = headers.get(name)?;
    Some(match String::from_utf8_lossy(value.as_bytes()) {
        Cow::Borrowed(v) => Cow::Borrowed(v.trim()),
        Cow::Owned(v) => Cow::Owned(v.trim().to_string()),
    })
}

/// Which request field a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Query,
    Header,
}

impl VersionManager {
    /// Resolve the version a request is pinned to.
    ///
    /// The query candidate is validated before the header one, so an
    /// unknown query value fails without the header being consulted.
    pub fn resolve<S: VersionSource + ?Sized>(&self, request: &S) -> Result<&Version> {
        let ResolverConfig {
            query_param: query_name,
            header: header_name,
        } = &self.config;
        let query = non_empty(request.query_value(query_name));
        let header = non_empty(request.header_value(header_name));

        if query.is_none() && header.is_none() {
            debug!("request carried no API version");
            return Err(Error::NoVersionSupplied);
        }

        let from_query = query
            .as_deref()
            .map(|date| self.candidate(date, Origin::Query))
            .transpose()?;
        let from_header = header
            .as_deref()
            .map(|date| self.candidate(date, Origin::Header))
            .transpose()?;

        // Lower index is newer.
        let idx = match (from_query, from_header) {
            (Some(q), Some(h)) => q.min(h),
            (Some(idx), None) | (None, Some(idx)) => idx,
            (None, None) => return Err(Error::NoVersionSupplied),
        };

        let version = &self.entries[idx].version;
        if version.is_deprecated() {
            debug!(version = version.date(), "request pinned to deprecated version");
            return Err(Error::VersionDeprecated(version.date().to_string()));
        }
        debug!(version = version.date(), "resolved API version");
        Ok(version)
    }

    fn candidate(&self, date: &str, origin: Origin) -> Result<usize> {
        self.position(date).ok_or_else(|| {
            debug!(version = date, source = ?origin, "unknown API version");
            Error::InvalidVersion(date.to_string())
        })
    }
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<Cow<'_, str>> {
    value.filter(|v| !v.is_empty())
}
