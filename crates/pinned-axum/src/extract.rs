use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use pinned::{FieldMap, Migratable, Version, VersionManager};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::rejection::VersionRejection;

/// The version a request is pinned to, bound to the catalog it came from.
///
/// As an extractor it resolves the request's query parameter and header
/// against the `Arc<VersionManager>` in the router state. When
/// [`pin_version`] already ran, the version it stored in the request
/// extensions is reused.
#[derive(Debug, Clone)]
pub struct PinnedVersion {
    version: Version,
    catalog: Arc<VersionManager>,
}

impl PinnedVersion {
    /// Resolve the version for a request.
    pub fn resolve(catalog: Arc<VersionManager>, parts: &Parts) -> Result<Self, VersionRejection> {
        let resolved = catalog.resolve(parts).map(Version::clone);
        match resolved {
            Ok(version) => Ok(Self { version, catalog }),
            Err(error) => {
                let latest = catalog.latest().map(|v| v.date().to_string());
                Err(VersionRejection::new(error, latest))
            }
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn date(&self) -> &str {
        self.version.date()
    }

    pub fn catalog(&self) -> &Arc<VersionManager> {
        &self.catalog
    }

    /// Migrate an object produced under the pinned version to the canonical
    /// shape.
    pub fn migrate<M: Migratable + ?Sized>(&self, object: &M) -> pinned::Result<FieldMap> {
        self.catalog.apply(&self.version, object)
    }

    /// Migrate an object and deserialize it into the canonical type.
    pub fn migrate_into<T, M>(&self, object: &M) -> pinned::Result<T>
    where
        T: DeserializeOwned,
        M: Migratable + ?Sized,
    {
        self.catalog.apply_into(&self.version, object)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PinnedVersion
where
    Arc<VersionManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = VersionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(pinned) = parts.extensions.get::<PinnedVersion>() {
            return Ok(pinned.clone());
        }
        Self::resolve(Arc::<VersionManager>::from_ref(state), parts)
    }
}

/// Middleware resolving the request version before any handler runs.
///
/// Rejects unpinned, unknown and deprecated versions, stores the resolved
/// [`PinnedVersion`] in the request extensions and echoes the version in the
/// response header the catalog reads it from.
pub async fn pin_version(
    State(catalog): State<Arc<VersionManager>>,
    request: Request,
    next: Next,
) -> Result<Response, VersionRejection> {
    let (mut parts, body) = request.into_parts();
    let pinned = PinnedVersion::resolve(catalog, &parts)?;
    let echo = response_header(&pinned);
    debug!(version = pinned.date(), path = %parts.uri.path(), "pinned request");

    parts.extensions.insert(pinned);
    let mut response = next.run(Request::from_parts(parts, body)).await;
    if let Some((name, value)) = echo {
        response.headers_mut().insert(name, value);
    }
    Ok(response)
}

fn response_header(pinned: &PinnedVersion) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(pinned.catalog.config().header.as_bytes()).ok()?;
    let value = HeaderValue::from_str(pinned.date()).ok()?;
    Some((name, value))
}
