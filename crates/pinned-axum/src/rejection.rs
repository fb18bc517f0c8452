use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pinned::Error;
use serde::Serialize;
use tracing::warn;

/// Why a request could not be pinned to a version.
///
/// Renders as JSON with `400 Bad Request` when no version or an unknown one
/// was supplied, `410 Gone` for deprecated versions and
/// `500 Internal Server Error` for anything else.
#[derive(Debug)]
pub struct VersionRejection {
    error: Error,
    latest: Option<String>,
}

#[derive(Serialize)]
struct RejectionBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<&'a str>,
}

impl VersionRejection {
    /// Wrap an error, pointing the client at `latest` as the upgrade target.
    pub fn new(error: Error, latest: Option<String>) -> Self {
        Self { error, latest }
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Newest version in the catalog at the time of rejection.
    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            Error::NoVersionSupplied | Error::InvalidVersion(_) => StatusCode::BAD_REQUEST,
            Error::VersionDeprecated(_) => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for VersionRejection {
    fn from(error: Error) -> Self {
        Self::new(error, None)
    }
}

impl IntoResponse for VersionRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Error::VersionDeprecated(date) = &self.error {
            warn!(version = %date, latest = ?self.latest, "rejected deprecated API version");
        }
        let body = RejectionBody {
            error: self.error.to_string(),
            latest: self.latest.as_deref(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (Error::NoVersionSupplied, StatusCode::BAD_REQUEST),
            (Error::InvalidVersion("x".into()), StatusCode::BAD_REQUEST),
            (Error::VersionDeprecated("2017-01-02".into()), StatusCode::GONE),
            (
                Error::UnknownVersion("2017-01-02".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(VersionRejection::from(error).status(), status);
        }
    }

    #[test]
    fn response_carries_status() {
        let rejection = VersionRejection::new(
            Error::VersionDeprecated("2017-01-02".into()),
            Some("2018-01-02".into()),
        );
        assert_eq!(rejection.latest(), Some("2018-01-02"));
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }
}
