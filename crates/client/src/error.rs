//! Error types for CoinGecko API calls.
//!
//! Every failure carries the upstream HTTP status and raw response
//! body when one was received, so callers can match on the variant
//! to decide on recovery (e.g. back off on `TooManyRequests`).

use reqwest::StatusCode;
use thiserror::Error;

/// Typed failure for a CoinGecko API call.
///
/// Each variant corresponds to one failure kind; the mapping from
/// HTTP status to variant lives in [`Error::from_status`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("bad request (HTTP 400): {body}")]
    BadRequest { body: String },

    #[error("unauthorized (HTTP 401): {body}")]
    Unauthorized { body: String },

    #[error("forbidden (HTTP 403): {body}")]
    Forbidden { body: String },

    #[error("not found (HTTP 404): {body}")]
    NotFound { body: String },

    #[error("rate limited (HTTP 429): {body}")]
    TooManyRequests { body: String },

    #[error("server error (HTTP {status}): {body}")]
    ServerError { status: u16, body: String },

    /// Network-level failure before any response was received
    /// (DNS, TCP, TLS, timeout).
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// 2xx response whose body is not valid JSON.
    #[error("invalid JSON in response body: {message}")]
    Decode { message: String },

    #[error("unexpected response{}: {body}", fmt_status(.status))]
    Unknown { status: Option<u16>, body: String },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!(" (HTTP {s})"),
        None => String::new(),
    }
}

impl Error {
    /// Map an upstream HTTP status to the matching error kind.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => Error::BadRequest { body },
            401 => Error::Unauthorized { body },
            403 => Error::Forbidden { body },
            404 => Error::NotFound { body },
            429 => Error::TooManyRequests { body },
            s if (500..600).contains(&s) => Error::ServerError { status: s, body },
            s => Error::Unknown {
                status: Some(s),
                body,
            },
        }
    }

    /// The upstream HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::BadRequest { .. } => Some(400),
            Error::Unauthorized { .. } => Some(401),
            Error::Forbidden { .. } => Some(403),
            Error::NotFound { .. } => Some(404),
            Error::TooManyRequests { .. } => Some(429),
            Error::ServerError { status, .. } => Some(*status),
            Error::Unknown { status, .. } => *status,
            Error::ConnectionFailed { .. } | Error::Decode { .. } => None,
        }
    }

    /// The raw upstream response body, when one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::BadRequest { body }
            | Error::Unauthorized { body }
            | Error::Forbidden { body }
            | Error::NotFound { body }
            | Error::TooManyRequests { body }
            | Error::ServerError { body, .. }
            | Error::Unknown { body, .. } => Some(body),
            Error::ConnectionFailed { .. } | Error::Decode { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_kind() {
        assert!(matches!(
            Error::from_status(StatusCode::BAD_REQUEST, String::new()),
            Error::BadRequest { .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::UNAUTHORIZED, String::new()),
            Error::Unauthorized { .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::FORBIDDEN, String::new()),
            Error::Forbidden { .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::NOT_FOUND, String::new()),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            Error::TooManyRequests { .. }
        ));
    }

    #[test]
    fn every_5xx_maps_to_server_error() {
        for code in [500u16, 502, 503, 599] {
            let status = StatusCode::from_u16(code).unwrap();
            let err = Error::from_status(status, "upstream".into());
            assert!(matches!(err, Error::ServerError { .. }), "HTTP {code}");
            assert_eq!(err.status(), Some(code));
        }
    }

    #[test]
    fn unrecognized_status_maps_to_unknown() {
        let err = Error::from_status(StatusCode::IM_A_TEAPOT, "teapot".into());
        match err {
            Error::Unknown { status, ref body } => {
                assert_eq!(status, Some(418));
                assert_eq!(body, "teapot");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn status_accessor_exposes_upstream_code() {
        let err = Error::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.body(), Some("slow down"));

        let err = Error::Decode {
            message: "expected value".into(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);

        let err = Error::ConnectionFailed {
            message: "dns".into(),
        };
        assert_eq!(err.status(), None);
    }
}
