/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{borrow::Cow, fmt};

use reqwest::StatusCode;

/// Errors which can occur while performing an EWS request.
///
/// Every failure is scoped to the call which produced it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server responded with a status other than `200 OK`.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The response could not be decoded.
    #[error(transparent)]
    Unmarshal(#[from] UnmarshalError),

    #[error("failed to serialize request: {0}")]
    Serialize(#[from] ::xml::writer::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request could not be sent, or no response arrived in time.
    #[error("failed to send request: {0}")]
    Send(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("request was cancelled")]
    Cancelled,

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// A response whose HTTP status was not `200 OK`.
///
/// The body is kept for diagnostics: Exchange usually describes the failure
/// in a SOAP fault. If reading the body failed as well, that failure is kept
/// alongside the status rather than replacing it.
#[derive(Debug)]
pub struct RequestError {
    status: StatusCode,
    body: Vec<u8>,
    body_error: Option<reqwest::Error>,
}

impl RequestError {
    pub(crate) fn new(
        status: StatusCode,
        body: Vec<u8>,
        body_error: Option<reqwest::Error>,
    ) -> Self {
        Self {
            status,
            body,
            body_error,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response body, possibly truncated if `body_error` is set.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The error encountered while reading the response body, if any.
    pub fn body_error(&self) -> Option<&reqwest::Error> {
        self.body_error.as_ref()
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request error: server responded with {}", self.status)?;

        if !self.body.is_empty() {
            write!(f, ": {}", self.body_text().trim())?;
        }

        if let Some(err) = &self.body_error {
            write!(f, " (additionally, reading the response body failed: {err})")?;
        }

        Ok(())
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.body_error
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// A failure to decode a response, either the SOAP envelope or the payload
/// it carries.
#[derive(Debug, thiserror::Error)]
pub enum UnmarshalError {
    #[error("unmarshal error: malformed SOAP envelope: {0}")]
    Envelope(#[from] quick_xml::Error),

    #[error("unmarshal error: response is empty")]
    Empty,

    #[error("unmarshal error: expected a SOAP envelope, found `{0}`")]
    NotAnEnvelope(String),

    #[error("unmarshal error: SOAP envelope has no body")]
    MissingBody,

    #[error("unmarshal error: response ended inside the SOAP envelope")]
    UnexpectedEof,

    #[error("unmarshal error: {0}")]
    Payload(#[from] serde_xml_rs::Error),
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{Error, RequestError};

    #[test]
    fn test_request_error_display() {
        let err = RequestError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            b"Internal error\n".to_vec(),
            None,
        );

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body_text(), "Internal error\n");
        assert_eq!(
            Error::from(err).to_string(),
            "request error: server responded with 500 Internal Server Error: Internal error"
        );
    }
}
