/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use reqwest::{header::HeaderMap, StatusCode};
use url::Url;

use crate::soap::Version;

/// Observes the traffic of a [`Client`](crate::Client).
///
/// All methods do nothing by default, so implementors only override what
/// they care about. Logging can't fail and can't affect the request.
pub trait Logger: Send + Sync {
    /// Called once, when the client is built.
    fn server(&self, _url: &Url, _version: Version) {}

    /// Called with the serialized envelope before it is sent.
    fn http_request(&self, _url: &Url, _body: &[u8]) {}

    /// Called with the full response before it is decoded.
    fn http_response(&self, _status: StatusCode, _headers: &HeaderMap, _body: &[u8]) {}
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopLogger;

impl Logger for NopLogger {}

/// Forwards traffic to the `log` facade: summaries at debug level, bodies at
/// trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugLogger;

impl Logger for DebugLogger {
    fn server(&self, url: &Url, version: Version) {
        log::debug!("using EWS endpoint {url} with version {version}");
    }

    fn http_request(&self, url: &Url, body: &[u8]) {
        log::debug!("POST {url} ({} bytes)", body.len());
        log::trace!("request body: {}", String::from_utf8_lossy(body));
    }

    fn http_response(&self, status: StatusCode, headers: &HeaderMap, body: &[u8]) {
        log::debug!("response {status} ({} bytes)", body.len());
        log::trace!("response headers: {headers:?}");
        log::trace!("response body: {}", String::from_utf8_lossy(body));
    }
}
