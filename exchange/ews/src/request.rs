/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{borrow::Cow, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    error::Error,
    soap::{self, Header, Version},
    xml::XmlRoot,
};

/// A single EWS request: an operation payload plus per-call options.
#[derive(Clone, Debug)]
pub struct Request<B> {
    body: B,
    header: Option<Header>,
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl<B> Request<B> {
    pub fn new(body: B) -> Self {
        Self {
            body,
            header: None,
            timeout: None,
            cancellation: None,
        }
    }

    /// Sends the request with the given header instead of one built from
    /// the client's version.
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    /// Overrides the client's timeout for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abandons the request once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub fn into_body(self) -> B {
        self.body
    }
}

impl<B: XmlRoot> Request<B> {
    /// Serializes the request as a SOAP envelope, using a header carrying
    /// `default_version` if the request has none.
    pub fn write_envelope(
        &self,
        default_version: Version,
        buf: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let header = match &self.header {
            Some(header) => Cow::Borrowed(header),
            None => Cow::Owned(Header::new(default_version)),
        };

        soap::write_envelope(buf, &header, &self.body)
    }
}

impl<B> From<B> for Request<B> {
    fn from(body: B) -> Self {
        Self::new(body)
    }
}
