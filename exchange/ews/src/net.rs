/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{fmt, future::Future, sync::Arc, time::Duration};

use reqwest::{header::CONTENT_TYPE, redirect, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    error::{Error, RequestError},
    logger::{Logger, NopLogger},
    pool::BufferPool,
    request::Request,
    soap::{ResponseEnvelope, Version},
    types::Operation,
    xml::XmlRoot,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A username and password for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configures and builds a [`Client`].
pub struct ClientBuilder {
    url: String,
    version: Version,
    credentials: Option<Credentials>,
    timeout: Duration,
    logger: Arc<dyn Logger>,
    buffer_pool: Option<Arc<BufferPool>>,
}

impl ClientBuilder {
    pub fn new(url: impl Into<String>, version: Version) -> Self {
        Self {
            url: url.into(),
            version,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            logger: Arc::new(NopLogger),
            buffer_pool: None,
        }
    }

    /// Authenticates every request with HTTP Basic auth.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the time allowed for a whole exchange, from connecting to
    /// reading the last byte of the response.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn logger(self, logger: impl Logger + 'static) -> Self {
        self.shared_logger(Arc::new(logger))
    }

    pub fn shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Shares a buffer pool between clients. Each client otherwise gets a
    /// pool of its own.
    pub fn buffer_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.buffer_pool = Some(pool);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let url = Url::parse(&self.url)?;

        // Redirects are returned to the caller rather than followed, since
        // following one would resend the credentials to another host.
        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(self.timeout)
            .build()
            .map_err(Error::HttpClient)?;

        self.logger.server(&url, self.version);

        Ok(Client {
            http,
            url,
            version: self.version,
            credentials: self.credentials,
            logger: self.logger,
            buffer_pool: self.buffer_pool.unwrap_or_default(),
        })
    }
}

/// A client for a single EWS endpoint.
///
/// Each call performs exactly one HTTP exchange; nothing is retried and no
/// state is kept between calls. Clones share the underlying connection pool,
/// logger and buffer pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    url: Url,
    version: Version,
    credentials: Option<Credentials>,
    logger: Arc<dyn Logger>,
    buffer_pool: Arc<BufferPool>,
}

impl Client {
    pub fn builder(url: impl Into<String>, version: Version) -> ClientBuilder {
        ClientBuilder::new(url, version)
    }

    /// Creates an unauthenticated client with default settings.
    pub fn new(url: impl Into<String>, version: Version) -> Result<Self, Error> {
        Self::builder(url, version).build()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The username used for authentication, if any.
    pub fn username(&self) -> Option<&str> {
        self.credentials
            .as_ref()
            .map(|credentials| credentials.username.as_str())
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }

    /// Performs an operation with default request options.
    pub async fn call<O: Operation>(&self, operation: O) -> Result<O::Response, Error> {
        self.send(&Request::new(operation)).await
    }

    /// Sends a request and decodes the contents of the response body as `T`.
    pub async fn send<B, T>(&self, request: &Request<B>) -> Result<T, Error>
    where
        B: XmlRoot,
        T: DeserializeOwned,
    {
        let document = self.exchange(request).await?;
        let envelope = ResponseEnvelope::parse(&document)?;

        Ok(envelope.decode_body()?)
    }

    /// Sends a request and returns the contents of the response body
    /// without decoding them.
    pub async fn send_raw<B: XmlRoot>(&self, request: &Request<B>) -> Result<Vec<u8>, Error> {
        let document = self.exchange(request).await?;
        let envelope = ResponseEnvelope::parse(&document)?;

        Ok(envelope.body().to_vec())
    }

    /// Serializes and sends a request, returning the response before its
    /// body has been read or its status checked.
    pub async fn raw_do<B: XmlRoot>(&self, request: &Request<B>) -> Result<Response, Error> {
        // The envelope is copied out so that the pooled buffer goes back
        // before the first await.
        let body = {
            let mut buf = self.buffer_pool.get();
            request.write_envelope(self.version, &mut buf)?;
            self.logger.http_request(&self.url, &buf);

            buf.to_vec()
        };

        let mut builder = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body);

        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        with_cancellation(request.cancellation(), builder.send())
            .await?
            .map_err(Error::Send)
    }

    /// Performs one exchange and returns the whole response document of a
    /// `200 OK` response.
    async fn exchange<B: XmlRoot>(&self, request: &Request<B>) -> Result<Vec<u8>, Error> {
        let mut response = self.raw_do(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let (body, body_error) =
            with_cancellation(request.cancellation(), read_body(&mut response)).await?;

        self.logger.http_response(status, &headers, &body);

        if status != StatusCode::OK {
            log::warn!("EWS request to {} failed with status {status}", self.url);

            return Err(RequestError::new(status, body, body_error).into());
        }

        match body_error {
            Some(err) => Err(Error::ReadBody(err)),
            None => Ok(body),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url.as_str())
            .field("version", &self.version)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Reads a response body to completion, keeping whatever arrived before a
/// failure.
async fn read_body(response: &mut Response) -> (Vec<u8>, Option<reqwest::Error>) {
    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) => return (body, None),
            Err(err) => return (body, Some(err)),
        }
    }
}

/// Runs `future` to completion unless `token` is cancelled first.
async fn with_cancellation<F: Future>(
    token: Option<&CancellationToken>,
    future: F,
) -> Result<F::Output, Error> {
    match token {
        Some(token) => {
            tokio::select! {
                biased;

                _ = token.cancelled() => Err(Error::Cancelled),
                output = future => Ok(output),
            }
        }

        None => Ok(future.await),
    }
}
