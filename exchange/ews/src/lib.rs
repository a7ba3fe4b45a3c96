/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

/// The `config` module reads client settings from TOML files.
#[cfg(feature = "config")]
pub mod config;

/// The `error` module defines the errors returned by requests.
pub mod error;

/// The `logger` module provides hooks for observing HTTP traffic.
pub mod logger;

/// The `net` module is responsible for making requests to the Exchange Web
/// Services API.
pub mod net;

/// The `pool` module provides the reusable buffers requests are serialized
/// into.
pub mod pool;

/// The `request` module defines the per-call options sent alongside an
/// operation payload.
pub mod request;

/// The `soap` module wraps operation payloads in SOAP envelopes and unwraps
/// them from responses.
pub mod soap;

/// The `types` module defines the various data structures used for EWS requests
/// and responses.
pub mod types;

/// The `xml` module provides utilities for serializing XML.
pub mod xml;

#[cfg(feature = "config")]
pub use config::{ClientConfig, ConfigError};
pub use error::{Error, RequestError, UnmarshalError};
pub use logger::{DebugLogger, Logger, NopLogger};
pub use net::{Client, ClientBuilder, Credentials};
pub use pool::BufferPool;
pub use request::Request;
pub use soap::{Header, Version};
pub use types::Operation;
