/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    net::{ClientBuilder, Credentials},
    soap::Version,
};

/// Client settings as read from a TOML file:
///
/// ```toml
/// url = "https://outlook.office365.com/EWS/Exchange.asmx"
/// version = "Exchange2013_SP1"
/// username = "someone@example.com"
/// password = "hunter2"
/// timeout_secs = 30
/// ```
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub url: String,
    pub version: Version,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ClientConfig {
    pub fn from_toml_str(config: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&config)
    }

    /// Turns the settings into a builder, to which a logger or buffer pool
    /// can still be added.
    ///
    /// A username without a password authenticates with an empty password.
    pub fn into_builder(self) -> ClientBuilder {
        let mut builder = ClientBuilder::new(self.url, self.version);

        if let Some(username) = self.username {
            builder = builder.credentials(Credentials::new(
                username,
                self.password.unwrap_or_default(),
            ));
        }

        if let Some(timeout_secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        builder
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("version", &self.version)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigError};
    use crate::{error::Error, net::Client, soap::Version};

    #[test]
    fn test_parse_config() {
        let config = ClientConfig::from_toml_str(
            r#"
            url = "https://mail.example.com/EWS/Exchange.asmx"
            version = "Exchange2010_SP2"
            username = "someone"
            password = "secret"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.version, Version::Exchange2010_SP2);
        assert_eq!(config.timeout_secs, Some(5));
        assert!(!format!("{config:?}").contains("secret"));

        let client = config.into_builder().build().unwrap();
        assert_eq!(client.username(), Some("someone"));
        assert_eq!(client.url().host_str(), Some("mail.example.com"));
    }

    #[test]
    fn test_missing_url() {
        let err = ClientConfig::from_toml_str(r#"version = "Exchange2013""#).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_version() {
        let err = ClientConfig::from_toml_str(
            r#"
            url = "https://mail.example.com/EWS/Exchange.asmx"
            version = "Exchange2016"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ClientConfig::load("/nonexistent/ews/config.toml").unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_config_error_converts() {
        fn client_from(path: &str) -> Result<Client, Error> {
            Ok(ClientConfig::load(path)?.into_builder().build()?)
        }

        let err = client_from("/nonexistent/ews/config.toml").unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::Io { .. })));
        assert!(err.to_string().contains("/nonexistent/ews/config.toml"));
    }
}
