/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::xml::{XmlAttribute, XmlElement};

/// The revision of the EWS schema the server should interpret a request
/// under.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/requestserverversion>.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, XmlAttribute)]
pub enum Version {
    Exchange2007,
    Exchange2007_SP1,
    Exchange2010,
    Exchange2010_SP1,
    Exchange2010_SP2,
    Exchange2013,
    Exchange2013_SP1,
}

impl Version {
    pub const ALL: [Version; 7] = [
        Version::Exchange2007,
        Version::Exchange2007_SP1,
        Version::Exchange2010,
        Version::Exchange2010_SP1,
        Version::Exchange2010_SP2,
        Version::Exchange2013,
        Version::Exchange2013_SP1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Version::Exchange2007 => "Exchange2007",
            Version::Exchange2007_SP1 => "Exchange2007_SP1",
            Version::Exchange2010 => "Exchange2010",
            Version::Exchange2010_SP1 => "Exchange2010_SP1",
            Version::Exchange2010_SP2 => "Exchange2010_SP2",
            Version::Exchange2013 => "Exchange2013",
            Version::Exchange2013_SP1 => "Exchange2013_SP1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown Exchange version `{0}`")]
pub struct UnknownVersion(pub String);

impl FromStr for Version {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::ALL
            .into_iter()
            .find(|version| version.as_str() == s)
            .ok_or_else(|| UnknownVersion(s.to_string()))
    }
}

/// The SOAP header of a request.
///
/// A header always carries exactly one protocol version; the other entries
/// are optional extensions.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/exchange-web-services/ews-xml-elements-in-exchange>.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "soap", child_ns_prefix = "t")]
pub struct Header {
    pub request_server_version: RequestServerVersion,
    pub mailbox_culture: Option<String>,
    pub exchange_impersonation: Option<ExchangeImpersonation>,
    pub time_zone_context: Option<TimeZoneContext>,
}

impl Header {
    pub fn new(version: Version) -> Self {
        Self {
            request_server_version: RequestServerVersion { version },
            mailbox_culture: None,
            exchange_impersonation: None,
            time_zone_context: None,
        }
    }

    pub fn version(&self) -> Version {
        self.request_server_version.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.request_server_version.version = version;
    }

    /// Sets the culture (e.g. `en-US`) used for localized strings in
    /// responses.
    pub fn with_mailbox_culture(mut self, culture: impl Into<String>) -> Self {
        self.mailbox_culture = Some(culture.into());
        self
    }

    /// Performs the request on behalf of another account.
    pub fn with_impersonation(mut self, connecting_sid: ConnectingSid) -> Self {
        self.exchange_impersonation = Some(ExchangeImpersonation { connecting_sid });
        self
    }

    /// Sets the time zone used to interpret and render dates, by Windows
    /// time zone identifier (e.g. `W. Europe Standard Time`).
    pub fn with_time_zone(mut self, id: impl Into<String>) -> Self {
        self.time_zone_context = Some(TimeZoneContext {
            time_zone_definition: TimeZoneDefinition { id: id.into() },
        });
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, XmlElement)]
pub struct RequestServerVersion {
    #[xml_serialize(is_attribute)]
    pub version: Version,
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/exchangeimpersonation>.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(child_ns_prefix = "t")]
pub struct ExchangeImpersonation {
    #[xml_serialize(rename = "ConnectingSID")]
    pub connecting_sid: ConnectingSid,
}

/// The account to impersonate.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "t")]
pub enum ConnectingSid {
    PrincipalName(String),
    SID(String),
    PrimarySmtpAddress(String),
    SmtpAddress(String),
}

#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(child_ns_prefix = "t")]
pub struct TimeZoneContext {
    pub time_zone_definition: TimeZoneDefinition,
}

#[derive(Clone, Debug, PartialEq, XmlElement)]
pub struct TimeZoneDefinition {
    #[xml_serialize(is_attribute)]
    pub id: String,
}

/// The SOAP header of a response.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseHeader {
    pub server_version_info: Option<ServerVersionInfo>,
}

/// The version of the Exchange server which handled a request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/serverversioninfo>.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ServerVersionInfo {
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub major_build_number: Option<u32>,
    pub minor_build_number: Option<u32>,
    pub version: Option<String>,
}
