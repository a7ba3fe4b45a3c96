/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use serde::Deserialize;

use crate::xml::{XmlAttribute, XmlElement};

/// The base set of properties to be returned in response to our request, which
/// can be modified by the parent.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/baseshape>.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, XmlElement)]
pub enum BaseShape {
    IdOnly,

    #[default]
    Default,

    AllProperties,
}

/// The format of an item body.
///
/// `Best` asks the server for the richest format available: text for plain
/// text bodies, HTML otherwise.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/bodytype>.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, XmlAttribute, XmlElement)]
pub enum BodyType {
    Best,
    HTML,
    Text,
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/responsemessage>.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Warning,
    Error,
}

/// The outcome of one part of an operation, as found in every response
/// message.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMessage {
    pub response_class: ResponseClass,
    pub message_text: Option<String>,
    pub response_code: Option<String>,
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/itemid>.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, XmlElement)]
#[serde(rename_all = "PascalCase")]
pub struct ItemId {
    #[xml_serialize(is_attribute)]
    pub id: String,

    #[xml_serialize(is_attribute)]
    pub change_key: Option<String>,
}

impl ItemId {
    pub fn new(id: impl Into<String>, change_key: Option<String>) -> Self {
        Self {
            id: id.into(),
            change_key,
        }
    }
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/folderid>.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, XmlElement)]
#[serde(rename_all = "PascalCase")]
pub struct FolderId {
    #[xml_serialize(is_attribute)]
    pub id: String,

    #[xml_serialize(is_attribute)]
    pub change_key: Option<String>,
}

/// An identifier for a remote folder.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "t", child_ns_prefix = "t")]
pub enum BaseFolderId {
    /// An identifier for an arbitrary folder.
    FolderId(FolderId),

    /// An identifier for referencing a folder by name, e.g. "inbox" or
    /// "junkemail".
    ///
    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/distinguishedfolderid>.
    DistinguishedFolderId {
        #[xml_serialize(is_attribute)]
        id: String,

        #[xml_serialize(is_attribute)]
        change_key: Option<String>,

        /// The mailbox owning the folder, when it isn't the caller's own.
        mailbox: Option<Mailbox>,
    },
}

impl BaseFolderId {
    /// Refers to a well-known folder of the caller's mailbox.
    pub fn distinguished(id: impl Into<String>) -> Self {
        BaseFolderId::DistinguishedFolderId {
            id: id.into(),
            change_key: None,
            mailbox: None,
        }
    }
}

/// A mail user, or an address which can receive mail.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/mailbox>.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, XmlElement)]
#[serde(rename_all = "PascalCase")]
#[xml_serialize(child_ns_prefix = "t")]
pub struct Mailbox {
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub routing_type: Option<String>,
    pub mailbox_type: Option<String>,
    pub item_id: Option<ItemId>,
}

impl Mailbox {
    /// A mailbox known only by its SMTP address.
    pub fn smtp(address: impl Into<String>) -> Self {
        Self {
            email_address: Some(address.into()),
            ..Default::default()
        }
    }
}
