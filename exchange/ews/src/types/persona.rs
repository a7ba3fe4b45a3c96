/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use serde::Deserialize;

use crate::{
    types::{BaseFolderId, BaseShape, IndexedPageItemView, Mailbox, Operation, ResponseClass},
    xml::XmlElement,
};

/// The persona properties to include in the response.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/personashape>.
#[derive(Clone, Debug, Default, PartialEq, Eq, XmlElement)]
#[xml_serialize(child_ns_prefix = "t")]
pub struct PersonaShape {
    pub base_shape: BaseShape,
}

/// A request to search contacts and the directory for people.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/findpeople>.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "m", child_ns_prefix = "m")]
pub struct FindPeople {
    pub persona_shape: Option<PersonaShape>,
    pub indexed_page_item_view: IndexedPageItemView,

    /// The contacts folder or directory to search; the default contacts
    /// folder when absent.
    pub parent_folder_id: Option<BaseFolderId>,

    /// Matched against names, email addresses and phone numbers.
    pub query_string: Option<String>,
}

impl FindPeople {
    pub fn new(indexed_page_item_view: IndexedPageItemView) -> Self {
        Self {
            persona_shape: None,
            indexed_page_item_view,
            parent_folder_id: None,
            query_string: None,
        }
    }
}

impl Operation for FindPeople {
    type Response = FindPeopleResponse;
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/findpeopleresponse>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FindPeopleResponse {
    pub response_class: ResponseClass,
    pub message_text: Option<String>,
    pub response_code: Option<String>,

    #[serde(default)]
    pub people: People,

    pub total_number_of_people_in_view: Option<u32>,
    pub first_matching_row_index: Option<u32>,
    pub first_loaded_row_index: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct People {
    #[serde(rename = "Persona", default)]
    pub personas: Vec<Persona>,
}

/// A person, aggregated from contacts and directory entries.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/persona>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Persona {
    pub persona_id: PersonaId,
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub departments: Option<AttributedStrings>,
    pub email_address: Option<Mailbox>,
    pub email_addresses: Option<EmailAddresses>,
    pub relevance_score: Option<i64>,
    pub business_phone_numbers: Option<PhoneNumbers>,
    pub mobile_phones: Option<PhoneNumbers>,
    pub office_locations: Option<AttributedStrings>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PersonaId {
    pub id: String,
    pub change_key: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct EmailAddresses {
    #[serde(rename = "Address", default)]
    pub addresses: Vec<Mailbox>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PhoneNumbers {
    #[serde(rename = "PhoneNumberAttributedValue", default)]
    pub values: Vec<PhoneNumberAttributedValue>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneNumberAttributedValue {
    pub value: PhoneNumber,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneNumber {
    pub number: String,

    /// E.g. `Business` or `Mobile`.
    #[serde(rename = "Type")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct AttributedStrings {
    #[serde(rename = "StringAttributedValue", default)]
    pub values: Vec<StringAttributedValue>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct StringAttributedValue {
    pub value: String,
}
