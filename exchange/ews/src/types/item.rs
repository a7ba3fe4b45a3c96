/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    types::{BaseFolderId, BodyType, ItemId, Mailbox, Operation, ResponseClass, ResponseMessage},
    xml::{XmlAttribute, XmlElement},
};

/// What to do with a message once it has been created or updated.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem#messagedisposition-attribute>.
#[derive(Clone, Copy, Debug, PartialEq, Eq, XmlAttribute)]
pub enum MessageDisposition {
    /// Save the item in its folder without sending it.
    SaveOnly,

    /// Send the item without keeping a copy.
    SendOnly,

    /// Send the item and save a copy in the saved item folder.
    SendAndSaveCopy,
}

/// Whether and how to send meeting requests for a created calendar item.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem#sendmeetinginvitations-attribute>.
#[derive(Clone, Copy, Debug, PartialEq, Eq, XmlAttribute)]
pub enum SendMeetingInvitations {
    SendToNone,
    SendOnlyToAll,
    SendToAllAndSaveCopy,
}

/// A collection of items of any kind.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/items>.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, XmlElement)]
pub struct Items {
    #[serde(rename = "$value", default)]
    #[xml_serialize(flatten)]
    pub items: Vec<Item>,
}

impl From<Vec<Item>> for Items {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "t")]
pub enum Item {
    Message(Message),
    CalendarItem(CalendarItem),
}

/// An email message.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/message-ex15websvcsotherref>.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, XmlElement)]
#[serde(rename_all = "PascalCase")]
#[xml_serialize(child_ns_prefix = "t")]
pub struct Message {
    pub item_id: Option<ItemId>,
    pub subject: Option<String>,
    pub body: Option<Body>,
    pub date_time_received: Option<DateTime<Utc>>,
    pub to_recipients: Option<Recipients>,
    pub cc_recipients: Option<Recipients>,
    pub bcc_recipients: Option<Recipients>,
    pub from: Option<SingleRecipient>,
    pub is_read: Option<bool>,
}

/// An appointment or meeting.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/calendaritem>.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, XmlElement)]
#[serde(rename_all = "PascalCase")]
#[xml_serialize(child_ns_prefix = "t")]
pub struct CalendarItem {
    pub item_id: Option<ItemId>,
    pub subject: Option<String>,
    pub body: Option<Body>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub is_all_day_event: Option<bool>,
    pub location: Option<String>,
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/body>.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, XmlElement)]
#[serde(rename_all = "PascalCase")]
pub struct Body {
    #[xml_serialize(is_attribute)]
    pub body_type: BodyType,

    #[serde(rename = "$value", default)]
    #[xml_serialize(flatten)]
    pub content: String,
}

impl Body {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            body_type: BodyType::Text,
            content: content.into(),
        }
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self {
            body_type: BodyType::HTML,
            content: content.into(),
        }
    }
}

/// A list of recipients, such as `ToRecipients`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, XmlElement)]
#[xml_serialize(child_ns_prefix = "t")]
pub struct Recipients {
    #[serde(rename = "Mailbox", default)]
    #[xml_serialize(rename = "Mailbox")]
    pub mailboxes: Vec<Mailbox>,
}

impl From<Vec<Mailbox>> for Recipients {
    fn from(mailboxes: Vec<Mailbox>) -> Self {
        Self { mailboxes }
    }
}

/// A single recipient, such as `From`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, XmlElement)]
#[serde(rename_all = "PascalCase")]
#[xml_serialize(child_ns_prefix = "t")]
pub struct SingleRecipient {
    pub mailbox: Mailbox,
}

/// A request to create (and optionally send) one or more items.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitem>.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "m", child_ns_prefix = "m")]
pub struct CreateItem {
    /// Required when creating messages, ignored otherwise.
    #[xml_serialize(is_attribute)]
    pub message_disposition: Option<MessageDisposition>,

    /// Required when creating calendar items, ignored otherwise.
    #[xml_serialize(is_attribute)]
    pub send_meeting_invitations: Option<SendMeetingInvitations>,

    /// The folder to save created items in. Ignored with
    /// [`MessageDisposition::SendOnly`].
    pub saved_item_folder_id: Option<BaseFolderId>,

    pub items: Items,
}

impl Operation for CreateItem {
    type Response = CreateItemResponse;
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/createitemresponse>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateItemResponse {
    pub response_messages: CreateItemResponseMessages,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CreateItemResponseMessages {
    #[serde(rename = "CreateItemResponseMessage", default)]
    pub messages: Vec<ItemResponseMessage>,
}

/// The outcome of an operation on items, with the items it produced.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ItemResponseMessage {
    pub response_class: ResponseClass,
    pub message_text: Option<String>,
    pub response_code: Option<String>,

    #[serde(default)]
    pub items: Items,
}

/// An identifier for an item, or for part of a recurring series.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "t")]
pub enum BaseItemId {
    ItemId(ItemId),

    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/occurrenceitemid>.
    OccurrenceItemId {
        #[xml_serialize(is_attribute)]
        recurring_master_id: String,

        #[xml_serialize(is_attribute)]
        change_key: Option<String>,

        #[xml_serialize(is_attribute)]
        instance_index: u32,
    },

    /// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/recurringmasteritemid>.
    RecurringMasterItemId {
        #[xml_serialize(is_attribute)]
        occurrence_id: String,

        #[xml_serialize(is_attribute)]
        change_key: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, XmlElement)]
pub struct ItemIds(pub Vec<BaseItemId>);

/// A request to send messages which already exist in the store, such as
/// drafts.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/senditem>.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "m", child_ns_prefix = "m")]
pub struct SendItem {
    #[xml_serialize(is_attribute)]
    pub save_item_to_folder: bool,

    pub item_ids: ItemIds,

    /// Where to save the sent copy; the Sent Items folder when absent.
    pub saved_item_folder_id: Option<BaseFolderId>,
}

impl Operation for SendItem {
    type Response = SendItemResponse;
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/senditemresponse>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SendItemResponse {
    pub response_messages: SendItemResponseMessages,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SendItemResponseMessages {
    #[serde(rename = "SendItemResponseMessage", default)]
    pub messages: Vec<ResponseMessage>,
}
