/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    types::{BaseFolderId, BaseShape, BodyType, Item, Items, Message, Operation, ResponseClass},
    xml::{XmlAttribute, XmlElement},
};

/// Whether a search finds items in folders or in the folders' dumpsters.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/finditem#traversal-attribute>.
#[derive(Clone, Copy, Debug, PartialEq, Eq, XmlAttribute)]
pub enum Traversal {
    Shallow,
    SoftDeleted,
    Associated,
}

/// The end of the result set a paged view counts its offset from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, XmlAttribute)]
pub enum BasePoint {
    #[default]
    Beginning,
    End,
}

/// The item properties to include in the response.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/itemshape>.
#[derive(Clone, Debug, Default, PartialEq, XmlElement)]
#[xml_serialize(child_ns_prefix = "t")]
pub struct ItemShape {
    pub base_shape: BaseShape,
    pub include_mime_content: Option<bool>,
    pub body_type: Option<BodyType>,
    pub filter_html_content: Option<bool>,
}

impl ItemShape {
    pub fn new(base_shape: BaseShape) -> Self {
        Self {
            base_shape,
            ..Default::default()
        }
    }
}

/// Pages through results by offset.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/indexedpageitemview>.
#[derive(Clone, Copy, Debug, Default, PartialEq, XmlElement)]
pub struct IndexedPageItemView {
    #[xml_serialize(is_attribute)]
    pub max_entries_returned: Option<u32>,

    #[xml_serialize(is_attribute)]
    pub offset: u32,

    #[xml_serialize(is_attribute)]
    pub base_point: BasePoint,
}

/// Expands recurring calendar items into the occurrences falling between two
/// dates.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/calendarview>.
#[derive(Clone, Copy, Debug, PartialEq, XmlElement)]
pub struct CalendarView {
    #[xml_serialize(is_attribute)]
    pub max_entries_returned: Option<u32>,

    #[xml_serialize(is_attribute)]
    pub start_date: DateTime<Utc>,

    #[xml_serialize(is_attribute)]
    pub end_date: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "m")]
pub enum View {
    IndexedPageItemView(IndexedPageItemView),
    CalendarView(CalendarView),
}

#[derive(Clone, Debug, PartialEq, XmlElement)]
pub struct ParentFolderIds(pub Vec<BaseFolderId>);

/// A request to list the items of one or more folders.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/finditem>.
#[derive(Clone, Debug, PartialEq, XmlElement)]
#[xml_serialize(ns_prefix = "m", child_ns_prefix = "m")]
pub struct FindItem {
    /// The manner in which to traverse nested folders.
    #[xml_serialize(is_attribute)]
    pub traversal: Traversal,

    /// The desired properties to include in the response.
    pub item_shape: ItemShape,

    /// Pagination or calendar expansion; without one, every matching item is
    /// returned.
    #[xml_serialize(flatten)]
    pub view: Option<View>,

    /// Identifiers for the folders in which to locate items.
    pub parent_folder_ids: ParentFolderIds,
}

impl FindItem {
    pub fn new(
        traversal: Traversal,
        item_shape: ItemShape,
        parent_folder_ids: Vec<BaseFolderId>,
    ) -> Self {
        Self {
            traversal,
            item_shape,
            view: None,
            parent_folder_ids: ParentFolderIds(parent_folder_ids),
        }
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }
}

impl Operation for FindItem {
    type Response = FindItemResponse;
}

/// The response to a [`FindItem`] request.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/finditemresponse>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FindItemResponse {
    pub response_messages: FindItemResponseMessages,
}

impl FindItemResponse {
    /// The messages found across all searched folders.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.response_messages
            .messages
            .iter()
            .filter_map(|message| message.root_folder.as_ref())
            .flat_map(|folder| folder.items.items.iter())
            .filter_map(|item| match item {
                Item::Message(message) => Some(message),
                _ => None,
            })
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FindItemResponseMessages {
    #[serde(rename = "FindItemResponseMessage", default)]
    pub messages: Vec<FindItemResponseMessage>,
}

/// The result of searching a single folder.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/finditemresponsemessage>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FindItemResponseMessage {
    pub response_class: ResponseClass,
    pub message_text: Option<String>,
    pub response_code: Option<String>,
    pub root_folder: Option<RootFolder>,
}

/// The items found in a folder, with paging information.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/rootfolder-finditemresponsemessage>.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RootFolder {
    pub indexed_paging_offset: Option<u32>,
    pub total_items_in_view: Option<u32>,
    pub includes_last_item_in_range: Option<bool>,

    #[serde(default)]
    pub items: Items,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{
        CalendarView, FindItem, FindItemResponse, IndexedPageItemView, ItemShape, Traversal, View,
    };
    use crate::types::{
        test_utils::{deserialize, serialize},
        BaseFolderId, BaseShape, BodyType, ResponseClass,
    };

    #[test]
    fn test_serialize_find_item() {
        let find_item = FindItem::new(
            Traversal::Shallow,
            ItemShape::new(BaseShape::IdOnly),
            vec![BaseFolderId::distinguished("inbox")],
        )
        .with_view(View::IndexedPageItemView(IndexedPageItemView {
            max_entries_returned: Some(10),
            ..Default::default()
        }));

        assert_eq!(
            serialize(&find_item),
            concat!(
                r#"<m:FindItem Traversal="Shallow">"#,
                r#"<m:ItemShape><t:BaseShape>IdOnly</t:BaseShape></m:ItemShape>"#,
                r#"<m:IndexedPageItemView MaxEntriesReturned="10" Offset="0" BasePoint="Beginning" />"#,
                r#"<m:ParentFolderIds><t:DistinguishedFolderId Id="inbox" /></m:ParentFolderIds>"#,
                r#"</m:FindItem>"#,
            )
        );
    }

    #[test]
    fn test_serialize_calendar_view() {
        let find_item = FindItem::new(
            Traversal::Shallow,
            ItemShape {
                base_shape: BaseShape::Default,
                body_type: Some(BodyType::Text),
                ..Default::default()
            },
            vec![BaseFolderId::distinguished("calendar")],
        )
        .with_view(View::CalendarView(CalendarView {
            max_entries_returned: None,
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap(),
        }));

        assert_eq!(
            serialize(&find_item),
            concat!(
                r#"<m:FindItem Traversal="Shallow">"#,
                r#"<m:ItemShape><t:BaseShape>Default</t:BaseShape><t:BodyType>Text</t:BodyType></m:ItemShape>"#,
                r#"<m:CalendarView StartDate="2024-03-01T00:00:00Z" EndDate="2024-03-08T00:00:00Z" />"#,
                r#"<m:ParentFolderIds><t:DistinguishedFolderId Id="calendar" /></m:ParentFolderIds>"#,
                r#"</m:FindItem>"#,
            )
        );
    }

    #[test]
    fn test_deserialize_find_item_response() {
        let response: FindItemResponse = deserialize(concat!(
            r#"<m:FindItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages" "#,
            r#"xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">"#,
            r#"<m:ResponseMessages><m:FindItemResponseMessage ResponseClass="Success">"#,
            r#"<m:ResponseCode>NoError</m:ResponseCode>"#,
            r#"<m:RootFolder IndexedPagingOffset="2" TotalItemsInView="2" IncludesLastItemInRange="true">"#,
            r#"<t:Items>"#,
            r#"<t:Message><t:ItemId Id="AAMkAD1" ChangeKey="CQAAAB1"/><t:Subject>Quarterly report</t:Subject>"#,
            r#"<t:IsRead>false</t:IsRead></t:Message>"#,
            r#"<t:Message><t:ItemId Id="AAMkAD2" ChangeKey="CQAAAB2"/><t:Subject>Lunch?</t:Subject>"#,
            r#"<t:From><t:Mailbox><t:Name>Alex</t:Name><t:EmailAddress>alex@example.com</t:EmailAddress></t:Mailbox></t:From>"#,
            r#"</t:Message>"#,
            r#"</t:Items></m:RootFolder>"#,
            r#"</m:FindItemResponseMessage></m:ResponseMessages></m:FindItemResponse>"#,
        ));

        let message = &response.response_messages.messages[0];
        assert_eq!(message.response_class, ResponseClass::Success);
        assert_eq!(message.response_code.as_deref(), Some("NoError"));

        let folder = message.root_folder.as_ref().unwrap();
        assert_eq!(folder.total_items_in_view, Some(2));
        assert_eq!(folder.includes_last_item_in_range, Some(true));

        let messages: Vec<_> = response.messages().collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].subject.as_deref(), Some("Quarterly report"));
        assert_eq!(messages[0].is_read, Some(false));
        assert_eq!(
            messages[1].item_id.as_ref().map(|id| id.id.as_str()),
            Some("AAMkAD2")
        );
        assert_eq!(
            messages[1]
                .from
                .as_ref()
                .and_then(|from| from.mailbox.email_address.as_deref()),
            Some("alex@example.com")
        );
    }

    #[test]
    fn test_deserialize_error_response() {
        let response: FindItemResponse = deserialize(concat!(
            r#"<m:FindItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">"#,
            r#"<m:ResponseMessages><m:FindItemResponseMessage ResponseClass="Error">"#,
            r#"<m:MessageText>The specified folder could not be found in the store.</m:MessageText>"#,
            r#"<m:ResponseCode>ErrorFolderNotFound</m:ResponseCode>"#,
            r#"</m:FindItemResponseMessage></m:ResponseMessages></m:FindItemResponse>"#,
        ));

        let message = &response.response_messages.messages[0];
        assert_eq!(message.response_class, ResponseClass::Error);
        assert_eq!(message.response_code.as_deref(), Some("ErrorFolderNotFound"));
        assert!(message.root_folder.is_none());
        assert_eq!(response.messages().count(), 0);
    }
}
