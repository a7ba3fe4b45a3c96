/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use ews::{
    types::{BaseFolderId, BaseShape, FindItem, IndexedPageItemView, ItemShape, Traversal, View},
    ClientConfig, DebugLogger, Error,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = ClientConfig::load("config.toml")?;
    let client = config.into_builder().logger(DebugLogger).build()?;

    // List the first page of the inbox.
    let find_item = FindItem::new(
        Traversal::Shallow,
        ItemShape::new(BaseShape::Default),
        vec![BaseFolderId::distinguished("inbox")],
    )
    .with_view(View::IndexedPageItemView(IndexedPageItemView {
        max_entries_returned: Some(25),
        ..Default::default()
    }));

    let response = client.call(find_item).await?;

    // Print a summary of what we found.
    for message in response.messages() {
        let id = message
            .item_id
            .as_ref()
            .map(|id| id.id.as_str())
            .unwrap_or_default();
        let id_short = id.get(..10).unwrap_or(id);

        println!(
            "{}...: {}",
            id_short,
            message.subject.as_deref().unwrap_or("(no subject)")
        );
    }

    Ok(())
}
