/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use serde::de::DeserializeOwned;

use crate::xml::XmlRoot;

pub const MESSAGES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";
pub const SOAP_NS_URI: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const TYPES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

/// An EWS operation: a request payload and the type of the payload the
/// server answers it with.
pub trait Operation: XmlRoot {
    type Response: DeserializeOwned;
}

mod common;
pub use common::*;

mod find;
pub use find::*;

mod item;
pub use item::*;

mod persona;
pub use persona::*;
