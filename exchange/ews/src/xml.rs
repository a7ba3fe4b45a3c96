/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{borrow::Cow, io::Write};

use ::xml::{
    writer::{Error, XmlEvent},
    EmitterConfig, EventWriter,
};
use chrono::{DateTime, SecondsFormat, Utc};

pub use ews_derive::{XmlAttribute, XmlElement};

/// A value which can be written as an XML element.
///
/// The name of the element is chosen by the parent, usually from the name
/// of the field holding the value.
pub trait XmlElement {
    /// Writes the value as an element with the given name.
    fn write_as_element<W: Write>(
        &self,
        writer: &mut EventWriter<W>,
        name: &str,
    ) -> Result<(), Error> {
        writer.write(XmlEvent::start_element(name))?;
        self.write_children(writer)?;
        writer.write(XmlEvent::end_element())
    }

    /// Writes the content of the value, without an enclosing element.
    fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error>;
}

/// An element which knows its own name, such as an operation payload.
pub trait XmlRoot: XmlElement {
    const NAME: &'static str;

    fn write_as_root<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
        self.write_as_element(writer, Self::NAME)
    }
}

/// A value which can be written as the value of an XML attribute.
///
/// Returning `None` omits the attribute.
pub trait XmlAttribute {
    fn attribute_value(&self) -> Option<Cow<'_, str>>;
}

/// Creates a writer suited to emitting a fragment of a larger document: no
/// XML declaration, no indentation.
pub fn fragment_writer<W: Write>(sink: W) -> EventWriter<W> {
    EmitterConfig::new()
        .write_document_declaration(false)
        .perform_indent(false)
        .create_writer(sink)
}

impl XmlElement for String {
    fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
        writer.write(XmlEvent::characters(self))
    }
}

impl XmlElement for bool {
    fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
        writer.write(XmlEvent::characters(if *self { "true" } else { "false" }))
    }
}

impl XmlElement for DateTime<Utc> {
    fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
        let value = self.to_rfc3339_opts(SecondsFormat::Secs, true);
        writer.write(XmlEvent::characters(&value))
    }
}

impl<T: XmlElement> XmlElement for Option<T> {
    fn write_as_element<W: Write>(
        &self,
        writer: &mut EventWriter<W>,
        name: &str,
    ) -> Result<(), Error> {
        match self {
            Some(value) => value.write_as_element(writer, name),
            None => Ok(()),
        }
    }

    fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
        match self {
            Some(value) => value.write_children(writer),
            None => Ok(()),
        }
    }
}

/// Sequences are written as repeated elements sharing the field's name.
impl<T: XmlElement> XmlElement for Vec<T> {
    fn write_as_element<W: Write>(
        &self,
        writer: &mut EventWriter<W>,
        name: &str,
    ) -> Result<(), Error> {
        for value in self {
            value.write_as_element(writer, name)?;
        }

        Ok(())
    }

    fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
        for value in self {
            value.write_children(writer)?;
        }

        Ok(())
    }
}

macro_rules! impl_for_integers {
    ($($ty:ty),*) => {
        $(
            impl XmlElement for $ty {
                fn write_children<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<(), Error> {
                    writer.write(XmlEvent::characters(&self.to_string()))
                }
            }

            impl XmlAttribute for $ty {
                fn attribute_value(&self) -> Option<Cow<'_, str>> {
                    Some(Cow::Owned(self.to_string()))
                }
            }
        )*
    };
}

impl_for_integers!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl XmlAttribute for String {
    fn attribute_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl XmlAttribute for bool {
    fn attribute_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(if *self { "true" } else { "false" }))
    }
}

impl XmlAttribute for DateTime<Utc> {
    fn attribute_value(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_rfc3339_opts(SecondsFormat::Secs, true)))
    }
}

impl<T: XmlAttribute> XmlAttribute for Option<T> {
    fn attribute_value(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(XmlAttribute::attribute_value)
    }
}
