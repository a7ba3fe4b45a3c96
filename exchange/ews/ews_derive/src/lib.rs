/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod xml_attribute;
use xml_attribute::write_attribute_derivation;

mod xml_element;
use xml_element::{
    write_element_derivation_for_enum, write_element_derivation_for_struct, ComponentOptions,
};

/// Derives `crate::xml::XmlAttribute` for a unit enum, using each variant's
/// name as the attribute value.
#[proc_macro_derive(XmlAttribute, attributes(xml_serialize))]
pub fn derive_xml_attribute(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match input.data {
        syn::Data::Enum(enum_input) => write_attribute_derivation(input.ident, enum_input),

        _ => panic!("`XmlAttribute` derivation is only supported for unit enums"),
    }
}

/// Derives `crate::xml::XmlElement` and `crate::xml::XmlRoot`.
///
/// Container options, given as `#[xml_serialize(...)]`:
///
/// - `ns_prefix = "m"`: prefix of the element name (and of variant element
///   names for enums with fields).
/// - `child_ns_prefix = "t"`: default prefix for child elements named after
///   fields.
/// - `default_ns = URI`, `ns = ("t", URI)`: namespace declarations written on
///   the element.
///
/// Field options:
///
/// - `is_attribute`: write the field as an XML attribute.
/// - `ns_prefix = "t"`: prefix for this field's element.
/// - `rename = "Name"`: element or attribute name instead of the PascalCase
///   field name.
/// - `flatten`: write the field's children inline, without an element of its
///   own.
#[proc_macro_derive(XmlElement, attributes(xml_serialize))]
pub fn derive_xml_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let options =
        ComponentOptions::try_from(input.attrs).expect("Unable to parse component attributes");

    match input.data {
        syn::Data::Struct(struct_input) => {
            write_element_derivation_for_struct(input.ident, struct_input, options)
        }
        syn::Data::Enum(enum_input) => {
            write_element_derivation_for_enum(input.ident, enum_input, options)
        }
        syn::Data::Union(_) => panic!("Using unions as XML elements is not supported"),
    }
}
