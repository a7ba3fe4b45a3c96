/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote, ToTokens};
use syn::{
    punctuated::Punctuated, token::Comma, Attribute, DataEnum, DataStruct, Expr, ExprLit, Ident,
    Lit, Meta, Token,
};

const MACRO_ATTRIBUTE: &str = "xml_serialize";

pub(super) fn write_element_derivation_for_struct(
    ident: Ident,
    data: DataStruct,
    options: ComponentOptions,
) -> proc_macro::TokenStream {
    let fields: Vec<_> = match data.fields {
        syn::Fields::Named(fields) => fields
            .named
            .into_iter()
            .map(|field| {
                let field_ident = field.ident.clone().unwrap();

                Ok(Field {
                    name: Some(field_ident.clone()),
                    accessor: quote!(&self.#field_ident),
                    options: FieldOptions::try_from(field.attrs)?,
                })
            })
            .collect::<Result<Vec<_>, &str>>()
            .expect("Unable to process struct field"),

        syn::Fields::Unnamed(fields) => fields
            .unnamed
            .into_iter()
            .enumerate()
            .map(|(index, field)| {
                let positional = Literal::usize_unsuffixed(index);

                let options = FieldOptions::try_from(field.attrs)?;
                if options.is_attribute {
                    panic!("Unnamed fields may not be XML attributes");
                }

                Ok(Field {
                    name: None,
                    accessor: quote!(&self.#positional),
                    options,
                })
            })
            .collect::<Result<Vec<_>, &str>>()
            .expect("Unable to process struct field"),

        syn::Fields::Unit => Default::default(),
    };

    let FieldCalls {
        attribute_locals,
        attribute_calls,
        element_calls,
    } = fields_to_calls(fields, options.child_prefix.as_ref());

    let xmlns_calls = namespaces_to_calls(options.namespaces);

    // Keep childless elements free of unused variable warnings.
    let writer_usage = if element_calls.is_empty() {
        quote!(let _ = writer;)
    } else {
        TokenStream::new()
    };

    let element_name = get_component_name(&ident, options.prefix.as_ref());
    quote!(
        #[automatically_derived]
        impl crate::xml::XmlElement for #ident {
            fn write_as_element<W: std::io::Write>(
                &self,
                writer: &mut ::xml::EventWriter<W>,
                name: &str,
            ) -> Result<(), ::xml::writer::Error> {
                #(#attribute_locals)*

                let builder = ::xml::writer::XmlEvent::start_element(name);
                #xmlns_calls
                #(#attribute_calls)*
                writer.write(builder)?;

                crate::xml::XmlElement::write_children(self, writer)?;

                writer.write(::xml::writer::XmlEvent::end_element())
            }

            fn write_children<W: std::io::Write>(
                &self,
                writer: &mut ::xml::EventWriter<W>,
            ) -> Result<(), ::xml::writer::Error> {
                #writer_usage
                #(#element_calls)*

                Ok(())
            }
        }

        #[automatically_derived]
        impl crate::xml::XmlRoot for #ident {
            const NAME: &'static str = #element_name;
        }
    )
    .into()
}

pub(super) fn write_element_derivation_for_enum(
    ident: Ident,
    data: DataEnum,
    enum_options: ComponentOptions,
) -> proc_macro::TokenStream {
    let is_unit_enum = data
        .variants
        .iter()
        .all(|variant| matches!(variant.fields, syn::Fields::Unit));
    if is_unit_enum {
        write_element_derivation_for_unit_enum(ident, data, enum_options)
    } else {
        write_element_derivation_for_structured_enum(ident, data, enum_options)
    }
}

/// Unit enums are written as text content, e.g. `<t:BaseShape>IdOnly</t:BaseShape>`.
fn write_element_derivation_for_unit_enum(
    ident: Ident,
    data: DataEnum,
    options: ComponentOptions,
) -> proc_macro::TokenStream {
    let variant_arms: Vec<_> = data
        .variants
        .into_iter()
        .map(|variant| {
            let variant_name = variant.ident;
            let as_string = variant_name.to_string();

            quote!(Self::#variant_name => #as_string)
        })
        .collect();

    let xmlns_calls = namespaces_to_calls(options.namespaces);

    let element_name = get_component_name(&ident, options.prefix.as_ref());
    quote!(
        #[automatically_derived]
        impl crate::xml::XmlElement for #ident {
            fn write_as_element<W: std::io::Write>(
                &self,
                writer: &mut ::xml::EventWriter<W>,
                name: &str,
            ) -> Result<(), ::xml::writer::Error> {
                let builder = ::xml::writer::XmlEvent::start_element(name);
                #xmlns_calls
                writer.write(builder)?;

                crate::xml::XmlElement::write_children(self, writer)?;

                writer.write(::xml::writer::XmlEvent::end_element())
            }

            fn write_children<W: std::io::Write>(
                &self,
                writer: &mut ::xml::EventWriter<W>,
            ) -> Result<(), ::xml::writer::Error> {
                let characters: &'static str = match self {
                    #(#variant_arms),*
                };

                writer.write(::xml::writer::XmlEvent::characters(characters))
            }
        }

        #[automatically_derived]
        impl crate::xml::XmlRoot for #ident {
            const NAME: &'static str = #element_name;
        }
    )
    .into()
}

/// Enums with fields write one child element per value, named after the
/// variant, e.g. `<t:DistinguishedFolderId Id="inbox"/>`.
fn write_element_derivation_for_structured_enum(
    ident: Ident,
    data: DataEnum,
    options: ComponentOptions,
) -> proc_macro::TokenStream {
    let xmlns_calls: TokenStream = namespaces_to_calls(options.namespaces);

    let variant_arms: Vec<_> = data
        .variants
        .into_iter()
        .map(|variant| {
            let ident = variant.ident;
            let variant_name = get_component_name(&ident, options.prefix.as_ref());

            match variant.fields {
                syn::Fields::Named(fields) => {
                    let fields = fields
                        .named
                        .into_iter()
                        .map(|field| {
                            let binding = field.ident.clone().unwrap();

                            Ok(Field {
                                name: Some(binding.clone()),
                                accessor: quote!(#binding),
                                options: FieldOptions::try_from(field.attrs)?,
                            })
                        })
                        .collect::<Result<Vec<_>, &str>>()
                        .expect("Unable to process enum variant field");

                    let bindings: Vec<_> = fields
                        .iter()
                        .map(|field| field.name.clone().unwrap())
                        .collect();

                    let FieldCalls {
                        attribute_locals,
                        attribute_calls,
                        element_calls,
                    } = fields_to_calls(fields, options.child_prefix.as_ref());

                    quote!(Self::#ident { #(#bindings),* } => {
                        #(#attribute_locals)*

                        let builder = ::xml::writer::XmlEvent::start_element(#variant_name);
                        #(#attribute_calls)*
                        writer.write(builder)?;

                        #(#element_calls)*

                        writer.write(::xml::writer::XmlEvent::end_element())
                    })
                }

                syn::Fields::Unnamed(fields) => {
                    if fields.unnamed.len() != 1 {
                        panic!("Tuple variants must have exactly one field");
                    }

                    for field in fields.unnamed {
                        let options = FieldOptions::try_from(field.attrs)
                            .expect("Unable to process enum variant field");
                        if options.is_attribute {
                            panic!("Unnamed fields may not be XML attributes");
                        }
                    }

                    quote!(Self::#ident(inner) => {
                        crate::xml::XmlElement::write_as_element(inner, writer, #variant_name)
                    })
                }

                syn::Fields::Unit => quote!(Self::#ident => {
                    writer.write(::xml::writer::XmlEvent::start_element(#variant_name))?;
                    writer.write(::xml::writer::XmlEvent::end_element())
                }),
            }
        })
        .collect();

    let element_name = get_component_name(&ident, options.prefix.as_ref());
    quote!(
        #[automatically_derived]
        impl crate::xml::XmlElement for #ident {
            fn write_as_element<W: std::io::Write>(
                &self,
                writer: &mut ::xml::EventWriter<W>,
                name: &str,
            ) -> Result<(), ::xml::writer::Error> {
                let builder = ::xml::writer::XmlEvent::start_element(name);
                #xmlns_calls
                writer.write(builder)?;

                crate::xml::XmlElement::write_children(self, writer)?;

                writer.write(::xml::writer::XmlEvent::end_element())
            }

            fn write_children<W: std::io::Write>(
                &self,
                writer: &mut ::xml::EventWriter<W>,
            ) -> Result<(), ::xml::writer::Error> {
                match self {
                    #(#variant_arms),*
                }
            }
        }

        #[automatically_derived]
        impl crate::xml::XmlRoot for #ident {
            const NAME: &'static str = #element_name;
        }
    )
    .into()
}

fn get_component_name(ident: &Ident, prefix: Option<&TokenStream>) -> TokenStream {
    prefixed_name(&ident.to_string(), prefix)
}

fn prefixed_name(name: &str, prefix: Option<&TokenStream>) -> TokenStream {
    match prefix {
        Some(prefix) => quote!(::const_format::formatcp!("{}:{}", #prefix, #name)),
        None => name.into_token_stream(),
    }
}

#[derive(Default)]
struct FieldCalls {
    attribute_locals: Vec<TokenStream>,
    attribute_calls: Vec<TokenStream>,
    element_calls: Vec<TokenStream>,
}

fn fields_to_calls(fields: Vec<Field>, child_prefix: Option<&TokenStream>) -> FieldCalls {
    let mut calls = FieldCalls::default();

    for (index, field) in fields.into_iter().enumerate() {
        let accessor = field.accessor;
        let options = field.options;

        if options.is_attribute {
            // Attribute values may be formatted on the fly, so they are held
            // in locals that outlive the start element builder.
            let local = format_ident!("attribute_{}", index);
            let attr_name = options
                .rename
                .unwrap_or_else(|| snake_to_pascal(field.name.as_ref().unwrap()));

            calls.attribute_locals.push(quote!(
                let #local = crate::xml::XmlAttribute::attribute_value(#accessor);
            ));
            calls.attribute_calls.push(quote!(
                let builder = match &#local {
                    Some(value) => builder.attr(#attr_name, &**value),
                    None => builder,
                };
            ));
        } else if options.flatten || field.name.is_none() {
            calls.element_calls.push(quote!(
                crate::xml::XmlElement::write_children(#accessor, writer)?;
            ));
        } else {
            let base_name = options
                .rename
                .unwrap_or_else(|| snake_to_pascal(field.name.as_ref().unwrap()));
            let element_name = prefixed_name(&base_name, options.prefix.as_ref().or(child_prefix));

            calls.element_calls.push(quote!(
                crate::xml::XmlElement::write_as_element(#accessor, writer, #element_name)?;
            ));
        }
    }

    calls
}

fn namespaces_to_calls(namespaces: Vec<XmlNamespace>) -> TokenStream {
    namespaces
        .into_iter()
        .map(|xmlns| match xmlns {
            XmlNamespace::Default(uri) => quote!(let builder = builder.default_ns(#uri);),
            XmlNamespace::Prefixed(prefix, uri) => {
                quote!(let builder = builder.ns(#prefix, #uri);)
            }
        })
        .collect()
}

#[derive(Default, Debug)]
pub(super) struct ComponentOptions {
    prefix: Option<TokenStream>,
    child_prefix: Option<TokenStream>,
    namespaces: Vec<XmlNamespace>,
}

impl TryFrom<Vec<Attribute>> for ComponentOptions {
    type Error = &'static str;

    fn try_from(value: Vec<Attribute>) -> Result<Self, Self::Error> {
        let meta = try_get_serialize_meta(value)?;

        let mut prefix = None;
        let mut child_prefix = None;
        let mut encountered_default = false;
        let namespaces = meta
            .into_iter()
            .map(|meta| match meta {
                Meta::NameValue(name_value) => {
                    if name_value.path.is_ident("default_ns") {
                        if encountered_default {
                            return Err(
                                "there must be at most one `default_ns` declaration per component",
                            );
                        }

                        encountered_default = true;

                        Ok(Some(XmlNamespace::Default(
                            name_value.value.into_token_stream(),
                        )))
                    } else if name_value.path.is_ident("ns") {
                        match name_value.value {
                            Expr::Tuple(tuple) if tuple.elems.len() == 2 => {
                                let mut elems = tuple.elems.into_iter();
                                Ok(Some(XmlNamespace::Prefixed(
                                    elems.next().unwrap().into_token_stream(),
                                    elems.next().unwrap().into_token_stream(),
                                )))
                            }

                            _ => Err("`ns` takes a single tuple of two elements as argument"),
                        }
                    } else if name_value.path.is_ident("ns_prefix") {
                        prefix = Some(name_value.value.into_token_stream());

                        Ok(None)
                    } else if name_value.path.is_ident("child_ns_prefix") {
                        child_prefix = Some(name_value.value.into_token_stream());

                        Ok(None)
                    } else {
                        Err("unrecognized XML component attribute")
                    }
                }

                _ => Err("unrecognized XML component attribute"),
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        Ok(ComponentOptions {
            prefix,
            child_prefix,
            namespaces,
        })
    }
}

fn try_get_serialize_meta(attrs: Vec<Attribute>) -> Result<Punctuated<Meta, Comma>, &'static str> {
    let mut parseable_attrs = attrs
        .into_iter()
        .filter(|attr| attr.path().is_ident(MACRO_ATTRIBUTE));

    let attr_to_parse = match parseable_attrs.next() {
        None => return Ok(Default::default()),
        Some(attr) => attr,
    };

    if parseable_attrs.next().is_some() {
        return Err("multiple attributes specified for component");
    }

    attr_to_parse
        .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
        .map_err(|_| "illegal attribute syntax")
}

#[derive(Default)]
struct FieldOptions {
    is_attribute: bool,
    flatten: bool,
    prefix: Option<TokenStream>,
    rename: Option<String>,
}

impl TryFrom<Vec<Attribute>> for FieldOptions {
    type Error = &'static str;

    fn try_from(value: Vec<Attribute>) -> Result<Self, Self::Error> {
        let meta = try_get_serialize_meta(value)?;

        let mut options = FieldOptions::default();
        for meta in meta {
            match meta {
                Meta::Path(path) if path.is_ident("is_attribute") => options.is_attribute = true,
                Meta::Path(path) if path.is_ident("flatten") => options.flatten = true,
                Meta::NameValue(name_value) if name_value.path.is_ident("ns_prefix") => {
                    options.prefix = Some(name_value.value.into_token_stream());
                }
                Meta::NameValue(name_value) if name_value.path.is_ident("rename") => {
                    match name_value.value {
                        Expr::Lit(ExprLit {
                            lit: Lit::Str(name),
                            ..
                        }) => options.rename = Some(name.value()),

                        _ => return Err("`rename` takes a string literal"),
                    }
                }

                _ => return Err("unrecognized XML field attribute"),
            }
        }

        if options.is_attribute && options.flatten {
            return Err("a field may not be both an attribute and flattened");
        }

        Ok(options)
    }
}

#[derive(Debug)]
enum XmlNamespace {
    Default(TokenStream),
    Prefixed(TokenStream, TokenStream),
}

struct Field {
    name: Option<Ident>,
    accessor: TokenStream,
    options: FieldOptions,
}

fn snake_to_pascal(ident: &Ident) -> String {
    let mut capitalize_next = true;
    ident
        .to_string()
        .trim_start_matches("r#")
        .chars()
        .filter_map(|character| {
            if character == '_' {
                capitalize_next = true;

                None
            } else if capitalize_next {
                capitalize_next = false;

                Some(character.to_ascii_uppercase())
            } else {
                Some(character)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use quote::format_ident;

    use super::snake_to_pascal;

    #[test]
    fn test_snake_to_pascal() {
        assert_eq!(snake_to_pascal(&format_ident!("item_shape")), "ItemShape");
        assert_eq!(snake_to_pascal(&format_ident!("id")), "Id");
        assert_eq!(
            snake_to_pascal(&format_ident!("save_item_to_folder")),
            "SaveItemToFolder"
        );
    }
}
