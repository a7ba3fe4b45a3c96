/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use quote::quote;
use syn::{DataEnum, Ident};

pub(super) fn write_attribute_derivation(ident: Ident, data: DataEnum) -> proc_macro::TokenStream {
    let variant_arms: Vec<_> = data
        .variants
        .into_iter()
        .map(|variant| {
            if !matches!(variant.fields, syn::Fields::Unit) {
                panic!("`XmlAttribute` derivation is only supported for unit enums");
            }

            let ident = &variant.ident;
            let value = variant.ident.to_string();

            quote!(Self::#ident => #value)
        })
        .collect();

    quote!(
        #[automatically_derived]
        impl crate::xml::XmlAttribute for #ident {
            fn attribute_value(&self) -> Option<std::borrow::Cow<'_, str>> {
                let value: &'static str = match self {
                    #(#variant_arms),*
                };

                Some(std::borrow::Cow::Borrowed(value))
            }
        }
    )
    .into()
}
