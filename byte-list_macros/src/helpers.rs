// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use proc_macro2::{TokenStream, TokenTree};
use quote::quote;
use syn::{AttrStyle, Data, DeriveInput, Error, Meta, Result, Type};

/// Helper function to derive Payload.
///
/// The generated code implements the trait and adds two compile-time checks:
/// every field type must itself be a `Payload`, and the size of the structure must equal
/// the sum of its field sizes (i.e. there are no padding bytes that `as_bytes` could expose).
pub(crate) fn derive_payload_trait(input: DeriveInput) -> Result<TokenStream> {
    let s = match &input.data {
        Data::Struct(s) => s,
        _ => {
            return Err(Error::new_spanned(
                &input,
                "Payload can only be derived for structs",
            ))
        }
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Payload cannot be derived for generic structs",
        ));
    }

    if !has_repr(&input, "C") && !has_repr(&input, "transparent") {
        return Err(Error::new_spanned(
            &input,
            "Payload can only be derived for structs with #[repr(C)] or #[repr(transparent)]",
        ));
    }

    let field_tys: Vec<&Type> = s.fields.iter().map(|field| &field.ty).collect();
    if field_tys.is_empty() {
        return Err(Error::new_spanned(
            &input,
            "Payload cannot be derived for structs without fields",
        ));
    }

    let ident = &input.ident;

    Ok(quote! {
        unsafe impl ::byte_list::Payload for #ident {}

        const _: () = {
            fn assert_field_is_payload<P: ::byte_list::Payload>() {}

            const _: fn() = || {
                #( assert_field_is_payload::<#field_tys>(); )*
            };

            assert!(
                ::core::mem::size_of::<#ident>() == 0 #( + ::core::mem::size_of::<#field_tys>() )*,
                "Payload structs must not contain padding bytes"
            );
        };
    })
}

/// Returns whether the given input has a `#[repr(...)]` attribute containing `repr`.
///
/// This also works when multiple `repr` attributes are used, or a single `repr` attribute has multiple entries.
fn has_repr(input: &DeriveInput, repr: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if !matches!(attr.style, AttrStyle::Outer) || !attr.path().is_ident("repr") {
            return false;
        }

        let list = match &attr.meta {
            Meta::List(list) => list,
            _ => return false,
        };

        list.tokens.clone().into_iter().any(|token_tree| {
            if let TokenTree::Ident(ident) = token_tree {
                ident == repr
            } else {
                false
            }
        })
    })
}
