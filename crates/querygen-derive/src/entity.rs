//! Entity derive macro implementation
//!
//! Generates, for `struct User { .. }`:
//!
//! - `UserProps<E>`: one `querygen::Prop<E>` per field (flattened fields nest
//!   the other entity's props), used by typed selectors
//! - `impl querygen::Entity for User`
//! - an `inventory` registration so `TypeRegistry::with_registered()` sees it

mod attrs;

use attrs::{FieldAttr, StructAttr};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let struct_attr = StructAttr::from_attrs(&input.attrs)?;
    let props_name = format_ident!("{}Props", name);

    let mut prop_fields = Vec::with_capacity(fields.len());
    let mut prop_inits = Vec::with_capacity(fields.len());
    let mut members = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let attr = FieldAttr::from_attrs(&field.attrs)?;

        if attr.flatten {
            if attr.has_column_flags() {
                return Err(syn::Error::new_spanned(
                    field,
                    "#[orm(flatten)] cannot be combined with column attributes",
                ));
            }
            prop_fields.push(quote! {
                pub #ident: <#ty as querygen::Entity>::Props<E>
            });
            prop_inits.push(quote! {
                #ident: <#ty as querygen::Entity>::props::<E>()
            });
            members.push(quote! { .flatten::<#ty>() });
            continue;
        }

        let property = struct_attr.rename_all.apply(&ident.unraw().to_string());

        let mut column = quote! { querygen::ColumnDescriptor::new(#property) };
        if let Some(wire) = &attr.column {
            column.extend(quote! { .with_name(#wire) });
        }
        if let Some(param) = &attr.param {
            column.extend(quote! { .with_param(#param) });
        }
        if let Some(value) = &attr.value {
            column.extend(quote! { .with_value(#value) });
        }
        if attr.is_id {
            column.extend(quote! { .primary_key() });
        }
        if attr.skip_insert {
            column.extend(quote! { .skip_insert() });
        }
        if attr.skip_update {
            column.extend(quote! { .skip_update() });
        }
        if attr.unique {
            column.extend(quote! { .unique() });
        }
        if attr.ignore {
            column.extend(quote! { .ignored() });
        }

        prop_fields.push(quote! { pub #ident: querygen::Prop<E> });
        prop_inits.push(quote! { #ident: querygen::Prop::new(#property) });
        members.push(quote! { .column(#column) });
    }

    let table = struct_attr
        .table
        .as_ref()
        .map(|table| quote! { .table(#table) });
    let prefixes = struct_attr
        .prefixes
        .iter()
        .map(|prefix| quote! { .prefix(#prefix) });

    let props_doc = format!("Typed property references for [`{name}`].");

    Ok(quote! {
        #[doc = #props_doc]
        #[allow(dead_code)]
        #vis struct #props_name<E: 'static> {
            #(#prop_fields,)*
            #[doc(hidden)]
            pub __owner: ::core::marker::PhantomData<fn() -> E>,
        }

        impl querygen::Entity for #name {
            type Props<E: 'static> = #props_name<E>;

            fn props<E: 'static>() -> Self::Props<E> {
                #props_name {
                    #(#prop_inits,)*
                    __owner: ::core::marker::PhantomData,
                }
            }

            fn entity_def() -> querygen::EntityDef {
                querygen::EntityDef::of::<Self>()
                    #table
                    #(#prefixes)*
                    #(#members)*
            }
        }

        // Auto-register this entity for start-up reflection via inventory
        querygen::inventory::submit! {
            querygen::EntityRegistration {
                entity_def: <#name as querygen::Entity>::entity_def,
            }
        }
    })
}
