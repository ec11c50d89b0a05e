//! `#[derive(Bind)]` expansion.
//!
//! The generated `BindRecord` impl describes each field: its position, name,
//! declared type name, raw tag strings and the typed setters that apply to
//! it. Tags are passed through verbatim; the schema compiler interprets them.

use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{parse_quote, spanned::Spanned, DeriveInput, GenericParam};

use crate::parse::{option_inner, BodyType, RecordField, RecordInput};

/// Expands `#[derive(Bind)]` for one struct.
pub fn expand_bind(item: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(item)?;
    let record = RecordInput::parse(input)?;

    let name = &record.ident;
    let record_name = name.to_string();
    let mut generics = record.generics.clone();
    let params: Vec<_> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(param) => Some(param.ident.clone()),
            _ => None,
        })
        .collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        where_clause.predicates.push(parse_quote! {
            #param: ::core::default::Default + ::core::marker::Send + 'static
        });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let fields = record.fields.iter().map(field_descriptor);

    Ok(quote! {
        impl #impl_generics ::daedalus_core::BindRecord for #name #ty_generics #where_clause {
            fn descriptor() -> ::daedalus_core::RecordDescriptor<Self> {
                ::daedalus_core::RecordDescriptor::new(#record_name)
                    #(.field(#fields))*
            }
        }
    })
}

fn field_descriptor(field: &RecordField) -> TokenStream {
    let index = field.index;
    let name = &field.name;
    let ty = &field.ty;

    let mut tokens = quote! {
        ::daedalus_core::FieldDescriptor::new(#index, #name, ::core::any::type_name::<#ty>())
    };

    for (variant, value) in field.attrs.tags() {
        let variant = format_ident!("{}", variant);
        tokens.extend(quote! {
            .with_tag(::daedalus_core::Tag::#variant, #value)
        });
    }

    if field.attrs.is_scalar() {
        tokens.extend(scalar_setter(field));
    }
    if field.attrs.context.is_some() {
        tokens.extend(context_setter(field));
    }
    if field.is_body() {
        tokens.extend(body_setters(field));
    }

    tokens
}

fn scalar_setter(field: &RecordField) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let kind = quote_spanned! {ty.span()=>
        <#ty as ::daedalus_core::ScalarField>::KIND
    };

    quote! {
        .with_scalar(
            #kind,
            |record: &mut Self, value: ::daedalus_core::ScalarValue| -> bool {
                match <#ty as ::daedalus_core::ScalarField>::from_scalar(value) {
                    ::core::option::Option::Some(value) => {
                        record.#ident = value;
                        true
                    }
                    ::core::option::Option::None => false,
                }
            },
        )
    }
}

fn context_setter(field: &RecordField) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let downcast = match option_inner(ty) {
        Some(inner) => quote_spanned! {ty.span()=>
            ::daedalus_core::descriptor::downcast_optional_context::<#inner>(value)
        },
        None => quote_spanned! {ty.span()=>
            ::daedalus_core::descriptor::downcast_context::<#ty>(value)
        },
    };

    quote! {
        .with_context(
            |record: &mut Self,
             value: &(dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync)|
             -> bool {
                match #downcast {
                    ::core::option::Option::Some(value) => {
                        record.#ident = value;
                        true
                    }
                    ::core::option::Option::None => false,
                }
            },
        )
    }
}

fn body_setters(field: &RecordField) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let body_type = BodyType::of(ty);
    let mut tokens = TokenStream::new();

    if body_type.is_json() {
        let decode = quote_spanned! {ty.span()=>
            ::daedalus_core::descriptor::decode_json::<#ty>(payload)
        };
        tokens.extend(quote! {
            .with_json_body(|record: &mut Self, payload: &[u8]| {
                record.#ident = #decode?;
                ::core::result::Result::Ok(())
            })
        });
    }

    if body_type.is_raw() {
        tokens.extend(quote! {
            .with_raw_body(|record: &mut Self, payload: ::daedalus_core::Bytes| {
                record.#ident = <#ty as ::daedalus_core::RawBody>::from_bytes(payload);
            })
        });
    }

    tokens
}
