// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod class_kind;
mod enum_kind;
mod object_kind;
mod sealed_kind;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;
use syn::spanned::Spanned;

use crate::derive_data::{SerialData, SerialField, SerialMeta, TypeAttributes};

use auto_register::get_auto_register_impl;
use class_kind::impl_class;
use enum_kind::impl_enum;
use object_kind::impl_object;
use sealed_kind::impl_sealed;

pub(crate) fn match_serial_impls(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if let Some(lifetime) = ast.generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "`Serializable` cannot be derived for types with lifetime parameters",
        ));
    }

    let meta = SerialMeta {
        ident: &ast.ident,
        generics: &ast.generics,
        attrs: TypeAttributes::parse_attrs(&ast.attrs)?,
        serial: crate::path::sf_serial(),
    };
    let data = SerialData::parse(ast, &meta)?;

    let body = match &data {
        SerialData::Class(fields) => impl_class(&meta, fields),
        SerialData::Object(fields) => impl_object(&meta, fields),
        SerialData::Enum(entries) => impl_enum(&meta, entries),
        SerialData::Sealed(variants) => return impl_sealed(&meta, variants),
    };
    let auto_register = get_auto_register_impl(&meta)?;

    Ok(quote! {
        #body
        #auto_register
    })
}

/// Implements `GeneratedSerializable` with the given function bodies, and
/// `Serializable` through `GeneratedSerializer`.
fn impl_generated(
    meta: &SerialMeta,
    descriptor: TokenStream,
    serialize: TokenStream,
    deserialize: TokenStream,
) -> TokenStream {
    let serial = &meta.serial;
    let descriptors_ = crate::path::descriptors_(serial);
    let encoding_ = crate::path::encoding_(serial);
    let ident = meta.ident;

    let generics = meta.bounded_generics();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #serial::GeneratedSerializable for #ident #ty_generics #where_clause {
            fn generated_descriptor() -> &'static #descriptors_::SerialDescriptor {
                #descriptor
            }

            fn generated_serialize(
                encoder: &mut dyn #encoding_::Encoder,
                value: &Self,
            ) -> #serial::SerialResult<()> {
                #serialize
            }

            fn generated_deserialize(
                decoder: &mut dyn #encoding_::Decoder,
            ) -> #serial::SerialResult<Self> {
                #deserialize
            }
        }

        impl #impl_generics #serial::Serializable for #ident #ty_generics #where_clause {
            type Serializer = #serial::GeneratedSerializer<Self>;

            #[inline]
            fn serializer() -> Self::Serializer {
                #serial::GeneratedSerializer::new()
            }
        }
    }
}

/// `Self { skipped: Default::default(), .. }` entries.
fn skipped_field_inits(fields: &[SerialField]) -> Vec<TokenStream> {
    fields
        .iter()
        .filter(|field| field.is_skipped())
        .map(|field| {
            let ident = field.ident;
            quote! { #ident: ::core::default::Default::default() }
        })
        .collect()
}
