use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{SerialMeta, UnitVariant};

pub(crate) fn impl_enum(meta: &SerialMeta, entries: &[UnitVariant]) -> TokenStream {
    let serial = &meta.serial;
    let exports_ = crate::path::exports_(serial);
    let descriptors_ = crate::path::descriptors_(serial);
    let encoding_ = crate::path::encoding_(serial);

    let serial_name = meta.serial_name();
    let annotations = meta.annotations();
    let names = entries.iter().map(|entry| &entry.name);
    let descriptor = meta.cached_descriptor(quote! {
        #descriptors_::SerialDescriptor::builder(#serial_name, #descriptors_::SerialKind::Enum)
            #(.enum_entry(#names))*
            #annotations
            .build()
    });

    let to_index = entries.iter().enumerate().map(|(index, entry)| {
        let ident = entry.ident;
        quote! { Self::#ident => #index, }
    });
    let serialize = quote! {
        let descriptor = <Self as #serial::GeneratedSerializable>::generated_descriptor();
        let index: usize = match value {
            #(#to_index)*
        };
        #encoding_::Encoder::encode_enum(encoder, descriptor, index)
    };

    let from_index = entries.iter().enumerate().map(|(index, entry)| {
        let ident = entry.ident;
        quote! { #index => #exports_::Result::Ok(Self::#ident), }
    });
    let deserialize = quote! {
        let descriptor = <Self as #serial::GeneratedSerializable>::generated_descriptor();
        match #encoding_::Decoder::decode_enum(decoder, descriptor)? {
            #(#from_index)*
            index => #exports_::Result::Err(
                #serial::SerialError::unknown_element_index(descriptor, index),
            ),
        }
    };

    super::impl_generated(meta, descriptor, serialize, deserialize)
}
