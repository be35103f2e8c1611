use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{SerialField, SerialMeta};

/// Objects have a single value and no element: they are written as an
/// empty structure, and any element found on read is unknown.
pub(crate) fn impl_object(meta: &SerialMeta, skipped: &[SerialField]) -> TokenStream {
    let serial = &meta.serial;
    let exports_ = crate::path::exports_(serial);
    let descriptors_ = crate::path::descriptors_(serial);
    let encoding_ = crate::path::encoding_(serial);

    let serial_name = meta.serial_name();
    let annotations = meta.annotations();
    let descriptor = meta.cached_descriptor(quote! {
        #descriptors_::SerialDescriptor::builder(#serial_name, #descriptors_::SerialKind::Object)
            #annotations
            .build()
    });

    let serialize = quote! {
        let _ = value;
        let descriptor = <Self as #serial::GeneratedSerializable>::generated_descriptor();
        let composite = #encoding_::Encoder::begin_structure(encoder, descriptor)?;
        #encoding_::CompositeEncoder::end_structure(composite, descriptor)
    };

    let inits = super::skipped_field_inits(skipped);
    let deserialize = quote! {
        let descriptor = <Self as #serial::GeneratedSerializable>::generated_descriptor();
        let mut composite = #encoding_::Decoder::begin_structure(decoder, descriptor)?;
        loop {
            match #encoding_::CompositeDecoder::decode_element_index(&mut *composite, descriptor)? {
                #encoding_::ElementIndex::Done => break,
                #encoding_::ElementIndex::Element(index) => {
                    return #exports_::Result::Err(
                        #serial::SerialError::unknown_element_index(descriptor, index),
                    );
                }
                #encoding_::ElementIndex::UnknownName(name) => {
                    return #exports_::Result::Err(
                        #serial::SerialError::unknown_element_name(descriptor, &name),
                    );
                }
            }
        }
        #encoding_::CompositeDecoder::end_structure(composite, descriptor)?;

        #exports_::Result::Ok(Self {
            #(#inits,)*
        })
    };

    super::impl_generated(meta, descriptor, serialize, deserialize)
}
