use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::derive_data::{FieldDefault, SerialField, SerialMeta};

/// The value a missing optional field takes.
fn default_value(default: &FieldDefault, ty: &syn::Type) -> TokenStream {
    match default {
        FieldDefault::Trait => quote! { <#ty as ::core::default::Default>::default() },
        FieldDefault::Path(path) => quote! { #path() },
    }
}

pub(crate) fn impl_class(meta: &SerialMeta, fields: &[SerialField]) -> TokenStream {
    let serial = &meta.serial;
    let exports_ = crate::path::exports_(serial);
    let descriptors_ = crate::path::descriptors_(serial);
    let encoding_ = crate::path::encoding_(serial);

    let serialized: Vec<&SerialField> = fields.iter().filter(|f| !f.is_skipped()).collect();
    let count = serialized.len();

    // Descriptor --------------------------------------------------------------

    let elements = serialized.iter().map(|field| {
        let name = &field.name;
        let ty = field.ty;
        let optional = field
            .is_optional()
            .then(|| quote! { .with_optional(true) });
        let annotations = field
            .attrs
            .custom_attributes
            .get_expression(&descriptors_)
            .map(|annotations| quote! { .with_annotations(#annotations) });
        quote! {
            .push(
                #descriptors_::ElementDescriptor::new(
                    #name,
                    #exports_::descriptor_of::<#ty> as #descriptors_::DescriptorFn,
                )
                #optional
                #annotations
            )
        }
    });
    let serial_name = meta.serial_name();
    let annotations = meta.annotations();
    let descriptor = meta.cached_descriptor(quote! {
        #descriptors_::SerialDescriptor::builder(#serial_name, #descriptors_::SerialKind::Class)
            #(#elements)*
            #annotations
            .build()
    });

    // Serialize ---------------------------------------------------------------

    let writes = serialized.iter().enumerate().map(|(index, field)| {
        let ident = field.ident;
        let write = match crate::utils::option_inner(field.ty) {
            Some(inner) => quote! {
                composite.encode_nullable_serializable_element(
                    descriptor,
                    #index,
                    &#exports_::serializer_of::<#inner>(),
                    value.#ident.as_ref(),
                )?;
            },
            None => {
                let ty = field.ty;
                quote! {
                    composite.encode_serializable_element(
                        descriptor,
                        #index,
                        &#exports_::serializer_of::<#ty>(),
                        &value.#ident,
                    )?;
                }
            }
        };
        match &field.attrs.default {
            Some(default) => {
                let default = default_value(default, field.ty);
                quote! {
                    if #encoding_::CompositeEncoder::should_encode_element_default(
                        &*composite,
                        descriptor,
                        #index,
                    ) || value.#ident != #default
                    {
                        #write
                    }
                }
            }
            None => write,
        }
    });
    let serialize = quote! {
        let descriptor = <Self as #serial::GeneratedSerializable>::generated_descriptor();
        let mut composite = #encoding_::Encoder::begin_structure(encoder, descriptor)?;
        #(#writes)*
        #encoding_::CompositeEncoder::end_structure(composite, descriptor)
    };

    // Deserialize -------------------------------------------------------------

    let slots: Vec<_> = (0..count).map(|index| format_ident!("__field{}", index)).collect();
    let slot_decls = serialized.iter().zip(&slots).map(|(field, slot)| {
        let ty = field.ty;
        quote! { let mut #slot: #exports_::Option<#ty> = #exports_::Option::None; }
    });
    let reads = serialized.iter().zip(&slots).enumerate().map(|(index, (field, slot))| {
        let read = match crate::utils::option_inner(field.ty) {
            Some(inner) => quote! {
                composite.decode_nullable_serializable_element(
                    descriptor,
                    #index,
                    &#exports_::serializer_of::<#inner>(),
                )?
            },
            None => {
                let ty = field.ty;
                quote! {
                    composite.decode_serializable_element(
                        descriptor,
                        #index,
                        &#exports_::serializer_of::<#ty>(),
                    )?
                }
            }
        };
        quote! {
            #encoding_::ElementIndex::Element(#index) => {
                #slot = #exports_::Option::Some(#read);
                marker.mark(#index);
            }
        }
    });

    let mut slot_iter = slots.iter();
    let inits: Vec<TokenStream> = fields.iter().map(|field| {
        let ident = field.ident;
        if field.is_skipped() {
            return quote! { #ident: ::core::default::Default::default() };
        }
        // Skipped fields take no slot.
        let Some(slot) = slot_iter.next() else {
            return crate::utils::empty();
        };
        let fallback = match &field.attrs.default {
            Some(default) => default_value(default, field.ty),
            None => {
                let name = &field.name;
                quote! {
                    return #exports_::Result::Err(#serial::SerialError::missing_fields(
                        descriptor.serial_name(),
                        #exports_::Vec::from([#exports_::String::from(#name)]),
                    ))
                }
            }
        };
        quote! {
            #ident: match #slot {
                #exports_::Option::Some(value) => value,
                #exports_::Option::None => #fallback,
            }
        }
    }).collect();

    let deserialize = quote! {
        let descriptor = <Self as #serial::GeneratedSerializable>::generated_descriptor();
        let mut composite = #encoding_::Decoder::begin_structure(decoder, descriptor)?;
        let mut marker = #encoding_::ElementMarker::new(#count);
        #(#slot_decls)*

        loop {
            match #encoding_::CompositeDecoder::decode_element_index(&mut *composite, descriptor)? {
                #encoding_::ElementIndex::Done => break,
                #(#reads)*
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
        marker.check_required(descriptor)?;

        #exports_::Result::Ok(Self {
            #(#inits,)*
        })
    };

    super::impl_generated(meta, descriptor, serialize, deserialize)
}
