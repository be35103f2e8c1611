use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{SealedVariant, SerialMeta};

/// A sealed enum is its own polymorphic base: each variant wraps one
/// subclass, and the scope of subclasses is built from the variants.
pub(crate) fn impl_sealed(
    meta: &SerialMeta,
    variants: &[SealedVariant],
) -> syn::Result<TokenStream> {
    if let Some((span, _)) = &meta.attrs.auto_register {
        return Err(syn::Error::new(
            *span,
            "a sealed enum lists its subclasses itself, `auto_register` does not apply",
        ));
    }

    let serial = &meta.serial;
    let exports_ = crate::path::exports_(serial);
    let descriptors_ = crate::path::descriptors_(serial);
    let modules_ = crate::path::modules_(serial);
    let ident = meta.ident;

    let idents: Vec<_> = variants.iter().map(|variant| variant.ident).collect();
    let types: Vec<_> = variants.iter().map(|variant| variant.ty).collect();

    let serial_name = meta.serial_name();
    let annotations = match meta.attrs.custom_attributes.get_expression(&descriptors_) {
        Some(annotations) => quote! { .with_annotations(#annotations) },
        None => crate::utils::empty(),
    };

    Ok(quote! {
        impl #modules_::PolymorphicBase for #ident {
            fn concrete_value(&self) -> &dyn #exports_::Any {
                match self {
                    #(Self::#idents(value) => value as &dyn #exports_::Any,)*
                }
            }

            fn concrete_type_name(&self) -> &'static str {
                match self {
                    #(Self::#idents(_) => ::core::any::type_name::<#types>(),)*
                }
            }
        }

        impl #serial::Serializable for #ident {
            type Serializer = #modules_::PolymorphicSerializer<Self>;

            fn serializer() -> Self::Serializer {
                static DESCRIPTOR: #descriptors_::DescriptorCell = #descriptors_::DescriptorCell::new();
                static SCOPE: #exports_::OnceLock<#exports_::Arc<#modules_::PolymorphicScope<#ident>>> =
                    #exports_::OnceLock::new();

                let scope = SCOPE.get_or_init(|| {
                    let scope = #modules_::PolymorphicScope::<#ident>::new(#serial_name)
                        #(.subclass(
                            #exports_::serializer_of::<#types>(),
                            #ident::#idents as fn(#types) -> #ident,
                        ))*;
                    #exports_::Arc::new(scope)
                });
                let descriptor = DESCRIPTOR.get_or_init(|| {
                    #descriptors_::SerialDescriptor::sealed(
                        #serial_name,
                        &[#(#exports_::descriptor_of::<#types>(),)*],
                    )
                    #annotations
                });
                #modules_::PolymorphicSerializer::sealed(descriptor, #exports_::Arc::clone(scope))
            }
        }
    })
}
