use proc_macro2::TokenStream;

use crate::derive_data::SerialMeta;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &SerialMeta) -> syn::Result<TokenStream> {
    use quote::quote_spanned;

    let Some((span, base)) = &meta.attrs.auto_register else {
        return Ok(crate::utils::empty());
    };
    // Invalid for generic types.
    if meta.is_generic() {
        return Ok(crate::utils::empty());
    }

    let exports_ = crate::path::exports_(&meta.serial);
    let modules_ = crate::path::modules_(&meta.serial);
    let ident = meta.ident;

    Ok(quote_spanned! { *span =>
        #exports_::inventory::submit! {
            #modules_::AutoRegistration(|builder| {
                builder.register_polymorphic::<#base>(|scope| {
                    scope.register(
                        #exports_::serializer_of::<#ident>(),
                        |value: #ident| #exports_::Box::new(value),
                    );
                });
            })
        }
    })
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(meta: &SerialMeta) -> syn::Result<TokenStream> {
    match &meta.attrs.auto_register {
        Some((span, _)) => Err(syn::Error::new(
            *span,
            "`auto_register` needs the `auto_register` feature of `sf_serial`",
        )),
        None => Ok(crate::utils::empty()),
    }
}
