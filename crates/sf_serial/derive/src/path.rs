//! Paths of the items the generated code refers to.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the access path to the `sf_serial` crate from the invoking crate.
///
/// 1. For crates that depend on `sf_serial`, `::sf_serial` is returned.
/// 2. For crates that depend on `sf_core` (or its alias `sf`), `::sf_core::serial` is returned.
/// 3. Otherwise `::sf_serial` is returned, which may be incorrect.
///
/// Reading the manifest is not free, so the path is computed once per
/// derive and passed around.
pub(crate) fn sf_serial() -> syn::Path {
    sf_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("sf_serial"))
}

// -----------------------------------------------------------------------------
// Internal API

#[inline(always)]
pub(crate) fn exports_(serial: &syn::Path) -> TokenStream {
    quote! { #serial::__macro_exports }
}

#[inline(always)]
pub(crate) fn descriptors_(serial: &syn::Path) -> TokenStream {
    quote! { #serial::descriptors }
}

#[inline(always)]
pub(crate) fn encoding_(serial: &syn::Path) -> TokenStream {
    quote! { #serial::encoding }
}

#[inline(always)]
pub(crate) fn modules_(serial: &syn::Path) -> TokenStream {
    quote! { #serial::modules }
}
