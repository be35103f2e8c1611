//! See [`Serializable`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static SERIAL_ATTRIBUTE_NAME: &str = "serial";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Serializable Derivation
///
/// `#[derive(Serializable)]` generates the descriptor and the serializer of
/// a type, and implements `Serializable` for it.
///
/// | Item | Serial kind |
/// |------|-------------|
/// | `struct T { a: A, .. }` | `Class` |
/// | `struct T;`, `struct T {}` | `Object` |
/// | `enum T { A, B }` | `Enum` |
/// | `#[serial(sealed)] enum T { A(A), B(B) }` | sealed polymorphic root |
///
/// Tuple structs and types with lifetime parameters are not supported.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Serializable)]
/// #[serial(name = "Project")]
/// #[serial(@ClassDiscriminator::new("kind"))]
/// #[serial(auto_register(Box<dyn Named>))]
/// struct Project { /* ... */ }
/// ```
///
/// - `name = "…"`: the serial name, `module_path!()::Ident` by default.
/// - `sealed`: on an enum whose variants each hold one subclass value.
/// - `auto_register(Base)`: submits `Box::new(value)` as a subclass of
///   `Base`, collected by `SerializersModuleBuilder::with_auto_registered`.
///   Ignored for generic types.
/// - `@expr`: attaches the value of `expr` as a descriptor annotation.
///
/// ## Field Attributes
///
/// ```rust, ignore
/// #[derive(Serializable)]
/// struct Project {
///     #[serial(rename = "title", @JsonNames::new(["label"]))]
///     name: String,
///     #[serial(default = "default_language")]
///     language: String,
///     #[serial(default)]
///     stars: i32,
///     #[serial(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// - `rename = "…"`: the element name, the field name by default.
/// - `default`, `default = "path"`: the element is optional. A missing
///   element takes `Default::default()` or the result of `path()`. On
///   encode, a value equal to its default is left out unless the format
///   asks for defaults, so the field type must implement `PartialEq`.
/// - `skip`: the field is neither written nor read, and is rebuilt with
///   `Default::default()`.
/// - `@expr`: attaches an element annotation.
///
/// Fields of type `Option<T>` are nullable elements. Unit enum variants
/// accept `rename` only.
///
/// ## Generics
///
/// Type parameters are bound by `Serializable + 'static`, and descriptors
/// are cached per instantiation.
#[proc_macro_derive(Serializable, attributes(serial))]
pub fn derive_serializable(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match impls::match_serial_impls(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
