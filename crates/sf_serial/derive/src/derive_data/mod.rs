//! The parsed shape of a type deriving `Serializable`.

// -----------------------------------------------------------------------------
// Modules

mod attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, FieldDefault, TypeAttributes};

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Type};

// -----------------------------------------------------------------------------
// SerialMeta

/// Information shared by every kind of derived type.
pub(crate) struct SerialMeta<'a> {
    pub ident: &'a Ident,
    pub generics: &'a Generics,
    pub attrs: TypeAttributes,
    pub serial: syn::Path,
}

impl SerialMeta<'_> {
    /// The serial name: `name = "…"`, or the module path and the type name.
    pub fn serial_name(&self) -> TokenStream {
        match &self.attrs.name {
            Some(name) => quote! { #name },
            None => {
                let ident = self.ident.to_string();
                quote! { ::core::concat!(::core::module_path!(), "::", #ident) }
            }
        }
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        self.generics.type_params().next().is_some()
    }

    /// The generics of the item, with every type parameter bound by
    /// `Serializable + 'static`.
    pub fn bounded_generics(&self) -> Generics {
        let serial = &self.serial;
        let mut generics = self.generics.clone();
        for param in generics.type_params_mut() {
            param.bounds.push(syn::parse_quote!(#serial::Serializable));
            param.bounds.push(syn::parse_quote!('static));
        }
        generics
    }

    /// A `static` cell and the expression that fills it with `build`.
    ///
    /// Generic types share one static per item, so their descriptors are
    /// stored per instantiation in a `GenericDescriptorCell`.
    pub fn cached_descriptor(&self, build: TokenStream) -> TokenStream {
        let descriptors_ = crate::path::descriptors_(&self.serial);
        if self.is_generic() {
            quote! {
                static DESCRIPTOR: #descriptors_::GenericDescriptorCell =
                    #descriptors_::GenericDescriptorCell::new();
                DESCRIPTOR.get_or_insert::<Self>(|| #build)
            }
        } else {
            quote! {
                static DESCRIPTOR: #descriptors_::DescriptorCell = #descriptors_::DescriptorCell::new();
                DESCRIPTOR.get_or_init(|| #build)
            }
        }
    }

    /// `.annotations(..)` for the descriptor builder, or nothing.
    pub fn annotations(&self) -> TokenStream {
        let descriptors_ = crate::path::descriptors_(&self.serial);
        match self.attrs.custom_attributes.get_expression(&descriptors_) {
            Some(annotations) => quote! { .annotations(#annotations) },
            None => crate::utils::empty(),
        }
    }
}

// -----------------------------------------------------------------------------
// SerialData

pub(crate) struct SerialField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
    /// The element name.
    pub name: String,
}

impl SerialField<'_> {
    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.attrs.skip.is_some()
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.attrs.default.is_some()
    }
}

pub(crate) struct UnitVariant<'a> {
    pub ident: &'a Ident,
    /// The entry name.
    pub name: String,
}

pub(crate) struct SealedVariant<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
}

/// The serial kind a derived type maps to.
pub(crate) enum SerialData<'a> {
    /// A struct with named, serialized fields.
    Class(Vec<SerialField<'a>>),
    /// A struct without serialized fields. Holds the skipped ones.
    Object(Vec<SerialField<'a>>),
    /// An enum of unit variants.
    Enum(Vec<UnitVariant<'a>>),
    /// A `#[serial(sealed)]` enum of newtype variants.
    Sealed(Vec<SealedVariant<'a>>),
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_owned(),
        None => name,
    }
}

impl<'a> SerialData<'a> {
    pub fn parse(ast: &'a DeriveInput, meta: &SerialMeta) -> syn::Result<Self> {
        match &ast.data {
            Data::Struct(data) => {
                if let Some(span) = meta.attrs.sealed {
                    return Err(syn::Error::new(span, "only enums can be sealed"));
                }
                Self::parse_struct(&data.fields)
            }
            Data::Enum(data) => {
                let variants = data.variants.iter();
                if meta.attrs.sealed.is_some() {
                    if !meta.generics.params.is_empty() {
                        return Err(syn::Error::new(
                            meta.generics.span(),
                            "sealed enums cannot be generic",
                        ));
                    }
                    Self::parse_sealed(variants)
                } else {
                    Self::parse_enum(variants)
                }
            }
            Data::Union(data) => Err(syn::Error::new(
                data.union_token.span,
                "`Serializable` cannot be derived for unions",
            )),
        }
    }

    fn parse_struct(fields: &'a Fields) -> syn::Result<Self> {
        let named = match fields {
            Fields::Named(named) => named,
            Fields::Unit => return Ok(Self::Object(Vec::new())),
            Fields::Unnamed(unnamed) if unnamed.unnamed.is_empty() => {
                return Ok(Self::Object(Vec::new()));
            }
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new(
                    unnamed.span(),
                    "tuple structs are not supported, use named fields",
                ));
            }
        };

        let mut fields = Vec::with_capacity(named.named.len());
        let mut names: Vec<(String, Span)> = Vec::new();
        for field in &named.named {
            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };
            let name = match &attrs.rename {
                Some(rename) => rename.value(),
                None => unraw(ident),
            };
            if attrs.skip.is_none() {
                if names.iter().any(|(other, _)| *other == name) {
                    return Err(syn::Error::new(
                        field.span(),
                        format!("element name `{name}` is used twice"),
                    ));
                }
                names.push((name.clone(), field.span()));
            } else if attrs.default.is_some() || !attrs.custom_attributes.is_empty() {
                return Err(syn::Error::new(
                    field.span(),
                    "a skipped field takes no other attribute",
                ));
            }
            fields.push(SerialField {
                ident,
                ty: &field.ty,
                attrs,
                name,
            });
        }

        if fields.iter().all(SerialField::is_skipped) {
            return Ok(Self::Object(fields));
        }
        Ok(Self::Class(fields))
    }

    fn parse_enum(variants: impl Iterator<Item = &'a syn::Variant>) -> syn::Result<Self> {
        let mut entries = Vec::new();
        for variant in variants {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new(
                    variant.span(),
                    "only unit variants are supported, mark the enum `#[serial(sealed)]` \
                     for a hierarchy of newtype variants",
                ));
            }
            let attrs = FieldAttributes::parse_attrs(&variant.attrs)?;
            if attrs.default.is_some() || attrs.skip.is_some() {
                return Err(syn::Error::new(
                    variant.span(),
                    "enum entries only take `rename`",
                ));
            }
            let name = match &attrs.rename {
                Some(rename) => rename.value(),
                None => unraw(&variant.ident),
            };
            if entries.iter().any(|entry: &UnitVariant| entry.name == name) {
                return Err(syn::Error::new(
                    variant.span(),
                    format!("entry name `{name}` is used twice"),
                ));
            }
            entries.push(UnitVariant {
                ident: &variant.ident,
                name,
            });
        }
        if entries.is_empty() {
            return Err(syn::Error::new(
                Span::call_site(),
                "`Serializable` cannot be derived for enums without variants",
            ));
        }
        Ok(Self::Enum(entries))
    }

    fn parse_sealed(variants: impl Iterator<Item = &'a syn::Variant>) -> syn::Result<Self> {
        let mut subclasses = Vec::new();
        for variant in variants {
            match &variant.fields {
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                    subclasses.push(SealedVariant {
                        ident: &variant.ident,
                        ty: &fields.unnamed[0].ty,
                    });
                }
                _ => {
                    return Err(syn::Error::new(
                        variant.span(),
                        "variants of a sealed enum hold exactly one subclass value",
                    ));
                }
            }
        }
        if subclasses.is_empty() {
            return Err(syn::Error::new(
                Span::call_site(),
                "a sealed enum needs at least one variant",
            ));
        }
        Ok(Self::Sealed(subclasses))
    }
}
