//! Parsing of `#[serial(..)]` attributes.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::ParseStream;
use syn::{Attribute, Expr, Ident, LitStr, Token, Type};

use crate::SERIAL_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// CustomAttributes

/// Annotation expressions given with `@`.
///
/// - `#[serial(@JsonNames::new(["login"]))]`
/// - `#[serial(@Since(2))]`
#[derive(Default)]
pub(crate) struct CustomAttributes {
    attributes: Vec<Expr>,
}

impl CustomAttributes {
    fn parse_inner_stream(&mut self, input: ParseStream) -> syn::Result<()> {
        input.parse::<Token![@]>()?;
        self.attributes.push(input.parse()?);
        Ok(())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// `Annotations::new().with(..)*`, or nothing if there is no annotation.
    pub fn get_expression(&self, descriptors_: &TokenStream) -> Option<TokenStream> {
        if self.attributes.is_empty() {
            return None;
        }
        let with_values = self.attributes.iter().map(|value| {
            quote! { .with(#value) }
        });
        Some(quote! {
            #descriptors_::Annotations::new() #(#with_values)*
        })
    }
}

// -----------------------------------------------------------------------------
// Shared

/// Runs `parse_item` on every comma separated item of every `#[serial(..)]`.
fn parse_serial_attrs(
    attrs: &[Attribute],
    mut parse_item: impl FnMut(ParseStream) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident(SERIAL_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_args_with(|input: ParseStream| {
            while !input.is_empty() {
                parse_item(input)?;
                if input.is_empty() {
                    break;
                }
                input.parse::<Token![,]>()?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn parse_string(input: ParseStream) -> syn::Result<LitStr> {
    input.parse::<Token![=]>()?;
    let lit: LitStr = input.parse()?;
    if lit.value().trim().is_empty() {
        return Err(syn::Error::new(lit.span(), "serial names must not be blank"));
    }
    Ok(lit)
}

fn duplicate(ident: &Ident) -> syn::Error {
    syn::Error::new(ident.span(), format!("`{ident}` is given more than once"))
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Attributes of the deriving type.
///
/// - `name = "…"`: the serial name.
/// - `sealed`: the enum is the root of a sealed hierarchy.
/// - `auto_register(Base)`: register the type as a subclass of `Base`.
/// - `@expr`: a descriptor annotation.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub name: Option<LitStr>,
    pub sealed: Option<Span>,
    pub auto_register: Option<(Span, Type)>,
    pub custom_attributes: CustomAttributes,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_serial_attrs(attrs, |input| {
            if input.peek(Token![@]) {
                return this.custom_attributes.parse_inner_stream(input);
            }
            let ident: Ident = input.parse()?;
            if ident == "name" {
                if this.name.is_some() {
                    return Err(duplicate(&ident));
                }
                this.name = Some(parse_string(input)?);
            } else if ident == "sealed" {
                if this.sealed.is_some() {
                    return Err(duplicate(&ident));
                }
                this.sealed = Some(ident.span());
            } else if ident == "auto_register" {
                if this.auto_register.is_some() {
                    return Err(duplicate(&ident));
                }
                let content;
                syn::parenthesized!(content in input);
                this.auto_register = Some((ident.span(), content.parse()?));
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    "unknown attribute, expected `name`, `sealed`, `auto_register` or `@expr`",
                ));
            }
            Ok(())
        })?;
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// How a field gets its value when the input lacks it.
pub(crate) enum FieldDefault {
    /// `Default::default()`.
    Trait,
    /// A function returning the default value.
    Path(syn::ExprPath),
}

/// Attributes of a field, or of a variant of a unit-only enum.
///
/// - `rename = "…"`: the element name.
/// - `default`, `default = "path"`: the element is optional.
/// - `skip`: the field is not serialized.
/// - `@expr`: an element annotation.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub default: Option<FieldDefault>,
    pub skip: Option<Span>,
    pub custom_attributes: CustomAttributes,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_serial_attrs(attrs, |input| {
            if input.peek(Token![@]) {
                return this.custom_attributes.parse_inner_stream(input);
            }
            let ident: Ident = if input.peek(Token![default]) {
                let token = input.parse::<Token![default]>()?;
                Ident::new("default", token.span)
            } else {
                input.parse()?
            };
            if ident == "rename" {
                if this.rename.is_some() {
                    return Err(duplicate(&ident));
                }
                this.rename = Some(parse_string(input)?);
            } else if ident == "default" {
                if this.default.is_some() {
                    return Err(duplicate(&ident));
                }
                this.default = Some(if input.peek(Token![=]) {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    FieldDefault::Path(lit.parse()?)
                } else {
                    FieldDefault::Trait
                });
            } else if ident == "skip" {
                if this.skip.is_some() {
                    return Err(duplicate(&ident));
                }
                this.skip = Some(ident.span());
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    "unknown attribute, expected `rename`, `default`, `skip` or `@expr`",
                ));
            }
            Ok(())
        })?;
        Ok(this)
    }
}
