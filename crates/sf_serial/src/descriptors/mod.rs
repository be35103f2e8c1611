//! Schema metadata describing the serial shape of a type.
//!
//! A [`SerialDescriptor`] is built once per type, stored in a `'static` cell
//! ([`DescriptorCell`] or [`GenericDescriptorCell`]) and never mutated.
//! Formats read it to decide how a value is laid out: which delimiters a
//! composite uses, which names its elements carry, which of them may be
//! absent from the input.

// -----------------------------------------------------------------------------
// Modules

mod annotations;
mod cell;
mod descriptor;
mod kind;

// -----------------------------------------------------------------------------
// Exports

pub use annotations::Annotations;
pub use cell::{DescriptorCell, GenericDescriptorCell};
pub use descriptor::{DescriptorBuilder, DescriptorFn, DescriptorRef};
pub use descriptor::{ElementDescriptor, SerialDescriptor};
pub use kind::{PolymorphicKind, PrimitiveKind, SerialKind};
