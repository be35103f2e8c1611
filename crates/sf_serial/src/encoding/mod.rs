//! The push/pull protocol between strategies and formats.
//!
//! A format implements four traits:
//!
//! - [`Encoder`]: writes one value, or opens a composite.
//! - [`CompositeEncoder`]: writes the elements of an open composite.
//! - [`Decoder`]: reads one value, or opens a composite.
//! - [`CompositeDecoder`]: reports which element comes next and reads it.
//!
//! Composites are boxed trait objects borrowing their parent, and
//! `end_structure` consumes them. A composite is therefore ended at most
//! once, and never after its parent has moved on.
//!
//! The generic helpers (`encode_serializable_element`,
//! `decode_structure`, ...) are inherent methods of the trait objects, so the
//! traits stay object safe.

// -----------------------------------------------------------------------------
// Modules

mod decoder;
mod encoder;
mod marker;

// -----------------------------------------------------------------------------
// Exports

pub use decoder::{CompositeDecoder, Decoder, ElementIndex};
pub use encoder::{CompositeEncoder, Encoder};
pub use marker::ElementMarker;
