//! Serializers for std types.
//!
//! Each std type gets a [`Serializable`](crate::Serializable) impl that
//! returns one of the strategies below. The composite strategies are
//! parameterized by the strategies of their items, so a list of a derived
//! type can also be written with a custom element strategy.

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod maps;
mod nullable;
mod primitives;

// -----------------------------------------------------------------------------
// Exports

pub use collections::{ListSerializer, SetSerializer};
pub use maps::MapSerializer;
pub use nullable::NullableSerializer;
pub use primitives::{BoolSerializer, CharSerializer, StringSerializer, UnitSerializer};
pub use primitives::{F32Serializer, F64Serializer};
pub use primitives::{I8Serializer, I16Serializer, I32Serializer, I64Serializer};
pub use primitives::{IsizeSerializer, U64Serializer, UsizeSerializer};
pub use primitives::{U8Serializer, U16Serializer, U32Serializer};
