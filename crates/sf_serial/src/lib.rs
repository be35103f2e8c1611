//! Format-agnostic serialization.
//!
//! A type is serialized through a strategy bound to a [`SerialDescriptor`],
//! the schema of its serial shape. Strategies push values into an
//! [`Encoder`] and pull them out of a [`Decoder`]; a format implements those
//! traits once and then works with every serializable type.
//!
//! ## Menu
//!
//! - [`descriptors`]: [`SerialDescriptor`], its kinds, annotations and static cells.
//! - [`encoding`]: the encoder/decoder protocol.
//! - [`builtins`]: strategies of std types.
//! - [`modules`]: polymorphic scopes and the [`SerializersModule`].
//! - [`recovery`]: re-raising errors after an asynchronous hop.
//! - [`Serializable`](derive::Serializable): the derive macro.
//!
//! [`SerialDescriptor`]: descriptors::SerialDescriptor
//! [`Encoder`]: encoding::Encoder
//! [`Decoder`]: encoding::Decoder
//! [`SerializersModule`]: modules::SerializersModule
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// The derive names this crate `sf_serial`, also when it expands inside the
// crate itself.
extern crate self as sf_serial;

// -----------------------------------------------------------------------------
// no_std support

// Descriptor cells need `OnceLock`/`RwLock` and `recovery` spawns threads.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod strategy;

pub mod builtins;
pub mod descriptors;
pub mod encoding;
pub mod modules;
pub mod recovery;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{SerialError, SerialErrorKind, SerialResult};
pub use sf_serial_derive as derive;
pub use sf_serial_derive::Serializable;
pub use strategy::{DeserializationStrategy, Described, SerializationStrategy, Serializer};
pub use strategy::{GeneratedSerializable, GeneratedSerializer, Serializable};
