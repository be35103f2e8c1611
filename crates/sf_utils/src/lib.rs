//! Small shared utilities for the serialization crates.
//!
//! - [`hash`]: hash containers with a fixed seed, re-exports *hashbrown* and *foldhash*.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId), used for
//!   annotation sets, generic descriptor cells and polymorphic registries.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

pub mod hash;

mod typeid_map;

// -----------------------------------------------------------------------------
// Exports

pub use typeid_map::TypeIdMap;
