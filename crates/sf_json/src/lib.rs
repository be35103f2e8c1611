//! The JSON format for `sf_serial`.
//!
//! [`Json`] drives any serialization strategy over JSON text: the streaming
//! encoder writes straight into a string, the streaming decoder reads
//! straight from the input, and polymorphic values go through the
//! [`JsonElement`] tree so their discriminator can sit anywhere in the
//! object.
//!
//! ## Menu
//!
//! - [`Json`]: the entry points, `encode`/`decode` and the tree variants.
//! - [`JsonBuilder`] and [`JsonConfig`]: options and their validation.
//! - [`JsonElement`]: the parsed tree, with `serde` interop.
//! - [`JsonNames`] and [`ClassDiscriminator`]: descriptor annotations the
//!   format understands.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod annotations;
mod composer;
mod config;
mod decoder;
mod element;
mod encoder;
mod json;
mod lexer;
mod mode;
mod path;
mod primitives;
mod reader;
mod tree;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use annotations::{ClassDiscriminator, JsonNames};
pub use config::{JsonBuilder, JsonConfig, JsonConfigError};
pub use element::{JsonElement, JsonNumber, JsonObject};
pub use json::Json;
