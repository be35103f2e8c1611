//! Format-agnostic serialization with a JSON format.
//!
//! - [`serial`]: descriptors, strategies, the encoder/decoder protocol and
//!   polymorphic modules.
//! - [`json`]: the JSON format.
//! - [`utils`]: hash containers shared by the crates.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use sf_json as json;
pub use sf_serial as serial;
pub use sf_utils as utils;
