//! Items used by the code that `#[derive(Serializable)]` and
//! `open_polymorphic!` expand to.

pub use alloc::boxed::Box;
pub use alloc::string::String;
pub use alloc::sync::Arc;
pub use alloc::vec::Vec;
pub use core::any::Any;
pub use core::option::Option;
pub use core::result::Result;
pub use std::sync::OnceLock;

#[cfg(feature = "auto_register")]
pub use inventory;

use crate::descriptors::SerialDescriptor;
use crate::{Described, Serializable};

/// The descriptor of the default serializer of `T`.
///
/// Generated element descriptors refer to it as a `fn` pointer, so the
/// descriptor of a field type is only built when first queried.
#[inline]
pub fn descriptor_of<T: Serializable>() -> &'static SerialDescriptor {
    T::serializer().descriptor()
}

/// The default serializer of `T`, with `T` named by the caller.
#[inline(always)]
pub fn serializer_of<T: Serializable>() -> T::Serializer {
    T::serializer()
}
