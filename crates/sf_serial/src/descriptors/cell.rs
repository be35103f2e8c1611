//! Static storage for descriptors.
//!
//! A descriptor is built on first use and then lives for the rest of the
//! program, so serializers can hand out `&'static SerialDescriptor`.
//!
//! - [`DescriptorCell`] serves a non-generic type: a single [`OnceLock`].
//! - [`GenericDescriptorCell`] serves a generic family. A `static` inside a
//!   generic function is shared by every instantiation, so the cell keeps one
//!   descriptor per [`TypeId`].

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use sf_utils::TypeIdMap;

use super::SerialDescriptor;

// -----------------------------------------------------------------------------
// DescriptorCell

/// Lazily built descriptor of a non-generic type.
///
/// # Examples
///
/// ```
/// use sf_serial::descriptors::{DescriptorCell, SerialDescriptor};
///
/// fn descriptor() -> &'static SerialDescriptor {
///     static CELL: DescriptorCell = DescriptorCell::new();
///     CELL.get_or_init(|| SerialDescriptor::object("Marker"))
/// }
///
/// assert!(core::ptr::eq(descriptor(), descriptor()));
/// ```
pub struct DescriptorCell(OnceLock<SerialDescriptor>);

impl DescriptorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> SerialDescriptor) -> &SerialDescriptor {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericDescriptorCell

/// Lazily built descriptors of a generic family, one per type.
///
/// # Examples
///
/// ```
/// use core::marker::PhantomData;
/// use sf_serial::descriptors::{GenericDescriptorCell, SerialDescriptor};
///
/// struct Tagged<T>(PhantomData<T>);
///
/// fn descriptor<T: 'static>() -> &'static SerialDescriptor {
///     static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
///     CELL.get_or_insert::<Tagged<T>>(|| {
///         SerialDescriptor::object(format!("Tagged<{}>", core::any::type_name::<T>()))
///     })
/// }
///
/// assert_eq!(descriptor::<u8>().serial_name(), "Tagged<u8>");
/// assert_eq!(descriptor::<i64>().serial_name(), "Tagged<i64>");
/// ```
pub struct GenericDescriptorCell(RwLock<TypeIdMap<&'static SerialDescriptor>>);

impl GenericDescriptorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the descriptor stored for `G`, building it with `f` if absent.
    ///
    /// `f` runs without the lock held, so it may look up other descriptors
    /// of the same family.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(
        &self,
        f: impl FnOnce() -> SerialDescriptor,
    ) -> &'static SerialDescriptor {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> SerialDescriptor,
    ) -> &'static SerialDescriptor {
        if let Some(descriptor) = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
        {
            return descriptor;
        }

        let built = f();
        let mut map = self.0.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race while `f` ran.
        *map.get_or_insert_with(type_id, || Box::leak(Box::new(built)))
    }
}
