use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use sf_utils::TypeIdMap;

/// Typed metadata attached to a descriptor or to one of its elements.
///
/// Values are keyed by their type, so at most one value of each type is kept.
/// Formats define the annotation types they understand and ignore the rest.
///
/// # Examples
///
/// ```
/// use sf_serial::descriptors::Annotations;
///
/// struct Alias(&'static str);
///
/// let annotations = Annotations::new().with(Alias("owner_name"));
/// assert_eq!(annotations.get::<Alias>().map(|a| a.0), Some("owner_name"));
/// assert!(!annotations.contains::<u8>());
/// ```
#[derive(Default, Clone)]
pub struct Annotations {
    values: TypeIdMap<Arc<dyn Any + Send + Sync>>,
}

impl Annotations {
    #[inline]
    pub const fn new() -> Self {
        Self {
            values: TypeIdMap::new(),
        }
    }

    /// Adds `value`, replacing a previous value of the same type.
    #[inline]
    pub fn with<A: Any + Send + Sync>(mut self, value: A) -> Self {
        self.values.insert(TypeId::of::<A>(), Arc::new(value));
        self
    }

    #[inline]
    pub fn get<A: Any>(&self) -> Option<&A> {
        self.values
            .get(&TypeId::of::<A>())
            .and_then(|value| value.downcast_ref::<A>())
    }

    #[inline]
    pub fn contains<A: Any>(&self) -> bool {
        self.values.contains(&TypeId::of::<A>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotations")
            .field("len", &self.values.len())
            .finish()
    }
}
