use core::fmt;
use core::marker::PhantomData;

use crate::SerialResult;
use crate::descriptors::SerialDescriptor;
use crate::encoding::{Decoder, Encoder};

// -----------------------------------------------------------------------------
// Strategies

/// Access to the descriptor a strategy is bound to.
///
/// Shared by [`SerializationStrategy`] and [`DeserializationStrategy`], so a
/// strategy pair implemented by one type always reports a single descriptor.
pub trait Described: Send + Sync {
    fn descriptor(&self) -> &'static SerialDescriptor;
}

/// Pushes a value of type `T` into an [`Encoder`].
///
/// Implementations are stateless and reusable; all traversal state lives in
/// the encoder.
pub trait SerializationStrategy<T: ?Sized>: Described {
    fn serialize(&self, encoder: &mut dyn Encoder, value: &T) -> SerialResult<()>;
}

/// Pulls a value of type `T` out of a [`Decoder`].
pub trait DeserializationStrategy<T>: Described {
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<T>;
}

/// A strategy that works in both directions.
pub trait Serializer<T>: SerializationStrategy<T> + DeserializationStrategy<T> {}

impl<T, S> Serializer<T> for S where S: SerializationStrategy<T> + DeserializationStrategy<T> + ?Sized {}

// -----------------------------------------------------------------------------
// Serializable

/// Types with a default [`Serializer`].
///
/// This is the registration surface formats use to find the strategy of a
/// static type. Implemented for the supported std types, and by
/// `#[derive(Serializable)]`.
///
/// # Examples
///
/// ```
/// use sf_serial::{Described, Serializable};
///
/// let descriptor = <Vec<Option<i32>> as Serializable>::serializer().descriptor();
/// assert_eq!(descriptor.serial_name(), "List");
/// assert!(descriptor.element_descriptor(0).is_nullable());
/// ```
pub trait Serializable: Sized {
    type Serializer: Serializer<Self> + 'static;

    fn serializer() -> Self::Serializer;
}

// -----------------------------------------------------------------------------
// Generated

/// The three functions `#[derive(Serializable)]` generates for a type.
///
/// [`GeneratedSerializer`] turns them into a strategy object.
pub trait GeneratedSerializable: Sized + 'static {
    fn generated_descriptor() -> &'static SerialDescriptor;

    fn generated_serialize(encoder: &mut dyn Encoder, value: &Self) -> SerialResult<()>;

    fn generated_deserialize(decoder: &mut dyn Decoder) -> SerialResult<Self>;
}

/// The strategy of a derived type.
pub struct GeneratedSerializer<T>(PhantomData<fn() -> T>);

impl<T> GeneratedSerializer<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Clone for GeneratedSerializer<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for GeneratedSerializer<T> {}

impl<T> Default for GeneratedSerializer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for GeneratedSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeneratedSerializer<{}>", core::any::type_name::<T>())
    }
}

impl<T: GeneratedSerializable> Described for GeneratedSerializer<T> {
    #[inline]
    fn descriptor(&self) -> &'static SerialDescriptor {
        T::generated_descriptor()
    }
}

impl<T: GeneratedSerializable> SerializationStrategy<T> for GeneratedSerializer<T> {
    #[inline]
    fn serialize(&self, encoder: &mut dyn Encoder, value: &T) -> SerialResult<()> {
        T::generated_serialize(encoder, value)
    }
}

impl<T: GeneratedSerializable> DeserializationStrategy<T> for GeneratedSerializer<T> {
    #[inline]
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<T> {
        T::generated_deserialize(decoder)
    }
}
