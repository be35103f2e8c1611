use crate::descriptors::{GenericDescriptorCell, SerialDescriptor};
use crate::encoding::{Decoder, Encoder};
use crate::{DeserializationStrategy, Described, SerialResult};
use crate::{Serializable, SerializationStrategy};

/// Wraps a strategy so that it accepts `None`.
///
/// The descriptor is the nullable twin of the inner one. `None` is written
/// with [`Encoder::encode_null`], `Some` after [`Encoder::encode_not_null_mark`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullableSerializer<S>(S);

impl<S> NullableSerializer<S> {
    #[inline]
    pub const fn new(inner: S) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn inner(&self) -> &S {
        &self.0
    }
}

impl<S: Described + 'static> Described for NullableSerializer<S> {
    fn descriptor(&self) -> &'static SerialDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<S>(|| self.0.descriptor().to_nullable())
    }
}

impl<T, S> SerializationStrategy<Option<T>> for NullableSerializer<S>
where
    S: SerializationStrategy<T> + 'static,
{
    fn serialize(&self, encoder: &mut dyn Encoder, value: &Option<T>) -> SerialResult<()> {
        encoder.encode_nullable_serializable_value(&self.0, value.as_ref())
    }
}

impl<T, S> DeserializationStrategy<Option<T>> for NullableSerializer<S>
where
    S: DeserializationStrategy<T> + 'static,
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<Option<T>> {
        decoder.decode_nullable_serializable_value(&self.0)
    }
}

impl<T: Serializable> Serializable for Option<T> {
    type Serializer = NullableSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        NullableSerializer(T::serializer())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::testing::{Token, decode, encode};
    use crate::{Described, Serializable};

    #[test]
    fn descriptor_is_nullable_twin() {
        let descriptor = <Option<i32> as Serializable>::serializer().descriptor();
        assert_eq!(descriptor.serial_name(), "i32?");
        assert!(descriptor.is_nullable());
        assert!(core::ptr::eq(
            descriptor,
            <Option<i32> as Serializable>::serializer().descriptor()
        ));
    }

    #[test]
    fn none_and_some() {
        assert_eq!(encode(&None::<i32>), [Token::Null]);
        assert_eq!(encode(&Some(7_i32)), [Token::I32(7)]);
        assert_eq!(decode::<Option<i32>>(vec![Token::Null]).unwrap(), None);
        assert_eq!(decode::<Option<i32>>(vec![Token::I32(7)]).unwrap(), Some(7));
    }
}
