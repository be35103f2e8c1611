use alloc::format;
use alloc::string::String;

use crate::descriptors::{DescriptorCell, PrimitiveKind, SerialDescriptor};
use crate::encoding::{Decoder, ElementIndex, Encoder};
use crate::{DeserializationStrategy, Described, SerialError, SerialResult};
use crate::{Serializable, SerializationStrategy};

// -----------------------------------------------------------------------------
// Native primitives

macro_rules! impl_native_serializer {
    ($name:ident, $ty:ty, $kind:ident, $encode:ident, $decode:ident) => {
        #[doc = concat!("Strategy of `", stringify!($ty), "`.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Described for $name {
            fn descriptor(&self) -> &'static SerialDescriptor {
                static DESCRIPTOR: DescriptorCell = DescriptorCell::new();
                DESCRIPTOR.get_or_init(|| {
                    SerialDescriptor::primitive(stringify!($ty), PrimitiveKind::$kind)
                })
            }
        }

        impl SerializationStrategy<$ty> for $name {
            #[inline]
            fn serialize(&self, encoder: &mut dyn Encoder, value: &$ty) -> SerialResult<()> {
                encoder.$encode(*value)
            }
        }

        impl DeserializationStrategy<$ty> for $name {
            #[inline]
            fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<$ty> {
                decoder.$decode()
            }
        }

        impl Serializable for $ty {
            type Serializer = $name;

            #[inline]
            fn serializer() -> $name {
                $name
            }
        }
    };
}

impl_native_serializer!(BoolSerializer, bool, Boolean, encode_bool, decode_bool);
impl_native_serializer!(I8Serializer, i8, Byte, encode_i8, decode_i8);
impl_native_serializer!(I16Serializer, i16, Short, encode_i16, decode_i16);
impl_native_serializer!(I32Serializer, i32, Int, encode_i32, decode_i32);
impl_native_serializer!(I64Serializer, i64, Long, encode_i64, decode_i64);
impl_native_serializer!(F32Serializer, f32, Float, encode_f32, decode_f32);
impl_native_serializer!(F64Serializer, f64, Double, encode_f64, decode_f64);
impl_native_serializer!(CharSerializer, char, Char, encode_char, decode_char);

// -----------------------------------------------------------------------------
// Widened primitives

// Written through the next wider signed kind; decoding checks the range.
macro_rules! impl_widened_serializer {
    ($name:ident, $ty:ty, $wide:ty, $kind:ident, $encode:ident, $decode:ident) => {
        #[doc = concat!("Strategy of `", stringify!($ty), "`, written as `", stringify!($wide), "`.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Described for $name {
            fn descriptor(&self) -> &'static SerialDescriptor {
                static DESCRIPTOR: DescriptorCell = DescriptorCell::new();
                DESCRIPTOR.get_or_init(|| {
                    SerialDescriptor::primitive(stringify!($ty), PrimitiveKind::$kind)
                })
            }
        }

        impl SerializationStrategy<$ty> for $name {
            fn serialize(&self, encoder: &mut dyn Encoder, value: &$ty) -> SerialResult<()> {
                let wide = <$wide>::try_from(*value).map_err(|_| {
                    SerialError::serialization(format!(
                        "{} value {value} does not fit into {}",
                        stringify!($ty),
                        stringify!($wide),
                    ))
                })?;
                encoder.$encode(wide)
            }
        }

        impl DeserializationStrategy<$ty> for $name {
            fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<$ty> {
                let wide = decoder.$decode()?;
                <$ty>::try_from(wide).map_err(|_| {
                    SerialError::serialization(format!(
                        "{wide} is out of range for {}",
                        stringify!($ty),
                    ))
                })
            }
        }

        impl Serializable for $ty {
            type Serializer = $name;

            #[inline]
            fn serializer() -> $name {
                $name
            }
        }
    };
}

impl_widened_serializer!(U8Serializer, u8, i16, Short, encode_i16, decode_i16);
impl_widened_serializer!(U16Serializer, u16, i32, Int, encode_i32, decode_i32);
impl_widened_serializer!(U32Serializer, u32, i64, Long, encode_i64, decode_i64);
impl_widened_serializer!(U64Serializer, u64, i64, Long, encode_i64, decode_i64);
impl_widened_serializer!(UsizeSerializer, usize, i64, Long, encode_i64, decode_i64);
impl_widened_serializer!(IsizeSerializer, isize, i64, Long, encode_i64, decode_i64);

// -----------------------------------------------------------------------------
// String

/// Strategy of [`String`], also usable to write a `str`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Described for StringSerializer {
    fn descriptor(&self) -> &'static SerialDescriptor {
        static DESCRIPTOR: DescriptorCell = DescriptorCell::new();
        DESCRIPTOR.get_or_init(|| SerialDescriptor::primitive("String", PrimitiveKind::String))
    }
}

impl SerializationStrategy<String> for StringSerializer {
    #[inline]
    fn serialize(&self, encoder: &mut dyn Encoder, value: &String) -> SerialResult<()> {
        encoder.encode_str(value)
    }
}

impl SerializationStrategy<str> for StringSerializer {
    #[inline]
    fn serialize(&self, encoder: &mut dyn Encoder, value: &str) -> SerialResult<()> {
        encoder.encode_str(value)
    }
}

impl DeserializationStrategy<String> for StringSerializer {
    #[inline]
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<String> {
        decoder.decode_string()
    }
}

impl Serializable for String {
    type Serializer = StringSerializer;

    #[inline]
    fn serializer() -> StringSerializer {
        StringSerializer
    }
}

// -----------------------------------------------------------------------------
// Unit

/// Strategy of `()`, an object without elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSerializer;

impl Described for UnitSerializer {
    fn descriptor(&self) -> &'static SerialDescriptor {
        static DESCRIPTOR: DescriptorCell = DescriptorCell::new();
        DESCRIPTOR.get_or_init(|| SerialDescriptor::object("Unit"))
    }
}

impl SerializationStrategy<()> for UnitSerializer {
    fn serialize(&self, encoder: &mut dyn Encoder, _: &()) -> SerialResult<()> {
        let descriptor = self.descriptor();
        encoder.begin_structure(descriptor)?.end_structure(descriptor)
    }
}

impl DeserializationStrategy<()> for UnitSerializer {
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<()> {
        let descriptor = self.descriptor();
        let mut composite = decoder.begin_structure(descriptor)?;
        match composite.decode_element_index(descriptor)? {
            ElementIndex::Done => composite.end_structure(descriptor),
            ElementIndex::Element(index) => {
                Err(SerialError::unknown_element_index(descriptor, index))
            }
            ElementIndex::UnknownName(name) => {
                Err(SerialError::unknown_element_name(descriptor, &name))
            }
        }
    }
}

impl Serializable for () {
    type Serializer = UnitSerializer;

    #[inline]
    fn serializer() -> UnitSerializer {
        UnitSerializer
    }
}

#[cfg(test)]
mod tests {
    use crate::descriptors::{PrimitiveKind, SerialKind};
    use crate::{Described, Serializable};

    #[test]
    fn descriptors_are_shared_and_named_after_the_type() {
        let a = <u16 as Serializable>::serializer().descriptor();
        let b = <u16 as Serializable>::serializer().descriptor();
        assert!(core::ptr::eq(a, b));
        assert_eq!(a.serial_name(), "u16");
        assert_eq!(a.kind(), SerialKind::Primitive(PrimitiveKind::Int));

        let unit = <() as Serializable>::serializer().descriptor();
        assert_eq!(unit.kind(), SerialKind::Object);
        assert_eq!(unit.elements_count(), 0);
    }
}
