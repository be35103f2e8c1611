use alloc::boxed::Box;

use crate::descriptors::SerialDescriptor;
use crate::modules::SerializersModule;
use crate::{SerialResult, SerializationStrategy};

// -----------------------------------------------------------------------------
// Encoder

/// Writes values into a serial form.
///
/// Primitive methods write one scalar. `begin_structure` and
/// `begin_collection` open a composite whose elements are written through the
/// returned [`CompositeEncoder`].
pub trait Encoder {
    /// The module used to resolve open polymorphic values.
    fn serializers_module(&self) -> &SerializersModule {
        SerializersModule::empty()
    }

    fn encode_bool(&mut self, value: bool) -> SerialResult<()>;
    fn encode_i8(&mut self, value: i8) -> SerialResult<()>;
    fn encode_i16(&mut self, value: i16) -> SerialResult<()>;
    fn encode_i32(&mut self, value: i32) -> SerialResult<()>;
    fn encode_i64(&mut self, value: i64) -> SerialResult<()>;
    fn encode_f32(&mut self, value: f32) -> SerialResult<()>;
    fn encode_f64(&mut self, value: f64) -> SerialResult<()>;
    fn encode_char(&mut self, value: char) -> SerialResult<()>;
    fn encode_str(&mut self, value: &str) -> SerialResult<()>;

    /// Writes the entry of `descriptor` (an enum descriptor) at `index`.
    fn encode_enum(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<()>;

    fn encode_null(&mut self) -> SerialResult<()>;

    /// Announces that a non-null value of a nullable type follows.
    #[inline]
    fn encode_not_null_mark(&mut self) -> SerialResult<()> {
        Ok(())
    }

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeEncoder + '_>>;

    /// Opens a list or map of `size` entries.
    #[inline]
    fn begin_collection(
        &mut self,
        descriptor: &'static SerialDescriptor,
        size: usize,
    ) -> SerialResult<Box<dyn CompositeEncoder + '_>> {
        let _ = size;
        self.begin_structure(descriptor)
    }

    /// Writes a polymorphic value whose concrete subclass is described by
    /// `subclass`. `body` writes the subclass payload into the encoder it is
    /// given.
    ///
    /// The default writes the two elements of the root descriptor: the
    /// subclass serial name (`type`), then the payload (`value`).
    fn encode_polymorphic(
        &mut self,
        root: &'static SerialDescriptor,
        subclass: &'static SerialDescriptor,
        body: &mut dyn FnMut(&mut dyn Encoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        let mut composite = self.begin_structure(root)?;
        composite.encode_str_element(root, 0, subclass.serial_name())?;
        body(composite.element_encoder(root, 1)?)?;
        composite.end_structure(root)
    }
}

impl<'a> dyn Encoder + 'a {
    /// Opens `descriptor`, runs `block` on the composite, then ends it.
    ///
    /// When `block` fails the composite is not ended and the error is
    /// returned as is; whatever was written so far stays in the output.
    pub fn encode_structure<R>(
        &mut self,
        descriptor: &'static SerialDescriptor,
        block: impl FnOnce(&mut dyn CompositeEncoder) -> SerialResult<R>,
    ) -> SerialResult<R> {
        let mut composite = self.begin_structure(descriptor)?;
        let result = block(&mut *composite)?;
        composite.end_structure(descriptor)?;
        Ok(result)
    }

    #[inline]
    pub fn encode_serializable_value<T, S>(&mut self, strategy: &S, value: &T) -> SerialResult<()>
    where
        T: ?Sized,
        S: SerializationStrategy<T> + ?Sized,
    {
        strategy.serialize(self, value)
    }

    pub fn encode_nullable_serializable_value<T, S>(
        &mut self,
        strategy: &S,
        value: Option<&T>,
    ) -> SerialResult<()>
    where
        T: ?Sized,
        S: SerializationStrategy<T> + ?Sized,
    {
        match value {
            Some(value) => {
                self.encode_not_null_mark()?;
                strategy.serialize(self, value)
            }
            None => self.encode_null(),
        }
    }
}

// -----------------------------------------------------------------------------
// CompositeEncoder

/// Writes the elements of an open composite.
///
/// Every element method takes the composite's descriptor and the element
/// index. For lists the index counts the items; for maps keys sit at even
/// and values at odd indices.
pub trait CompositeEncoder {
    /// Prepares element `index` and returns the encoder that writes it.
    fn element_encoder(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<&mut dyn Encoder>;

    /// Whether an optional element equal to its default is written anyway.
    #[inline]
    fn should_encode_element_default(
        &self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> bool {
        let _ = (descriptor, index);
        true
    }

    fn encode_bool_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: bool,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_bool(value)
    }

    fn encode_i8_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: i8,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_i8(value)
    }

    fn encode_i16_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: i16,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_i16(value)
    }

    fn encode_i32_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: i32,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_i32(value)
    }

    fn encode_i64_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: i64,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_i64(value)
    }

    fn encode_f32_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: f32,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_f32(value)
    }

    fn encode_f64_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: f64,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_f64(value)
    }

    fn encode_char_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: char,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_char(value)
    }

    fn encode_str_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        value: &str,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_str(value)
    }

    /// Writes `null` for element `index`. Formats may leave the element out
    /// instead.
    fn encode_null_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<()> {
        self.element_encoder(descriptor, index)?.encode_null()
    }

    /// Closes the composite.
    ///
    /// # Panics
    ///
    /// Implementations panic if `descriptor` is not the one the composite was
    /// opened with.
    fn end_structure(self: Box<Self>, descriptor: &'static SerialDescriptor) -> SerialResult<()>;
}

impl<'a> dyn CompositeEncoder + 'a {
    #[inline]
    pub fn encode_serializable_element<T, S>(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        strategy: &S,
        value: &T,
    ) -> SerialResult<()>
    where
        T: ?Sized,
        S: SerializationStrategy<T> + ?Sized,
    {
        strategy.serialize(self.element_encoder(descriptor, index)?, value)
    }

    /// Writes an element of a nullable type.
    ///
    /// # Panics
    ///
    /// If `value` is `None` and the element descriptor is not nullable.
    pub fn encode_nullable_serializable_element<T, S>(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        strategy: &S,
        value: Option<&T>,
    ) -> SerialResult<()>
    where
        T: ?Sized,
        S: SerializationStrategy<T> + ?Sized,
    {
        match value {
            Some(value) => {
                let encoder = self.element_encoder(descriptor, index)?;
                encoder.encode_not_null_mark()?;
                strategy.serialize(encoder, value)
            }
            None => {
                assert!(
                    descriptor.element_descriptor(index).is_nullable(),
                    "Cannot encode null into non-nullable element '{}' of '{}'",
                    descriptor.element_name(index),
                    descriptor.serial_name(),
                );
                self.encode_null_element(descriptor, index)
            }
        }
    }
}
