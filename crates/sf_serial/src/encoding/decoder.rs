use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;

use crate::descriptors::SerialDescriptor;
use crate::modules::SerializersModule;
use crate::{DeserializationStrategy, SerialError, SerialResult};

// -----------------------------------------------------------------------------
// ElementIndex

/// What a [`CompositeDecoder`] found next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementIndex {
    /// The element at this index follows.
    Element(usize),
    /// The composite has no more elements.
    Done,
    /// The input names an element the descriptor does not declare.
    ///
    /// Formats that skip unknown names never report this.
    UnknownName(String),
}

// -----------------------------------------------------------------------------
// Decoder

/// Reads values from a serial form.
pub trait Decoder {
    /// The module used to resolve open polymorphic values.
    fn serializers_module(&self) -> &SerializersModule {
        SerializersModule::empty()
    }

    /// Returns `false` if the next value is `null`, without consuming it.
    fn decode_not_null_mark(&mut self) -> SerialResult<bool>;

    /// Consumes a `null`.
    fn decode_null(&mut self) -> SerialResult<()>;

    fn decode_bool(&mut self) -> SerialResult<bool>;
    fn decode_i8(&mut self) -> SerialResult<i8>;
    fn decode_i16(&mut self) -> SerialResult<i16>;
    fn decode_i32(&mut self) -> SerialResult<i32>;
    fn decode_i64(&mut self) -> SerialResult<i64>;
    fn decode_f32(&mut self) -> SerialResult<f32>;
    fn decode_f64(&mut self) -> SerialResult<f64>;
    fn decode_char(&mut self) -> SerialResult<char>;
    fn decode_string(&mut self) -> SerialResult<String>;

    /// Reads an entry of the enum `descriptor` and returns its index.
    fn decode_enum(&mut self, descriptor: &'static SerialDescriptor) -> SerialResult<usize>;

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeDecoder + '_>>;

    /// Reads a polymorphic value of the hierarchy `root`.
    ///
    /// The format finds the subclass serial name and calls `resolve` with it
    /// and with a decoder positioned on the payload. `None` means the input
    /// carried no serial name at all.
    ///
    /// The default reads the two elements of the root descriptor: the
    /// subclass serial name (`type`), then the payload (`value`).
    fn decode_polymorphic(
        &mut self,
        root: &'static SerialDescriptor,
        resolve: &mut dyn FnMut(Option<&str>, &mut dyn Decoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        let mut composite = self.begin_structure(root)?;
        let mut serial_name: Option<String> = None;
        let mut resolved = false;

        loop {
            match composite.decode_element_index(root)? {
                ElementIndex::Done => break,
                ElementIndex::Element(0) => {
                    serial_name = Some(composite.decode_string_element(root, 0)?);
                }
                ElementIndex::Element(1) => {
                    let Some(name) = serial_name.as_deref() else {
                        return Err(SerialError::serialization(format!(
                            "Cannot read polymorphic value of '{}' before its type token",
                            root.serial_name()
                        )));
                    };
                    resolve(Some(name), composite.element_decoder(root, 1)?)?;
                    resolved = true;
                }
                ElementIndex::Element(index) => {
                    return Err(SerialError::unknown_element_index(root, index));
                }
                ElementIndex::UnknownName(name) => {
                    return Err(SerialError::unknown_element_name(root, &name));
                }
            }
        }

        if !resolved {
            return Err(SerialError::serialization(format!(
                "Polymorphic value of '{}' has not been read for class {}",
                root.serial_name(),
                serial_name.as_deref().unwrap_or("<missing>"),
            )));
        }
        composite.end_structure(root)
    }
}

impl<'a> dyn Decoder + 'a {
    /// Opens `descriptor`, runs `block` on the composite, then ends it.
    pub fn decode_structure<R>(
        &mut self,
        descriptor: &'static SerialDescriptor,
        block: impl FnOnce(&mut dyn CompositeDecoder) -> SerialResult<R>,
    ) -> SerialResult<R> {
        let mut composite = self.begin_structure(descriptor)?;
        let result = block(&mut *composite)?;
        composite.end_structure(descriptor)?;
        Ok(result)
    }

    #[inline]
    pub fn decode_serializable_value<T, S>(&mut self, strategy: &S) -> SerialResult<T>
    where
        S: DeserializationStrategy<T> + ?Sized,
    {
        strategy.deserialize(self)
    }

    pub fn decode_nullable_serializable_value<T, S>(
        &mut self,
        strategy: &S,
    ) -> SerialResult<Option<T>>
    where
        S: DeserializationStrategy<T> + ?Sized,
    {
        if self.decode_not_null_mark()? {
            strategy.deserialize(self).map(Some)
        } else {
            self.decode_null()?;
            Ok(None)
        }
    }
}

// -----------------------------------------------------------------------------
// CompositeDecoder

/// Reads the elements of an open composite.
///
/// The caller loops on [`decode_element_index`](Self::decode_element_index)
/// until [`ElementIndex::Done`], reads each reported element, then calls
/// [`end_structure`](Self::end_structure).
pub trait CompositeDecoder {
    fn decode_element_index(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<ElementIndex>;

    /// The number of entries of a list or map, when the format knows it up
    /// front.
    #[inline]
    fn decode_collection_size(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Option<usize>> {
        let _ = descriptor;
        Ok(None)
    }

    /// Returns the decoder positioned on element `index`.
    fn element_decoder(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<&mut dyn Decoder>;

    fn decode_bool_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<bool> {
        self.element_decoder(descriptor, index)?.decode_bool()
    }

    fn decode_i8_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<i8> {
        self.element_decoder(descriptor, index)?.decode_i8()
    }

    fn decode_i16_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<i16> {
        self.element_decoder(descriptor, index)?.decode_i16()
    }

    fn decode_i32_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<i32> {
        self.element_decoder(descriptor, index)?.decode_i32()
    }

    fn decode_i64_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<i64> {
        self.element_decoder(descriptor, index)?.decode_i64()
    }

    fn decode_f32_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<f32> {
        self.element_decoder(descriptor, index)?.decode_f32()
    }

    fn decode_f64_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<f64> {
        self.element_decoder(descriptor, index)?.decode_f64()
    }

    fn decode_char_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<char> {
        self.element_decoder(descriptor, index)?.decode_char()
    }

    fn decode_string_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<String> {
        self.element_decoder(descriptor, index)?.decode_string()
    }

    /// Closes the composite.
    ///
    /// # Panics
    ///
    /// Implementations panic if `descriptor` is not the one the composite was
    /// opened with.
    fn end_structure(self: Box<Self>, descriptor: &'static SerialDescriptor) -> SerialResult<()>;
}

impl<'a> dyn CompositeDecoder + 'a {
    #[inline]
    pub fn decode_serializable_element<T, S>(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        strategy: &S,
    ) -> SerialResult<T>
    where
        S: DeserializationStrategy<T> + ?Sized,
    {
        strategy.deserialize(self.element_decoder(descriptor, index)?)
    }

    pub fn decode_nullable_serializable_element<T, S>(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
        strategy: &S,
    ) -> SerialResult<Option<T>>
    where
        S: DeserializationStrategy<T> + ?Sized,
    {
        self.element_decoder(descriptor, index)?
            .decode_nullable_serializable_value(strategy)
    }
}
