use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::fmt::Display;

use sf_serial::descriptors::{SerialDescriptor, SerialKind};
use sf_serial::encoding::{CompositeEncoder, Encoder};
use sf_serial::modules::SerializersModule;
use sf_serial::{SerialError, SerialResult};

use crate::annotations::discriminator_key;
use crate::composer::Composer;
use crate::mode::{WriteMode, switch_mode};
use crate::primitives::{special_float_error, special_float_name};
use crate::{Json, JsonConfig};

// -----------------------------------------------------------------------------
// StreamingEncoder

/// Writes JSON text straight into a [`Composer`].
pub(crate) struct StreamingEncoder<'j> {
    composer: Composer<'j>,
    json: &'j Json,
    /// The next scalar is a map key and must be quoted.
    key_mode: bool,
    /// Discriminator key and serial name, written first by the next
    /// structure.
    pending: Option<(&'j str, &'static str)>,
}

impl<'j> StreamingEncoder<'j> {
    pub fn new(json: &'j Json) -> Self {
        let config = json.config();
        let indent = config.pretty_print.then_some(&*config.pretty_print_indent);
        Self {
            composer: Composer::new(indent),
            json,
            key_mode: false,
            pending: None,
        }
    }

    #[inline]
    pub fn finish(self) -> String {
        self.composer.finish()
    }

    #[inline]
    fn config(&self) -> &'j JsonConfig {
        self.json.config()
    }

    /// Writes a number or literal, quoted in key position.
    fn print_scalar(&mut self, value: impl Display) {
        if core::mem::take(&mut self.key_mode) {
            self.composer.print_char('"');
            self.composer.print_display(value);
            self.composer.print_char('"');
        } else {
            self.composer.print_display(value);
        }
    }

    fn print_float(&mut self, value: f64, text: impl Display) -> SerialResult<()> {
        if value.is_finite() {
            self.print_scalar(text);
            return Ok(());
        }
        if !self.config().allow_special_floating_point_values {
            return Err(special_float_error(value));
        }
        self.print_scalar(special_float_name(value));
        Ok(())
    }

    fn encode_array_polymorphic(
        &mut self,
        subclass: &'static SerialDescriptor,
        body: &mut dyn FnMut(&mut dyn Encoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        self.composer.print_char('[');
        self.composer.indent();
        self.composer.next_item();
        self.composer.print_quoted(subclass.serial_name());
        self.composer.print_char(',');
        self.composer.next_item();
        body(self)?;
        self.composer.unindent();
        self.composer.next_item();
        self.composer.print_char(']');
        Ok(())
    }
}

/// Rejects subclasses that cannot carry a discriminator key.
fn check_subclass(
    root: &SerialDescriptor,
    subclass: &SerialDescriptor,
    key: &str,
) -> SerialResult<()> {
    let message = match subclass.kind() {
        SerialKind::Class | SerialKind::Object => {
            if subclass.element_index(key).is_none() {
                return Ok(());
            }
            format!(
                "Class '{}' cannot be serialized as base class '{}' because it has a property \
                 named like the class discriminator '{key}'. Either change the class \
                 discriminator, rename the property, or use array polymorphism.",
                subclass.serial_name(),
                root.serial_name(),
            )
        }
        SerialKind::Enum => format!(
            "Enums cannot be serialized polymorphically with '{key}' parameter. \
             Use 'use_array_polymorphism(true)' in the Json builder instead."
        ),
        SerialKind::Primitive(_) => format!(
            "Primitives cannot be serialized polymorphically with '{key}' parameter. \
             Use 'use_array_polymorphism(true)' in the Json builder instead."
        ),
        SerialKind::Polymorphic(_) => {
            "Actual serializer for polymorphic cannot be polymorphic itself.".into()
        }
        kind => format!(
            "Class '{}' with serial kind '{kind}' cannot be serialized polymorphically with a \
             class discriminator.",
            subclass.serial_name(),
        ),
    };
    Err(SerialError::json_encoding(message))
}

impl Encoder for StreamingEncoder<'_> {
    fn serializers_module(&self) -> &SerializersModule {
        self.json.module()
    }

    fn encode_bool(&mut self, value: bool) -> SerialResult<()> {
        self.print_scalar(value);
        Ok(())
    }

    fn encode_i8(&mut self, value: i8) -> SerialResult<()> {
        self.print_scalar(value);
        Ok(())
    }

    fn encode_i16(&mut self, value: i16) -> SerialResult<()> {
        self.print_scalar(value);
        Ok(())
    }

    fn encode_i32(&mut self, value: i32) -> SerialResult<()> {
        self.print_scalar(value);
        Ok(())
    }

    fn encode_i64(&mut self, value: i64) -> SerialResult<()> {
        self.print_scalar(value);
        Ok(())
    }

    fn encode_f32(&mut self, value: f32) -> SerialResult<()> {
        self.print_float(f64::from(value), format_args!("{value:?}"))
    }

    fn encode_f64(&mut self, value: f64) -> SerialResult<()> {
        self.print_float(value, format_args!("{value:?}"))
    }

    fn encode_char(&mut self, value: char) -> SerialResult<()> {
        self.key_mode = false;
        self.composer.print_quoted(value.encode_utf8(&mut [0; 4]));
        Ok(())
    }

    fn encode_str(&mut self, value: &str) -> SerialResult<()> {
        self.key_mode = false;
        self.composer.print_quoted(value);
        Ok(())
    }

    fn encode_enum(&mut self, descriptor: &'static SerialDescriptor, index: usize) -> SerialResult<()> {
        self.key_mode = false;
        self.composer.print_quoted(descriptor.element_name(index));
        Ok(())
    }

    fn encode_null(&mut self) -> SerialResult<()> {
        self.print_scalar("null");
        Ok(())
    }

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeEncoder + '_>> {
        let mode = switch_mode(descriptor, self.config())?;
        self.key_mode = false;
        self.composer.print_char(mode.begin());
        self.composer.indent();

        let mut written = 0;
        if let Some((key, serial_name)) = self.pending.take() {
            self.composer.next_item();
            self.composer.print_quoted(key);
            self.composer.print_char(':');
            self.composer.space();
            self.composer.print_quoted(serial_name);
            written = 1;
        }

        Ok(Box::new(StreamingComposite {
            encoder: self,
            descriptor,
            mode,
            written,
        }))
    }

    fn encode_polymorphic(
        &mut self,
        root: &'static SerialDescriptor,
        subclass: &'static SerialDescriptor,
        body: &mut dyn FnMut(&mut dyn Encoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        let config = self.config();
        if config.use_array_polymorphism {
            return self.encode_array_polymorphic(subclass, body);
        }

        let key = discriminator_key(root, config);
        check_subclass(root, subclass, key)?;

        self.pending = Some((key, subclass.serial_name()));
        body(self)?;
        if self.pending.take().is_some() {
            return Err(SerialError::serialization(format!(
                "Subclass '{}' of '{}' was not written as a JSON object",
                subclass.serial_name(),
                root.serial_name(),
            )));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// StreamingComposite

struct StreamingComposite<'e, 'j> {
    encoder: &'e mut StreamingEncoder<'j>,
    descriptor: &'static SerialDescriptor,
    mode: WriteMode,
    written: usize,
}

impl CompositeEncoder for StreamingComposite<'_, '_> {
    fn element_encoder(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<&mut dyn Encoder> {
        let composer = &mut self.encoder.composer;
        match self.mode {
            WriteMode::Obj => {
                if self.written > 0 {
                    composer.print_char(',');
                }
                composer.next_item();
                composer.print_quoted(descriptor.element_name(index));
                composer.print_char(':');
                composer.space();
            }
            WriteMode::List | WriteMode::ListMap => {
                if self.written > 0 {
                    composer.print_char(',');
                }
                composer.next_item();
            }
            WriteMode::Map if index % 2 == 0 => {
                if self.written > 0 {
                    composer.print_char(',');
                }
                composer.next_item();
                self.encoder.key_mode = true;
            }
            WriteMode::Map => {
                composer.print_char(':');
                composer.space();
            }
        }
        self.written += 1;
        Ok(&mut *self.encoder)
    }

    fn should_encode_element_default(
        &self,
        _descriptor: &'static SerialDescriptor,
        _index: usize,
    ) -> bool {
        self.encoder.config().encode_defaults
    }

    fn encode_null_element(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<()> {
        if self.mode == WriteMode::Obj && !self.encoder.config().explicit_nulls {
            return Ok(());
        }
        self.element_encoder(descriptor, index)?.encode_null()
    }

    fn end_structure(self: Box<Self>, descriptor: &'static SerialDescriptor) -> SerialResult<()> {
        assert!(
            core::ptr::eq(descriptor, self.descriptor) || descriptor == self.descriptor,
            "Composite of '{}' ended with the descriptor of '{}'",
            self.descriptor.serial_name(),
            descriptor.serial_name(),
        );
        let composer = &mut self.encoder.composer;
        composer.unindent();
        if self.written > 0 {
            composer.next_item();
        }
        composer.print_char(self.mode.end());
        Ok(())
    }
}
