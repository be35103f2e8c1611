use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};

use log::trace;
use sf_serial::descriptors::{SerialDescriptor, SerialKind};
use sf_serial::encoding::{CompositeDecoder, Decoder, ElementIndex, ElementMarker};
use sf_serial::modules::SerializersModule;
use sf_serial::{SerialError, SerialResult};

use crate::annotations::element_index_for_key;
use crate::lexer::{Lexer, Token, UNKNOWN_KEYS_HINT};
use crate::mode::{WriteMode, switch_mode};
use crate::primitives::{is_number, parse_bool, parse_integer, special_float, special_float_message};
use crate::reader::read_element;
use crate::tree::TreeDecoder;
use crate::{Json, JsonConfig};

/// A primitive as it appeared in the input.
struct Scalar<'a> {
    text: Cow<'a, str>,
    quoted: bool,
    offset: usize,
    /// Quoted numbers and booleans are accepted here.
    coercible: bool,
}

// -----------------------------------------------------------------------------
// StreamingDecoder

/// Decodes values straight from JSON text.
pub(crate) struct StreamingDecoder<'a, 'j> {
    pub lexer: Lexer<'a>,
    json: &'j Json,
    /// Number of open composites.
    depth: usize,
    /// The next scalar is a map key.
    key_mode: bool,
    /// The next value is a missing element decoded as null.
    force_null: bool,
}

impl<'a, 'j> StreamingDecoder<'a, 'j> {
    pub fn new(json: &'j Json, input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            json,
            depth: 0,
            key_mode: false,
            force_null: false,
        }
    }

    #[inline]
    fn config(&self) -> &'j JsonConfig {
        self.json.config()
    }

    /// Whether unquoted strings are accepted at the cursor.
    #[inline]
    fn lenient_here(&self) -> bool {
        self.depth > 0 && self.config().lenient
    }

    fn scalar(&mut self) -> SerialResult<Scalar<'a>> {
        let coercible = self.key_mode || self.lenient_here();
        self.key_mode = false;
        self.lexer.peek();
        let offset = self.lexer.offset();
        let (text, quoted) = self.lexer.consume_scalar()?;
        Ok(Scalar {
            text,
            quoted,
            offset,
            coercible,
        })
    }

    fn literal_error(&self, scalar: &Scalar<'_>, kind: &str) -> SerialError {
        let message = if scalar.quoted && !scalar.coercible {
            format!("Expected an unquoted {kind} literal, but had the string \"{}\"", scalar.text)
        } else {
            format!("Failed to parse literal '{}' as {kind} value", scalar.text)
        };
        self.lexer.fail_at(scalar.offset, message, None)
    }

    fn decode_integer<T: TryFrom<i64>>(&mut self, kind: &str) -> SerialResult<T> {
        let scalar = self.scalar()?;
        if scalar.quoted && !scalar.coercible {
            return Err(self.literal_error(&scalar, kind));
        }
        parse_integer(&scalar.text)
            .and_then(|value| T::try_from(value).ok())
            .ok_or_else(|| self.literal_error(&scalar, kind))
    }

    fn decode_float(&mut self, kind: &str) -> SerialResult<f64> {
        let scalar = self.scalar()?;
        if let Some(value) = special_float(&scalar.text) {
            if !self.config().allow_special_floating_point_values {
                return Err(self.lexer.fail_at(scalar.offset, special_float_message(value), None));
            }
            return Ok(value);
        }
        if (scalar.quoted && !scalar.coercible) || !is_number(&scalar.text) {
            return Err(self.literal_error(&scalar, kind));
        }
        match scalar.text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.literal_error(&scalar, kind)),
        }
    }

    fn read_string(&mut self) -> SerialResult<Cow<'a, str>> {
        self.key_mode = false;
        let lenient = self.lenient_here();
        self.lexer.consume_string(lenient)
    }
}

impl Decoder for StreamingDecoder<'_, '_> {
    fn serializers_module(&self) -> &SerializersModule {
        self.json.module()
    }

    fn decode_not_null_mark(&mut self) -> SerialResult<bool> {
        Ok(!self.force_null && !self.lexer.peek_null())
    }

    fn decode_null(&mut self) -> SerialResult<()> {
        self.key_mode = false;
        if core::mem::take(&mut self.force_null) {
            return Ok(());
        }
        self.lexer.consume_null()
    }

    fn decode_bool(&mut self) -> SerialResult<bool> {
        let scalar = self.scalar()?;
        if scalar.quoted && !scalar.coercible {
            return Err(self.literal_error(&scalar, "boolean"));
        }
        parse_bool(&scalar.text).ok_or_else(|| self.literal_error(&scalar, "boolean"))
    }

    fn decode_i8(&mut self) -> SerialResult<i8> {
        self.decode_integer("byte")
    }

    fn decode_i16(&mut self) -> SerialResult<i16> {
        self.decode_integer("short")
    }

    fn decode_i32(&mut self) -> SerialResult<i32> {
        self.decode_integer("int")
    }

    fn decode_i64(&mut self) -> SerialResult<i64> {
        self.decode_integer("long")
    }

    fn decode_f32(&mut self) -> SerialResult<f32> {
        let value = self.decode_float("float")?;
        let narrowed = value as f32;
        if value.is_finite() && !narrowed.is_finite() {
            return Err(self.lexer.fail(format!("Value {value} is out of the range of float")));
        }
        Ok(narrowed)
    }

    fn decode_f64(&mut self) -> SerialResult<f64> {
        self.decode_float("double")
    }

    fn decode_char(&mut self) -> SerialResult<char> {
        self.lexer.peek();
        let offset = self.lexer.offset();
        let text = self.read_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(self.lexer.fail_at(
                offset,
                format!("Expected a single char, but had \"{text}\""),
                None,
            )),
        }
    }

    fn decode_string(&mut self) -> SerialResult<String> {
        self.read_string().map(Cow::into_owned)
    }

    fn decode_enum(&mut self, descriptor: &'static SerialDescriptor) -> SerialResult<usize> {
        self.lexer.peek();
        let offset = self.lexer.offset();
        let name = self.read_string()?;
        element_index_for_key(descriptor, &name, self.config()).ok_or_else(|| {
            self.lexer.fail_at(
                offset,
                format!(
                    "'{}' does not contain element with name '{name}'",
                    descriptor.serial_name()
                ),
                None,
            )
        })
    }

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeDecoder + '_>> {
        let mode = switch_mode(descriptor, self.config())?;
        self.key_mode = false;
        self.lexer.consume(mode.begin_token())?;
        self.lexer.enter()?;
        self.depth += 1;

        Ok(Box::new(StreamingComposite {
            decoder: self,
            descriptor,
            mode,
            position: 0,
            marker: ElementMarker::new(descriptor.elements_count()),
            forced: None,
        }))
    }

    fn decode_polymorphic(
        &mut self,
        root: &'static SerialDescriptor,
        resolve: &mut dyn FnMut(Option<&str>, &mut dyn Decoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        self.key_mode = false;
        let nested = self.depth > 0;
        let config = self.config();
        let element = read_element(&mut self.lexer, config, nested)?;
        let mut tree = TreeDecoder::new(&element, self.json, self.lexer.path.to_string(), nested);
        tree.decode_polymorphic(root, resolve)
    }
}

// -----------------------------------------------------------------------------
// StreamingComposite

struct StreamingComposite<'d, 'a, 'j> {
    decoder: &'d mut StreamingDecoder<'a, 'j>,
    descriptor: &'static SerialDescriptor,
    mode: WriteMode,
    /// Entries read from the input so far.
    position: usize,
    marker: ElementMarker,
    /// A missing nullable element reported without input.
    forced: Option<usize>,
}

impl StreamingComposite<'_, '_, '_> {
    fn decode_object_index(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<ElementIndex> {
        let config = self.decoder.config();
        loop {
            let lexer = &mut self.decoder.lexer;
            if !lexer.next_element(self.position == 0, Token::EndObject, config.allow_trailing_comma)? {
                return Ok(self.missing_null(descriptor));
            }
            self.position += 1;

            lexer.peek();
            let key_offset = lexer.offset();
            let key = lexer.consume_string(config.lenient)?;
            lexer.path.key(&key);
            lexer.consume(Token::Colon)?;

            match element_index_for_key(descriptor, &key, config) {
                Some(index) => {
                    if config.coerce_input_values && self.coerce_value(descriptor, index)? {
                        trace!(
                            "coerced the input of '{}.{key}' to its default",
                            descriptor.serial_name()
                        );
                        continue;
                    }
                    self.marker.mark(index);
                    return Ok(ElementIndex::Element(index));
                }
                None if config.ignore_unknown_keys => {
                    trace!("skipping unknown key '{key}' of '{}'", descriptor.serial_name());
                    lexer.skip_element()?;
                }
                None => {
                    let located = lexer.fail_at(
                        key_offset,
                        format!("Encountered an unknown key '{key}'"),
                        Some(UNKNOWN_KEYS_HINT),
                    );
                    return Err(SerialError::unknown_field(
                        descriptor.serial_name(),
                        key,
                        located.message(),
                    ));
                }
            }
        }
    }

    /// Whether the value under the cursor is skipped so the default of the
    /// optional element `index` applies.
    fn coerce_value(
        &mut self,
        descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<bool> {
        if !descriptor.is_element_optional(index) {
            return Ok(false);
        }
        let element = descriptor.element_descriptor(index);
        let config = self.decoder.config();
        let lexer = &mut self.decoder.lexer;

        if !element.is_nullable() && lexer.peek_null() {
            lexer.consume_null()?;
            return Ok(true);
        }
        if element.kind() == SerialKind::Enum && lexer.peek() == Token::Quote {
            let start = lexer.offset();
            let name = lexer.consume_string(false)?;
            if element_index_for_key(element, &name, config).is_none() {
                return Ok(true);
            }
            lexer.reset(start);
        }
        Ok(false)
    }

    /// With `explicit_nulls` off, a nullable element absent from the input
    /// decodes as null.
    fn missing_null(&mut self, descriptor: &'static SerialDescriptor) -> ElementIndex {
        if self.decoder.config().explicit_nulls {
            return ElementIndex::Done;
        }
        let index = self.marker.next_unmarked(|index| {
            descriptor.element_descriptor(index).is_nullable() && !descriptor.is_element_optional(index)
        });
        match index {
            Some(index) => {
                self.forced = Some(index);
                ElementIndex::Element(index)
            }
            None => ElementIndex::Done,
        }
    }

    fn decode_map_index(&mut self) -> SerialResult<ElementIndex> {
        let config = self.decoder.config();
        let lexer = &mut self.decoder.lexer;
        if self.position % 2 == 0 {
            if !lexer.next_element(self.position == 0, Token::EndObject, config.allow_trailing_comma)? {
                return Ok(ElementIndex::Done);
            }
            lexer.peek();
            let start = lexer.offset();
            if let Ok(key) = lexer.consume_string(true) {
                let key = key.into_owned();
                lexer.path.map_key(&key);
            }
            lexer.reset(start);
        } else {
            lexer.consume(Token::Colon)?;
        }
        self.position += 1;
        Ok(ElementIndex::Element(self.position - 1))
    }

    fn decode_list_index(&mut self) -> SerialResult<ElementIndex> {
        let config = self.decoder.config();
        let lexer = &mut self.decoder.lexer;
        if !lexer.next_element(self.position == 0, Token::EndList, config.allow_trailing_comma)? {
            return Ok(ElementIndex::Done);
        }
        lexer.path.index(self.position);
        self.position += 1;
        Ok(ElementIndex::Element(self.position - 1))
    }
}

impl CompositeDecoder for StreamingComposite<'_, '_, '_> {
    fn decode_element_index(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<ElementIndex> {
        match self.mode {
            WriteMode::Obj => self.decode_object_index(descriptor),
            WriteMode::Map => self.decode_map_index(),
            WriteMode::List | WriteMode::ListMap => self.decode_list_index(),
        }
    }

    fn element_decoder(
        &mut self,
        _descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<&mut dyn Decoder> {
        let decoder = &mut *self.decoder;
        decoder.force_null = self.forced.take() == Some(index);
        decoder.key_mode = self.mode == WriteMode::Map && index % 2 == 0;
        Ok(decoder)
    }

    fn end_structure(self: Box<Self>, descriptor: &'static SerialDescriptor) -> SerialResult<()> {
        assert!(
            core::ptr::eq(descriptor, self.descriptor) || descriptor == self.descriptor,
            "Composite of '{}' ended with the descriptor of '{}'",
            self.descriptor.serial_name(),
            descriptor.serial_name(),
        );
        let this = *self;
        let decoder = this.decoder;
        decoder.key_mode = false;
        decoder.force_null = false;
        decoder.lexer.consume(this.mode.end_token())?;
        decoder.lexer.path.pop();
        decoder.depth -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use sf_serial::SerialErrorKind;

    use crate::Json;

    fn lenient() -> Json {
        Json::builder().lenient(true).build().unwrap()
    }

    #[test]
    fn primitives_at_top_level() {
        let json = Json::default();
        assert_eq!(json.decode::<i32>(" 42 ").unwrap(), 42);
        assert_eq!(json.decode::<f64>("-2.5e1").unwrap(), -25.0);
        assert_eq!(json.decode::<bool>("true").unwrap(), true);
        assert_eq!(json.decode::<String>(r#""a\nb""#).unwrap(), "a\nb");
        assert_eq!(json.decode::<char>(r#""x""#).unwrap(), 'x');
        assert_eq!(json.decode::<Option<i32>>("null").unwrap(), None);

        assert!(json.decode::<i8>("300").is_err());
        assert!(json.decode::<char>(r#""xy""#).is_err());
    }

    #[test]
    fn literal_is_not_a_string_at_top_level() {
        for json in [Json::default(), lenient()] {
            let error = json.decode::<String>("42").unwrap_err();
            assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        }
    }

    #[test]
    fn quoted_numbers_only_when_lenient_and_nested() {
        let input = r#"["1", "2"]"#;
        let error = Json::default().decode::<Vec<i32>>(input).unwrap_err();
        assert!(error.message().contains("Expected an unquoted int literal, but had the string \"1\""));
        assert_eq!(lenient().decode::<Vec<i32>>(input).unwrap(), [1, 2]);
        assert_eq!(lenient().decode::<Vec<String>>("[a, b]").unwrap(), ["a", "b"]);
        assert!(lenient().decode::<i32>(r#""1""#).is_err());
    }

    #[test]
    fn map_keys_are_unquoted() {
        let json = Json::default();
        let map: BTreeMap<i32, bool> = json.decode(r#"{"1": true, "-2": false}"#).unwrap();
        assert_eq!(map, BTreeMap::from([(1, true), (-2, false)]));

        let error = json.decode::<BTreeMap<i32, bool>>(r#"{"x": true}"#).unwrap_err();
        assert!(error.message().contains("at path: $['x']"), "{}", error.message());
    }

    #[test]
    fn trailing_content_is_rejected() {
        let error = Json::default().decode::<i32>("1 2").unwrap_err();
        assert!(error.message().contains("Expected the input to end"));
    }

    #[test]
    fn special_floats_need_the_option() {
        let error = Json::default().decode::<f64>("NaN").unwrap_err();
        assert!(error.message().contains("special floating-point value NaN"));

        let json = Json::builder()
            .allow_special_floating_point_values(true)
            .build()
            .unwrap();
        assert!(json.decode::<f64>("NaN").unwrap().is_nan());
        assert_eq!(json.decode::<f64>(r#""-Infinity""#).unwrap(), f64::NEG_INFINITY);
        assert_eq!(
            json.decode::<Vec<f32>>("[Infinity, 1.5]").unwrap(),
            [f32::INFINITY, 1.5]
        );
    }

    #[test]
    fn structure_mismatch_names_the_token() {
        let error = Json::default().decode::<Vec<i32>>(r#"{"a": 1}"#).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        assert!(
            error.message().contains("Expected start of the array '['"),
            "{}",
            error.message()
        );
    }
}
