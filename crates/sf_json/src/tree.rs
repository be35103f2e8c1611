//! Decoding from a [`JsonElement`] instead of text.
//!
//! Polymorphic values go through here: the streaming decoder reads the whole
//! value first, so the discriminator can be found wherever it sits in the
//! object.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};

use log::trace;
use sf_serial::descriptors::{SerialDescriptor, SerialKind};
use sf_serial::encoding::{CompositeDecoder, Decoder, ElementIndex, ElementMarker};
use sf_serial::modules::SerializersModule;
use sf_serial::{SerialError, SerialResult};

use crate::annotations::{discriminator_key, element_index_for_key};
use crate::element::{JsonElement, JsonObject, NULL};
use crate::lexer::UNKNOWN_KEYS_HINT;
use crate::mode::{WriteMode, switch_mode};
use crate::primitives::{is_number, parse_bool, parse_integer, special_float, special_float_message};
use crate::{Json, JsonConfig};

#[derive(Clone, Copy)]
enum Source<'t> {
    Element(&'t JsonElement),
    /// A map key, which is always a string in the tree.
    Key(&'t str),
}

// -----------------------------------------------------------------------------
// TreeDecoder

pub(crate) struct TreeDecoder<'t> {
    source: Source<'t>,
    json: &'t Json,
    path: String,
    /// Lenient coercions only apply to nested values.
    nested: bool,
    /// An object key left out of the next structure: the discriminator of a
    /// polymorphic payload.
    skip_key: Option<&'t str>,
    force_null: bool,
}

impl<'t> TreeDecoder<'t> {
    pub fn new(element: &'t JsonElement, json: &'t Json, path: String, nested: bool) -> Self {
        Self::with_source(Source::Element(element), json, path, nested)
    }

    fn with_source(source: Source<'t>, json: &'t Json, path: String, nested: bool) -> Self {
        Self {
            source,
            json,
            path,
            nested,
            skip_key: None,
            force_null: false,
        }
    }

    #[inline]
    fn config(&self) -> &'t JsonConfig {
        self.json.config()
    }

    fn fail(&self, message: impl core::fmt::Display) -> SerialError {
        SerialError::json_decoding(
            None,
            Some(self.path.clone()),
            format!("{message} at path: {}", self.path),
        )
    }

    fn element(&self, expected: &str) -> SerialResult<&'t JsonElement> {
        match self.source {
            Source::Element(element) => Ok(element),
            Source::Key(key) => Err(self.fail(format!("Expected {expected}, but had the map key '{key}'"))),
        }
    }

    /// The text of a number or boolean.
    fn primitive(&self, kind: &str) -> SerialResult<String> {
        match self.source {
            Source::Key(key) => Ok(key.into()),
            Source::Element(JsonElement::String(text)) => {
                if self.nested && self.config().lenient {
                    Ok(text.clone())
                } else {
                    Err(self.fail(format!(
                        "Expected an unquoted {kind} literal, but had the string \"{text}\""
                    )))
                }
            }
            Source::Element(element @ (JsonElement::Number(_) | JsonElement::Bool(_))) => {
                Ok(element.to_string())
            }
            Source::Element(element) => Err(self.fail(format!(
                "Expected {kind} value, but had {}",
                element.kind_name()
            ))),
        }
    }

    fn decode_integer<T: TryFrom<i64>>(&self, kind: &str) -> SerialResult<T> {
        let value = match self.source {
            Source::Element(JsonElement::Number(number)) => number.as_i64(),
            _ => parse_integer(&self.primitive(kind)?),
        };
        value
            .and_then(|value| T::try_from(value).ok())
            .ok_or_else(|| self.literal_error(kind))
    }

    fn decode_float(&self, kind: &str) -> SerialResult<f64> {
        let special = match self.source {
            Source::Element(JsonElement::String(text)) => special_float(text),
            Source::Key(key) => special_float(key),
            _ => None,
        };
        let value = match (special, self.source) {
            (Some(value), _) => value,
            (None, Source::Element(JsonElement::Number(number))) => number.as_f64(),
            (None, _) => {
                let text = self.primitive(kind)?;
                if !is_number(&text) {
                    return Err(self.literal_error(kind));
                }
                text.parse().map_err(|_| self.literal_error(kind))?
            }
        };
        if !value.is_finite() && !self.config().allow_special_floating_point_values {
            return Err(self.fail(special_float_message(value)));
        }
        Ok(value)
    }

    fn literal_error(&self, kind: &str) -> SerialError {
        let text = match self.source {
            Source::Element(element) => element.to_string(),
            Source::Key(key) => key.into(),
        };
        self.fail(format!("Failed to parse literal '{text}' as {kind} value"))
    }

    fn string(&self) -> SerialResult<&'t str> {
        match self.source {
            Source::Key(key) => Ok(key),
            Source::Element(JsonElement::String(text)) => Ok(text),
            Source::Element(element) => Err(self.fail(format!(
                "Expected string value, but had {}",
                element.kind_name()
            ))),
        }
    }

    fn decode_array_polymorphic(
        &mut self,
        root: &'static SerialDescriptor,
        resolve: &mut dyn FnMut(Option<&str>, &mut dyn Decoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        let element = self.element("a polymorphic value")?;
        let Some([name, payload]) = element.as_array() else {
            return Err(self.fail(format!(
                "Expected a [serial name, value] array for polymorphic '{}', but had {element}",
                root.serial_name()
            )));
        };
        let Some(name) = name.as_str() else {
            return Err(self.fail(format!(
                "Expected the serial name of a subclass of '{}', but had {}",
                root.serial_name(),
                name.kind_name()
            )));
        };

        trace!("resolving '{name}' as a subclass of '{}'", root.serial_name());
        let path = format!("{}[1]", self.path);
        let mut payload = TreeDecoder::new(payload, self.json, path, true);
        resolve(Some(name), &mut payload)
    }
}

impl Decoder for TreeDecoder<'_> {
    fn serializers_module(&self) -> &SerializersModule {
        self.json.module()
    }

    fn decode_not_null_mark(&mut self) -> SerialResult<bool> {
        Ok(!self.force_null && !matches!(self.source, Source::Element(JsonElement::Null)))
    }

    fn decode_null(&mut self) -> SerialResult<()> {
        if core::mem::take(&mut self.force_null) {
            return Ok(());
        }
        match self.source {
            Source::Element(JsonElement::Null) => Ok(()),
            Source::Element(element) => Err(self.fail(format!(
                "Expected null, but had {}",
                element.kind_name()
            ))),
            Source::Key(key) => Err(self.fail(format!("Expected null, but had the map key '{key}'"))),
        }
    }

    fn decode_bool(&mut self) -> SerialResult<bool> {
        let value = match self.source {
            Source::Element(JsonElement::Bool(value)) => Some(*value),
            _ => parse_bool(&self.primitive("boolean")?),
        };
        value.ok_or_else(|| self.literal_error("boolean"))
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
            return Err(self.fail(format!("Value {value} is out of the range of float")));
        }
        Ok(narrowed)
    }

    fn decode_f64(&mut self) -> SerialResult<f64> {
        self.decode_float("double")
    }

    fn decode_char(&mut self) -> SerialResult<char> {
        let text = self.string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(self.fail(format!("Expected a single char, but had \"{text}\""))),
        }
    }

    fn decode_string(&mut self) -> SerialResult<String> {
        match self.source {
            Source::Element(element @ (JsonElement::Number(_) | JsonElement::Bool(_)))
                if self.nested && self.config().lenient =>
            {
                Ok(element.to_string())
            }
            _ => self.string().map(String::from),
        }
    }

    fn decode_enum(&mut self, descriptor: &'static SerialDescriptor) -> SerialResult<usize> {
        let name = self.string()?;
        element_index_for_key(descriptor, name, self.config()).ok_or_else(|| {
            self.fail(format!(
                "'{}' does not contain element with name '{name}'",
                descriptor.serial_name()
            ))
        })
    }

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeDecoder + '_>> {
        let mode = switch_mode(descriptor, self.config())?;
        let element = self.element("a structure")?;
        let node = match (mode, element) {
            (WriteMode::Obj, JsonElement::Object(object)) => Node::Object(object),
            (WriteMode::Map, JsonElement::Object(object)) => Node::Map(object),
            (WriteMode::List, JsonElement::Array(items)) => Node::Array(items),
            (WriteMode::ListMap, JsonElement::Array(items)) => Node::ArrayMap(items),
            (WriteMode::Obj | WriteMode::Map, _) => {
                return Err(self.fail(format!(
                    "Expected object for '{}', but had {}",
                    descriptor.serial_name(),
                    element.kind_name()
                )));
            }
            (WriteMode::List | WriteMode::ListMap, _) => {
                return Err(self.fail(format!(
                    "Expected array for '{}', but had {}",
                    descriptor.serial_name(),
                    element.kind_name()
                )));
            }
        };

        let current = TreeDecoder::new(&NULL, self.json, String::new(), true);
        Ok(Box::new(TreeComposite {
            node,
            json: self.json,
            path: self.path.clone(),
            descriptor,
            position: 0,
            marker: ElementMarker::new(descriptor.elements_count()),
            forced: None,
            skip_key: self.skip_key.take(),
            current,
        }))
    }

    fn decode_polymorphic(
        &mut self,
        root: &'static SerialDescriptor,
        resolve: &mut dyn FnMut(Option<&str>, &mut dyn Decoder) -> SerialResult<()>,
    ) -> SerialResult<()> {
        let config = self.config();
        if config.use_array_polymorphism {
            return self.decode_array_polymorphic(root, resolve);
        }

        let element = self.element("a polymorphic value")?;
        let JsonElement::Object(object) = element else {
            return Err(self.fail(format!(
                "Expected object for polymorphic '{}', but had {}",
                root.serial_name(),
                element.kind_name()
            )));
        };

        let key = discriminator_key(root, config);
        let name = match object.get(key) {
            None | Some(JsonElement::Null) => None,
            Some(JsonElement::String(name)) => Some(name.as_str()),
            Some(other) => {
                return Err(self.fail(format!(
                    "Class discriminator '{key}' of '{}' must be a string, but had {}",
                    root.serial_name(),
                    other.kind_name()
                )));
            }
        };

        trace!(
            "resolving {:?} as a subclass of '{}'",
            name,
            root.serial_name()
        );
        let mut payload =
            TreeDecoder::with_source(self.source, self.json, self.path.clone(), self.nested);
        payload.skip_key = Some(key);
        resolve(name, &mut payload)
    }
}

// -----------------------------------------------------------------------------
// TreeComposite

#[derive(Clone, Copy)]
enum Node<'t> {
    Object(&'t JsonObject),
    Array(&'t [JsonElement]),
    Map(&'t JsonObject),
    /// A map with structured keys, `[k1, v1, k2, v2, ...]`.
    ArrayMap(&'t [JsonElement]),
}

struct TreeComposite<'t> {
    node: Node<'t>,
    json: &'t Json,
    path: String,
    descriptor: &'static SerialDescriptor,
    position: usize,
    marker: ElementMarker,
    forced: Option<usize>,
    skip_key: Option<&'t str>,
    /// Decoder of the element last reported.
    current: TreeDecoder<'t>,
}

impl<'t> TreeComposite<'t> {
    fn enter(&mut self, source: Source<'t>, path: String) {
        self.current = TreeDecoder::with_source(source, self.json, path, true);
    }

    fn object_index(
        &mut self,
        object: &'t JsonObject,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<ElementIndex> {
        let config = self.json.config();
        while let Some((key, value)) = object.entry(self.position) {
            self.position += 1;
            if self.skip_key == Some(key) {
                continue;
            }

            let Some(index) = element_index_for_key(descriptor, key, config) else {
                if config.ignore_unknown_keys {
                    trace!("skipping unknown key '{key}' of '{}'", descriptor.serial_name());
                    continue;
                }
                return Err(SerialError::unknown_field(
                    descriptor.serial_name(),
                    key,
                    format!(
                        "Encountered an unknown key '{key}' at path: {}\n{UNKNOWN_KEYS_HINT}",
                        self.path
                    ),
                ));
            };

            if config.coerce_input_values && coerce_value(descriptor, index, value, config) {
                trace!(
                    "coerced the input of '{}.{key}' to its default",
                    descriptor.serial_name()
                );
                continue;
            }
            self.marker.mark(index);
            self.enter(Source::Element(value), format!("{}.{key}", self.path));
            return Ok(ElementIndex::Element(index));
        }

        if config.explicit_nulls {
            return Ok(ElementIndex::Done);
        }
        let forced = self.marker.next_unmarked(|index| {
            descriptor.element_descriptor(index).is_nullable()
                && !descriptor.is_element_optional(index)
        });
        Ok(match forced {
            Some(index) => {
                self.forced = Some(index);
                let path = format!("{}.{}", self.path, descriptor.element_name(index));
                self.enter(Source::Element(&NULL), path);
                ElementIndex::Element(index)
            }
            None => ElementIndex::Done,
        })
    }

    fn map_index(&mut self, object: &'t JsonObject) -> ElementIndex {
        let Some((key, value)) = object.entry(self.position / 2) else {
            return ElementIndex::Done;
        };
        let path = format!("{}['{key}']", self.path);
        let source = if self.position % 2 == 0 {
            Source::Key(key)
        } else {
            Source::Element(value)
        };
        self.enter(source, path);
        self.position += 1;
        ElementIndex::Element(self.position - 1)
    }

    fn array_index(&mut self, items: &'t [JsonElement]) -> ElementIndex {
        let Some(item) = items.get(self.position) else {
            return ElementIndex::Done;
        };
        self.enter(Source::Element(item), format!("{}[{}]", self.path, self.position));
        self.position += 1;
        ElementIndex::Element(self.position - 1)
    }
}

/// Whether `value` is dropped so the default of the optional element
/// `index` applies.
fn coerce_value(
    descriptor: &SerialDescriptor,
    index: usize,
    value: &JsonElement,
    config: &JsonConfig,
) -> bool {
    if !descriptor.is_element_optional(index) {
        return false;
    }
    let element = descriptor.element_descriptor(index);
    match value {
        JsonElement::Null => !element.is_nullable(),
        JsonElement::String(name) if element.kind() == SerialKind::Enum => {
            element_index_for_key(element, name, config).is_none()
        }
        _ => false,
    }
}

impl CompositeDecoder for TreeComposite<'_> {
    fn decode_element_index(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<ElementIndex> {
        match self.node {
            Node::Object(object) => self.object_index(object, descriptor),
            Node::Map(object) => Ok(self.map_index(object)),
            Node::Array(items) | Node::ArrayMap(items) => Ok(self.array_index(items)),
        }
    }

    fn decode_collection_size(
        &mut self,
        _descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Option<usize>> {
        Ok(match self.node {
            Node::Object(_) => None,
            Node::Map(object) => Some(object.len()),
            Node::Array(items) => Some(items.len()),
            Node::ArrayMap(items) => Some(items.len() / 2),
        })
    }

    fn element_decoder(
        &mut self,
        _descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<&mut dyn Decoder> {
        self.current.force_null = self.forced.take() == Some(index);
        Ok(&mut self.current)
    }

    fn end_structure(self: Box<Self>, descriptor: &'static SerialDescriptor) -> SerialResult<()> {
        assert!(
            core::ptr::eq(descriptor, self.descriptor) || descriptor == self.descriptor,
            "Composite of '{}' ended with the descriptor of '{}'",
            self.descriptor.serial_name(),
            descriptor.serial_name(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use sf_serial::{Serializable, SerialErrorKind};

    use crate::element::{JsonElement, JsonObject};
    use crate::Json;

    #[test]
    fn decodes_from_a_tree() {
        let json = Json::default();
        let element = json.parse_to_json_element(r#"{"b": [1, 2], "a": []}"#).unwrap();
        let map: BTreeMap<String, Vec<i64>> = json
            .decode_from_json_element(&<BTreeMap<String, Vec<i64>>>::serializer(), &element)
            .unwrap();
        assert_eq!(map["b"], [1, 2]);
        assert!(map["a"].is_empty());
    }

    #[test]
    fn tree_errors_carry_the_path() {
        let json = Json::default();
        let element: JsonElement = JsonObject::from_iter([(
            "xs",
            JsonElement::from(alloc::vec![JsonElement::from(1_i64), JsonElement::from("two")]),
        )])
        .into();
        let error = json
            .decode_from_json_element::<BTreeMap<String, Vec<i32>>, _>(
                &<BTreeMap<String, Vec<i32>>>::serializer(),
                &element,
            )
            .unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        assert!(error.message().ends_with("at path: $['xs'][1]"), "{}", error.message());
    }

    #[test]
    fn top_level_number_is_not_a_string() {
        let json = Json::builder().lenient(true).build().unwrap();
        let element = JsonElement::from(42_i64);
        let error = json
            .decode_from_json_element(&String::serializer(), &element)
            .unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
    }
}
