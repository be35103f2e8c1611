use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_core::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use sf_utils::hash::HashMap;

use crate::composer::write_escaped;
use crate::primitives::{is_number, special_float_name};

// -----------------------------------------------------------------------------
// JsonNumber

/// A JSON number, kept as an integer when the text had no fraction or
/// exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonNumber(NumberRepr);

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberRepr {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl JsonNumber {
    /// Non-finite values are kept; they are only written when the format
    /// allows special floating point values.
    #[inline]
    pub const fn from_f64(value: f64) -> Self {
        Self(NumberRepr::Float(value))
    }

    /// Parses a number in JSON syntax.
    pub fn parse(text: &str) -> Option<Self> {
        if !is_number(text) {
            return None;
        }
        if !text.contains(['.', 'e', 'E']) {
            let integer = if text.starts_with('-') {
                text.parse::<i64>().ok().map(Self::from)
            } else {
                text.parse::<u64>().ok().map(Self::from)
            };
            // Integers out of range fall through to a float.
            if integer.is_some() {
                return integer;
            }
        }
        let value: f64 = text.parse().ok()?;
        value.is_finite().then_some(Self::from_f64(value))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            NumberRepr::PosInt(value) => i64::try_from(value).ok(),
            NumberRepr::NegInt(value) => Some(value),
            NumberRepr::Float(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.0 {
            NumberRepr::PosInt(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self.0 {
            NumberRepr::PosInt(value) => value as f64,
            NumberRepr::NegInt(value) => value as f64,
            NumberRepr::Float(value) => value,
        }
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        !matches!(self.0, NumberRepr::Float(_))
    }
}

impl From<i64> for JsonNumber {
    fn from(value: i64) -> Self {
        match u64::try_from(value) {
            Ok(value) => Self(NumberRepr::PosInt(value)),
            Err(_) => Self(NumberRepr::NegInt(value)),
        }
    }
}

impl From<u64> for JsonNumber {
    #[inline]
    fn from(value: u64) -> Self {
        Self(NumberRepr::PosInt(value))
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            NumberRepr::PosInt(value) => write!(f, "{value}"),
            NumberRepr::NegInt(value) => write!(f, "{value}"),
            NumberRepr::Float(value) if !value.is_finite() => {
                f.write_str(special_float_name(value))
            }
            NumberRepr::Float(value) => write!(f, "{value:?}"),
        }
    }
}

// -----------------------------------------------------------------------------
// JsonObject

/// The entries of a JSON object, in insertion order.
///
/// Inserting an existing key replaces its value in place, so the last of
/// several duplicate keys wins.
#[derive(Debug, Clone, Default)]
pub struct JsonObject {
    entries: Vec<(String, JsonElement)>,
    index: HashMap<String, usize>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&JsonElement> {
        let &position = self.index.get(key)?;
        Some(&self.entries[position].1)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts an entry, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: JsonElement) -> Option<JsonElement> {
        let key = key.into();
        match self.index.get(key.as_str()) {
            Some(&position) => Some(core::mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &JsonElement)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// The entry at `position` in insertion order.
    #[inline]
    pub(crate) fn entry(&self, position: usize) -> Option<(&str, &JsonElement)> {
        self.entries.get(position).map(|(key, value)| (key.as_str(), value))
    }
}

impl PartialEq for JsonObject {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>> FromIterator<(K, JsonElement)> for JsonObject {
    fn from_iter<I: IntoIterator<Item = (K, JsonElement)>>(iter: I) -> Self {
        let mut object = JsonObject::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

// -----------------------------------------------------------------------------
// JsonElement

/// A parsed JSON value.
///
/// Obtained with [`Json::parse_to_json_element`](crate::Json::parse_to_json_element)
/// and decoded with [`Json::decode_from_json_element`](crate::Json::decode_from_json_element).
/// `Display` prints compact JSON.
///
/// # Examples
///
/// ```
/// use sf_json::{Json, JsonElement};
///
/// let element = Json::default()
///     .parse_to_json_element(r#"{"name": "tokio", "stars": [1, 2.5], "a": null}"#)
///     .unwrap();
///
/// let object = element.as_object().unwrap();
/// assert_eq!(object.get("name").and_then(JsonElement::as_str), Some("tokio"));
/// assert_eq!(element.to_string(), r#"{"name":"tokio","stars":[1,2.5],"a":null}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonElement {
    #[default]
    Null,
    Bool(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonElement>),
    Object(JsonObject),
}

pub(crate) static NULL: JsonElement = JsonElement::Null;

impl JsonElement {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonElement::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonElement::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            JsonElement::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonElement::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonElement]> {
        match self {
            JsonElement::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonElement::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The value of `key` if this is an object holding it.
    pub fn get(&self, key: &str) -> Option<&JsonElement> {
        self.as_object()?.get(key)
    }

    /// A short name of the variant, for messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            JsonElement::Null => "null",
            JsonElement::Bool(_) => "boolean",
            JsonElement::Number(_) => "number",
            JsonElement::String(_) => "string",
            JsonElement::Array(_) => "array",
            JsonElement::Object(_) => "object",
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            JsonElement::Null => out.push_str("null"),
            JsonElement::Bool(true) => out.push_str("true"),
            JsonElement::Bool(false) => out.push_str("false"),
            JsonElement::Number(number) => {
                use core::fmt::Write;
                let _ = write!(out, "{number}");
            }
            JsonElement::String(value) => write_escaped(out, value),
            JsonElement::Array(items) => {
                out.push('[');
                for (position, item) in items.iter().enumerate() {
                    if position > 0 {
                        out.push(',');
                    }
                    item.render(out);
                }
                out.push(']');
            }
            JsonElement::Object(object) => {
                out.push('{');
                for (position, (key, value)) in object.iter().enumerate() {
                    if position > 0 {
                        out.push(',');
                    }
                    write_escaped(out, key);
                    out.push(':');
                    value.render(out);
                }
                out.push('}');
            }
        }
    }
}

impl fmt::Display for JsonElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out);
        f.write_str(&out)
    }
}

impl From<bool> for JsonElement {
    fn from(value: bool) -> Self {
        JsonElement::Bool(value)
    }
}

impl From<i64> for JsonElement {
    fn from(value: i64) -> Self {
        JsonElement::Number(JsonNumber::from(value))
    }
}

impl From<f64> for JsonElement {
    fn from(value: f64) -> Self {
        JsonElement::Number(JsonNumber::from_f64(value))
    }
}

impl From<&str> for JsonElement {
    fn from(value: &str) -> Self {
        JsonElement::String(value.into())
    }
}

impl From<String> for JsonElement {
    fn from(value: String) -> Self {
        JsonElement::String(value)
    }
}

impl From<Vec<JsonElement>> for JsonElement {
    fn from(items: Vec<JsonElement>) -> Self {
        JsonElement::Array(items)
    }
}

impl From<JsonObject> for JsonElement {
    fn from(object: JsonObject) -> Self {
        JsonElement::Object(object)
    }
}

// -----------------------------------------------------------------------------
// serde

impl Serialize for JsonNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            NumberRepr::PosInt(value) => serializer.serialize_u64(value),
            NumberRepr::NegInt(value) => serializer.serialize_i64(value),
            NumberRepr::Float(value) => serializer.serialize_f64(value),
        }
    }
}

impl Serialize for JsonElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonElement::Null => serializer.serialize_unit(),
            JsonElement::Bool(value) => serializer.serialize_bool(*value),
            JsonElement::Number(number) => number.serialize(serializer),
            JsonElement::String(value) => serializer.serialize_str(value),
            JsonElement::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonElement::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct ElementVisitor;

impl<'de> Visitor<'de> for ElementVisitor {
    type Value = JsonElement;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<JsonElement, E> {
        Ok(JsonElement::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<JsonElement, E> {
        Ok(JsonElement::Number(JsonNumber::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<JsonElement, E> {
        Ok(JsonElement::Number(JsonNumber::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<JsonElement, E> {
        Ok(JsonElement::Number(JsonNumber::from_f64(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<JsonElement, E> {
        Ok(JsonElement::String(value.into()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<JsonElement, E> {
        Ok(JsonElement::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonElement, E> {
        Ok(JsonElement::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonElement, E> {
        Ok(JsonElement::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonElement, D::Error> {
        JsonElement::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonElement, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonElement::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonElement, A::Error> {
        let mut object = JsonObject::new();
        while let Some((key, value)) = map.next_entry::<String, JsonElement>()? {
            object.insert(key, value);
        }
        Ok(JsonElement::Object(object))
    }
}

impl<'de> Deserialize<'de> for JsonElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ElementVisitor)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::{JsonElement, JsonNumber, JsonObject};

    #[test]
    fn numbers_keep_integers() {
        assert_eq!(JsonNumber::parse("42").and_then(|n| n.as_i64()), Some(42));
        assert_eq!(JsonNumber::parse("-7").and_then(|n| n.as_i64()), Some(-7));
        assert_eq!(
            JsonNumber::parse("18446744073709551615").and_then(|n| n.as_u64()),
            Some(u64::MAX)
        );
        assert!(!JsonNumber::parse("2.0").unwrap().is_integer());
        assert!(JsonNumber::parse("1e400").is_none());
        assert!(JsonNumber::parse("0x1").is_none());

        assert_eq!(JsonNumber::from_f64(2.0).to_string(), "2.0");
        assert_eq!(JsonNumber::from_f64(f64::NAN).to_string(), "NaN");
        assert_eq!(JsonNumber::from(-3_i64).to_string(), "-3");
    }

    #[test]
    fn last_duplicate_wins_in_place() {
        let mut object = JsonObject::new();
        object.insert("a", JsonElement::from(1_i64));
        object.insert("b", JsonElement::from(true));
        let replaced = object.insert("a", JsonElement::from("x"));

        assert_eq!(replaced, Some(JsonElement::from(1_i64)));
        assert_eq!(object.len(), 2);
        let keys: vec::Vec<_> = object.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(JsonElement::Object(object).to_string(), r#"{"a":"x","b":true}"#);
    }

    #[test]
    fn serde_interop() {
        let element: JsonElement =
            serde_json::from_str(r#"{"name":"rust","tags":["a",null],"stars":-3,"rate":0.5}"#)
                .unwrap();
        assert_eq!(element.get("name").and_then(JsonElement::as_str), Some("rust"));
        assert_eq!(
            element.get("stars").and_then(JsonElement::as_number).and_then(JsonNumber::as_i64),
            Some(-3)
        );

        let text = serde_json::to_string(&element).unwrap();
        assert_eq!(text, element.to_string());
    }
}
