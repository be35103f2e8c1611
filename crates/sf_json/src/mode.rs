use alloc::format;

use sf_serial::descriptors::{SerialDescriptor, SerialKind};
use sf_serial::{SerialError, SerialResult};

use crate::JsonConfig;
use crate::lexer::Token;

/// How a composite is laid out in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// `{"name": value, ...}`
    Obj,
    /// `[value, ...]`
    List,
    /// `{"key": value, ...}`
    Map,
    /// `[key, value, key, value, ...]`, for maps with structured keys.
    ListMap,
}

impl WriteMode {
    pub fn begin(self) -> char {
        match self {
            WriteMode::Obj | WriteMode::Map => '{',
            WriteMode::List | WriteMode::ListMap => '[',
        }
    }

    pub fn end(self) -> char {
        match self {
            WriteMode::Obj | WriteMode::Map => '}',
            WriteMode::List | WriteMode::ListMap => ']',
        }
    }

    pub fn begin_token(self) -> Token {
        match self {
            WriteMode::Obj | WriteMode::Map => Token::BeginObject,
            WriteMode::List | WriteMode::ListMap => Token::BeginList,
        }
    }

    pub fn end_token(self) -> Token {
        match self {
            WriteMode::Obj | WriteMode::Map => Token::EndObject,
            WriteMode::List | WriteMode::ListMap => Token::EndList,
        }
    }
}

/// The layout of a composite described by `descriptor`.
pub(crate) fn switch_mode(
    descriptor: &SerialDescriptor,
    config: &JsonConfig,
) -> SerialResult<WriteMode> {
    Ok(match descriptor.kind() {
        SerialKind::List => WriteMode::List,
        SerialKind::Map => {
            let key = descriptor.element_descriptor(0);
            if key.kind().is_primitive() || key.kind() == SerialKind::Enum {
                WriteMode::Map
            } else if config.allow_structured_map_keys {
                WriteMode::ListMap
            } else {
                return Err(invalid_key_kind(key));
            }
        }
        _ => WriteMode::Obj,
    })
}

fn invalid_key_kind(key: &SerialDescriptor) -> SerialError {
    SerialError::json_encoding(format!(
        "Value of type '{}' can't be used in JSON as a key in the map. It should have either \
         primitive or enum kind, but its kind is '{}'. Use 'allow_structured_map_keys(true)' \
         in the Json builder to convert such maps to [key1, value1, key2, value2,...] arrays.",
        key.serial_name(),
        key.kind(),
    ))
}
