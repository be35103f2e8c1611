use alloc::format;
use alloc::vec::Vec;

use sf_serial::SerialResult;

use crate::JsonConfig;
use crate::element::{JsonElement, JsonNumber, JsonObject};
use crate::lexer::{LENIENT_HINT, Lexer, Token};
use crate::primitives::{special_float, special_float_message};

/// Reads one value from `lexer` into a [`JsonElement`].
///
/// `nested` tells whether the value sits inside another one, which is
/// where lenient coercions apply.
pub(crate) fn read_element(
    lexer: &mut Lexer<'_>,
    config: &JsonConfig,
    nested: bool,
) -> SerialResult<JsonElement> {
    match lexer.peek() {
        Token::BeginObject => read_object(lexer, config),
        Token::BeginList => read_array(lexer, config),
        Token::Quote => Ok(JsonElement::String(lexer.consume_string(false)?.into_owned())),
        Token::Literal => read_literal(lexer, config, nested),
        token => Err(lexer.fail(format!(
            "Expected a JSON value, but had {} instead",
            token.describe()
        ))),
    }
}

fn read_object(lexer: &mut Lexer<'_>, config: &JsonConfig) -> SerialResult<JsonElement> {
    lexer.consume(Token::BeginObject)?;
    lexer.enter()?;

    let mut object = JsonObject::new();
    let mut first = true;
    while lexer.next_element(first, Token::EndObject, config.allow_trailing_comma)? {
        first = false;
        let key = lexer.consume_string(config.lenient)?.into_owned();
        lexer.path.key(&key);
        lexer.consume(Token::Colon)?;
        let value = read_element(lexer, config, true)?;
        object.insert(key, value);
    }

    lexer.consume(Token::EndObject)?;
    lexer.path.pop();
    Ok(JsonElement::Object(object))
}

fn read_array(lexer: &mut Lexer<'_>, config: &JsonConfig) -> SerialResult<JsonElement> {
    lexer.consume(Token::BeginList)?;
    lexer.enter()?;

    let mut items = Vec::new();
    while lexer.next_element(items.is_empty(), Token::EndList, config.allow_trailing_comma)? {
        lexer.path.index(items.len());
        items.push(read_element(lexer, config, true)?);
    }

    lexer.consume(Token::EndList)?;
    lexer.path.pop();
    Ok(JsonElement::Array(items))
}

fn read_literal(
    lexer: &mut Lexer<'_>,
    config: &JsonConfig,
    nested: bool,
) -> SerialResult<JsonElement> {
    let offset = lexer.offset();
    let text = lexer.literal()?;
    match text {
        "null" => return Ok(JsonElement::Null),
        "true" => return Ok(JsonElement::Bool(true)),
        "false" => return Ok(JsonElement::Bool(false)),
        _ => {}
    }

    if let Some(value) = special_float(text) {
        if !config.allow_special_floating_point_values {
            return Err(lexer.fail_at(offset, special_float_message(value), None));
        }
        return Ok(JsonElement::Number(JsonNumber::from_f64(value)));
    }
    if let Some(number) = JsonNumber::parse(text) {
        return Ok(JsonElement::Number(number));
    }
    if config.lenient && nested {
        return Ok(JsonElement::String(text.into()));
    }
    Err(lexer.fail_at(offset, format!("Unexpected JSON literal '{text}'"), Some(LENIENT_HINT)))
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use sf_serial::SerialErrorKind;

    use super::read_element;
    use crate::JsonConfig;
    use crate::element::JsonElement;
    use crate::lexer::{Lexer, MAX_DEPTH};

    fn read(input: &str, config: &JsonConfig) -> sf_serial::SerialResult<JsonElement> {
        let mut lexer = Lexer::new(input);
        let element = read_element(&mut lexer, config, false)?;
        lexer.expect_eof()?;
        Ok(element)
    }

    #[test]
    fn reads_nested_values() {
        let config = JsonConfig::default();
        let element = read(r#" {"a": [1, -2, 3.5, "x"], "b": {"c": null}, "d": true} "#, &config)
            .unwrap();
        assert_eq!(element.to_string(), r#"{"a":[1,-2,3.5,"x"],"b":{"c":null},"d":true}"#);
    }

    #[test]
    fn error_paths() {
        let config = JsonConfig::default();
        let error = read(r#"{"a": [1, oops]}"#, &config).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        assert!(error.message().contains("Unexpected JSON literal 'oops'"));
        assert!(error.message().contains("at path: $.a[1]"));

        let error = read("NaN", &config).unwrap_err();
        assert!(error.message().contains("special floating-point value NaN"));
    }

    #[test]
    fn lenient_literals_only_when_nested() {
        let config = JsonConfig {
            lenient: true,
            allow_special_floating_point_values: true,
            ..JsonConfig::default()
        };
        let element = read("{name: rust, rate: NaN}", &config).unwrap();
        assert_eq!(element.get("name"), Some(&JsonElement::from("rust")));
        assert!(element.get("rate").and_then(JsonElement::as_number).is_some());
        assert!(read("rust", &config).is_err());
    }

    #[test]
    fn nesting_depth_is_limited() {
        let config = JsonConfig::default();
        let deep = alloc::format!("{}1{}", "[{\"a\":".repeat(50_000), "}]".repeat(50_000));
        let error = read(&deep, &config).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        assert!(error.message().contains("Exceeded the maximum nesting depth of 512"));

        let limit = alloc::format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(read(&limit, &config).is_ok());
    }
}
