use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Display;

use sf_serial::{SerialError, SerialResult};

use crate::path::JsonPath;

// -----------------------------------------------------------------------------
// Hints

pub(crate) const LENIENT_HINT: &str =
    "Use 'lenient(true)' in the Json builder to accept non-compliant JSON.";
pub(crate) const UNKNOWN_KEYS_HINT: &str =
    "Use 'ignore_unknown_keys(true)' in the Json builder to ignore unknown keys.";
pub(crate) const TRAILING_COMMA_HINT: &str = "Trailing commas are non-compliant JSON and not \
    allowed by default. Use 'allow_trailing_comma(true)' in the Json builder to accept them.";
/// Composites may nest this deep. Reading stops with an error past it.
pub(crate) const MAX_DEPTH: usize = 512;

pub(crate) const SPECIAL_FLOATS_HINT: &str = "Use 'allow_special_floating_point_values(true)' \
    in the Json builder to accept them.";

// -----------------------------------------------------------------------------
// Token

/// The class of the next token, decided by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    BeginObject,
    EndObject,
    BeginList,
    EndList,
    Colon,
    Comma,
    /// A quoted string.
    Quote,
    /// Anything else: numbers, `true`, `false`, `null`, or unquoted text.
    Literal,
    Eof,
}

impl Token {
    fn of(byte: u8) -> Self {
        match byte {
            b'{' => Token::BeginObject,
            b'}' => Token::EndObject,
            b'[' => Token::BeginList,
            b']' => Token::EndList,
            b':' => Token::Colon,
            b',' => Token::Comma,
            b'"' => Token::Quote,
            _ => Token::Literal,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Token::BeginObject => "start of the object '{'",
            Token::EndObject => "end of the object '}'",
            Token::BeginList => "start of the array '['",
            Token::EndList => "end of the array ']'",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::Quote => "quotation mark '\"'",
            Token::Literal => "literal",
            Token::Eof => "end of the input",
        }
    }
}

#[inline]
fn is_terminator(byte: u8) -> bool {
    matches!(
        byte,
        b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b'{' | b'}' | b'[' | b']' | b'"'
    )
}

/// The input around `offset`, shortened for long inputs.
fn excerpt(input: &str, offset: usize) -> Cow<'_, str> {
    const LIMIT: usize = 200;
    const RADIUS: usize = 60;

    if input.len() < LIMIT {
        return Cow::Borrowed(input);
    }
    let mut start = offset.saturating_sub(RADIUS);
    while !input.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = offset.saturating_add(RADIUS).min(input.len());
    while !input.is_char_boundary(end) {
        end += 1;
    }
    let prefix = if start > 0 { "....." } else { "" };
    let suffix = if end < input.len() { "....." } else { "" };
    Cow::Owned(format!("{prefix}{}{suffix}", &input[start..end]))
}

// -----------------------------------------------------------------------------
// Lexer

/// A cursor over JSON text.
///
/// The cursor always rests on a char boundary. Structural tokens are
/// consumed one byte at a time; strings and literals as a whole.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    pub path: JsonPath,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            path: JsonPath::new(),
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Moves back to an offset obtained from [`offset`](Self::offset).
    #[inline]
    pub fn reset(&mut self, offset: usize) {
        self.pos = offset;
    }

    /// Pushes a path segment for a composite whose begin token was just
    /// consumed.
    pub fn enter(&mut self) -> SerialResult<()> {
        if self.path.depth() >= MAX_DEPTH {
            return Err(self.fail(format!(
                "Exceeded the maximum nesting depth of {MAX_DEPTH}"
            )));
        }
        self.path.push();
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        let input = self.input;
        let bytes = input.as_bytes();
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = bytes.get(self.pos) {
            self.pos += 1;
        }
    }

    pub fn peek(&mut self) -> Token {
        self.skip_whitespace();
        match self.input.as_bytes().get(self.pos) {
            Some(&byte) => Token::of(byte),
            None => Token::Eof,
        }
    }

    /// The character under the cursor, for messages.
    fn current(&self) -> String {
        match self.input.get(self.pos..).and_then(|rest| rest.chars().next()) {
            Some(c) => c.to_string(),
            None => "EOF".into(),
        }
    }

    // -------------------------------------------------------------------------
    // Structure

    /// Consumes the structural token `expected`.
    pub fn consume(&mut self, expected: Token) -> SerialResult<()> {
        debug_assert!(!matches!(expected, Token::Quote | Token::Literal | Token::Eof));
        if self.peek() == expected {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub fn unexpected(&self, expected: Token) -> SerialError {
        self.fail(format!(
            "Expected {}, but had '{}' instead",
            expected.describe(),
            self.current()
        ))
    }

    /// Reads the separator in front of the next element of a composite
    /// closed by `end`. Returns `false`, without consuming `end`, when the
    /// composite has no more elements.
    pub fn next_element(
        &mut self,
        first: bool,
        end: Token,
        allow_trailing_comma: bool,
    ) -> SerialResult<bool> {
        let token = self.peek();
        if first {
            if token == Token::Comma {
                return Err(self.fail("Unexpected leading comma"));
            }
            return Ok(token != end);
        }
        if token == end {
            return Ok(false);
        }
        if token != Token::Comma {
            return Err(self.fail(format!(
                "Expected {} or ',', but had '{}' instead",
                end.describe(),
                self.current()
            )));
        }

        self.pos += 1;
        match self.peek() {
            token if token == end => {
                if allow_trailing_comma {
                    Ok(false)
                } else {
                    Err(self.fail_with_hint(
                        format!("Trailing comma before the {}", end.describe()),
                        TRAILING_COMMA_HINT,
                    ))
                }
            }
            Token::Comma => Err(self.fail("Unexpected duplicate comma")),
            _ => Ok(true),
        }
    }

    pub fn expect_eof(&mut self) -> SerialResult<()> {
        match self.peek() {
            Token::Eof => Ok(()),
            _ => Err(self.fail(format!(
                "Expected the input to end after the top-level value, but had '{}' instead",
                self.current()
            ))),
        }
    }

    // -------------------------------------------------------------------------
    // Scalars

    /// Reads a string. Unquoted text is accepted when `lenient` is set.
    pub fn consume_string(&mut self, lenient: bool) -> SerialResult<Cow<'a, str>> {
        match self.peek() {
            Token::Quote => self.quoted(),
            Token::Literal if lenient => self.literal().map(Cow::Borrowed),
            Token::Literal => Err(self.fail_with_hint(
                format!(
                    "Expected {}, but had '{}' instead",
                    Token::Quote.describe(),
                    self.current()
                ),
                LENIENT_HINT,
            )),
            _ => Err(self.unexpected(Token::Quote)),
        }
    }

    /// Reads a quoted string or a literal. The flag tells whether it was
    /// quoted.
    pub fn consume_scalar(&mut self) -> SerialResult<(Cow<'a, str>, bool)> {
        match self.peek() {
            Token::Quote => Ok((self.quoted()?, true)),
            Token::Literal => Ok((Cow::Borrowed(self.literal()?), false)),
            _ => Err(self.fail(format!(
                "Expected a primitive value, but had '{}' instead",
                self.current()
            ))),
        }
    }

    /// Reads the unquoted literal under the cursor.
    pub fn literal(&mut self) -> SerialResult<&'a str> {
        self.skip_whitespace();
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        let mut end = start;
        while bytes.get(end).is_some_and(|&byte| !is_terminator(byte)) {
            end += 1;
        }
        if end == start {
            return Err(self.fail(format!(
                "Expected a literal, but had '{}' instead",
                self.current()
            )));
        }
        self.pos = end;
        Ok(&input[start..end])
    }

    /// Whether the next token is the `null` literal.
    pub fn peek_null(&mut self) -> bool {
        if self.peek() != Token::Literal {
            return false;
        }
        let rest = &self.input.as_bytes()[self.pos..];
        rest.starts_with(b"null") && rest.get(4).is_none_or(|&byte| is_terminator(byte))
    }

    pub fn consume_null(&mut self) -> SerialResult<()> {
        if self.peek_null() {
            self.pos += 4;
            Ok(())
        } else {
            Err(self.fail(format!(
                "Expected 'null' literal, but had '{}' instead",
                self.current()
            )))
        }
    }

    fn quoted(&mut self) -> SerialResult<Cow<'a, str>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos + 1;
        let mut end = start;

        // Strings without escapes are borrowed from the input.
        loop {
            match bytes.get(end) {
                Some(b'"') => {
                    self.pos = end + 1;
                    return Ok(Cow::Borrowed(&input[start..end]));
                }
                Some(b'\\') => break,
                Some(&byte) if byte < 0x20 => {
                    self.pos = end;
                    return Err(self.fail("Unescaped control character in string"));
                }
                Some(_) => end += 1,
                None => {
                    self.pos = end;
                    return Err(self.fail("Unexpected end of input in string"));
                }
            }
        }

        let mut out = String::from(&input[start..end]);
        self.pos = end;
        loop {
            let Some(c) = self.input[self.pos..].chars().next() else {
                return Err(self.fail("Unexpected end of input in string"));
            };
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(Cow::Owned(out));
                }
                '\\' => {
                    self.pos += 1;
                    let escaped = self.escape()?;
                    out.push(escaped);
                }
                c if u32::from(c) < 0x20 => {
                    return Err(self.fail("Unescaped control character in string"));
                }
                c => {
                    self.pos += c.len_utf8();
                    out.push(c);
                }
            }
        }
    }

    fn escape(&mut self) -> SerialResult<char> {
        let Some(c) = self.input[self.pos..].chars().next() else {
            return Err(self.fail("Unexpected end of input in escape sequence"));
        };
        self.pos += c.len_utf8();
        Ok(match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.unicode_escape(),
            other => return Err(self.fail(format!("Invalid escaped char '{other}'"))),
        })
    }

    fn hex4(&mut self) -> SerialResult<u16> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|digits| digits.bytes().all(|byte| byte.is_ascii_hexdigit()));
        let Some(digits) = digits else {
            return Err(self.fail("Invalid unicode escape, expected four hex digits"));
        };
        self.pos += 4;
        u16::from_str_radix(digits, 16)
            .map_err(|_| self.fail("Invalid unicode escape, expected four hex digits"))
    }

    fn unicode_escape(&mut self) -> SerialResult<char> {
        let high = self.hex4()?;
        if !(0xD800..=0xDBFF).contains(&high) {
            return char::from_u32(u32::from(high))
                .ok_or_else(|| self.fail(format!("Invalid unicode escape '\\u{high:04x}'")));
        }
        if !self.input[self.pos..].starts_with("\\u") {
            return Err(self.fail("Unpaired surrogate in unicode escape"));
        }
        self.pos += 2;
        let low = self.hex4()?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(self.fail("Unpaired surrogate in unicode escape"));
        }
        let code = 0x10000 + (((u32::from(high) - 0xD800) << 10) | (u32::from(low) - 0xDC00));
        char::from_u32(code).ok_or_else(|| self.fail("Invalid surrogate pair in unicode escape"))
    }

    // -------------------------------------------------------------------------
    // Skipping

    /// Skips one whole value, nested composites included.
    pub fn skip_element(&mut self) -> SerialResult<()> {
        let mut closers: Vec<Token> = Vec::new();
        loop {
            match self.peek() {
                Token::BeginObject => {
                    closers.push(Token::EndObject);
                    self.pos += 1;
                }
                Token::BeginList => {
                    closers.push(Token::EndList);
                    self.pos += 1;
                }
                token @ (Token::EndObject | Token::EndList) => {
                    if closers.last() != Some(&token) {
                        return Err(self.fail(format!(
                            "Unexpected '{}' while skipping a value",
                            self.current()
                        )));
                    }
                    closers.pop();
                    self.pos += 1;
                    if closers.is_empty() {
                        return Ok(());
                    }
                }
                Token::Colon | Token::Comma => {
                    if closers.is_empty() {
                        return Err(self.fail(format!(
                            "Expected a value, but had '{}' instead",
                            self.current()
                        )));
                    }
                    self.pos += 1;
                }
                Token::Quote => {
                    self.quoted()?;
                    if closers.is_empty() {
                        return Ok(());
                    }
                }
                Token::Literal => {
                    self.literal()?;
                    if closers.is_empty() {
                        return Ok(());
                    }
                }
                Token::Eof => {
                    return Err(self.fail("Unexpected end of input while skipping a value"));
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Errors

    pub fn fail(&self, message: impl Display) -> SerialError {
        self.fail_at(self.pos, message, None)
    }

    pub fn fail_with_hint(&self, message: impl Display, hint: &str) -> SerialError {
        self.fail_at(self.pos, message, Some(hint))
    }

    /// A [`JsonDecoding`](SerialError::JsonDecoding) error located at `offset`.
    pub fn fail_at(&self, offset: usize, message: impl Display, hint: Option<&str>) -> SerialError {
        let path = self.path.to_string();
        let mut text = format!("Unexpected JSON token at offset {offset}: {message} at path: {path}");
        if let Some(hint) = hint {
            text.push('\n');
            text.push_str(hint);
        }
        text.push_str("\nJSON input: ");
        text.push_str(&excerpt(self.input, offset));
        SerialError::json_decoding(Some(offset), Some(path), text)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use sf_serial::SerialErrorKind;

    use super::{Lexer, Token, excerpt};

    #[test]
    fn strings_and_escapes() {
        let mut lexer = Lexer::new(r#" "plain" "a\"bé😀" "#);
        assert_eq!(lexer.consume_string(false).unwrap(), "plain");
        assert_eq!(lexer.consume_string(false).unwrap(), "a\"bé😀");
        assert_eq!(lexer.peek(), Token::Eof);

        let mut lexer = Lexer::new("rust");
        let error = lexer.consume_string(false).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        assert!(error.message().contains("Expected quotation mark"));
        assert!(error.message().contains("lenient(true)"));
        assert_eq!(Lexer::new("rust").consume_string(true).unwrap(), "rust");
    }

    #[test]
    fn literals_stop_at_structure() {
        let mut lexer = Lexer::new("[12.5,null]");
        lexer.consume(Token::BeginList).unwrap();
        assert_eq!(lexer.literal().unwrap(), "12.5");
        assert!(lexer.next_element(false, Token::EndList, false).unwrap());
        assert!(lexer.peek_null());
        lexer.consume_null().unwrap();
        assert!(!lexer.next_element(false, Token::EndList, false).unwrap());
        lexer.consume(Token::EndList).unwrap();
        lexer.expect_eof().unwrap();

        assert!(!Lexer::new("nullable").peek_null());
    }

    #[test]
    fn comma_rules() {
        let mut lexer = Lexer::new("[1,]");
        lexer.consume(Token::BeginList).unwrap();
        lexer.literal().unwrap();
        let error = lexer.next_element(false, Token::EndList, false).unwrap_err();
        assert!(error.message().contains("Trailing comma"));

        let mut lexer = Lexer::new("[1,]");
        lexer.consume(Token::BeginList).unwrap();
        lexer.literal().unwrap();
        assert!(!lexer.next_element(false, Token::EndList, true).unwrap());

        let mut lexer = Lexer::new("[,1]");
        lexer.consume(Token::BeginList).unwrap();
        assert!(lexer.next_element(true, Token::EndList, true).is_err());

        let mut lexer = Lexer::new("[1,,2]");
        lexer.consume(Token::BeginList).unwrap();
        lexer.literal().unwrap();
        assert!(lexer.next_element(false, Token::EndList, true).is_err());
    }

    #[test]
    fn skips_nested_values() {
        let mut lexer = Lexer::new(r#"{"a":[1,{"b":"}"}],"c":true} 7"#);
        lexer.skip_element().unwrap();
        assert_eq!(lexer.literal().unwrap(), "7");

        let mut lexer = Lexer::new("[1,2}");
        assert!(lexer.skip_element().is_err());
    }

    #[test]
    fn error_location() {
        let mut lexer = Lexer::new("{} x");
        lexer.skip_element().unwrap();
        let error = lexer.expect_eof().unwrap_err();
        assert_eq!(
            error.message(),
            "Unexpected JSON token at offset 3: Expected the input to end after the top-level \
             value, but had 'x' instead at path: $\nJSON input: {} x"
        );

        let long: String = core::iter::repeat_n('é', 150).collect();
        let shown = excerpt(&long, 151);
        assert!(shown.starts_with(".....") && shown.ends_with("....."));
    }
}
