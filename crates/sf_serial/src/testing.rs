//! A token stream format used by the unit tests of this crate.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::descriptors::SerialDescriptor;
use crate::encoding::{CompositeDecoder, CompositeEncoder, Decoder, ElementIndex, Encoder};
use crate::modules::SerializersModule;
use crate::{SerialError, SerialResult, Serializable};
use crate::{DeserializationStrategy, SerializationStrategy};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    Enum(usize),
    Null,
    Begin(String),
    Element(usize),
    /// An element name the descriptor does not know. Never written.
    Name(String),
    End,
}

pub(crate) fn begin(name: &str) -> Token {
    Token::Begin(name.to_string())
}

pub(crate) fn str(value: &str) -> Token {
    Token::Str(value.to_string())
}

// -----------------------------------------------------------------------------
// Encoder

#[derive(Default)]
pub(crate) struct TokenEncoder {
    pub tokens: Vec<Token>,
    pub module: Option<Arc<SerializersModule>>,
    /// Leave out optional elements equal to their default.
    pub skip_defaults: bool,
}

impl Encoder for TokenEncoder {
    fn serializers_module(&self) -> &SerializersModule {
        match &self.module {
            Some(module) => module,
            None => SerializersModule::empty(),
        }
    }

    fn encode_bool(&mut self, value: bool) -> SerialResult<()> {
        self.tokens.push(Token::Bool(value));
        Ok(())
    }

    fn encode_i8(&mut self, value: i8) -> SerialResult<()> {
        self.tokens.push(Token::I8(value));
        Ok(())
    }

    fn encode_i16(&mut self, value: i16) -> SerialResult<()> {
        self.tokens.push(Token::I16(value));
        Ok(())
    }

    fn encode_i32(&mut self, value: i32) -> SerialResult<()> {
        self.tokens.push(Token::I32(value));
        Ok(())
    }

    fn encode_i64(&mut self, value: i64) -> SerialResult<()> {
        self.tokens.push(Token::I64(value));
        Ok(())
    }

    fn encode_f32(&mut self, value: f32) -> SerialResult<()> {
        self.tokens.push(Token::F32(value));
        Ok(())
    }

    fn encode_f64(&mut self, value: f64) -> SerialResult<()> {
        self.tokens.push(Token::F64(value));
        Ok(())
    }

    fn encode_char(&mut self, value: char) -> SerialResult<()> {
        self.tokens.push(Token::Char(value));
        Ok(())
    }

    fn encode_str(&mut self, value: &str) -> SerialResult<()> {
        self.tokens.push(str(value));
        Ok(())
    }

    fn encode_enum(
        &mut self,
        _descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<()> {
        self.tokens.push(Token::Enum(index));
        Ok(())
    }

    fn encode_null(&mut self) -> SerialResult<()> {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeEncoder + '_>> {
        self.tokens.push(begin(descriptor.serial_name()));
        Ok(Box::new(TokenCompositeEncoder { encoder: self }))
    }
}

struct TokenCompositeEncoder<'a> {
    encoder: &'a mut TokenEncoder,
}

impl CompositeEncoder for TokenCompositeEncoder<'_> {
    fn element_encoder(
        &mut self,
        _descriptor: &'static SerialDescriptor,
        index: usize,
    ) -> SerialResult<&mut dyn Encoder> {
        self.encoder.tokens.push(Token::Element(index));
        Ok(&mut *self.encoder)
    }

    fn should_encode_element_default(
        &self,
        _descriptor: &'static SerialDescriptor,
        _index: usize,
    ) -> bool {
        !self.encoder.skip_defaults
    }

    fn end_structure(self: Box<Self>, _descriptor: &'static SerialDescriptor) -> SerialResult<()> {
        self.encoder.tokens.push(Token::End);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Decoder

pub(crate) struct TokenDecoder {
    tokens: Vec<Token>,
    position: usize,
    pub module: Option<Arc<SerializersModule>>,
}

impl TokenDecoder {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0, module: None }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> SerialResult<Token> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| SerialError::serialization("Unexpected end of tokens"))?;
        self.position += 1;
        Ok(token)
    }

    pub fn is_done(&self) -> bool {
        self.position == self.tokens.len()
    }
}

fn unexpected(expected: &str, found: Token) -> SerialError {
    SerialError::serialization(format!("Expected {expected}, found {found:?}"))
}

macro_rules! decode_token {
    ($($method:ident: $variant:ident -> $ty:ty;)*) => {$(
        fn $method(&mut self) -> SerialResult<$ty> {
            match self.next()? {
                Token::$variant(value) => Ok(value),
                other => Err(unexpected(stringify!($variant), other)),
            }
        }
    )*};
}

impl Decoder for TokenDecoder {
    fn serializers_module(&self) -> &SerializersModule {
        match &self.module {
            Some(module) => module,
            None => SerializersModule::empty(),
        }
    }

    fn decode_not_null_mark(&mut self) -> SerialResult<bool> {
        Ok(self.peek() != Some(&Token::Null))
    }

    fn decode_null(&mut self) -> SerialResult<()> {
        match self.next()? {
            Token::Null => Ok(()),
            other => Err(unexpected("Null", other)),
        }
    }

    decode_token! {
        decode_bool: Bool -> bool;
        decode_i8: I8 -> i8;
        decode_i16: I16 -> i16;
        decode_i32: I32 -> i32;
        decode_i64: I64 -> i64;
        decode_f32: F32 -> f32;
        decode_f64: F64 -> f64;
        decode_char: Char -> char;
        decode_string: Str -> String;
    }

    fn decode_enum(&mut self, _descriptor: &'static SerialDescriptor) -> SerialResult<usize> {
        match self.next()? {
            Token::Enum(index) => Ok(index),
            other => Err(unexpected("Enum", other)),
        }
    }

    fn begin_structure(
        &mut self,
        descriptor: &'static SerialDescriptor,
    ) -> SerialResult<Box<dyn CompositeDecoder + '_>> {
        match self.next()? {
            Token::Begin(name) if name == descriptor.serial_name() => {
                Ok(Box::new(TokenCompositeDecoder { decoder: self }))
            }
            other => Err(unexpected(&format!("Begin({})", descriptor.serial_name()), other)),
        }
    }
}

struct TokenCompositeDecoder<'a> {
    decoder: &'a mut TokenDecoder,
}

impl CompositeDecoder for TokenCompositeDecoder<'_> {
    fn decode_element_index(
        &mut self,
        _descriptor: &'static SerialDescriptor,
    ) -> SerialResult<ElementIndex> {
        match self.decoder.peek() {
            Some(Token::End) => Ok(ElementIndex::Done),
            _ => match self.decoder.next()? {
                Token::Element(index) => Ok(ElementIndex::Element(index)),
                Token::Name(name) => Ok(ElementIndex::UnknownName(name)),
                other => Err(unexpected("Element", other)),
            },
        }
    }

    fn element_decoder(
        &mut self,
        _descriptor: &'static SerialDescriptor,
        _index: usize,
    ) -> SerialResult<&mut dyn Decoder> {
        Ok(&mut *self.decoder)
    }

    fn end_structure(self: Box<Self>, _descriptor: &'static SerialDescriptor) -> SerialResult<()> {
        match self.decoder.next()? {
            Token::End => Ok(()),
            other => Err(unexpected("End", other)),
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers

pub(crate) fn encode_with<T: ?Sized, S>(strategy: &S, value: &T) -> SerialResult<Vec<Token>>
where
    S: SerializationStrategy<T> + ?Sized,
{
    let mut encoder = TokenEncoder::default();
    strategy.serialize(&mut encoder, value)?;
    Ok(encoder.tokens)
}

pub(crate) fn decode_with<T, S>(strategy: &S, tokens: Vec<Token>) -> SerialResult<T>
where
    S: DeserializationStrategy<T> + ?Sized,
{
    let mut decoder = TokenDecoder::new(tokens);
    let value = strategy.deserialize(&mut decoder)?;
    assert!(decoder.is_done(), "tokens left after decoding");
    Ok(value)
}

pub(crate) fn encode<T: Serializable>(value: &T) -> Vec<Token> {
    encode_with(&T::serializer(), value).unwrap()
}

pub(crate) fn decode<T: Serializable>(tokens: Vec<Token>) -> SerialResult<T> {
    decode_with(&T::serializer(), tokens)
}
