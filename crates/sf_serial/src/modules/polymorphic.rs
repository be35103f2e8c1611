use alloc::format;
use alloc::sync::Arc;

use crate::descriptors::{PolymorphicKind, SerialDescriptor, SerialKind};
use crate::encoding::{Decoder, Encoder};
use crate::modules::scope::not_registered_class;
use crate::modules::scope::{missing_discriminator, unknown_subclass};
use crate::modules::{PolymorphicBase, PolymorphicScope, SerializersModule};
use crate::{DeserializationStrategy, Described, SerialError, SerialResult};
use crate::SerializationStrategy;

// -----------------------------------------------------------------------------
// PolymorphicSerializer

/// The strategy of a polymorphic base type `B`.
///
/// An open serializer looks its scope up in the module of the current
/// call; a sealed one carries the scope generated for its enum. Either way
/// the subclass is found first, then the format writes or reads the
/// discriminator and the payload through [`Encoder::encode_polymorphic`] and
/// [`Decoder::decode_polymorphic`].
pub struct PolymorphicSerializer<B> {
    descriptor: &'static SerialDescriptor,
    sealed: Option<Arc<PolymorphicScope<B>>>,
}

impl<B: PolymorphicBase> PolymorphicSerializer<B> {
    /// # Panics
    ///
    /// If `descriptor` is not an open polymorphic descriptor.
    pub fn open(descriptor: &'static SerialDescriptor) -> Self {
        assert_eq!(
            descriptor.kind(),
            SerialKind::Polymorphic(PolymorphicKind::Open),
            "'{}' is not an open polymorphic descriptor",
            descriptor.serial_name(),
        );
        Self {
            descriptor,
            sealed: None,
        }
    }

    /// # Panics
    ///
    /// If `descriptor` is not a sealed polymorphic descriptor.
    pub fn sealed(descriptor: &'static SerialDescriptor, scope: Arc<PolymorphicScope<B>>) -> Self {
        assert_eq!(
            descriptor.kind(),
            SerialKind::Polymorphic(PolymorphicKind::Sealed),
            "'{}' is not a sealed polymorphic descriptor",
            descriptor.serial_name(),
        );
        Self {
            descriptor,
            sealed: Some(scope),
        }
    }

    fn scope(&self, module: &SerializersModule) -> Option<Arc<PolymorphicScope<B>>> {
        match &self.sealed {
            Some(scope) => Some(Arc::clone(scope)),
            None => module.polymorphic_scope::<B>(),
        }
    }
}

impl<B> Clone for PolymorphicSerializer<B> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            sealed: self.sealed.clone(),
        }
    }
}

impl<B> core::fmt::Debug for PolymorphicSerializer<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolymorphicSerializer")
            .field("base", &self.descriptor.serial_name())
            .field("sealed", &self.sealed.is_some())
            .finish()
    }
}

impl<B: PolymorphicBase> Described for PolymorphicSerializer<B> {
    #[inline]
    fn descriptor(&self) -> &'static SerialDescriptor {
        self.descriptor
    }
}

impl<B: PolymorphicBase> SerializationStrategy<B> for PolymorphicSerializer<B> {
    fn serialize(&self, encoder: &mut dyn Encoder, value: &B) -> SerialResult<()> {
        let base_name = self.descriptor.serial_name();
        let Some(scope) = self.scope(encoder.serializers_module()) else {
            return Err(not_registered_class(base_name, value.concrete_type_name()));
        };
        let subclass = scope.subclass_for_value(value)?;
        log::trace!(
            "writing '{}' as subclass '{}' of '{base_name}'",
            subclass.type_name(),
            subclass.serial_name(),
        );

        encoder.encode_polymorphic(self.descriptor, subclass.descriptor(), &mut |encoder| {
            subclass.encode(encoder, value)
        })
    }
}

impl<B: PolymorphicBase> DeserializationStrategy<B> for PolymorphicSerializer<B> {
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<B> {
        let base_name = self.descriptor.serial_name();
        let scope = self.scope(decoder.serializers_module());
        let mut decoded: Option<B> = None;

        decoder.decode_polymorphic(self.descriptor, &mut |serial_name, decoder| {
            let subclass = match &scope {
                Some(scope) => scope.subclass_for_name(serial_name)?,
                None => {
                    return Err(match serial_name {
                        Some(name) => unknown_subclass(base_name, name),
                        None => missing_discriminator(base_name),
                    });
                }
            };
            log::trace!("reading subclass '{}' of '{base_name}'", subclass.serial_name());
            decoded = Some(subclass.decode(decoder)?);
            Ok(())
        })?;

        decoded.ok_or_else(|| {
            SerialError::serialization(format!(
                "Polymorphic value of '{base_name}' was not read by the format"
            ))
        })
    }
}

// -----------------------------------------------------------------------------
// open_polymorphic

/// Implements [`Serializable`](crate::Serializable) for `Box<dyn Trait>`,
/// making it the base of an open hierarchy.
///
/// `Trait` must have [`SerialAny`](crate::modules::SerialAny) as a
/// supertrait. The serial name of the base defaults to the trait path as
/// written; a second argument overrides it. Subclasses are registered in a
/// [`SerializersModule`] with
/// [`polymorphic`](crate::modules::SerializersModuleBuilder::polymorphic).
///
/// # Examples
///
/// ```
/// use sf_serial::modules::SerialAny;
/// use sf_serial::{Described, Serializable, open_polymorphic};
///
/// trait Shape: SerialAny {}
/// open_polymorphic!(dyn Shape);
///
/// let descriptor = <Box<dyn Shape>>::serializer().descriptor();
/// assert_eq!(descriptor.serial_name(), "Shape");
/// assert_eq!(descriptor.element_name(0), "type");
/// ```
#[macro_export]
macro_rules! open_polymorphic {
    (dyn $base:path) => {
        $crate::open_polymorphic!(dyn $base, ::core::stringify!($base));
    };
    (dyn $base:path, $name:expr) => {
        impl $crate::Serializable for $crate::__macro_exports::Box<dyn $base> {
            type Serializer = $crate::modules::PolymorphicSerializer<Self>;

            fn serializer() -> Self::Serializer {
                static DESCRIPTOR: $crate::descriptors::DescriptorCell =
                    $crate::descriptors::DescriptorCell::new();
                $crate::modules::PolymorphicSerializer::open(DESCRIPTOR.get_or_init(|| {
                    $crate::descriptors::SerialDescriptor::open_polymorphic($name)
                }))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;

    use crate::modules::{SerialAny, SerializersModule};
    use crate::testing::{Token, TokenDecoder, TokenEncoder, begin, str};
    use crate::{DeserializationStrategy, SerialErrorKind, Serializable};
    use crate::{SerializationStrategy, open_polymorphic};

    trait Message: SerialAny + core::fmt::Debug {
        fn text(&self) -> String;
    }

    #[derive(Debug)]
    struct Text(String);

    impl Message for String {
        fn text(&self) -> String {
            self.clone()
        }
    }

    impl Message for i32 {
        fn text(&self) -> String {
            alloc::format!("{self}")
        }
    }

    impl Message for Text {
        fn text(&self) -> String {
            self.0.clone()
        }
    }

    open_polymorphic!(dyn Message, "Message");

    fn module() -> Arc<SerializersModule> {
        let module = SerializersModule::builder()
            .polymorphic::<Box<dyn Message>>(|scope| {
                scope
                    .register(String::serializer(), |v: String| Box::new(v))
                    .register(i32::serializer(), |v: i32| Box::new(v));
            })
            .build();
        Arc::new(module)
    }

    #[test]
    fn default_envelope_round_trip() {
        let value: Box<dyn Message> = Box::new(42_i32);
        let mut encoder = TokenEncoder {
            module: Some(module()),
            ..TokenEncoder::default()
        };
        <Box<dyn Message>>::serializer()
            .serialize(&mut encoder, &value)
            .unwrap();
        assert_eq!(
            encoder.tokens,
            [
                begin("Message"),
                Token::Element(0),
                str("i32"),
                Token::Element(1),
                Token::I32(42),
                Token::End,
            ]
        );

        let mut decoder = TokenDecoder::new(encoder.tokens);
        decoder.module = Some(module());
        let decoded = <Box<dyn Message>>::serializer()
            .deserialize(&mut decoder)
            .unwrap();
        assert_eq!(decoded.text(), "42");
        assert!(decoder.is_done());
    }

    #[test]
    fn unregistered_class_on_write() {
        let value: Box<dyn Message> = Box::new(Text("hi".into()));
        let mut encoder = TokenEncoder {
            module: Some(module()),
            ..TokenEncoder::default()
        };
        let error = <Box<dyn Message>>::serializer()
            .serialize(&mut encoder, &value)
            .unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::Serialization);
        assert!(error.message().contains("Text' is not registered"));
        assert!(error.message().contains("scope of 'Message'"));
    }

    #[test]
    fn unknown_serial_name_on_read() {
        let tokens = alloc::vec![
            begin("Message"),
            Token::Element(0),
            str("Text"),
            Token::Element(1),
            str("hi"),
            Token::End,
        ];
        let mut decoder = TokenDecoder::new(tokens);
        decoder.module = Some(module());
        let error = <Box<dyn Message>>::serializer()
            .deserialize(&mut decoder)
            .unwrap_err();
        assert!(error.message().starts_with("Serializer for subclass 'Text' is not found"));
    }

    #[test]
    fn value_before_type_is_rejected() {
        let tokens = alloc::vec![begin("Message"), Token::Element(1), Token::I32(1), Token::End];
        let mut decoder = TokenDecoder::new(tokens);
        decoder.module = Some(module());
        let error = <Box<dyn Message>>::serializer()
            .deserialize(&mut decoder)
            .unwrap_err();
        assert!(error.message().contains("before its type token"));
    }

    #[test]
    fn empty_module_resolves_nothing() {
        let value: Box<dyn Message> = Box::new(1_i32);
        let mut encoder = TokenEncoder::default();
        let error = <Box<dyn Message>>::serializer()
            .serialize(&mut encoder, &value)
            .unwrap_err();
        assert!(error.message().contains("is not registered"));
        assert!(encoder.tokens.is_empty());
    }
}
