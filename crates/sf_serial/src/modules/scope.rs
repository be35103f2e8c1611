use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use sf_utils::TypeIdMap;
use sf_utils::hash::HashMap;

use crate::descriptors::SerialDescriptor;
use crate::encoding::{Decoder, Encoder};
use crate::modules::PolymorphicBase;
use crate::{SerialError, SerialResult, Serializer};

// -----------------------------------------------------------------------------
// SubclassSerializer

trait SubclassSerializer<B>: Send + Sync {
    fn descriptor(&self) -> &'static SerialDescriptor;

    fn encode(&self, encoder: &mut dyn Encoder, value: &B) -> SerialResult<()>;

    fn decode(&self, decoder: &mut dyn Decoder) -> SerialResult<B>;
}

struct Registered<B, T, S> {
    serializer: S,
    upcast: fn(T) -> B,
}

impl<B, T, S> SubclassSerializer<B> for Registered<B, T, S>
where
    B: PolymorphicBase,
    T: 'static,
    S: Serializer<T>,
{
    #[inline]
    fn descriptor(&self) -> &'static SerialDescriptor {
        self.serializer.descriptor()
    }

    fn encode(&self, encoder: &mut dyn Encoder, value: &B) -> SerialResult<()> {
        match value.concrete_value().downcast_ref::<T>() {
            Some(concrete) => self.serializer.serialize(encoder, concrete),
            None => Err(SerialError::serialization(format!(
                "Value of type '{}' cannot be written by the serializer of '{}'",
                value.concrete_type_name(),
                self.descriptor().serial_name(),
            ))),
        }
    }

    #[inline]
    fn decode(&self, decoder: &mut dyn Decoder) -> SerialResult<B> {
        self.serializer.deserialize(decoder).map(self.upcast)
    }
}

// -----------------------------------------------------------------------------
// Subclass

/// A registered subclass of the base type `B`.
pub struct Subclass<B> {
    type_id: TypeId,
    type_name: &'static str,
    serializer: Box<dyn SubclassSerializer<B>>,
}

impl<B> Subclass<B> {
    #[inline]
    pub fn serial_name(&self) -> &'static str {
        self.descriptor().serial_name()
    }

    #[inline]
    pub fn descriptor(&self) -> &'static SerialDescriptor {
        self.serializer.descriptor()
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Writes the payload of `value`, which must hold this subclass.
    #[inline]
    pub fn encode(&self, encoder: &mut dyn Encoder, value: &B) -> SerialResult<()> {
        self.serializer.encode(encoder, value)
    }

    /// Reads a value of this subclass and converts it into the base type.
    #[inline]
    pub fn decode(&self, decoder: &mut dyn Decoder) -> SerialResult<B> {
        self.serializer.decode(decoder)
    }
}

impl<B> fmt::Debug for Subclass<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subclass")
            .field("serial_name", &self.serial_name())
            .field("type_name", &self.type_name)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// PolymorphicScope

/// The subclasses of one polymorphic base type.
///
/// Subclasses are indexed twice: by concrete [`TypeId`] to write a value,
/// and by serial name to read one. Both must be unique within the scope.
///
/// # Examples
///
/// ```
/// use sf_serial::modules::{PolymorphicScope, SerialAny};
/// use sf_serial::Serializable;
///
/// trait Named: SerialAny {}
/// impl Named for String {}
/// impl Named for i32 {}
///
/// let scope = PolymorphicScope::<Box<dyn Named>>::new("Named")
///     .subclass(String::serializer(), |v: String| Box::new(v))
///     .subclass(i32::serializer(), |v: i32| Box::new(v));
///
/// assert_eq!(scope.len(), 2);
/// assert!(scope.subclass_for_name(Some("String")).is_ok());
/// assert!(scope.subclass_for_name(Some("Unknown")).is_err());
///
/// let value: Box<dyn Named> = Box::new(7_i32);
/// assert_eq!(scope.subclass_for_value(&value).unwrap().serial_name(), "i32");
/// ```
pub struct PolymorphicScope<B> {
    base_name: String,
    subclasses: Vec<Subclass<B>>,
    by_type: TypeIdMap<usize>,
    by_name: HashMap<&'static str, usize>,
}

impl<B: PolymorphicBase> PolymorphicScope<B> {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            subclasses: Vec::new(),
            by_type: TypeIdMap::new(),
            by_name: HashMap::default(),
        }
    }

    /// Adds a subclass and returns the scope.
    ///
    /// `upcast` converts a decoded subclass value into the base type,
    /// typically `|v| Box::new(v)` or an enum variant constructor.
    ///
    /// # Panics
    ///
    /// See [`register`](Self::register).
    #[inline]
    pub fn subclass<T, S>(mut self, serializer: S, upcast: fn(T) -> B) -> Self
    where
        T: 'static,
        S: Serializer<T> + 'static,
    {
        self.register(serializer, upcast);
        self
    }

    /// Adds a subclass.
    ///
    /// # Panics
    ///
    /// If the concrete type or the serial name is already registered.
    pub fn register<T, S>(&mut self, serializer: S, upcast: fn(T) -> B) -> &mut Self
    where
        T: 'static,
        S: Serializer<T> + 'static,
    {
        let serial_name = serializer.descriptor().serial_name();
        let type_id = TypeId::of::<T>();

        if let Some(&index) = self.by_type.get(&type_id) {
            panic!(
                "Class '{}' is already registered in the polymorphic scope of '{}' as '{}'",
                type_name::<T>(),
                self.base_name,
                self.subclasses[index].serial_name(),
            );
        }
        if let Some(&index) = self.by_name.get(serial_name) {
            panic!(
                "Serial name '{serial_name}' of '{}' clashes with '{}' in the polymorphic scope \
                 of '{}'",
                type_name::<T>(),
                self.subclasses[index].type_name,
                self.base_name,
            );
        }

        let index = self.subclasses.len();
        self.subclasses.push(Subclass {
            type_id,
            type_name: type_name::<T>(),
            serializer: Box::new(Registered { serializer, upcast }),
        });
        self.by_type.insert(type_id, index);
        self.by_name.insert(serial_name, index);
        self
    }

    /// Finds the subclass of `value` by its concrete type.
    pub fn subclass_for_value(&self, value: &B) -> SerialResult<&Subclass<B>> {
        let type_id = Any::type_id(value.concrete_value());
        match self.by_type.get(&type_id) {
            Some(&index) => Ok(&self.subclasses[index]),
            None => Err(not_registered_class(
                &self.base_name,
                value.concrete_type_name(),
            )),
        }
    }

    /// Finds the subclass by the serial name read from the input.
    ///
    /// `None` means the input carried no discriminator.
    pub fn subclass_for_name(&self, serial_name: Option<&str>) -> SerialResult<&Subclass<B>> {
        match serial_name {
            Some(name) => match self.by_name.get(name) {
                Some(&index) => Ok(&self.subclasses[index]),
                None => Err(unknown_subclass(&self.base_name, name)),
            },
            None => Err(missing_discriminator(&self.base_name)),
        }
    }
}

impl<B> PolymorphicScope<B> {
    #[inline]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subclasses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subclasses.is_empty()
    }

    /// The subclasses in registration order.
    #[inline]
    pub fn subclasses(&self) -> &[Subclass<B>] {
        &self.subclasses
    }
}

impl<B> fmt::Debug for PolymorphicScope<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicScope")
            .field("base_name", &self.base_name)
            .field("subclasses", &self.subclasses)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Messages

pub(super) fn not_registered_class(base_name: &str, type_name: &str) -> SerialError {
    SerialError::serialization(format!(
        "Class '{type_name}' is not registered for polymorphic serialization in the scope of \
         '{base_name}'. Register the subclass in the SerializersModule, or derive the base as \
         a sealed enum"
    ))
}

pub(super) fn unknown_subclass(base_name: &str, serial_name: &str) -> SerialError {
    SerialError::serialization(format!(
        "Serializer for subclass '{serial_name}' is not found in the polymorphic scope of \
         '{base_name}'. Check that a class with serial name '{serial_name}' exists and is \
         registered in the SerializersModule"
    ))
}

pub(super) fn missing_discriminator(base_name: &str) -> SerialError {
    SerialError::serialization(format!(
        "Class discriminator was missing and no default serializers were registered in the \
         polymorphic scope of '{base_name}'"
    ))
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::PolymorphicScope;
    use crate::modules::SerialAny;
    use crate::{SerialErrorKind, Serializable};

    trait Named: SerialAny {}
    impl Named for String {}
    impl Named for i64 {}
    impl Named for bool {}

    fn scope() -> PolymorphicScope<Box<dyn Named>> {
        PolymorphicScope::<Box<dyn Named>>::new("Named")
            .subclass(String::serializer(), |v: String| Box::new(v))
            .subclass(i64::serializer(), |v: i64| Box::new(v))
    }

    #[test]
    fn resolution_failures_name_the_scope() {
        let scope = scope();

        let value: Box<dyn Named> = Box::new(true);
        let error = scope.subclass_for_value(&value).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::Serialization);
        assert!(error.message().starts_with("Class 'bool' is not registered"));
        assert!(error.message().contains("in the scope of 'Named'"));

        let error = scope.subclass_for_name(Some("f64")).unwrap_err();
        assert!(error.message().starts_with("Serializer for subclass 'f64' is not found"));

        let error = scope.subclass_for_name(None).unwrap_err();
        assert!(error.message().contains("discriminator was missing"));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_type_panics() {
        scope().subclass(String::serializer(), |v: String| Box::new(v));
    }

    #[test]
    fn subclasses_keep_registration_order() {
        let scope = scope();
        let names: Vec<_> = scope.subclasses().iter().map(|s| s.serial_name()).collect();
        assert_eq!(names, ["String", "i64"]);
    }
}
