use core::any::{Any, type_name};

use alloc::boxed::Box;

/// Object safe access to the concrete type behind a trait object.
///
/// Blanket-implemented for every sized `'static` type. Use it as a supertrait
/// of the traits that form open hierarchies:
///
/// ```
/// use sf_serial::modules::SerialAny;
///
/// trait Shape: SerialAny {}
/// ```
pub trait SerialAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<T: Any> SerialAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// The static base type of a polymorphic hierarchy.
///
/// Implemented for `Box<dyn Trait>` when `Trait: SerialAny`, and by the
/// derive for sealed enums, whose newtype variants hold the subclasses.
pub trait PolymorphicBase: 'static {
    /// The concrete subclass value, used to find its serializer.
    fn concrete_value(&self) -> &dyn Any;

    fn concrete_type_name(&self) -> &'static str;
}

impl<T: ?Sized + SerialAny> PolymorphicBase for Box<T> {
    #[inline]
    fn concrete_value(&self) -> &dyn Any {
        (**self).as_any()
    }

    #[inline]
    fn concrete_type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::TypeId;

    use super::{PolymorphicBase, SerialAny};

    trait Shape: SerialAny {}

    struct Circle;
    impl Shape for Circle {}

    #[test]
    fn box_exposes_concrete_value() {
        let shape: Box<dyn Shape> = Box::new(Circle);
        assert_eq!(shape.concrete_value().type_id(), TypeId::of::<Circle>());
        assert!(shape.concrete_type_name().ends_with("Circle"));
    }
}
