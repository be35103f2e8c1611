use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use sf_utils::hash::HashMap;

use super::{Annotations, PolymorphicKind, PrimitiveKind, SerialKind};

// -----------------------------------------------------------------------------
// DescriptorRef

/// Returns the descriptor of an element type on demand.
pub type DescriptorFn = fn() -> &'static SerialDescriptor;

/// The descriptor of an element, either known or resolved on first use.
///
/// Resolving lazily lets a type name itself among its elements, as a tree
/// node holding a list of nodes does.
#[derive(Clone, Copy)]
pub enum DescriptorRef {
    Static(&'static SerialDescriptor),
    Lazy(DescriptorFn),
}

impl DescriptorRef {
    #[inline]
    pub fn get(&self) -> &'static SerialDescriptor {
        match *self {
            Self::Static(descriptor) => descriptor,
            Self::Lazy(func) => func(),
        }
    }
}

impl From<&'static SerialDescriptor> for DescriptorRef {
    #[inline]
    fn from(value: &'static SerialDescriptor) -> Self {
        Self::Static(value)
    }
}

impl From<DescriptorFn> for DescriptorRef {
    #[inline]
    fn from(value: DescriptorFn) -> Self {
        Self::Lazy(value)
    }
}

// -----------------------------------------------------------------------------
// ElementDescriptor

/// One element of a composite descriptor.
#[derive(Clone)]
pub struct ElementDescriptor {
    name: Cow<'static, str>,
    descriptor: DescriptorRef,
    optional: bool,
    annotations: Annotations,
}

impl ElementDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, descriptor: impl Into<DescriptorRef>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            optional: false,
            annotations: Annotations::new(),
        }
    }

    /// Marks the element as optional: it may be absent from the input.
    #[inline]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[inline]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn descriptor(&self) -> &'static SerialDescriptor {
        self.descriptor.get()
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

impl fmt::Debug for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDescriptor")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// SerialDescriptor

/// Immutable schema node of a serializable type.
///
/// List and map descriptors declare one and two elements respectively,
/// whatever the size of the value. The element queries map a runtime index
/// onto them: every index of a list refers to element `0`, and map indices
/// alternate between key (`0`) and value (`1`).
///
/// # Examples
///
/// ```
/// use sf_serial::descriptors::{PrimitiveKind, SerialDescriptor, SerialKind};
///
/// static STRING: std::sync::LazyLock<SerialDescriptor> =
///     std::sync::LazyLock::new(|| SerialDescriptor::primitive("String", PrimitiveKind::String));
///
/// let project = SerialDescriptor::builder("Project", SerialKind::Class)
///     .element("name", &*STRING)
///     .optional_element("owner", &*STRING)
///     .build();
///
/// assert_eq!(project.elements_count(), 2);
/// assert_eq!(project.element_index("owner"), Some(1));
/// assert!(project.is_element_optional(1));
/// assert_eq!(project.element_descriptor(0).serial_name(), "String");
/// ```
#[derive(Clone)]
pub struct SerialDescriptor {
    serial_name: Cow<'static, str>,
    kind: SerialKind,
    nullable: bool,
    elements: Box<[ElementDescriptor]>,
    indices: HashMap<Cow<'static, str>, usize>,
    annotations: Annotations,
}

impl SerialDescriptor {
    /// Starts building a descriptor. See [`DescriptorBuilder::build`] for the
    /// structural checks.
    #[inline]
    pub fn builder(serial_name: impl Into<Cow<'static, str>>, kind: SerialKind) -> DescriptorBuilder {
        DescriptorBuilder {
            serial_name: serial_name.into(),
            kind,
            elements: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    pub fn primitive(serial_name: impl Into<Cow<'static, str>>, kind: PrimitiveKind) -> Self {
        Self::builder(serial_name, SerialKind::Primitive(kind)).build()
    }

    pub fn object(serial_name: impl Into<Cow<'static, str>>) -> Self {
        Self::builder(serial_name, SerialKind::Object).build()
    }

    pub fn list(serial_name: impl Into<Cow<'static, str>>, element: impl Into<DescriptorRef>) -> Self {
        Self::builder(serial_name, SerialKind::List)
            .element("0", element)
            .build()
    }

    pub fn map(
        serial_name: impl Into<Cow<'static, str>>,
        key: impl Into<DescriptorRef>,
        value: impl Into<DescriptorRef>,
    ) -> Self {
        Self::builder(serial_name, SerialKind::Map)
            .element("0", key)
            .element("1", value)
            .build()
    }

    /// The descriptor of an open polymorphic root.
    ///
    /// Its `value` element is a [`Contextual`](SerialKind::Contextual)
    /// placeholder, since the subclasses are only known at run time.
    pub fn open_polymorphic(base_name: impl Into<Cow<'static, str>>) -> Self {
        let base_name = base_name.into();
        let placeholder = SerialDescriptor::builder(
            format!("Polymorphic<{base_name}>"),
            SerialKind::Contextual,
        )
        .build();
        Self::builder(base_name, SerialKind::Polymorphic(PolymorphicKind::Open))
            .element("type", string_descriptor())
            .element("value", leak(placeholder))
            .build()
    }

    /// The descriptor of a sealed root, listing every subclass under its
    /// `value` element.
    pub fn sealed(
        base_name: impl Into<Cow<'static, str>>,
        subclasses: &[&'static SerialDescriptor],
    ) -> Self {
        let base_name = base_name.into();
        let value = subclasses
            .iter()
            .fold(
                SerialDescriptor::builder(format!("Sealed<{base_name}>"), SerialKind::Contextual),
                |builder, subclass| builder.element(subclass.serial_name.clone(), *subclass),
            )
            .build();
        Self::builder(base_name, SerialKind::Polymorphic(PolymorphicKind::Sealed))
            .element("type", string_descriptor())
            .element("value", leak(value))
            .build()
    }

    /// Replaces the annotations of the descriptor.
    #[inline]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Returns a nullable copy of this descriptor, with `?` appended to the serial name.
    pub fn to_nullable(&self) -> Self {
        if self.nullable {
            return self.clone();
        }
        let mut nullable = self.clone();
        nullable.serial_name = format!("{}?", self.serial_name).into();
        nullable.nullable = true;
        nullable
    }

    #[inline]
    pub fn serial_name(&self) -> &str {
        &self.serial_name
    }

    #[inline]
    pub fn kind(&self) -> SerialKind {
        self.kind
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// The number of declared elements, not the size of a value.
    #[inline]
    pub fn elements_count(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn elements(&self) -> &[ElementDescriptor] {
        &self.elements
    }

    #[inline]
    fn slot(&self, index: usize) -> &ElementDescriptor {
        let slot = match self.kind {
            SerialKind::List => 0,
            SerialKind::Map => index % 2,
            _ => index,
        };
        match self.elements.get(slot) {
            Some(element) => element,
            None => panic!(
                "Index {index} out of bounds for '{}' with {} elements",
                self.serial_name,
                self.elements.len(),
            ),
        }
    }

    /// # Panics
    ///
    /// If `index` does not refer to an element.
    #[inline]
    pub fn element_name(&self, index: usize) -> &str {
        self.slot(index).name()
    }

    /// # Panics
    ///
    /// If `index` does not refer to an element.
    #[inline]
    pub fn element_descriptor(&self, index: usize) -> &'static SerialDescriptor {
        self.slot(index).descriptor()
    }

    /// # Panics
    ///
    /// If `index` does not refer to an element.
    #[inline]
    pub fn is_element_optional(&self, index: usize) -> bool {
        self.slot(index).is_optional()
    }

    /// # Panics
    ///
    /// If `index` does not refer to an element.
    #[inline]
    pub fn element_annotations(&self, index: usize) -> &Annotations {
        self.slot(index).annotations()
    }

    /// Looks up an element by its serial name.
    #[inline]
    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }
}

impl PartialEq for SerialDescriptor {
    /// Shallow comparison: element descriptors are compared by name only, so
    /// recursive descriptors do not recurse.
    fn eq(&self, other: &Self) -> bool {
        self.serial_name == other.serial_name
            && self.kind == other.kind
            && self.nullable == other.nullable
            && self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| a.name == b.name && a.optional == b.optional)
    }
}

impl fmt::Debug for SerialDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialDescriptor")
            .field("serial_name", &self.serial_name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("elements", &self.elements)
            .finish()
    }
}

impl fmt::Display for SerialDescriptor {
    /// `Name(a, b?)`, where `?` marks optional elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serial_name)?;
        if self.elements.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&element.name)?;
            if element.optional {
                f.write_str("?")?;
            }
        }
        f.write_str(")")
    }
}

// -----------------------------------------------------------------------------
// DescriptorBuilder

/// Collects the elements of a [`SerialDescriptor`].
pub struct DescriptorBuilder {
    serial_name: Cow<'static, str>,
    kind: SerialKind,
    elements: Vec<ElementDescriptor>,
    annotations: Annotations,
}

impl DescriptorBuilder {
    #[inline]
    pub fn element(self, name: impl Into<Cow<'static, str>>, descriptor: impl Into<DescriptorRef>) -> Self {
        self.push(ElementDescriptor::new(name, descriptor))
    }

    #[inline]
    pub fn optional_element(
        self,
        name: impl Into<Cow<'static, str>>,
        descriptor: impl Into<DescriptorRef>,
    ) -> Self {
        self.push(ElementDescriptor::new(name, descriptor).with_optional(true))
    }

    /// Adds an enum entry, described as an object named `{serial_name}.{name}`.
    pub fn enum_entry(self, name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let entry = SerialDescriptor::object(format!("{}.{name}", self.serial_name));
        self.element(name, leak(entry))
    }

    #[inline]
    pub fn push(mut self, element: ElementDescriptor) -> Self {
        self.elements.push(element);
        self
    }

    #[inline]
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// # Panics
    ///
    /// - If the serial name is blank.
    /// - If two elements share a name.
    /// - If the element count does not fit the kind: a class needs at least
    ///   one element, a list exactly one, a map exactly two, a polymorphic
    ///   root exactly two, primitives and objects none.
    pub fn build(self) -> SerialDescriptor {
        let Self {
            serial_name,
            kind,
            elements,
            annotations,
        } = self;

        assert!(
            !serial_name.trim().is_empty(),
            "Blank serial names are prohibited"
        );

        let count = elements.len();
        let arity_ok = match kind {
            SerialKind::Class => count > 0,
            SerialKind::List => count == 1,
            SerialKind::Map | SerialKind::Polymorphic(_) => count == 2,
            SerialKind::Primitive(_) | SerialKind::Object => count == 0,
            SerialKind::Enum | SerialKind::Contextual => true,
        };
        assert!(
            arity_ok,
            "Descriptor '{serial_name}' of kind {kind} cannot have {count} elements"
        );

        let mut indices = HashMap::with_capacity_and_hasher(count, Default::default());
        for (index, element) in elements.iter().enumerate() {
            let previous = indices.insert(element.name.clone(), index);
            assert!(
                previous.is_none(),
                "Element with name '{}' is already registered in '{serial_name}'",
                element.name,
            );
        }

        SerialDescriptor {
            serial_name,
            kind,
            nullable: false,
            elements: elements.into_boxed_slice(),
            indices,
            annotations,
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn leak(descriptor: SerialDescriptor) -> &'static SerialDescriptor {
    Box::leak(Box::new(descriptor))
}

fn string_descriptor() -> &'static SerialDescriptor {
    use crate::{Described, Serializable};
    <String as Serializable>::serializer().descriptor()
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::{Described, Serializable};

    fn int() -> &'static SerialDescriptor {
        <i32 as Serializable>::serializer().descriptor()
    }

    #[test]
    fn collection_indices_map_onto_declared_elements() {
        let list = SerialDescriptor::list("List", int());
        assert_eq!(list.elements_count(), 1);
        assert_eq!(list.element_descriptor(17).serial_name(), "i32");

        let map = SerialDescriptor::map("Map", string_descriptor(), int());
        assert_eq!(map.elements_count(), 2);
        assert_eq!(map.element_descriptor(4).serial_name(), "String");
        assert_eq!(map.element_descriptor(5).serial_name(), "i32");
    }

    #[test]
    #[should_panic(expected = "cannot have 0 elements")]
    fn empty_class_is_rejected() {
        SerialDescriptor::builder("Empty", SerialKind::Class).build();
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_names_are_rejected() {
        SerialDescriptor::builder("Twice", SerialKind::Class)
            .element("a", int())
            .element("a", int())
            .build();
    }

    #[test]
    fn nullable_and_display() {
        let point = SerialDescriptor::builder("Point", SerialKind::Class)
            .element("x", int())
            .optional_element("y", int())
            .build();
        let nullable = point.to_nullable();
        assert!(nullable.is_nullable());
        assert_eq!(nullable.serial_name(), "Point?");
        assert_eq!(point.to_string(), "Point(x, y?)");
        assert_ne!(point, nullable);
    }

    #[test]
    fn enum_entries_are_objects() {
        let color = SerialDescriptor::builder("Color", SerialKind::Enum)
            .enum_entry("Red")
            .enum_entry("Green")
            .build();
        assert_eq!(color.element_index("Green"), Some(1));
        let red = color.element_descriptor(0);
        assert_eq!(red.kind(), SerialKind::Object);
        assert_eq!(red.serial_name(), "Color.Red");
    }

    #[test]
    fn open_polymorphic_has_contextual_value() {
        let shape = SerialDescriptor::open_polymorphic("Shape");
        assert_eq!(shape.kind(), SerialKind::Polymorphic(PolymorphicKind::Open));
        assert_eq!(shape.element_name(0), "type");
        assert_eq!(shape.element_descriptor(1).kind(), SerialKind::Contextual);
        assert_eq!(shape.element_descriptor(1).serial_name(), "Polymorphic<Shape>");
    }
}
