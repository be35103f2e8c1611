use core::fmt;

/// The scalar kinds a format has to support natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
}

/// Whether the subclasses of a polymorphic root are known statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolymorphicKind {
    /// The root lists every subclass itself.
    Sealed,
    /// Subclasses come from the [`SerializersModule`](crate::modules::SerializersModule)
    /// of the call.
    Open,
}

/// The shape of a serial descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerialKind {
    /// A record with named elements.
    Class,
    /// A singleton without elements.
    Object,
    /// One of a fixed set of names.
    Enum,
    /// A homogeneous sequence, described by one element.
    List,
    /// Key-value pairs, described by a key element and a value element.
    Map,
    /// A placeholder whose actual descriptor is only known at run time.
    Contextual,
    Polymorphic(PolymorphicKind),
    Primitive(PrimitiveKind),
}

impl SerialKind {
    #[inline]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    #[inline]
    pub const fn is_polymorphic(self) -> bool {
        matches!(self, Self::Polymorphic(_))
    }

    /// Kinds that are encoded through a composite (`begin_structure`).
    #[inline]
    pub const fn is_structured(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Object | Self::List | Self::Map | Self::Polymorphic(_)
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Class => "CLASS",
            Self::Object => "OBJECT",
            Self::Enum => "ENUM",
            Self::List => "LIST",
            Self::Map => "MAP",
            Self::Contextual => "CONTEXTUAL",
            Self::Polymorphic(PolymorphicKind::Sealed) => "SEALED",
            Self::Polymorphic(PolymorphicKind::Open) => "OPEN",
            Self::Primitive(PrimitiveKind::Boolean) => "BOOLEAN",
            Self::Primitive(PrimitiveKind::Byte) => "BYTE",
            Self::Primitive(PrimitiveKind::Short) => "SHORT",
            Self::Primitive(PrimitiveKind::Int) => "INT",
            Self::Primitive(PrimitiveKind::Long) => "LONG",
            Self::Primitive(PrimitiveKind::Float) => "FLOAT",
            Self::Primitive(PrimitiveKind::Double) => "DOUBLE",
            Self::Primitive(PrimitiveKind::Char) => "CHAR",
            Self::Primitive(PrimitiveKind::String) => "STRING",
        }
    }
}

impl fmt::Display for SerialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PrimitiveKind> for SerialKind {
    #[inline]
    fn from(value: PrimitiveKind) -> Self {
        Self::Primitive(value)
    }
}
