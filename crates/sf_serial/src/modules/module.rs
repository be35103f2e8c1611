use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use sf_utils::TypeIdMap;

use crate::modules::{PolymorphicBase, PolymorphicScope};
use crate::{Described, Serializable};

// -----------------------------------------------------------------------------
// SerializersModule

/// The registry of open polymorphic hierarchies.
///
/// Maps each base type `B` to its [`PolymorphicScope<B>`]. A module is
/// built once, then shared read-only (usually behind an `Arc` inside a
/// format) by every call that needs it.
///
/// # Examples
///
/// ```
/// use sf_serial::modules::{SerialAny, SerializersModule};
/// use sf_serial::open_polymorphic;
/// use sf_serial::Serializable;
///
/// trait Event: SerialAny {}
/// impl Event for String {}
///
/// open_polymorphic!(dyn Event, "Event");
///
/// let module = SerializersModule::builder()
///     .polymorphic::<Box<dyn Event>>(|scope| {
///         scope.register(String::serializer(), |v: String| Box::new(v));
///     })
///     .build();
///
/// let scope = module.polymorphic_scope::<Box<dyn Event>>().unwrap();
/// assert_eq!(scope.base_name(), "Event");
/// assert_eq!(scope.len(), 1);
/// ```
#[derive(Default)]
pub struct SerializersModule {
    scopes: TypeIdMap<Arc<dyn Any + Send + Sync>>,
}

impl SerializersModule {
    /// The module without any registration.
    #[inline]
    pub fn empty() -> &'static SerializersModule {
        static EMPTY: SerializersModule = SerializersModule {
            scopes: TypeIdMap::new(),
        };
        &EMPTY
    }

    #[inline]
    pub fn builder() -> SerializersModuleBuilder {
        SerializersModuleBuilder::new()
    }

    /// The scope registered for the base type `B`.
    pub fn polymorphic_scope<B: PolymorphicBase>(&self) -> Option<Arc<PolymorphicScope<B>>> {
        let scope = self.scopes.get(&TypeId::of::<B>())?;
        Arc::clone(scope).downcast::<PolymorphicScope<B>>().ok()
    }

    #[inline]
    pub fn contains<B: PolymorphicBase>(&self) -> bool {
        self.scopes.contains(&TypeId::of::<B>())
    }

    /// The number of registered base types.
    #[inline]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl fmt::Debug for SerializersModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializersModule")
            .field("scopes", &self.scopes.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SerializersModuleBuilder

/// Collects polymorphic registrations into a [`SerializersModule`].
#[derive(Default)]
pub struct SerializersModuleBuilder {
    scopes: TypeIdMap<Box<dyn Any + Send + Sync>>,
}

impl SerializersModuleBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            scopes: TypeIdMap::new(),
        }
    }

    /// Registers subclasses of the base type `B` and returns the builder.
    ///
    /// Calling it again for the same `B` adds to the existing scope.
    ///
    /// # Panics
    ///
    /// If a subclass is registered twice, see [`PolymorphicScope::register`].
    #[inline]
    pub fn polymorphic<B>(mut self, configure: impl FnOnce(&mut PolymorphicScope<B>)) -> Self
    where
        B: PolymorphicBase + Serializable,
    {
        self.register_polymorphic(configure);
        self
    }

    /// Registers subclasses of the base type `B`.
    ///
    /// The scope is named after the serial name of `B`.
    pub fn register_polymorphic<B>(
        &mut self,
        configure: impl FnOnce(&mut PolymorphicScope<B>),
    ) -> &mut Self
    where
        B: PolymorphicBase + Serializable,
    {
        let scope = self.scopes.get_or_insert_with(TypeId::of::<B>(), || {
            let base_name = B::serializer().descriptor().serial_name();
            let scope = PolymorphicScope::<B>::new(base_name);
            Box::new(scope) as Box<dyn Any + Send + Sync>
        });
        match scope.downcast_mut::<PolymorphicScope<B>>() {
            Some(scope) => configure(scope),
            None => unreachable!("scope of '{}' has a foreign type", type_name::<B>()),
        }
        self
    }

    /// Adds every registration submitted with `#[serial(auto_register(..))]`.
    #[cfg(feature = "auto_register")]
    pub fn with_auto_registered(mut self) -> Self {
        let mut count = 0_usize;
        for registration in inventory::iter::<AutoRegistration> {
            (registration.0)(&mut self);
            count += 1;
        }
        log::debug!("collected {count} automatic polymorphic registrations");
        self
    }

    pub fn build(self) -> SerializersModule {
        let scopes = self
            .scopes
            .into_iter()
            .map(|(type_id, scope)| (type_id, Arc::<dyn Any + Send + Sync>::from(scope)));

        let mut module = SerializersModule {
            scopes: TypeIdMap::with_capacity(scopes.len()),
        };
        module.scopes.extend(scopes);
        log::debug!("built serializers module with {} polymorphic scopes", module.len());
        module
    }
}

impl fmt::Debug for SerializersModuleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializersModuleBuilder")
            .field("scopes", &self.scopes.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AutoRegistration

/// A registration submitted by `#[serial(auto_register(..))]`.
#[cfg(feature = "auto_register")]
pub struct AutoRegistration(pub fn(&mut SerializersModuleBuilder));

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);
