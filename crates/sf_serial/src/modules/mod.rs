//! Runtime resolution of polymorphic values.
//!
//! A polymorphic value has a static base type `B` and a concrete subclass
//! only known at run time. Two things are needed to write and read it:
//!
//! - [`PolymorphicScope<B>`]: the table of subclasses of `B`, indexed by
//!   concrete type (for writing) and by serial name (for reading).
//! - [`PolymorphicSerializer<B>`]: the strategy of `B`. It finds the
//!   subclass of a value, then lets the format write the discriminator and
//!   the payload.
//!
//! Sealed hierarchies (enums deriving `Serializable` with
//! `#[serial(sealed)]`) carry their own scope. Open hierarchies
//! (`Box<dyn Trait>`) look theirs up in the [`SerializersModule`] the format
//! was configured with.
//!
//! ## auto_register
//!
//! With the `auto_register` feature, `#[serial(auto_register(Base))]` on a
//! derived type submits its registration through the [`inventory`] crate,
//! and [`SerializersModuleBuilder::with_auto_registered`] collects all of
//! them.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod base;
mod module;
mod polymorphic;
mod scope;

// -----------------------------------------------------------------------------
// Exports

pub use base::{PolymorphicBase, SerialAny};
pub use module::{SerializersModule, SerializersModuleBuilder};
pub use polymorphic::PolymorphicSerializer;
pub use scope::{PolymorphicScope, Subclass};

#[cfg(feature = "auto_register")]
pub use module::AutoRegistration;
