//! Descriptor annotations understood by the JSON format.

use alloc::boxed::Box;

use sf_serial::descriptors::SerialDescriptor;

use crate::JsonConfig;

/// Alternative keys accepted for an element on decode.
///
/// The element is still written under its own name. Ignored when
/// [`use_alternative_names`](crate::JsonConfig::use_alternative_names) is
/// off.
///
/// # Examples
///
/// ```
/// use sf_json::{Json, JsonNames};
/// use sf_serial::Serializable;
///
/// #[derive(Serializable, Debug, PartialEq)]
/// #[serial(name = "User")]
/// struct User {
///     #[serial(@JsonNames::new(["login", "username"]))]
///     name: String,
/// }
///
/// let json = Json::default();
/// let user: User = json.decode(r#"{"login":"rust"}"#).unwrap();
/// assert_eq!(user, User { name: "rust".into() });
/// assert_eq!(json.encode(&user).unwrap(), r#"{"name":"rust"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonNames {
    names: Box<[&'static str]>,
}

impl JsonNames {
    pub fn new(names: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    #[inline]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

/// The discriminator key of one polymorphic hierarchy, overriding
/// [`class_discriminator`](crate::JsonConfig::class_discriminator).
///
/// Attach it to the root: the sealed enum, or the descriptor of an open
/// base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDiscriminator(&'static str);

impl ClassDiscriminator {
    #[inline]
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    #[inline]
    pub const fn key(&self) -> &'static str {
        self.0
    }
}

// -----------------------------------------------------------------------------
// Lookups

/// The discriminator key used for values of the hierarchy `root`.
pub(crate) fn discriminator_key<'a>(
    root: &'static SerialDescriptor,
    config: &'a JsonConfig,
) -> &'a str {
    match root.annotations().get::<ClassDiscriminator>() {
        Some(discriminator) => discriminator.key(),
        None => &config.class_discriminator,
    }
}

/// The index of the element of `descriptor` known as `key` in the input.
pub(crate) fn element_index_for_key(
    descriptor: &SerialDescriptor,
    key: &str,
    config: &JsonConfig,
) -> Option<usize> {
    if let Some(index) = descriptor.element_index(key) {
        return Some(index);
    }
    if !config.use_alternative_names {
        return None;
    }
    descriptor.elements().iter().position(|element| {
        element
            .annotations()
            .get::<JsonNames>()
            .is_some_and(|names| names.names().contains(&key))
    })
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use sf_serial::descriptors::{Annotations, ElementDescriptor, SerialDescriptor, SerialKind};
    use sf_serial::{Described, Serializable};

    use super::{JsonNames, element_index_for_key};
    use crate::JsonConfig;

    #[test]
    fn alternative_names_resolve_to_the_element() {
        let descriptor = SerialDescriptor::builder("User", SerialKind::Class)
            .element("id", i64::serializer().descriptor())
            .push(
                ElementDescriptor::new("name", String::serializer().descriptor())
                    .with_annotations(Annotations::new().with(JsonNames::new(["login"]))),
            )
            .build();

        let config = JsonConfig::default();
        assert_eq!(element_index_for_key(&descriptor, "name", &config), Some(1));
        assert_eq!(element_index_for_key(&descriptor, "login", &config), Some(1));
        assert_eq!(element_index_for_key(&descriptor, "nick", &config), None);

        let config = JsonConfig {
            use_alternative_names: false,
            ..JsonConfig::default()
        };
        assert_eq!(element_index_for_key(&descriptor, "login", &config), None);
    }
}
