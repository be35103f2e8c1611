use alloc::borrow::Cow;
use alloc::sync::Arc;

use sf_serial::modules::SerializersModule;
use thiserror::Error;

use crate::Json;

// -----------------------------------------------------------------------------
// JsonConfig

/// The options of a [`Json`] instance.
///
/// Obtained with [`Json::config`]; built and validated by [`JsonBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct JsonConfig {
    /// Write one element per line, indented by `pretty_print_indent`.
    pub pretty_print: bool,
    pub pretty_print_indent: Cow<'static, str>,
    /// Accept unquoted strings and keys, and quoted nested numbers and booleans.
    pub lenient: bool,
    /// Skip object keys the descriptor does not declare.
    pub ignore_unknown_keys: bool,
    /// Write and read `NaN`, `Infinity` and `-Infinity`.
    pub allow_special_floating_point_values: bool,
    /// The key of the polymorphic discriminator, unless the root overrides it.
    pub class_discriminator: Cow<'static, str>,
    /// Let optional elements fall back to their default on `null` or on an
    /// unknown enum entry.
    pub coerce_input_values: bool,
    /// Write optional elements equal to their default.
    pub encode_defaults: bool,
    /// Write `null` elements. When off, they are left out, and absent
    /// nullable elements decode as `None`.
    pub explicit_nulls: bool,
    /// Write maps with non-primitive keys as `[k1, v1, k2, v2, ...]`.
    pub allow_structured_map_keys: bool,
    /// Write polymorphic values as `["serial name", {...}]`.
    pub use_array_polymorphism: bool,
    /// Accept the keys listed in [`JsonNames`](crate::JsonNames) annotations.
    pub use_alternative_names: bool,
    pub allow_trailing_comma: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            pretty_print: false,
            pretty_print_indent: Cow::Borrowed("    "),
            lenient: false,
            ignore_unknown_keys: false,
            allow_special_floating_point_values: false,
            class_discriminator: Cow::Borrowed("type"),
            coerce_input_values: false,
            encode_defaults: false,
            explicit_nulls: true,
            allow_structured_map_keys: false,
            use_array_polymorphism: false,
            use_alternative_names: true,
            allow_trailing_comma: false,
        }
    }
}

// -----------------------------------------------------------------------------
// JsonConfigError

/// An invalid combination of options, reported by [`JsonBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum JsonConfigError {
    #[error(
        "Only whitespace, tab, newline and carriage return are allowed as pretty print \
         symbols. Had '{0}'"
    )]
    InvalidIndent(Cow<'static, str>),
    #[error("Indent should not be specified when default printing mode is used")]
    IndentWithoutPrettyPrint,
    #[error("Class discriminator should not be blank")]
    BlankClassDiscriminator,
    #[error(
        "Class discriminator should not be specified when array polymorphism is specified"
    )]
    DiscriminatorWithArrayPolymorphism,
}

// -----------------------------------------------------------------------------
// JsonBuilder

/// Builds a [`Json`] instance.
///
/// # Examples
///
/// ```
/// use sf_json::{Json, JsonConfigError};
///
/// let json = Json::builder().pretty_print(true).lenient(true).build().unwrap();
/// assert!(json.config().pretty_print);
///
/// let error = Json::builder().pretty_print_indent("--").build().unwrap_err();
/// assert_eq!(error, JsonConfigError::IndentWithoutPrettyPrint);
/// ```
#[derive(Debug, Clone)]
pub struct JsonBuilder {
    config: JsonConfig,
    indent_set: bool,
    discriminator_set: bool,
    module: Arc<SerializersModule>,
}

macro_rules! flag_setters {
    ($($(#[$meta:meta])* $name:ident;)*) => {$(
        $(#[$meta])*
        #[inline]
        pub fn $name(mut self, value: bool) -> Self {
            self.config.$name = value;
            self
        }
    )*};
}

impl JsonBuilder {
    pub(crate) fn new() -> Self {
        Self {
            config: JsonConfig::default(),
            indent_set: false,
            discriminator_set: false,
            module: Arc::new(SerializersModule::default()),
        }
    }

    /// A builder starting from the options and the module of `json`.
    pub(crate) fn from_json(json: &Json) -> Self {
        let defaults = JsonConfig::default();
        Self {
            indent_set: json.config().pretty_print_indent != defaults.pretty_print_indent,
            discriminator_set: json.config().class_discriminator != defaults.class_discriminator,
            config: json.config().clone(),
            module: Arc::clone(json.module()),
        }
    }

    flag_setters! {
        pretty_print;
        lenient;
        ignore_unknown_keys;
        allow_special_floating_point_values;
        coerce_input_values;
        encode_defaults;
        explicit_nulls;
        allow_structured_map_keys;
        use_array_polymorphism;
        use_alternative_names;
        allow_trailing_comma;
    }

    /// Sets the indent of pretty printing. Requires `pretty_print`.
    #[inline]
    pub fn pretty_print_indent(mut self, indent: impl Into<Cow<'static, str>>) -> Self {
        self.config.pretty_print_indent = indent.into();
        self.indent_set = true;
        self
    }

    #[inline]
    pub fn class_discriminator(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.config.class_discriminator = key.into();
        self.discriminator_set = true;
        self
    }

    /// The module that resolves open polymorphic values.
    #[inline]
    pub fn serializers_module(mut self, module: impl Into<Arc<SerializersModule>>) -> Self {
        self.module = module.into();
        self
    }

    pub fn build(self) -> Result<Json, JsonConfigError> {
        let config = self.config;

        if self.indent_set {
            if !config.pretty_print {
                return Err(JsonConfigError::IndentWithoutPrettyPrint);
            }
            let indent = &config.pretty_print_indent;
            if !indent.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n')) {
                return Err(JsonConfigError::InvalidIndent(indent.clone()));
            }
        }
        if config.class_discriminator.trim().is_empty() {
            return Err(JsonConfigError::BlankClassDiscriminator);
        }
        if self.discriminator_set && config.use_array_polymorphism {
            return Err(JsonConfigError::DiscriminatorWithArrayPolymorphism);
        }

        Ok(Json::from_parts(config, self.module))
    }
}

#[cfg(test)]
mod tests {
    use super::JsonConfigError;
    use crate::Json;

    #[test]
    fn defaults() {
        let json = Json::default();
        let config = json.config();
        assert!(!config.pretty_print);
        assert_eq!(config.class_discriminator, "type");
        assert!(config.explicit_nulls);
        assert!(config.use_alternative_names);
        assert!(!config.encode_defaults);
    }

    #[test]
    fn invalid_combinations() {
        let error = Json::builder()
            .pretty_print(true)
            .pretty_print_indent("ab")
            .build()
            .unwrap_err();
        assert!(matches!(error, JsonConfigError::InvalidIndent(_)));

        let error = Json::builder()
            .use_array_polymorphism(true)
            .class_discriminator("kind")
            .build()
            .unwrap_err();
        assert_eq!(error, JsonConfigError::DiscriminatorWithArrayPolymorphism);

        let error = Json::builder().class_discriminator(" ").build().unwrap_err();
        assert_eq!(error, JsonConfigError::BlankClassDiscriminator);
    }

    #[test]
    fn builder_from_existing_instance() {
        let pretty = Json::builder()
            .pretty_print(true)
            .pretty_print_indent("\t")
            .build()
            .unwrap();
        let derived = Json::builder_from(&pretty).lenient(true).build().unwrap();
        assert!(derived.config().lenient);
        assert_eq!(derived.config().pretty_print_indent, "\t");

        // Turning pretty printing off keeps the custom indent, which is rejected.
        let error = Json::builder_from(&pretty).pretty_print(false).build().unwrap_err();
        assert_eq!(error, JsonConfigError::IndentWithoutPrettyPrint);
    }
}
