use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use crate::descriptors::SerialDescriptor;

/// The result type of every encode and decode operation.
pub type SerialResult<T> = Result<T, SerialError>;

// -----------------------------------------------------------------------------
// SerialErrorKind

/// The kind of a [`SerialError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerialErrorKind {
    Serialization,
    MissingField,
    UnknownField,
    JsonDecoding,
    JsonEncoding,
}

// -----------------------------------------------------------------------------
// SerialError

/// Failure of an encode or decode call.
///
/// The message is formatted once, at construction. [`SerialError::recover`]
/// relies on that: the recovered error repeats the message verbatim and keeps
/// the original as its [`cause`](SerialError::cause).
///
/// Programming errors, such as ending a composite with a foreign descriptor
/// or writing `null` into a non-nullable element, are not represented here;
/// they panic.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SerialError {
    /// Generic failure, including polymorphic resolution failures.
    #[error("{message}")]
    Serialization {
        message: String,
        #[source]
        cause: Option<Box<SerialError>>,
    },

    /// One or more required elements were absent from the input.
    #[error("{message}")]
    MissingField {
        serial_name: String,
        fields: Vec<String>,
        message: String,
        #[source]
        cause: Option<Box<SerialError>>,
    },

    /// The input carried an element the descriptor does not declare.
    #[error("{message}")]
    UnknownField {
        serial_name: String,
        name: Option<String>,
        index: Option<usize>,
        message: String,
        #[source]
        cause: Option<Box<SerialError>>,
    },

    /// Malformed JSON input, or a JSON token of the wrong kind.
    #[error("{message}")]
    JsonDecoding {
        offset: Option<usize>,
        path: Option<String>,
        message: String,
        #[source]
        cause: Option<Box<SerialError>>,
    },

    /// A value that cannot be represented in JSON with the current configuration.
    #[error("{message}")]
    JsonEncoding {
        message: String,
        #[source]
        cause: Option<Box<SerialError>>,
    },
}

impl SerialError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a [`MissingField`](Self::MissingField) error naming every missing element.
    ///
    /// # Examples
    ///
    /// ```
    /// use sf_serial::SerialError;
    ///
    /// let err = SerialError::missing_fields("Project", vec!["name".into()]);
    /// assert_eq!(
    ///     err.message(),
    ///     "Field 'name' is required for type with serial name 'Project', but it was missing",
    /// );
    /// ```
    pub fn missing_fields(serial_name: impl Into<String>, fields: Vec<String>) -> Self {
        let serial_name = serial_name.into();
        let message = match fields.as_slice() {
            [single] => format!(
                "Field '{single}' is required for type with serial name '{serial_name}', but it was missing"
            ),
            many => format!(
                "Fields [{}] are required for type with serial name '{serial_name}', but they were missing",
                many.join(", ")
            ),
        };
        Self::MissingField {
            serial_name,
            fields,
            message,
            cause: None,
        }
    }

    /// An element index that the descriptor does not declare.
    pub fn unknown_element_index(descriptor: &SerialDescriptor, index: usize) -> Self {
        Self::UnknownField {
            serial_name: descriptor.serial_name().into(),
            name: None,
            index: Some(index),
            message: format!(
                "An unknown field for index {index} in '{}'",
                descriptor.serial_name()
            ),
            cause: None,
        }
    }

    /// An element name that the descriptor does not declare.
    pub fn unknown_element_name(descriptor: &SerialDescriptor, name: &str) -> Self {
        Self::unknown_field(
            descriptor.serial_name(),
            name,
            format!(
                "Encountered an unknown key '{name}' in '{}'",
                descriptor.serial_name()
            ),
        )
    }

    /// An element name that the descriptor does not declare, with a
    /// format specific message.
    pub fn unknown_field(
        serial_name: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnknownField {
            serial_name: serial_name.into(),
            name: Some(name.into()),
            index: None,
            message: message.into(),
            cause: None,
        }
    }

    pub fn json_decoding(
        offset: Option<usize>,
        path: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::JsonDecoding {
            offset,
            path,
            message: message.into(),
            cause: None,
        }
    }

    pub fn json_encoding(message: impl Into<String>) -> Self {
        Self::JsonEncoding {
            message: message.into(),
            cause: None,
        }
    }

    pub fn kind(&self) -> SerialErrorKind {
        match self {
            Self::Serialization { .. } => SerialErrorKind::Serialization,
            Self::MissingField { .. } => SerialErrorKind::MissingField,
            Self::UnknownField { .. } => SerialErrorKind::UnknownField,
            Self::JsonDecoding { .. } => SerialErrorKind::JsonDecoding,
            Self::JsonEncoding { .. } => SerialErrorKind::JsonEncoding,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Serialization { message, .. }
            | Self::MissingField { message, .. }
            | Self::UnknownField { message, .. }
            | Self::JsonDecoding { message, .. }
            | Self::JsonEncoding { message, .. } => message,
        }
    }

    /// The error this one was recovered from, if any.
    pub fn cause(&self) -> Option<&SerialError> {
        match self {
            Self::Serialization { cause, .. }
            | Self::MissingField { cause, .. }
            | Self::UnknownField { cause, .. }
            | Self::JsonDecoding { cause, .. }
            | Self::JsonEncoding { cause, .. } => cause.as_deref(),
        }
    }

    fn cause_mut(&mut self) -> &mut Option<Box<SerialError>> {
        match self {
            Self::Serialization { cause, .. }
            | Self::MissingField { cause, .. }
            | Self::UnknownField { cause, .. }
            | Self::JsonDecoding { cause, .. }
            | Self::JsonEncoding { cause, .. } => cause,
        }
    }

    /// Rebuilds this error at the current location.
    ///
    /// The result has the same kind, payload and message, and its cause is
    /// `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sf_serial::{SerialError, SerialErrorKind};
    ///
    /// let original = SerialError::json_encoding("NaN is not a valid JSON number");
    /// let recovered = original.clone().recover();
    ///
    /// assert_eq!(recovered.kind(), SerialErrorKind::JsonEncoding);
    /// assert_eq!(recovered.message(), original.message());
    /// assert_eq!(recovered.cause(), Some(&original));
    /// ```
    pub fn recover(self) -> Self {
        let mut recovered = self.clone();
        *recovered.cause_mut() = Some(Box::new(self));
        recovered
    }
}
