//! Error types for certificate template resolution.
//!
//! This module defines the errors that can surface while resolving a
//! template's key archival settings, plus the property-level errors reported
//! by enrollment policy objects.
//!
//! Only conditions that prevent the archival requirement itself from being
//! determined are returned to callers. Failures reading the optional
//! symmetric algorithm or key length are absorbed by the resolver.

use thiserror::Error;

use crate::policy_object::TemplateProperty;

/// Result type alias using [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors that can occur while resolving template settings.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The source handle is invalid or no longer connected.
    #[error("Template source unavailable: {0}")]
    SourceUnavailable(String),

    /// A mandatory attribute or property is absent.
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// A mandatory attribute is present but cannot be interpreted.
    #[error("Invalid attribute '{name}': {message}")]
    InvalidAttribute {
        /// Attribute or property name.
        name: String,
        /// Description of the problem.
        message: String,
    },

    /// An algorithm identifier could not be parsed.
    #[error("Invalid algorithm identifier: {0}")]
    InvalidAlgorithm(String),

    /// A template export document could not be parsed.
    #[error("Invalid template export: {0}")]
    InvalidExport(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TemplateError {
    /// Create a source unavailable error with the given message.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::MissingAttribute(name.into())
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid algorithm error.
    pub fn invalid_algorithm(value: impl Into<String>) -> Self {
        Self::InvalidAlgorithm(value.into())
    }

    /// Create an invalid export error.
    pub fn invalid_export(msg: impl Into<String>) -> Self {
        Self::InvalidExport(msg.into())
    }

    /// Create a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if this error was raised by a template source rather than
    /// by configuration or local I/O.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::MissingAttribute(_) | Self::InvalidAttribute { .. }
        )
    }
}

/// Errors reported when reading a single property from a policy object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The object does not carry the property.
    #[error("property {0} not found")]
    NotFound(TemplateProperty),

    /// The property exists but holds a value of a different type.
    #[error("property {property} has type {actual}, expected {expected}")]
    TypeMismatch {
        /// Property being read.
        property: TemplateProperty,
        /// Expected value type.
        expected: &'static str,
        /// Type actually present.
        actual: &'static str,
    },

    /// The property cannot be read in this runtime context.
    #[error("property {0} is not supported")]
    NotSupported(TemplateProperty),

    /// The underlying object has been released or disconnected.
    #[error("policy object disconnected")]
    Disconnected,
}

impl PropertyError {
    /// Convert a failure to read a mandatory property into a [`TemplateError`].
    pub fn into_template_error(self) -> TemplateError {
        match self {
            Self::Disconnected => TemplateError::source_unavailable(self.to_string()),
            Self::NotFound(property) => TemplateError::missing_attribute(property.name()),
            Self::TypeMismatch { property, .. } | Self::NotSupported(property) => {
                TemplateError::invalid_attribute(property.name(), self.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::missing_attribute("msPKI-Private-Key-Flag");
        assert_eq!(
            err.to_string(),
            "Missing required attribute: msPKI-Private-Key-Flag"
        );

        let err = TemplateError::invalid_attribute("msPKI-Private-Key-Flag", "not an integer");
        assert_eq!(
            err.to_string(),
            "Invalid attribute 'msPKI-Private-Key-Flag': not an integer"
        );
    }

    #[test]
    fn test_is_source_error() {
        assert!(TemplateError::source_unavailable("closed").is_source_error());
        assert!(TemplateError::missing_attribute("x").is_source_error());
        assert!(!TemplateError::config("bad").is_source_error());
        assert!(!TemplateError::invalid_export("bad").is_source_error());
    }

    #[test]
    fn test_property_error_mapping() {
        let err = PropertyError::Disconnected.into_template_error();
        assert!(matches!(err, TemplateError::SourceUnavailable(_)));

        let err = PropertyError::NotFound(TemplateProperty::PrivateKeyFlags).into_template_error();
        assert!(matches!(err, TemplateError::MissingAttribute(ref n) if n == "PrivateKeyFlags"));

        let err = PropertyError::TypeMismatch {
            property: TemplateProperty::PrivateKeyFlags,
            expected: "Int32",
            actual: "String",
        }
        .into_template_error();
        assert!(matches!(err, TemplateError::InvalidAttribute { .. }));
    }
}
