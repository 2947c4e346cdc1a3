// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Enrollment-policy-object template source.
//!
//! Templates obtained from an enrollment policy server are exposed as live
//! objects with properties addressed by key. Any property read may fail:
//! the property can be missing, carry an unexpected type, or be
//! unsupported by the host.
//!
//! # Integer representation
//!
//! Hosts disagree on how 32-bit template integers are delivered. Some report
//! them as signed values, others as unsigned values whose high bits would be
//! misread by a naive signed cast. The active representation is reported by
//! a [`CapabilityProbe`] and passed explicitly into extraction:
//!
//! - [`IntegerRepresentation::Signed`]: flags and key length must be
//!   [`PropertyValue::Int32`] and are read directly.
//! - [`IntegerRepresentation::Unsigned`]: flags must be
//!   [`PropertyValue::UInt32`]; the key length goes through a numeric
//!   conversion that accepts any integer or decimal string that fits.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::algorithm::AlgorithmIdentifier;
use crate::error::{PropertyError, Result, TemplateError};
use crate::flags::PrivateKeyFlags;
use crate::settings::KeyArchivalSettings;

/// Template properties used for key archival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemplateProperty {
    /// Private key flag mask.
    PrivateKeyFlags,
    /// Symmetric algorithm object identifier.
    SymmetricAlgorithm,
    /// Symmetric key length in bits.
    SymmetricKeyLength,
}

impl TemplateProperty {
    /// Property name as exposed by the policy object.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PrivateKeyFlags => "PrivateKeyFlags",
            Self::SymmetricAlgorithm => "SymmetricAlgorithm",
            Self::SymmetricKeyLength => "SymmetricKeyLength",
        }
    }
}

impl fmt::Display for TemplateProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value held by a policy object property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Object identifier (dotted value).
    ObjectId(String),
    /// Text.
    String(String),
}

impl PropertyValue {
    /// Name of the value type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::ObjectId(_) => "ObjectId",
            Self::String(_) => "String",
        }
    }
}

/// Integer representation used by the host for template properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerRepresentation {
    /// Values arrive as signed 32-bit integers.
    Signed,
    /// Values arrive as unsigned 32-bit integers.
    #[default]
    Unsigned,
}

impl IntegerRepresentation {
    /// Name of the property value type this representation expects.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Signed => "Int32",
            Self::Unsigned => "UInt32",
        }
    }

    /// Get the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
        }
    }
}

impl fmt::Display for IntegerRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntegerRepresentation {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signed" | "int32" => Ok(Self::Signed),
            "unsigned" | "uint32" => Ok(Self::Unsigned),
            other => Err(TemplateError::config(format!(
                "Unknown integer representation '{other}' (expected 'signed' or 'unsigned')"
            ))),
        }
    }
}

/// Reports which integer representation the host environment uses.
pub trait CapabilityProbe {
    /// Active integer representation.
    fn integer_representation(&self) -> IntegerRepresentation;
}

impl CapabilityProbe for IntegerRepresentation {
    fn integer_representation(&self) -> IntegerRepresentation {
        *self
    }
}

/// Live enrollment policy template.
pub trait EnrollmentPolicyTemplate {
    /// Read a template property.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] describing why the property could not be
    /// read.
    fn property(&self, property: TemplateProperty) -> std::result::Result<PropertyValue, PropertyError>;
}

/// In-memory policy template.
///
/// Properties can be marked unsupported to mimic hosts that refuse
/// certain reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyTemplate {
    /// Template common name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// Property values keyed by property name.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,

    /// Properties whose reads fail with [`PropertyError::NotSupported`].
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unsupported: BTreeSet<TemplateProperty>,

    #[serde(skip)]
    disconnected: bool,
}

impl PolicyTemplate {
    /// Create a template with no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the common name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.common_name = Some(name.into());
        self
    }

    /// Set a property value.
    pub fn with_property(mut self, property: TemplateProperty, value: PropertyValue) -> Self {
        self.properties.insert(property.name().to_string(), value);
        self
    }

    /// Mark a property as unsupported.
    pub fn with_unsupported(mut self, property: TemplateProperty) -> Self {
        self.unsupported.insert(property);
        self
    }

    /// Mark the template as released; every read then fails.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    /// Parse a template from a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| TemplateError::invalid_export(format!("policy template TOML: {e}")))
    }

    /// Parse a template from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TemplateError::invalid_export(format!("policy template JSON: {e}")))
    }
}

impl EnrollmentPolicyTemplate for PolicyTemplate {
    fn property(&self, property: TemplateProperty) -> std::result::Result<PropertyValue, PropertyError> {
        if self.disconnected {
            return Err(PropertyError::Disconnected);
        }
        if self.unsupported.contains(&property) {
            return Err(PropertyError::NotSupported(property));
        }
        self.properties
            .get(property.name())
            .cloned()
            .ok_or(PropertyError::NotFound(property))
    }
}

/// Read the private key flags in the given representation.
///
/// # Errors
///
/// Fails if the object is disconnected, the property is absent, or its type
/// does not match `representation`.
pub fn private_key_flags(
    template: &dyn EnrollmentPolicyTemplate,
    representation: IntegerRepresentation,
) -> Result<PrivateKeyFlags> {
    let property = TemplateProperty::PrivateKeyFlags;
    let value = template
        .property(property)
        .map_err(PropertyError::into_template_error)?;

    match (representation, value) {
        (IntegerRepresentation::Signed, PropertyValue::Int32(bits)) => {
            Ok(PrivateKeyFlags::from_signed(bits))
        }
        (IntegerRepresentation::Unsigned, PropertyValue::UInt32(bits)) => {
            Ok(PrivateKeyFlags::from_bits(bits))
        }
        (_, other) => Err(PropertyError::TypeMismatch {
            property,
            expected: representation.type_name(),
            actual: other.type_name(),
        }
        .into_template_error()),
    }
}

/// Read the symmetric algorithm.
pub fn symmetric_algorithm(template: &dyn EnrollmentPolicyTemplate) -> Result<AlgorithmIdentifier> {
    let property = TemplateProperty::SymmetricAlgorithm;
    match template
        .property(property)
        .map_err(PropertyError::into_template_error)?
    {
        PropertyValue::ObjectId(value) => AlgorithmIdentifier::parse(&value),
        other => Err(PropertyError::TypeMismatch {
            property,
            expected: "ObjectId",
            actual: other.type_name(),
        }
        .into_template_error()),
    }
}

/// Read the symmetric key length in the given representation.
pub fn symmetric_key_length(
    template: &dyn EnrollmentPolicyTemplate,
    representation: IntegerRepresentation,
) -> Result<u32> {
    let property = TemplateProperty::SymmetricKeyLength;
    let value = template
        .property(property)
        .map_err(PropertyError::into_template_error)?;

    match (representation, value) {
        (IntegerRepresentation::Signed, PropertyValue::Int32(v)) => key_length_in_range(v.into()),
        (IntegerRepresentation::Unsigned, PropertyValue::UInt32(v)) => {
            key_length_in_range(v.into())
        }
        (IntegerRepresentation::Unsigned, PropertyValue::Int32(v)) => key_length_in_range(v.into()),
        (IntegerRepresentation::Unsigned, PropertyValue::String(s)) => {
            let v = s.trim().parse::<i64>().map_err(|e| {
                TemplateError::invalid_attribute(property.name(), format!("'{s}': {e}"))
            })?;
            key_length_in_range(v)
        }
        (_, other) => Err(PropertyError::TypeMismatch {
            property,
            expected: representation.type_name(),
            actual: other.type_name(),
        }
        .into_template_error()),
    }
}

/// Key lengths are 32-bit signed on every host, so anything outside
/// `0..=i32::MAX` is rejected.
fn key_length_in_range(value: i64) -> Result<u32> {
    i32::try_from(value)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            TemplateError::invalid_attribute(
                TemplateProperty::SymmetricKeyLength.name(),
                format!("key length {value} out of range"),
            )
        })
}

/// Resolve key archival settings from a policy template.
///
/// Only the flags read can fail. The algorithm and key length are read
/// independently and any failure leaves that field at its default.
pub fn resolve(
    template: &dyn EnrollmentPolicyTemplate,
    representation: IntegerRepresentation,
) -> Result<KeyArchivalSettings> {
    let flags = private_key_flags(template, representation)?;
    if !flags.requires_key_archival() {
        debug!(flags = %flags, "Key archival not required");
        return Ok(KeyArchivalSettings::not_required());
    }

    let algorithm = optional(
        TemplateProperty::SymmetricAlgorithm,
        symmetric_algorithm(template),
    );
    let key_length = optional(
        TemplateProperty::SymmetricKeyLength,
        symmetric_key_length(template, representation),
    );

    Ok(KeyArchivalSettings::required(algorithm, key_length))
}

fn optional<T>(property: TemplateProperty, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(property = %property, "Property unreadable, using default: {}", e);
            None
        }
    }
}
