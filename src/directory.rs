// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Directory-record template source.
//!
//! Certificate templates are stored in the directory under
//! `CN=Certificate Templates,CN=Public Key Services,CN=Services` in the
//! configuration naming context. Key archival is described by two
//! attributes of the template object:
//!
//! - `msPKI-Private-Key-Flag`: integer flag mask
//! - `msPKI-RA-Application-Policies`: optional string, see
//!   [`crate::ra_policies`]
//!
//! Reading the directory is left to the caller; this module only needs
//! something implementing [`DirectoryRecord`]. [`DirectoryEntry`] is an
//! in-memory record that can be built by hand or loaded from an exported
//! TOML/JSON document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, TemplateError};
use crate::flags::PrivateKeyFlags;
use crate::ra_policies::RaApplicationPolicies;
use crate::settings::KeyArchivalSettings;

/// Private key flags attribute.
pub const PRIVATE_KEY_FLAG_ATTRIBUTE: &str = "msPKI-Private-Key-Flag";

/// RA application policies attribute.
pub const RA_APPLICATION_POLICIES_ATTRIBUTE: &str = "msPKI-RA-Application-Policies";

/// Value of a single-valued directory attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer syntax.
    Integer(i64),
    /// String syntax (also how LDAP transports integers).
    String(String),
}

impl AttributeValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Attribute store backing a directory template object.
pub trait DirectoryRecord {
    /// Read a single-valued attribute.
    ///
    /// Returns `Ok(None)` when the attribute is not set.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::SourceUnavailable`] if the record can no
    /// longer be read.
    fn attribute(&self, name: &str) -> Result<Option<AttributeValue>>;
}

/// In-memory directory record.
///
/// Attribute lookup ignores ASCII case, like LDAP attribute descriptions.
///
/// ```
/// use usg_cert_template::directory::DirectoryEntry;
///
/// let entry = DirectoryEntry::from_toml(r#"
///     distinguished_name = "CN=KeyRecovery,CN=Certificate Templates"
///
///     [attributes]
///     "msPKI-Private-Key-Flag" = 1
///     "msPKI-RA-Application-Policies" = "msPKI-Symmetric-Key-Length`DWORD`256`"
/// "#).unwrap();
/// assert_eq!(entry.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryEntry {
    /// Distinguished name of the template object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinguished_name: Option<String>,

    /// Attribute values by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl DirectoryEntry {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distinguished name.
    pub fn with_dn(mut self, dn: impl Into<String>) -> Self {
        self.distinguished_name = Some(dn.into());
        self
    }

    /// Add an attribute value, replacing any previous value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check whether the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Parse a record from a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| TemplateError::invalid_export(format!("directory record TOML: {e}")))
    }

    /// Parse a record from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TemplateError::invalid_export(format!("directory record JSON: {e}")))
    }
}

impl DirectoryRecord for DirectoryEntry {
    fn attribute(&self, name: &str) -> Result<Option<AttributeValue>> {
        let value = self.attributes.get(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        });
        Ok(value.cloned())
    }
}

/// Read the private key flags of a directory template.
///
/// # Errors
///
/// Fails if the attribute is absent, is not an integer, or does not fit in
/// 32 bits.
pub fn private_key_flags(record: &dyn DirectoryRecord) -> Result<PrivateKeyFlags> {
    let value = record
        .attribute(PRIVATE_KEY_FLAG_ATTRIBUTE)?
        .ok_or_else(|| TemplateError::missing_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE))?;

    let raw = match value {
        AttributeValue::Integer(raw) => raw,
        AttributeValue::String(ref s) => s.trim().parse::<i64>().map_err(|e| {
            TemplateError::invalid_attribute(
                PRIVATE_KEY_FLAG_ATTRIBUTE,
                format!("'{s}' is not an integer: {e}"),
            )
        })?,
    };

    if let Ok(signed) = i32::try_from(raw) {
        Ok(PrivateKeyFlags::from_signed(signed))
    } else if let Ok(unsigned) = u32::try_from(raw) {
        Ok(PrivateKeyFlags::from_bits(unsigned))
    } else {
        Err(TemplateError::invalid_attribute(
            PRIVATE_KEY_FLAG_ATTRIBUTE,
            format!("{raw} does not fit in 32 bits"),
        ))
    }
}

/// Resolve key archival settings from a directory record.
pub fn resolve(record: &dyn DirectoryRecord) -> Result<KeyArchivalSettings> {
    let flags = private_key_flags(record)?;
    if !flags.requires_key_archival() {
        debug!(flags = %flags, "Key archival not required");
        return Ok(KeyArchivalSettings::not_required());
    }

    let policies = match record.attribute(RA_APPLICATION_POLICIES_ATTRIBUTE)? {
        Some(AttributeValue::String(value)) => RaApplicationPolicies::parse(&value),
        Some(other) => {
            debug!(
                "Ignoring {} with {} syntax",
                RA_APPLICATION_POLICIES_ATTRIBUTE,
                other.type_name()
            );
            RaApplicationPolicies::default()
        }
        None => RaApplicationPolicies::default(),
    };

    Ok(KeyArchivalSettings::required(
        policies.symmetric_algorithm(),
        policies.symmetric_key_length(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_flags_integer() {
        let entry = DirectoryEntry::new().with_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE, 0x11_i32);
        assert_eq!(private_key_flags(&entry).unwrap().bits(), 0x11);
    }

    #[test]
    fn test_private_key_flags_string() {
        let entry = DirectoryEntry::new().with_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE, "16842753");
        assert_eq!(private_key_flags(&entry).unwrap().bits(), 0x0101_0001);
    }

    #[test]
    fn test_private_key_flags_negative() {
        let entry = DirectoryEntry::new().with_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE, -2_147_483_647_i32);
        let flags = private_key_flags(&entry).unwrap();
        assert_eq!(flags.bits(), 0x8000_0001);
        assert!(flags.requires_key_archival());
    }

    #[test]
    fn test_private_key_flags_errors() {
        let entry = DirectoryEntry::new();
        assert!(matches!(
            private_key_flags(&entry),
            Err(TemplateError::MissingAttribute(_))
        ));

        let entry = DirectoryEntry::new().with_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE, "x");
        assert!(matches!(
            private_key_flags(&entry),
            Err(TemplateError::InvalidAttribute { .. })
        ));

        let entry = DirectoryEntry::new().with_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE, 1_i64 << 40);
        assert!(private_key_flags(&entry).is_err());
    }

    #[test]
    fn test_attribute_lookup_ignores_case() {
        let entry = DirectoryEntry::new().with_attribute("mspki-private-key-flag", 1_i32);
        assert_eq!(
            entry.attribute(PRIVATE_KEY_FLAG_ATTRIBUTE).unwrap(),
            Some(AttributeValue::Integer(1))
        );
    }

    #[test]
    fn test_resolve_integer_policy_attribute_ignored() {
        let entry = DirectoryEntry::new()
            .with_attribute(PRIVATE_KEY_FLAG_ATTRIBUTE, 1_i32)
            .with_attribute(RA_APPLICATION_POLICIES_ATTRIBUTE, 5_i32);
        let settings = resolve(&entry).unwrap();
        assert!(settings.archival_required());
        assert!(settings.encryption_algorithm().is_none());
        assert_eq!(settings.key_length(), 0);
    }

    #[test]
    fn test_from_json() {
        let entry = DirectoryEntry::from_json(
            r#"{"attributes": {"msPKI-Private-Key-Flag": 16, "cn": "User"}}"#,
        )
        .unwrap();
        assert_eq!(entry.len(), 2);
        assert!(!resolve(&entry).unwrap().archival_required());
    }

    #[test]
    fn test_malformed_export() {
        let err = DirectoryEntry::from_toml("[attributes\n").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidExport(_)));
        assert!(err.to_string().starts_with("Invalid template export: directory record TOML"));

        let err = DirectoryEntry::from_json(r#"{"attrs": {}}"#).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidExport(_)));
    }
}
