// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Symmetric algorithm identifiers for key archival.
//!
//! Templates name the algorithm that protects an archived key either by
//! object identifier (policy objects, newer directory templates) or by a
//! provider algorithm name such as `3DES` (older directory templates). Both
//! forms are accepted; well-known names are mapped onto their OIDs.
//!
//! No trust decision is made here. Any syntactically valid identifier is
//! kept as-is.

use const_oid::ObjectIdentifier;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{Result, TemplateError};

/// Triple DES in CBC mode (1.2.840.113549.3.7)
pub const DES_EDE3_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.3.7");

/// DES in CBC mode (1.3.14.3.2.7)
pub const DES_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.7");

/// RC2 in CBC mode (1.2.840.113549.3.2)
pub const RC2_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.3.2");

/// RC4 (1.2.840.113549.3.4)
pub const RC4: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.3.4");

/// AES-128 in CBC mode (2.16.840.1.101.3.4.1.2)
pub const AES128_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.2");

/// AES-192 in CBC mode (2.16.840.1.101.3.4.1.22)
pub const AES192_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.22");

/// AES-256 in CBC mode (2.16.840.1.101.3.4.1.42)
pub const AES256_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42");

/// AES-128 in GCM mode (2.16.840.1.101.3.4.1.6)
pub const AES128_GCM: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.6");

/// AES-192 in GCM mode (2.16.840.1.101.3.4.1.26)
pub const AES192_GCM: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.26");

/// AES-256 in GCM mode (2.16.840.1.101.3.4.1.46)
pub const AES256_GCM: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.46");

const FRIENDLY_NAMES: [(ObjectIdentifier, &str); 10] = [
    (DES_EDE3_CBC, "3des"),
    (DES_CBC, "des"),
    (RC2_CBC, "rc2"),
    (RC4, "rc4"),
    (AES128_CBC, "aes128"),
    (AES192_CBC, "aes192"),
    (AES256_CBC, "aes256"),
    (AES128_GCM, "aes128-gcm"),
    (AES192_GCM, "aes192-gcm"),
    (AES256_GCM, "aes256-gcm"),
];

/// Identifier of the symmetric algorithm protecting an archived key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlgorithmIdentifier {
    /// Dotted object identifier.
    Oid(ObjectIdentifier),
    /// Dotted identifier kept as text because it has arcs wider than 32
    /// bits, a first arc above 2, or an encoding too long for
    /// [`ObjectIdentifier`].
    Dotted(String),
    /// Provider algorithm name with no fixed OID (e.g. `AES`).
    Named(String),
}

impl AlgorithmIdentifier {
    /// Parse an identifier from its textual form.
    ///
    /// Dotted values need at least two non-empty numeric arcs. Those that
    /// [`ObjectIdentifier`] cannot hold are kept as [`Self::Dotted`]. Known
    /// names (`3DES`, `DES`, `RC2`, `RC4`, `AES128`, `AES192`, `AES256`,
    /// case-insensitive) resolve to their OIDs; any other name is kept
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidAlgorithm`] for empty input or a
    /// dotted value with empty arcs or a single arc.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TemplateError::invalid_algorithm("empty value"));
        }

        if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Self::parse_dotted(value);
        }

        match Self::oid_for_name(value) {
            Some(oid) => Ok(Self::Oid(oid)),
            None => Ok(Self::Named(value.to_string())),
        }
    }

    fn parse_dotted(value: &str) -> Result<Self> {
        let arcs: Vec<&str> = value.split('.').collect();
        if arcs.len() < 2 || arcs.iter().any(|arc| arc.is_empty()) {
            return Err(TemplateError::invalid_algorithm(format!(
                "{value}: malformed dotted identifier"
            )));
        }

        // const-oid 0.9 does unchecked arithmetic on arcs wider than 32 bits
        let fits = arcs.len() >= 3 && arcs.iter().all(|arc| arc.parse::<u32>().is_ok());
        if fits {
            if let Ok(oid) = ObjectIdentifier::new(value) {
                return Ok(Self::Oid(oid));
            }
        }
        Ok(Self::Dotted(value.to_string()))
    }

    /// Get the object identifier, if known.
    pub fn oid(&self) -> Option<ObjectIdentifier> {
        match self {
            Self::Oid(oid) => Some(*oid),
            Self::Dotted(_) | Self::Named(_) => None,
        }
    }

    /// Human-readable algorithm name.
    ///
    /// Falls back to the raw identifier when the OID has no friendly name.
    pub fn display_name(&self) -> String {
        match self {
            Self::Oid(oid) => FRIENDLY_NAMES
                .iter()
                .find(|(known, _)| known == oid)
                .map(|(_, name)| (*name).to_string())
                .unwrap_or_else(|| oid.to_string()),
            Self::Dotted(value) | Self::Named(value) => value.clone(),
        }
    }

    fn oid_for_name(name: &str) -> Option<ObjectIdentifier> {
        let oid = match name.to_ascii_lowercase().as_str() {
            "3des" | "des3" | "tripledes" => DES_EDE3_CBC,
            "des" => DES_CBC,
            "rc2" => RC2_CBC,
            "rc4" => RC4,
            "aes128" => AES128_CBC,
            "aes192" => AES192_CBC,
            "aes256" => AES256_CBC,
            _ => return None,
        };
        Some(oid)
    }
}

impl From<ObjectIdentifier> for AlgorithmIdentifier {
    fn from(oid: ObjectIdentifier) -> Self {
        Self::Oid(oid)
    }
}

impl std::str::FromStr for AlgorithmIdentifier {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oid(oid) => write!(f, "{}", oid),
            Self::Dotted(value) | Self::Named(value) => f.write_str(value),
        }
    }
}

impl Serialize for AlgorithmIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
