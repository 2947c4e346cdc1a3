// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Resolved key archival settings.

use serde::Serialize;
use std::fmt;

use crate::algorithm::AlgorithmIdentifier;

/// Key archival settings of a certificate template.
///
/// The algorithm and key length are only ever populated when archival is
/// required. Values are fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyArchivalSettings {
    archival_required: bool,
    encryption_algorithm: Option<AlgorithmIdentifier>,
    key_length: u32,
}

impl KeyArchivalSettings {
    /// Settings for a template that does not require archival.
    pub fn not_required() -> Self {
        Self::default()
    }

    /// Settings for a template that requires archival.
    ///
    /// A `key_length` of `None` is stored as 0.
    pub fn required(
        encryption_algorithm: Option<AlgorithmIdentifier>,
        key_length: Option<u32>,
    ) -> Self {
        Self {
            archival_required: true,
            encryption_algorithm,
            key_length: key_length.unwrap_or(0),
        }
    }

    /// Whether the private key must be archived.
    pub fn archival_required(&self) -> bool {
        self.archival_required
    }

    /// Symmetric algorithm used to encrypt the archived key.
    pub fn encryption_algorithm(&self) -> Option<&AlgorithmIdentifier> {
        self.encryption_algorithm.as_ref()
    }

    /// Symmetric key length in bits, 0 when unknown.
    pub fn key_length(&self) -> u32 {
        self.key_length
    }

    /// Render the settings as a text block.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyArchivalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Key Archival Settings]")?;
        write!(f, "  Key archival required: {}", self.archival_required)?;
        if self.archival_required {
            let algorithm = self
                .encryption_algorithm
                .as_ref()
                .map(AlgorithmIdentifier::display_name)
                .unwrap_or_else(|| "Unknown".to_string());
            writeln!(f)?;
            writeln!(f, "  Symmetric algorithm: {}", algorithm)?;
            write!(f, "  Symmetric key length: {}", self.key_length)?;
        }
        Ok(())
    }
}
