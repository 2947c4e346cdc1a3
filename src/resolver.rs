// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Key archival resolution.
//!
//! [`KeyArchivalResolver`] turns either kind of template source into a
//! [`KeyArchivalSettings`] value. Which strategy runs is decided by the
//! [`TemplateSource`] variant the caller holds.
//!
//! # Example
//!
//! ```
//! use usg_cert_template::directory::DirectoryEntry;
//! use usg_cert_template::{IntegerRepresentation, KeyArchivalResolver, TemplateSource};
//!
//! let entry = DirectoryEntry::new()
//!     .with_attribute("msPKI-Private-Key-Flag", 1)
//!     .with_attribute(
//!         "msPKI-RA-Application-Policies",
//!         "msPKI-Symmetric-Algorithm`1`2.16.840.1.101.3.4.1.42`msPKI-Symmetric-Key-Length`1`256",
//!     );
//!
//! let resolver = KeyArchivalResolver::with_representation(IntegerRepresentation::Unsigned);
//! let settings = resolver.resolve(TemplateSource::Directory(&entry))?;
//!
//! assert!(settings.archival_required());
//! assert_eq!(settings.key_length(), 256);
//! # Ok::<(), usg_cert_template::TemplateError>(())
//! ```

use tracing::debug;

use crate::directory::{self, DirectoryRecord};
use crate::error::Result;
use crate::policy_object::{self, CapabilityProbe, EnrollmentPolicyTemplate, IntegerRepresentation};
use crate::settings::KeyArchivalSettings;

/// Template source handle.
///
/// Handles are borrowed for the duration of a single resolution; acquiring
/// and releasing them is up to the caller.
#[derive(Clone, Copy)]
pub enum TemplateSource<'a> {
    /// Directory template object.
    Directory(&'a dyn DirectoryRecord),
    /// Enrollment policy template object.
    PolicyObject(&'a dyn EnrollmentPolicyTemplate),
}

impl TemplateSource<'_> {
    /// Short name of the source kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::PolicyObject(_) => "policy-object",
        }
    }
}

impl std::fmt::Debug for TemplateSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TemplateSource").field(&self.kind()).finish()
    }
}

/// Resolves key archival settings from template sources.
///
/// The resolver holds no state beyond the host's integer representation,
/// so it is cheap to copy and safe to reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyArchivalResolver {
    representation: IntegerRepresentation,
}

impl KeyArchivalResolver {
    /// Create a resolver using the representation reported by `probe`.
    pub fn new(probe: &dyn CapabilityProbe) -> Self {
        Self::with_representation(probe.integer_representation())
    }

    /// Create a resolver with an explicit representation.
    pub fn with_representation(representation: IntegerRepresentation) -> Self {
        Self { representation }
    }

    /// Integer representation applied to policy objects.
    pub fn representation(&self) -> IntegerRepresentation {
        self.representation
    }

    /// Resolve the key archival settings of a template.
    ///
    /// # Errors
    ///
    /// Fails only when the source is unavailable or its private key flags
    /// cannot be read. Problems with the symmetric algorithm or key length
    /// are absorbed and leave those fields at their defaults.
    pub fn resolve(&self, source: TemplateSource<'_>) -> Result<KeyArchivalSettings> {
        debug!(source = source.kind(), "Resolving key archival settings");

        let settings = match source {
            TemplateSource::Directory(record) => directory::resolve(record)?,
            TemplateSource::PolicyObject(template) => {
                policy_object::resolve(template, self.representation)?
            }
        };

        debug!(
            source = source.kind(),
            archival_required = settings.archival_required(),
            key_length = settings.key_length(),
            "Resolved key archival settings"
        );
        Ok(settings)
    }
}
