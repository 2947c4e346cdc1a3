// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # usg-cert-template
//!
//! Key archival policy resolution for certificate templates.
//!
//! A certificate template can require that the subject's private key be
//! archived with the CA, encrypted under a symmetric algorithm. This crate
//! reads that policy from either of the two places a template lives:
//!
//! - a **directory record** (`msPKI-Private-Key-Flag` and
//!   `msPKI-RA-Application-Policies` attributes)
//! - a live **enrollment policy object** (`PrivateKeyFlags`,
//!   `SymmetricAlgorithm` and `SymmetricKeyLength` properties)
//!
//! and normalizes it into a single [`KeyArchivalSettings`] value.
//!
//! ## Quick Start
//!
//! ```
//! use usg_cert_template::policy_object::{PolicyTemplate, PropertyValue, TemplateProperty};
//! use usg_cert_template::{IntegerRepresentation, KeyArchivalResolver, TemplateSource};
//!
//! let template = PolicyTemplate::new()
//!     .with_property(TemplateProperty::PrivateKeyFlags, PropertyValue::UInt32(0x1))
//!     .with_property(
//!         TemplateProperty::SymmetricAlgorithm,
//!         PropertyValue::ObjectId("2.16.840.1.101.3.4.1.42".into()),
//!     )
//!     .with_property(TemplateProperty::SymmetricKeyLength, PropertyValue::UInt32(256));
//!
//! let resolver = KeyArchivalResolver::new(&IntegerRepresentation::Unsigned);
//! let settings = resolver.resolve(TemplateSource::PolicyObject(&template))?;
//!
//! println!("{}", settings);
//! # assert_eq!(settings.key_length(), 256);
//! # Ok::<(), usg_cert_template::TemplateError>(())
//! ```
//!
//! ## Error Handling
//!
//! Only failures that prevent the archival requirement from being known are
//! returned: an unavailable source, or missing/unusable private key flags.
//! A missing or malformed algorithm or key length leaves that field at its
//! default.
//!
//! ## Cargo Features
//!
//! - `cli` (default): builds the `template-archival` command-line tool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod algorithm;
pub mod config;
pub mod directory;
pub mod error;
pub mod flags;
pub mod policy_object;
pub mod ra_policies;
pub mod resolver;
pub mod settings;

// Re-export main types at crate root for convenience
pub use algorithm::AlgorithmIdentifier;
pub use config::{ConfigLoader, OutputFormat, ResolverConfig};
pub use directory::{DirectoryEntry, DirectoryRecord};
pub use error::{PropertyError, Result, TemplateError};
pub use flags::PrivateKeyFlags;
pub use policy_object::{
    CapabilityProbe, EnrollmentPolicyTemplate, IntegerRepresentation, PolicyTemplate,
};
pub use ra_policies::RaApplicationPolicies;
pub use resolver::{KeyArchivalResolver, TemplateSource};
pub use settings::KeyArchivalSettings;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
