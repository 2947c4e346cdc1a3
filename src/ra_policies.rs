// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Parser for the `msPKI-RA-Application-Policies` attribute.
//!
//! On schema version 2+ templates this attribute doubles as a carrier for
//! auxiliary key settings. The value is a flat, backtick-delimited list of
//! triplets:
//!
//! ```text
//! name`type`value`name`type`value`...
//! ```
//!
//! For example:
//!
//! ```text
//! msPKI-Asymmetric-Algorithm`PZPWSTR`RSA`msPKI-Symmetric-Algorithm`PZPWSTR`3DES`msPKI-Symmetric-Key-Length`DWORD`168`
//! ```
//!
//! The middle token is a value type tag and is not interpreted. Empty
//! segments are discarded before grouping, and a trailing group with fewer
//! than three tokens is dropped. Parsing never fails: unrecognized or
//! malformed entries are skipped so the remaining fields are still read.

use serde::Serialize;
use tracing::{debug, trace};

use crate::algorithm::AlgorithmIdentifier;

/// Delimiter between tokens. It cannot occur inside an encoded value.
pub const FIELD_DELIMITER: char = '`';

/// Field carrying the archival symmetric algorithm.
pub const SYMMETRIC_ALGORITHM_FIELD: &str = "msPKI-Symmetric-Algorithm";

/// Field carrying the archival symmetric key length.
pub const SYMMETRIC_KEY_LENGTH_FIELD: &str = "msPKI-Symmetric-Key-Length";

/// One `name`type`value` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyField {
    /// Field name, e.g. `msPKI-Symmetric-Algorithm`.
    pub name: String,
    /// Value type tag, e.g. `PZPWSTR` or `DWORD`.
    pub kind: String,
    /// Raw value.
    pub value: String,
}

/// Decoded RA application policies attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaApplicationPolicies {
    fields: Vec<PolicyField>,
}

impl RaApplicationPolicies {
    /// Parse an attribute value.
    ///
    /// A value without any delimiter is a plain RA policy OID list and
    /// yields no fields.
    pub fn parse(value: &str) -> Self {
        if !value.contains(FIELD_DELIMITER) {
            return Self::default();
        }

        let tokens: Vec<&str> = value
            .split(FIELD_DELIMITER)
            .filter(|token| !token.is_empty())
            .collect();

        let mut fields = Vec::with_capacity(tokens.len() / 3);
        let mut index = 0;
        while index + 2 < tokens.len() {
            let field = PolicyField {
                name: tokens[index].to_string(),
                kind: tokens[index + 1].to_string(),
                value: tokens[index + 2].to_string(),
            };
            trace!(name = %field.name, kind = %field.kind, "RA policy field");
            fields.push(field);
            index += 3;
        }

        if index < tokens.len() {
            debug!(
                remaining = tokens.len() - index,
                "Skipping incomplete trailing RA policy field"
            );
        }

        Self { fields }
    }

    /// All decoded fields, in attribute order.
    pub fn fields(&self) -> &[PolicyField] {
        &self.fields
    }

    /// Check whether no fields were decoded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw value of the last field with the given name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Symmetric algorithm, if a well-formed entry is present.
    ///
    /// When the field repeats, the last parsable occurrence wins.
    pub fn symmetric_algorithm(&self) -> Option<AlgorithmIdentifier> {
        let mut algorithm = None;
        for field in self.named(SYMMETRIC_ALGORITHM_FIELD) {
            match AlgorithmIdentifier::parse(&field.value) {
                Ok(parsed) => algorithm = Some(parsed),
                Err(e) => debug!(value = %field.value, "Ignoring symmetric algorithm: {}", e),
            }
        }
        algorithm
    }

    /// Symmetric key length in bits, if a well-formed entry is present.
    ///
    /// The value must fit in `0..=i32::MAX`. When the field repeats, the
    /// last parsable occurrence wins.
    pub fn symmetric_key_length(&self) -> Option<u32> {
        let mut key_length = None;
        for field in self.named(SYMMETRIC_KEY_LENGTH_FIELD) {
            match field.value.trim().parse::<i32>().map(u32::try_from) {
                Ok(Ok(bits)) => key_length = Some(bits),
                Ok(Err(_)) => debug!(value = %field.value, "Ignoring negative symmetric key length"),
                Err(e) => debug!(value = %field.value, "Ignoring symmetric key length: {}", e),
            }
        }
        key_length
    }

    fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PolicyField> + 'a {
        self.fields.iter().filter(move |field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOWS_STYLE: &str = "msPKI-Asymmetric-Algorithm`PZPWSTR`RSA`msPKI-Hash-Algorithm`PZPWSTR`SHA256`msPKI-Key-Usage`DWORD`16777215`msPKI-Symmetric-Algorithm`PZPWSTR`3DES`msPKI-Symmetric-Key-Length`DWORD`168`";

    #[test]
    fn test_parse_windows_style_value() {
        let policies = RaApplicationPolicies::parse(WINDOWS_STYLE);
        assert_eq!(policies.fields().len(), 5);
        assert_eq!(policies.field("msPKI-Hash-Algorithm"), Some("SHA256"));
        assert_eq!(policies.fields()[2].kind, "DWORD");

        let algorithm = policies.symmetric_algorithm().unwrap();
        assert_eq!(algorithm.to_string(), "1.2.840.113549.3.7");
        assert_eq!(policies.symmetric_key_length(), Some(168));
    }

    #[test]
    fn test_no_delimiter_yields_nothing() {
        let policies = RaApplicationPolicies::parse("1.3.6.1.4.1.311.20.2.1");
        assert!(policies.is_empty());
        assert!(policies.symmetric_algorithm().is_none());
        assert!(policies.symmetric_key_length().is_none());
    }

    #[test]
    fn test_empty_segments_are_discarded() {
        let policies = RaApplicationPolicies::parse(
            "``msPKI-Symmetric-Key-Length``DWORD```256```",
        );
        assert_eq!(policies.symmetric_key_length(), Some(256));
    }

    #[test]
    fn test_trailing_incomplete_triplet() {
        let policies = RaApplicationPolicies::parse(
            "msPKI-Symmetric-Key-Length`1`128`msPKI-Symmetric-Algorithm`1",
        );
        assert_eq!(policies.fields().len(), 1);
        assert_eq!(policies.symmetric_key_length(), Some(128));
        assert!(policies.symmetric_algorithm().is_none());
    }

    #[test]
    fn test_malformed_values_do_not_stop_scan() {
        let policies = RaApplicationPolicies::parse(
            "msPKI-Symmetric-Key-Length`1`lots`msPKI-Symmetric-Algorithm`1`2..5`msPKI-Symmetric-Algorithm`1`2.16.840.1.101.3.4.1.2`",
        );
        assert_eq!(policies.fields().len(), 3);
        assert!(policies.symmetric_key_length().is_none());
        assert_eq!(
            policies.symmetric_algorithm().unwrap().display_name(),
            "aes128"
        );
    }

    #[test]
    fn test_last_occurrence_wins() {
        let policies = RaApplicationPolicies::parse(
            "msPKI-Symmetric-Key-Length`1`128`msPKI-Symmetric-Key-Length`1`256`msPKI-Symmetric-Key-Length`1`-1",
        );
        assert_eq!(policies.symmetric_key_length(), Some(256));
        assert_eq!(policies.field(SYMMETRIC_KEY_LENGTH_FIELD), Some("-1"));
    }

    #[test]
    fn test_key_length_above_i32_max_ignored() {
        let policies = RaApplicationPolicies::parse(
            "msPKI-Symmetric-Key-Length`DWORD`192`msPKI-Symmetric-Key-Length`DWORD`3000000000`",
        );
        assert_eq!(policies.symmetric_key_length(), Some(192));
    }

    #[test]
    fn test_wide_arc_algorithm_kept() {
        let policies = RaApplicationPolicies::parse(
            "msPKI-Symmetric-Algorithm`PZPWSTR`2.25.329800735698586629295641978511506172918`msPKI-Symmetric-Key-Length`DWORD`256`",
        );
        assert_eq!(
            policies.symmetric_algorithm().unwrap().to_string(),
            "2.25.329800735698586629295641978511506172918"
        );
        assert_eq!(policies.symmetric_key_length(), Some(256));
    }

    #[test]
    fn test_fields_serialize() {
        let policies = RaApplicationPolicies::parse("msPKI-Symmetric-Key-Length`DWORD`128`");
        let json = serde_json::to_value(policies.fields()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "msPKI-Symmetric-Key-Length", "kind": "DWORD", "value": "128"}
            ])
        );
    }

    #[test]
    fn test_unrecognized_fields_only() {
        let policies = RaApplicationPolicies::parse("foo`bar`baz`qux`quux`corge");
        assert_eq!(policies.fields().len(), 2);
        assert!(policies.symmetric_algorithm().is_none());
        assert!(policies.symmetric_key_length().is_none());
    }
}
