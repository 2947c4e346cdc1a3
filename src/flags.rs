// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Template private key flags.
//!
//! The `msPKI-Private-Key-Flag` attribute (and the `PrivateKeyFlags` property
//! of an enrollment policy template) is a 32-bit mask. Directory services and
//! some COM hosts report it as a signed value; the bit pattern is the same
//! either way, so it is stored here as `u32`.
//!
//! | Flag | Value |
//! |------|-------|
//! | Require key archival | `0x0000_0001` |
//! | Exportable key | `0x0000_0010` |
//! | Strong key protection | `0x0000_0020` |
//! | Require alternate signature algorithm | `0x0000_0040` |
//! | Require same key renewal | `0x0000_0080` |
//! | Use legacy provider | `0x0000_0100` |
//! | EK trust on use | `0x0000_0200` |
//! | EK validate certificate | `0x0000_0400` |
//! | EK validate key | `0x0000_0800` |
//! | Attestation preferred | `0x0000_1000` |
//! | Attestation required | `0x0000_2000` |
//! | Attestation without policy | `0x0000_4000` |
//! | Hello logon key | `0x0020_0000` |

use std::fmt;

/// Private key flags of a certificate template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrivateKeyFlags(u32);

impl PrivateKeyFlags {
    /// The private key must be archived with the CA.
    pub const REQUIRE_KEY_ARCHIVAL: Self = Self(0x0000_0001);
    /// The private key may be exported.
    pub const EXPORTABLE_KEY: Self = Self(0x0000_0010);
    /// The user is prompted on every private key use.
    pub const STRONG_KEY_PROTECTION: Self = Self(0x0000_0020);
    /// Requests must be signed with an alternate (PKCS #1 v2.1) signature format.
    pub const REQUIRE_ALTERNATE_SIGNATURE_ALGORITHM: Self = Self(0x0000_0040);
    /// Renewal must reuse the existing key.
    pub const REQUIRE_SAME_KEY_RENEWAL: Self = Self(0x0000_0080);
    /// A legacy CSP must be used.
    pub const USE_LEGACY_PROVIDER: Self = Self(0x0000_0100);
    /// Endorsement key is trusted on first use.
    pub const EK_TRUST_ON_USE: Self = Self(0x0000_0200);
    /// Endorsement key certificate must chain to a trusted root.
    pub const EK_VALIDATE_CERT: Self = Self(0x0000_0400);
    /// Endorsement key must be on the CA's allow list.
    pub const EK_VALIDATE_KEY: Self = Self(0x0000_0800);
    /// Key attestation is used when the client supports it.
    pub const ATTEST_PREFERRED: Self = Self(0x0000_1000);
    /// Key attestation is mandatory.
    pub const ATTEST_REQUIRED: Self = Self(0x0000_2000);
    /// Attestation does not add an issuance policy.
    pub const ATTESTATION_WITHOUT_POLICY: Self = Self(0x0000_4000);
    /// Key is a Windows Hello logon key.
    pub const HELLO_LOGON_KEY: Self = Self(0x0020_0000);

    /// Create flags from an unsigned mask.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Create flags from a signed mask, keeping the bit pattern.
    pub const fn from_signed(bits: i32) -> Self {
        Self(bits as u32)
    }

    /// Get the raw mask.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether every bit of `other` is set.
    pub const fn contains(&self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Check whether the template requires private key archival.
    pub const fn requires_key_archival(&self) -> bool {
        self.contains(Self::REQUIRE_KEY_ARCHIVAL)
    }

    /// Names of the documented flags that are set, in bit order.
    pub fn iter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        FLAG_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

static FLAG_NAMES: [(PrivateKeyFlags, &str); 13] = [
    (PrivateKeyFlags::REQUIRE_KEY_ARCHIVAL, "RequireKeyArchival"),
    (PrivateKeyFlags::EXPORTABLE_KEY, "ExportableKey"),
    (PrivateKeyFlags::STRONG_KEY_PROTECTION, "StrongKeyProtection"),
    (
        PrivateKeyFlags::REQUIRE_ALTERNATE_SIGNATURE_ALGORITHM,
        "RequireAlternateSignatureAlgorithm",
    ),
    (PrivateKeyFlags::REQUIRE_SAME_KEY_RENEWAL, "RequireSameKeyRenewal"),
    (PrivateKeyFlags::USE_LEGACY_PROVIDER, "UseLegacyProvider"),
    (PrivateKeyFlags::EK_TRUST_ON_USE, "EKTrustOnUse"),
    (PrivateKeyFlags::EK_VALIDATE_CERT, "EKValidateCert"),
    (PrivateKeyFlags::EK_VALIDATE_KEY, "EKValidateKey"),
    (PrivateKeyFlags::ATTEST_PREFERRED, "AttestPreferred"),
    (PrivateKeyFlags::ATTEST_REQUIRED, "AttestRequired"),
    (PrivateKeyFlags::ATTESTATION_WITHOUT_POLICY, "AttestationWithoutPolicy"),
    (PrivateKeyFlags::HELLO_LOGON_KEY, "HelloLogonKey"),
];

impl From<u32> for PrivateKeyFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl From<i32> for PrivateKeyFlags {
    fn from(bits: i32) -> Self {
        Self::from_signed(bits)
    }
}

impl std::ops::BitOr for PrivateKeyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for PrivateKeyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().collect();
        if names.is_empty() {
            write!(f, "0x{:08X}", self.0)
        } else {
            write!(f, "0x{:08X} ({})", self.0, names.join(", "))
        }
    }
}
