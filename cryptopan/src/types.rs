//! Shared types used across the CryptoPAn library.

use core::fmt;
use ipnet::IpNet;
use std::error;
use std::net::{AddrParseError, IpAddr};

// =============================================================================
// ADDRESS VERSION
// =============================================================================

/// IP version tag carried alongside the 128-bit integer form of an address.
///
/// IPv4 addresses occupy the high 32 bits of the 128-bit space
/// (`addr << 96`); IPv6 addresses occupy all 128 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    /// 32-bit IPv4 address.
    V4,
    /// 128-bit IPv6 address.
    V6,
}

impl IpVersion {
    /// Width of an address of this version, in bits.
    #[must_use]
    pub const fn bit_width(self) -> u32 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced by engine construction, address parsing, and the
/// reserved-range policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoPAnError {
    /// The key material is not exactly 32 bytes (16 cipher + 16 padding).
    InvalidKeyLength(usize),
    /// A string was not a valid IPv4 or IPv6 literal.
    AddressValue(AddrParseError),
    /// An anonymized address fell back into a reserved range.
    ///
    /// Returning such an address would let a later pass treat it as
    /// reserved and pass it through, breaking prefix preservation
    /// downstream. The only sound recovery is a different key.
    CollisionWithReserved {
        /// The plaintext address that was anonymized.
        original: IpAddr,
        /// The anonymized output that landed in a reserved range.
        anonymized: IpAddr,
        /// The reserved range that was hit.
        network: IpNet,
    },
}

impl fmt::Display for CryptoPAnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength(len) => {
                write!(f, "invalid key length: expected 32 bytes, found {len}")
            }
            Self::AddressValue(err) => write!(f, "invalid IP address literal: {err}"),
            Self::CollisionWithReserved { original, anonymized, network } => write!(
                f,
                "anonymized form {anonymized} of {original} falls into reserved \
                 range {network}; re-run with a different key"
            ),
        }
    }
}

impl error::Error for CryptoPAnError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::AddressValue(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AddrParseError> for CryptoPAnError {
    fn from(err: AddrParseError) -> Self {
        Self::AddressValue(err)
    }
}
