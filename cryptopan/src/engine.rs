//! CryptoPAn Engine
//!
//! The keyed, deterministic, bit-serial permutation over the IP address
//! space. One AES block encryption per output bit: 32 rounds for IPv4,
//! 128 for IPv6.

use crate::types::{CryptoPAnError, IpVersion};
use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Key material length: 16 bytes AES key followed by 16 bytes padding seed.
pub const KEY_LEN: usize = 32;

// =============================================================================
// ENGINE
// =============================================================================

/// Prefix-preserving address anonymizer.
///
/// Two plaintext addresses sharing a common binary prefix of length `k`
/// map to outputs sharing an anonymized prefix of length `k`, and vice
/// versa. The construction follows Xu, Fan, Ammar and Moon,
/// "Prefix-Preserving IP Address Anonymization" (ICNP 2002).
///
/// The engine is immutable after construction and safe to share.
///
/// # Example
/// ```rust
/// use cryptopan::CryptoPAn;
///
/// let key: Vec<u8> = (0u8..32).collect();
/// let engine = CryptoPAn::new(&key)?;
/// assert_eq!(engine.anonymize_str("192.0.2.1")?, "2.90.93.17");
/// # Ok::<(), cryptopan::CryptoPAnError>(())
/// ```
pub struct CryptoPAn {
    cipher: Aes128,
    /// `AES(key[16..32])` as a big-endian 128-bit integer; completes the
    /// low bits of every per-round block.
    padding: u128,
    /// `masks[l]` keeps the low `128 - l` bits: `u128::MAX >> l`.
    masks: [u128; 128],
}

impl CryptoPAn {
    /// Builds an engine from 32 bytes of key material.
    ///
    /// The first 16 bytes key the AES-128 block cipher; the latter 16 are
    /// encrypted once to form the padding value.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoPAnError::InvalidKeyLength`] unless `key` is
    /// exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoPAnError> {
        if key.len() != KEY_LEN {
            return Err(CryptoPAnError::InvalidKeyLength(key.len()));
        }

        let cipher = Aes128::new(GenericArray::from_slice(&key[..16]));

        let mut block = GenericArray::clone_from_slice(&key[16..]);
        cipher.encrypt_block(&mut block);
        let padding = block.iter().fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte));

        let mut masks = [0u128; 128];
        for (l, mask) in masks.iter_mut().enumerate() {
            *mask = u128::MAX >> l;
        }

        Ok(Self { cipher, padding, masks })
    }

    /// Anonymizes the integer form of an address.
    ///
    /// `addr` must lie in `[0, 2^32)` for [`IpVersion::V4`]; the result is
    /// in the same range. IPv6 uses the full 128-bit space.
    #[must_use]
    pub fn anonymize_int(&self, addr: u128, version: IpVersion) -> u128 {
        let (pos_max, ext) = match version {
            IpVersion::V4 => (32, addr << 96),
            IpVersion::V6 => (128, addr),
        };

        // One keystream bit per round: encrypt the top `pos` plaintext bits
        // completed with the keyed padding, keep the MSB of the ciphertext.
        let mut result: u128 = 0;
        for pos in 0..pos_max {
            let mask = self.masks[pos];
            let padded = (ext & !mask) | (self.padding & mask);
            let mut block = GenericArray::from(padded.to_be_bytes());
            self.cipher.encrypt_block(&mut block);
            result |= u128::from(block[0] >> 7) << (127 - pos);
        }

        match version {
            IpVersion::V4 => addr ^ (result >> 96),
            IpVersion::V6 => addr ^ result,
        }
    }

    /// Anonymizes a parsed address, preserving its version.
    #[must_use]
    pub fn anonymize(&self, addr: IpAddr) -> IpAddr {
        match addr {
            IpAddr::V4(v4) => {
                let anon = self.anonymize_int(u128::from(u32::from(v4)), IpVersion::V4);
                IpAddr::V4(Ipv4Addr::from(truncate_v4(anon)))
            }
            IpAddr::V6(v6) => {
                let anon = self.anonymize_int(u128::from(v6), IpVersion::V6);
                IpAddr::V6(Ipv6Addr::from(anon))
            }
        }
    }

    /// Anonymizes a textual address and formats the result canonically:
    /// dotted-quad for IPv4, eight uncompressed lowercase hex groups for
    /// IPv6 (see [`format_ipv6_full`]).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoPAnError::AddressValue`] when `addr` is not a valid
    /// IPv4 or IPv6 literal.
    pub fn anonymize_str(&self, addr: &str) -> Result<String, CryptoPAnError> {
        let ip: IpAddr = addr.parse()?;
        Ok(format_ip(self.anonymize(ip)))
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Formats an IPv6 address as eight lowercase hex groups without leading
/// zeros and without `::` compression, e.g. `0:0:0:0:0:0:0:1`.
///
/// Not RFC 5952: every group is present, none is elided.
#[must_use]
pub fn format_ipv6_full(addr: Ipv6Addr) -> String {
    let s = addr.segments();
    format!(
        "{:x}:{:x}:{:x}:{:x}:{:x}:{:x}:{:x}:{:x}",
        s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]
    )
}

/// Canonical output form for an anonymized address.
#[must_use]
pub fn format_ip(addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format_ipv6_full(v6),
    }
}

/// Masks a promoted anonymization result back down to 32 bits.
#[allow(clippy::cast_possible_truncation)] // high 96 bits are shifted out
const fn truncate_v4(anon: u128) -> u32 {
    (anon & 0xffff_ffff) as u32
}
