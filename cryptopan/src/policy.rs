//! Reserved-Range Policy
//!
//! Decides per address whether to pass it through untouched, anonymize
//! only its host bits, or anonymize it fully, and flags accidental
//! collisions with reserved ranges.

use crate::engine::{format_ip, CryptoPAn};
use crate::types::CryptoPAnError;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// =============================================================================
// DEFAULT RANGES
// =============================================================================

/// IPv4 special-purpose ranges commonly kept prefix-stable in sanitized
/// traces: private blocks, documentation, protocol-assignment and
/// multicast space.
pub const SPECIAL_PURPOSE_V4: &[&str] = &[
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.0.0.0/24",
    "192.0.2.0/24",
    "192.168.0.0/16",
    "224.0.0.0/4",
];

/// Parses [`SPECIAL_PURPOSE_V4`] into networks, for use as a
/// `preserve_prefix` list.
#[must_use]
#[allow(clippy::expect_used)] // entries are static, valid CIDR literals
pub fn special_purpose_v4() -> Vec<IpNet> {
    SPECIAL_PURPOSE_V4
        .iter()
        .map(|s| s.parse().expect("static CIDR literal"))
        .collect()
}

/// Default `no_anonymize` list: IPv4 loopback and the IPv6 unspecified
/// address.
#[must_use]
#[allow(clippy::expect_used)] // prefix lengths are static and in range
pub fn default_no_anonymize() -> Vec<IpNet> {
    vec![
        IpNet::V4(Ipv4Net::new(Ipv4Addr::new(127, 0, 0, 0), 8).expect("valid prefix length")),
        IpNet::V6(Ipv6Net::new(Ipv6Addr::UNSPECIFIED, 128).expect("valid prefix length")),
    ]
}

// =============================================================================
// POLICY
// =============================================================================

/// A [`CryptoPAn`] engine wrapped with reserved-range handling.
///
/// Two ordered CIDR lists drive the decision, tested in order with
/// first-match-wins semantics and entries of the wrong IP version
/// ignored:
///
/// - `no_anonymize`: addresses passed through verbatim.
/// - `preserve_prefix`: only host bits are anonymized; the network
///   prefix survives.
///
/// After the transform, output that lands in a `no_anonymize` range, or
/// in a `preserve_prefix` range other than the input's, is reported as
/// [`CryptoPAnError::CollisionWithReserved`] rather than returned.
pub struct AddressPolicy {
    engine: CryptoPAn,
    no_anonymize: Vec<IpNet>,
    preserve_prefix: Vec<IpNet>,
}

impl AddressPolicy {
    /// Builds a policy with the default `no_anonymize` list (IPv4
    /// loopback, IPv6 unspecified) and no `preserve_prefix` ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoPAnError::InvalidKeyLength`] unless `key` is
    /// exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoPAnError> {
        Self::with_networks(key, default_no_anonymize(), Vec::new())
    }

    /// Builds a policy with explicit range lists.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoPAnError::InvalidKeyLength`] unless `key` is
    /// exactly 32 bytes.
    pub fn with_networks(
        key: &[u8],
        no_anonymize: Vec<IpNet>,
        preserve_prefix: Vec<IpNet>,
    ) -> Result<Self, CryptoPAnError> {
        Ok(Self { engine: CryptoPAn::new(key)?, no_anonymize, preserve_prefix })
    }

    /// The wrapped engine.
    #[must_use]
    pub const fn engine(&self) -> &CryptoPAn {
        &self.engine
    }

    /// Anonymizes a parsed address under the policy.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoPAnError::CollisionWithReserved`] when the
    /// anonymized output falls into a reserved range (see the type-level
    /// docs).
    pub fn anonymize_ip(&self, addr: IpAddr) -> Result<IpAddr, CryptoPAnError> {
        if first_match(&self.no_anonymize, &addr).is_some() {
            return Ok(addr);
        }

        let input_net = first_match(&self.preserve_prefix, &addr);
        let anonymized = self.engine.anonymize(addr);

        if let Some(network) = first_match(&self.no_anonymize, &anonymized) {
            return Err(CryptoPAnError::CollisionWithReserved {
                original: addr,
                anonymized,
                network: *network,
            });
        }
        if let Some(network) = first_match(&self.preserve_prefix, &anonymized) {
            if input_net != Some(network) {
                return Err(CryptoPAnError::CollisionWithReserved {
                    original: addr,
                    anonymized,
                    network: *network,
                });
            }
        }

        Ok(match input_net {
            Some(net) => overwrite_prefix(anonymized, net),
            None => anonymized,
        })
    }

    /// Anonymizes a textual address under the policy.
    ///
    /// Addresses matching `no_anonymize` are returned as the input string,
    /// untouched; anonymized output is formatted canonically (dotted-quad,
    /// or eight uncompressed hex groups).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoPAnError::AddressValue`] on an unparseable literal
    /// and [`CryptoPAnError::CollisionWithReserved`] as described for
    /// [`Self::anonymize_ip`].
    pub fn anonymize(&self, addr: &str) -> Result<String, CryptoPAnError> {
        let ip: IpAddr = addr.parse()?;
        if first_match(&self.no_anonymize, &ip).is_some() {
            return Ok(addr.to_owned());
        }
        Ok(format_ip(self.anonymize_ip(ip)?))
    }
}

// =============================================================================
// RANGE HELPERS
// =============================================================================

/// First list entry containing `addr`; entries of the other IP version
/// never match.
fn first_match<'a>(nets: &'a [IpNet], addr: &IpAddr) -> Option<&'a IpNet> {
    nets.iter().find(|net| net.contains(addr))
}

/// Overwrites the top `prefix_len` bits of `anon` with `net`'s network
/// bits; host bits of `anon` survive.
fn overwrite_prefix(anon: IpAddr, net: &IpNet) -> IpAddr {
    match (anon, net) {
        (IpAddr::V4(a), IpNet::V4(n)) => {
            let host = u32::from(a) & u32::from(n.hostmask());
            IpAddr::V4(Ipv4Addr::from(u32::from(n.network()) | host))
        }
        (IpAddr::V6(a), IpNet::V6(n)) => {
            let host = u128::from(a) & u128::from(n.hostmask());
            IpAddr::V6(Ipv6Addr::from(u128::from(n.network()) | host))
        }
        // A range only reaches here by containing the same-version input.
        _ => anon,
    }
}
