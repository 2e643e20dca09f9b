//! # CryptoPAn
//!
//! Prefix-preserving IP address anonymization for IPv4 and IPv6.
//!
//! Two plaintext addresses share a common binary prefix of length `k` if
//! and only if their anonymized counterparts do. Network traces keep
//! their topological locality while individual identifiers disappear.
//! The construction is the keyed, deterministic, one-bit-at-a-time
//! permutation of Xu, Fan, Ammar and Moon, "Prefix-Preserving IP Address
//! Anonymization: Measurement-based Security Evaluation and a New
//! Cryptography-based Scheme" (ICNP 2002), built from AES-128.
//!
//! # Usage
//! ```rust
//! use cryptopan::{AddressPolicy, CryptoPAn};
//!
//! let key: Vec<u8> = (0u8..32).collect();
//!
//! // 1. Raw engine
//! let engine = CryptoPAn::new(&key)?;
//! assert_eq!(engine.anonymize_str("192.0.2.1")?, "2.90.93.17");
//!
//! // 2. With reserved-range policy (loopback passes through)
//! let policy = AddressPolicy::new(&key)?;
//! assert_eq!(policy.anonymize("127.0.0.1")?, "127.0.0.1");
//! # Ok::<(), cryptopan::CryptoPAnError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

mod engine;
mod policy;
mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use engine::{format_ip, format_ipv6_full, CryptoPAn, KEY_LEN};
pub use policy::{default_no_anonymize, special_purpose_v4, AddressPolicy, SPECIAL_PURPOSE_V4};
pub use types::{CryptoPAnError, IpVersion};
