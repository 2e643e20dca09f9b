//! Scrub Command
//!
//! Single-pass line rewriter: IPv6 tokens first, then IPv4, then MAC
//! redaction. Stdout carries the rewritten stream; everything else goes
//! to stderr.

use anyhow::{Context, Result};
use cryptopan::AddressPolicy;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Fixed replacement for every MAC address literal.
pub const MAC_REDACTED: &str = "XX:XX:XX:XX:XX:XX";

// =============================================================================
// TOKEN SCANNER
// =============================================================================

/// Dotted-quad IPv4: four decimal octets, each 0-255.
const IPV4_PATTERN: &str =
    r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

/// IPv6 literals: full form, `::`-compressed forms, link-local with zone
/// index, and embedded dotted-quads. Branch order matters: the scanner
/// takes the first alternative that matches at a position, so longer
/// forms come first.
const IPV6_PATTERN: &str = r"(?x)
    (?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}              # 1:2:3:4:5:6:7:8
  | fe80:(?::[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]+          # fe80::7:8%eth0
  | ::(?:ffff(?::0{1,4})?:)?
    (?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])                  # ::ffff:255.255.255.255
  | (?:[0-9a-fA-F]{1,4}:){1,4}:
    (?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])                  # 64:ff9b::192.0.2.33
  | [0-9a-fA-F]{1,4}:(?::[0-9a-fA-F]{1,4}){1,6}           # 1::3:4:5:6:7:8
  | (?:[0-9a-fA-F]{1,4}:){1,2}(?::[0-9a-fA-F]{1,4}){1,5}  # 1:2::4:5:6:7:8
  | (?:[0-9a-fA-F]{1,4}:){1,3}(?::[0-9a-fA-F]{1,4}){1,4}  # 1:2:3::5:6:7:8
  | (?:[0-9a-fA-F]{1,4}:){1,4}(?::[0-9a-fA-F]{1,4}){1,3}  # 1:2:3:4::6:7:8
  | (?:[0-9a-fA-F]{1,4}:){1,5}(?::[0-9a-fA-F]{1,4}){1,2}  # 1:2:3:4:5::7:8
  | (?:[0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}           # 1:2:3:4:5:6::8
  | (?:[0-9a-fA-F]{1,4}:){1,7}:                           # 1:2:3:4:5:6:7::
  | :(?:(?::[0-9a-fA-F]{1,4}){1,7}|:)                     # ::2:3:4:5:6:7:8 and ::
";

/// Six hex pairs with optional colons, whitespace-delimited on both
/// sides. The trailing delimiter is re-scanned (see [`Scanner::mac_tokens`])
/// so back-to-back MACs one space apart all match.
const MAC_PATTERN: &str = r"\s((?:[0-9a-fA-F]{2}:?){6})\s";

/// Compiled token grammars. Built once per run.
pub struct Scanner {
    ipv6: Regex,
    ipv4: Regex,
    mac: Regex,
}

impl Scanner {
    /// Compiles the three token grammars.
    pub fn new() -> Result<Self> {
        Ok(Self {
            ipv6: Regex::new(IPV6_PATTERN).context("IPv6 grammar failed to compile")?,
            ipv4: Regex::new(IPV4_PATTERN).context("IPv4 grammar failed to compile")?,
            mac: Regex::new(MAC_PATTERN).context("MAC grammar failed to compile")?,
        })
    }

    fn ipv6_tokens(&self, line: &str) -> Vec<String> {
        self.ipv6.find_iter(line).map(|m| m.as_str().to_owned()).collect()
    }

    fn ipv4_tokens(&self, line: &str) -> Vec<String> {
        self.ipv4.find_iter(line).map(|m| m.as_str().to_owned()).collect()
    }

    /// MAC matches consume their trailing delimiter, so the next scan
    /// restarts on it: `" aa:..:ff 00:..:55 "` yields both literals.
    fn mac_tokens(&self, line: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut at = 0;
        while let Some(caps) = self.mac.captures_at(line, at) {
            let Some(mac) = caps.get(1) else { break };
            tokens.push(mac.as_str().to_owned());
            at = mac.end();
        }
        tokens
    }
}

// =============================================================================
// LINE REWRITING
// =============================================================================

/// Rewrites one line: every IPv6 token, then every IPv4 token, is
/// anonymized under the policy; every MAC literal becomes
/// [`MAC_REDACTED`]. Each match replaces the first occurrence of its
/// literal in the current line, so repeated literals are consumed
/// left-to-right.
///
/// A `%zone` suffix on a link-local token is stripped before
/// anonymization and not re-attached.
pub fn scrub_line(line: &str, scanner: &Scanner, policy: &AddressPolicy) -> Result<String> {
    let mut line = line.to_owned();

    for token in scanner.ipv6_tokens(&line) {
        let bare = token.split_once('%').map_or(token.as_str(), |(addr, _zone)| addr);
        let anonymized = policy.anonymize(bare)?;
        line = line.replacen(&token, &anonymized, 1);
    }
    for token in scanner.ipv4_tokens(&line) {
        let anonymized = policy.anonymize(&token)?;
        line = line.replacen(&token, &anonymized, 1);
    }
    for mac in scanner.mac_tokens(&line) {
        line = line.replacen(&mac, MAC_REDACTED, 1);
    }

    Ok(line)
}

/// Rewrites a whole stream line-by-line, preserving line order and each
/// line's original trailing newline.
pub fn scrub_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    scanner: &Scanner,
    policy: &AddressPolicy,
) -> Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line.as_str(), ""),
        };
        let scrubbed = scrub_line(body, scanner, policy)?;
        write!(writer, "{scrubbed}{newline}")?;
    }
    Ok(())
}

/// Rewrites `path` to stdout.
pub fn scrub_file(path: &Path, policy: &AddressPolicy) -> Result<()> {
    let scanner = Scanner::new()?;
    eprintln!("reading {}", path.display());
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let stdout = io::stdout();
    scrub_stream(BufReader::new(file), stdout.lock(), &scanner, policy)
}

// =============================================================================
// TESTS
// =============================================================================
