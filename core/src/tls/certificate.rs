/*
 * certificate.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Gemlet, a Gemini protocol client.
 *
 * Gemlet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Gemlet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Gemlet.  If not, see <http://www.gnu.org/licenses/>.
 */

//! The parts of an X.509 server certificate the trust decision looks at.

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use sha2::{Digest, Sha256};
use x509_parser::extensions::GeneralName;
use x509_parser::parse_x509_certificate;

use super::tofu::TrustError;

/// Validity period check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Expired,
    NotYetValid,
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Validity::Valid => "VALID",
            Validity::Expired => "EXPIRED",
            Validity::NotYetValid => "NOT_YET_VALID",
        })
    }
}

#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    /// Seconds since the Unix epoch.
    pub not_before: i64,
    pub not_after: i64,
    /// Subject CN plus DNS and IP subject alternative names.
    pub names: BTreeSet<String>,
    /// DER SubjectPublicKeyInfo.
    pub public_key: Vec<u8>,
    /// SHA-256 of the whole certificate, colon-separated hex.
    pub fingerprint: String,
}

impl CertificateInfo {
    pub fn parse(der: &[u8]) -> Result<Self, TrustError> {
        let (_, cert) = parse_x509_certificate(der).map_err(|e| TrustError::Malformed(e.to_string()))?;
        let mut names = BTreeSet::new();
        if let Some(cn) = cert.subject().iter_common_name().next() {
            if let Ok(cn) = cn.as_str() {
                names.insert(cn.to_string());
            }
        }
        let san = cert
            .subject_alternative_name()
            .map_err(|e| TrustError::Malformed(e.to_string()))?;
        if let Some(san) = san {
            for name in &san.value.general_names {
                match name {
                    GeneralName::DNSName(dns) => {
                        names.insert(dns.to_string());
                    }
                    GeneralName::IPAddress(bytes) => {
                        if let Some(ip) = ip_from_bytes(bytes) {
                            names.insert(ip.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.raw_serial_as_string(),
            not_before: cert.validity().not_before.timestamp(),
            not_after: cert.validity().not_after.timestamp(),
            names,
            public_key: cert.public_key().raw.to_vec(),
            fingerprint: fingerprint(der),
        })
    }

    pub fn validity_at(&self, now: i64) -> Validity {
        if now < self.not_before {
            Validity::NotYetValid
        } else if now > self.not_after {
            Validity::Expired
        } else {
            Validity::Valid
        }
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.names.iter().any(|name| name_matches(name, host))
    }

    /// Multi-line description shown when the user asks to see the certificate.
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        format!(
            "Subject:     {}\nIssuer:      {}\nSerial:      {}\nNot before:  {}\nNot after:   {}\nNames:       {}\nSHA-256:     {}",
            self.subject,
            self.issuer,
            self.serial,
            format_time(self.not_before),
            format_time(self.not_after),
            names.join(", "),
            self.fingerprint,
        )
    }
}

/// `*.example.org` matches any host ending in `.example.org`; other names must equal
/// the host. Both comparisons ignore ASCII case.
pub fn name_matches(name: &str, host: &str) -> bool {
    match name.strip_prefix('*') {
        Some(suffix) => {
            host.len() >= suffix.len()
                && host.is_char_boundary(host.len() - suffix.len())
                && host[host.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
        }
        None => name.eq_ignore_ascii_case(host),
    }
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

fn fingerprint(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    digest
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn format_time(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_names() {
        assert!(name_matches("*.example.org", "a.example.org"));
        assert!(name_matches("*.example.org", "A.EXAMPLE.ORG"));
        assert!(name_matches("*.example.org", "deep.a.example.org"));
        assert!(!name_matches("*.example.org", "example.org"));
        assert!(!name_matches("*.example.org", "org"));
    }

    #[test]
    fn exact_names() {
        assert!(name_matches("Example.org", "example.ORG"));
        assert!(!name_matches("example.org", "www.example.org"));
    }

    #[test]
    fn validity_period() {
        let info = CertificateInfo {
            subject: String::new(),
            issuer: String::new(),
            serial: String::new(),
            not_before: 100,
            not_after: 200,
            names: BTreeSet::new(),
            public_key: Vec::new(),
            fingerprint: String::new(),
        };
        assert_eq!(info.validity_at(50), Validity::NotYetValid);
        assert_eq!(info.validity_at(150), Validity::Valid);
        assert_eq!(info.validity_at(250), Validity::Expired);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(CertificateInfo::parse(b"not a certificate"), Err(TrustError::Malformed(_))));
    }
}
