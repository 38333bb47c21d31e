/*
 * tofu.rs
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

//! Trust-on-first-use server certificate verification.
//!
//! Gemini servers mostly use self-signed certificates, so no CA chain is built. The
//! leaf is compared with the certificate pinned for the host; anything other than a
//! valid, matching, unchanged certificate goes to the user.

use std::fmt;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{self, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, Error as TlsError, OtherError, SignatureScheme};
use thiserror::Error;

use super::certificate::{CertificateInfo, Validity};
use super::store::CertificateStore;
use crate::interaction::{prompt_until, Answer, UserInteraction};

#[derive(Debug, Clone, Error)]
pub enum TrustError {
    #[error("Server did not present a certificate")]
    NoCertificate,
    #[error("Malformed server certificate: {0}")]
    Malformed(String),
    #[error("Server certificate was not accepted for {host}")]
    Rejected { host: String },
    #[error("Unable to pin certificate: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Accept,
    Reject,
    Show,
}

impl Choice {
    fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "1" | "y" | "yes" => Some(Choice::Accept),
            "2" | "n" | "no" => Some(Choice::Reject),
            "3" | "s" | "show" => Some(Choice::Show),
            _ => None,
        }
    }
}

/// Decides whether a server certificate is trusted, consulting the store and the user.
pub struct TofuTrustManager {
    store: Arc<dyn CertificateStore>,
    ui: Arc<dyn UserInteraction>,
}

impl fmt::Debug for TofuTrustManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TofuTrustManager").finish_non_exhaustive()
    }
}

impl TofuTrustManager {
    pub fn new(store: Arc<dyn CertificateStore>, ui: Arc<dyn UserInteraction>) -> Self {
        Self { store, ui }
    }

    pub fn store(&self) -> &Arc<dyn CertificateStore> {
        &self.store
    }

    /// Check the chain presented by `host` at `now` (seconds since the Unix epoch).
    /// Only the leaf (first entry) is considered.
    pub fn check_server(&self, host: &str, chain: &[CertificateDer<'_>], now: i64) -> Result<(), TrustError> {
        let leaf = chain.first().ok_or(TrustError::NoCertificate)?;
        let info = CertificateInfo::parse(leaf.as_ref())?;
        let validity = info.validity_at(now);
        let host_matches = info.matches_host(host);
        let pinned = self
            .store
            .load(host)
            .map_err(|e| TrustError::Storage(e.to_string()))?;

        let mut warnings = Vec::new();
        match &pinned {
            Some(pinned) => {
                let unchanged = CertificateInfo::parse(pinned.as_ref())
                    .map(|p| p.public_key == info.public_key)
                    .unwrap_or(false);
                if unchanged && validity == Validity::Valid && host_matches {
                    tracing::debug!(host, "pinned certificate matches");
                    return Ok(());
                }
                if !unchanged {
                    warnings.push("TLS certificate for this host has been changed!".to_string());
                }
            }
            None => warnings.push("First time accessing this host.".to_string()),
        }
        if !host_matches {
            let names: Vec<&str> = info.names.iter().map(String::as_str).collect();
            warnings.push(format!(
                "Host {} presented a certificate issued for:\n  {}",
                host,
                names.join("\n  ")
            ));
        }
        if validity != Validity::Valid {
            warnings.push(format!("Certificate expiration status is {}", validity));
        }
        for warning in &warnings {
            tracing::warn!(host, "{}", warning);
            self.ui.show_message(&format!("WARNING: {}", warning));
        }

        if self.ask(host, &info) {
            self.store
                .store(host, leaf)
                .map_err(|e| TrustError::Storage(e.to_string()))?;
            tracing::info!(host, fingerprint = %info.fingerprint, "accepted server certificate");
            Ok(())
        } else {
            tracing::info!(host, "rejected server certificate");
            Err(TrustError::Rejected { host: host.to_string() })
        }
    }

    fn ask(&self, host: &str, info: &CertificateInfo) -> bool {
        let ui = self.ui.as_ref();
        let message = format!(
            "Do you want to accept the certificate for host '{}'?\n(1) Yes\n(2) No\n(3) Show Certificate",
            host
        );
        let choice = prompt_until(ui, &message, false, |answer| match Choice::parse(answer) {
            Some(Choice::Show) => {
                ui.show_message(&info.describe());
                Answer::Reprompt
            }
            Some(choice) => Answer::Accept(choice),
            None => {
                ui.show_message("Please enter a valid option.");
                Answer::Reprompt
            }
        });
        choice == Some(Choice::Accept)
    }
}

/// Host name as the trust store keys it.
pub fn host_name(server_name: &ServerName<'_>) -> String {
    match server_name {
        ServerName::DnsName(name) => name.as_ref().to_string(),
        ServerName::IpAddress(ip) => std::net::IpAddr::from(*ip).to_string(),
        other => format!("{:?}", other),
    }
}

/// rustls hook running the trust manager inside the handshake.
#[derive(Debug)]
pub struct TofuVerifier {
    manager: Arc<TofuTrustManager>,
    provider: Arc<CryptoProvider>,
}

impl TofuVerifier {
    pub fn new(manager: Arc<TofuTrustManager>) -> Self {
        let provider = CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(crypto::aws_lc_rs::default_provider()));
        Self { manager, provider }
    }

    pub fn with_provider(manager: Arc<TofuTrustManager>, provider: Arc<CryptoProvider>) -> Self {
        Self { manager, provider }
    }
}

impl ServerCertVerifier for TofuVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        let host = host_name(server_name);
        let mut chain = Vec::with_capacity(1 + intermediates.len());
        chain.push(end_entity.clone());
        chain.extend(intermediates.iter().cloned());
        self.manager
            .check_server(&host, &chain, now.as_secs() as i64)
            .map(|()| ServerCertVerified::assertion())
            .map_err(|e| TlsError::InvalidCertificate(CertificateError::Other(OtherError(Arc::new(e)))))
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        crypto::verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        crypto::verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}
