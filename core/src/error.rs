/*
 * error.rs
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

//! Errors ending a navigation.

use std::io;

use rustls::{CertificateError, Error as TlsError};
use thiserror::Error;

use crate::protocol::gemini::ParseError;
use crate::tls::{StorageError, TrustError};
use crate::uri::{GeminiUri, UriError};

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Invalid response: {0}")]
    Parse(ParseError),
    #[error(transparent)]
    Io(io::Error),
    #[error("Invalid URI: {0}")]
    Uri(#[from] UriError),
    #[error(transparent)]
    Trust(TrustError),
    #[error("Redirect cycle: {}", join(.visited))]
    RedirectCycle { visited: Vec<GeminiUri> },
    #[error("Too many redirects: {}", join(.visited))]
    TooManyRedirects { visited: Vec<GeminiUri> },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Input cancelled")]
    InputCancelled,
}

fn join(visited: &[GeminiUri]) -> String {
    visited
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl GeminiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GeminiError::Io(e) if e.kind() == io::ErrorKind::TimedOut)
    }
}

impl From<ParseError> for GeminiError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Io(e) => GeminiError::from(e),
            e => GeminiError::Parse(e),
        }
    }
}

impl From<TrustError> for GeminiError {
    fn from(e: TrustError) -> Self {
        GeminiError::Trust(e)
    }
}

/// Trust rejections surface from the handshake as rustls certificate errors wrapped
/// in `io::Error`; those become `Trust`.
impl From<io::Error> for GeminiError {
    fn from(e: io::Error) -> Self {
        match trust_error(&e) {
            Some(trust) => GeminiError::Trust(trust),
            None => GeminiError::Io(e),
        }
    }
}

fn trust_error(e: &io::Error) -> Option<TrustError> {
    let inner = e.get_ref()?;
    if let Some(nested) = inner.downcast_ref::<io::Error>() {
        return trust_error(nested);
    }
    match inner.downcast_ref::<TlsError>()? {
        TlsError::InvalidCertificate(CertificateError::Other(other)) => {
            other.0.downcast_ref::<TrustError>().cloned()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use rustls::OtherError;

    #[test]
    fn trust_rejection_recovered_from_io_error() {
        let rejected = TrustError::Rejected { host: "example.org".into() };
        let tls = TlsError::InvalidCertificate(CertificateError::Other(OtherError(Arc::new(rejected))));
        let e = io::Error::new(io::ErrorKind::InvalidData, tls);
        match GeminiError::from(e) {
            GeminiError::Trust(TrustError::Rejected { host }) => assert_eq!(host, "example.org"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_io_is_io() {
        let e = ParseError::Io(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        let e = GeminiError::from(e);
        assert!(e.is_timeout());
    }

    #[test]
    fn cycle_lists_visited() {
        let visited = vec![
            crate::uri::geminify("a.example").unwrap(),
            crate::uri::geminify("b.example").unwrap(),
        ];
        let e = GeminiError::RedirectCycle { visited };
        assert_eq!(
            e.to_string(),
            "Redirect cycle: gemini://a.example:1965 -> gemini://b.example:1965"
        );
    }
}
