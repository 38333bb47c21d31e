/*
 * uri.rs
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

//! Gemini URIs: normalization of user input, query answers and link resolution.
//! Normalized URIs always read `gemini://host:port` followed by the raw path, query and
//! fragment (percent-encoding is kept as received, never decoded).

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

pub const GEMINI_SCHEME: &str = "gemini";
pub const DEFAULT_PORT: u16 = 1965;

/// `&` already encoded, used to join a new answer to an existing query.
const ENCODED_AMPERSAND: &str = "%26";

/// Query answers: encode everything except RFC 3986 unreserved characters.
const QUERY_ANSWER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("Scheme must be gemini but was: {0}")]
    UnsupportedScheme(String),
    #[error("URI must not contain userInfo component: {0}")]
    UserInfo(String),
    #[error("URI has no host: {0}")]
    MissingHost(String),
    #[error("invalid port in URI: {0}")]
    InvalidPort(String),
    #[error("illegal character in URI: {0:?}")]
    IllegalCharacter(String),
}

/// A normalized `gemini://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeminiUri {
    host: String,
    port: u16,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl GeminiUri {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// `host:port`, with brackets around IPv6 literals.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The request line sent to the server: the URI without its fragment, then CRLF.
    pub fn request_line(&self) -> String {
        let mut line = format!("{}://{}{}", GEMINI_SCHEME, self.authority(), self.path);
        if let Some(q) = &self.query {
            line.push('?');
            line.push_str(q);
        }
        line.push_str("\r\n");
        line
    }

    /// Parse an absolute `gemini://` URI.
    fn parse_absolute(uri: &str) -> Result<GeminiUri, UriError> {
        if uri.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UriError::IllegalCharacter(uri.to_string()));
        }
        let rest = match split_scheme(uri) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(GEMINI_SCHEME) => rest,
            Some((scheme, _)) => return Err(UriError::UnsupportedScheme(scheme.to_string())),
            None => return Err(UriError::UnsupportedScheme(String::new())),
        };
        let (rest, fragment) = match rest.split_once('#') {
            Some((r, f)) => (r, Some(f.to_string())),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((r, q)) => (r, Some(q.to_string())),
            None => (rest, None),
        };
        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        if authority.contains('@') {
            return Err(UriError::UserInfo(uri.to_string()));
        }
        let (host, port) = split_host_port(authority, uri)?;
        if host.is_empty() {
            return Err(UriError::MissingHost(uri.to_string()));
        }
        Ok(GeminiUri {
            host: host.to_ascii_lowercase(),
            port,
            path: path.to_string(),
            query,
            fragment,
        })
    }
}

/// `scheme://rest` where scheme is ASCII letters only.
fn split_scheme(text: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = text.split_once("://")?;
    if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) {
        Some((scheme, rest))
    } else {
        None
    }
}

fn split_host_port<'a>(authority: &'a str, uri: &str) -> Result<(&'a str, u16), UriError> {
    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| UriError::MissingHost(uri.to_string()))?;
        match after {
            "" => (host, None),
            _ => match after.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return Err(UriError::InvalidPort(uri.to_string())),
            },
        }
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };
    let port = match port {
        None | Some("") => DEFAULT_PORT,
        Some(p) => p.parse::<u16>().map_err(|_| UriError::InvalidPort(uri.to_string()))?,
    };
    Ok((host, port))
}

impl fmt::Display for GeminiUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", GEMINI_SCHEME, self.authority(), self.path)?;
        if let Some(q) = &self.query {
            write!(f, "?{}", q)?;
        }
        if let Some(frag) = &self.fragment {
            write!(f, "#{}", frag)?;
        }
        Ok(())
    }
}

impl FromStr for GeminiUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        geminify(s)
    }
}

/// Normalize user input: `scheme://...` must be gemini; anything else gets `gemini://`
/// prepended. The port defaults to 1965.
pub fn geminify(text: &str) -> Result<GeminiUri, UriError> {
    let text = text.trim();
    match split_scheme(text) {
        Some(_) => GeminiUri::parse_absolute(text),
        None => GeminiUri::parse_absolute(&format!("{}://{}", GEMINI_SCHEME, text)),
    }
}

/// Add a user's answer to an Input prompt as the query. The answer is percent-encoded;
/// an existing query is kept and joined with an encoded `&`.
pub fn append_query(uri: &GeminiUri, answer: &str) -> GeminiUri {
    let encoded = utf8_percent_encode(answer, QUERY_ANSWER).to_string();
    let query = match uri.query.as_deref() {
        Some(q) if !q.is_empty() => format!("{}{}{}", q, ENCODED_AMPERSAND, encoded),
        _ => encoded,
    };
    GeminiUri {
        query: Some(query),
        ..uri.clone()
    }
}

/// Where a GemText link points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Gemini(GeminiUri),
    /// A link with another scheme, returned verbatim for the caller to handle or reject.
    Other(String),
}

/// Resolve a link found in a document served from `base`.
///
/// `/path` is absolute on the base host; `scheme://...` is a full URI; anything else is
/// appended to the base path. `..` segments are not resolved.
pub fn append_link(base: &GeminiUri, link: &str) -> Result<LinkTarget, UriError> {
    if link.starts_with('/') {
        let uri = GeminiUri::parse_absolute(&format!("{}://{}{}", GEMINI_SCHEME, base.authority(), link))?;
        return Ok(LinkTarget::Gemini(uri));
    }
    if let Some((scheme, _)) = split_scheme(link) {
        if scheme.eq_ignore_ascii_case(GEMINI_SCHEME) {
            return geminify(link).map(LinkTarget::Gemini);
        }
        return Ok(LinkTarget::Other(link.to_string()));
    }
    let path = join_paths(&base.path, link);
    let uri = GeminiUri::parse_absolute(&format!("{}://{}{}", GEMINI_SCHEME, base.authority(), path))?;
    Ok(LinkTarget::Gemini(uri))
}

fn join_paths(base: &str, relative: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let base = base.strip_prefix('/').unwrap_or(base);
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    if base.is_empty() {
        format!("/{}", relative)
    } else {
        format!("/{}/{}", base, relative)
    }
}
