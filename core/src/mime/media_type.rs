/*
 * media_type.rs
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

//! Media type of a Success response (the meta line, RFC 2045 syntax).

use std::fmt;

pub const CHARSET: &str = "charset";
pub const LANGUAGE: &str = "lang";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    primary_type: String,
    sub_type: String,
    /// Names are stored lower-case; the first occurrence of a name wins.
    parameters: Vec<(String, String)>,
}

impl MediaType {
    pub fn new(primary_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            primary_type: primary_type.into().to_ascii_lowercase(),
            sub_type: sub_type.into().to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// `text/gemini; charset=utf-8`, the media type of a Success with an empty meta line.
    pub fn gemini_text() -> Self {
        Self::new("text", "gemini").with_parameter(CHARSET, "utf-8")
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        if !self.parameters.iter().any(|(n, _)| *n == name) {
            self.parameters.push((name, value.into()));
        }
        self
    }

    /// Parse `type/subtype; name=value; ...`. Returns `None` for an empty value or a
    /// value without a `/`.
    pub fn parse(value: &str) -> Option<MediaType> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let mut parts = value.split(';');
        let type_part = parts.next()?.trim();
        let (primary, sub) = type_part.split_once('/')?;
        let primary = primary.trim();
        let sub = sub.trim();
        if primary.is_empty() || sub.is_empty() {
            return None;
        }
        let mut media_type = MediaType::new(primary, sub);
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (name, value) = match param.split_once('=') {
                Some((n, v)) => (n.trim(), unquote(v.trim())),
                None => (param, String::new()),
            };
            if name.is_empty() {
                continue;
            }
            media_type = media_type.with_parameter(name, value);
        }
        Some(media_type)
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter(CHARSET)
    }

    pub fn lang(&self) -> Option<&str> {
        self.parameter(LANGUAGE)
    }

    pub fn is_text(&self) -> bool {
        self.primary_type == "text"
    }

    pub fn is_gemini_text(&self) -> bool {
        self.is_text() && self.sub_type == "gemini"
    }

    pub fn is_image(&self) -> bool {
        self.primary_type == "image"
    }

    pub fn is_audio(&self) -> bool {
        self.primary_type == "audio"
    }

    pub fn is_application(&self) -> bool {
        self.primary_type == "application"
    }
}

/// Strip surrounding double quotes and backslash escapes.
fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary_type, self.sub_type)?;
        for (name, value) in &self.parameters {
            write!(f, "; {}={}", name, value)?;
        }
        Ok(())
    }
}
