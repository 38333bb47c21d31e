/*
 * status.rs
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

//! Gemini status codes and their six response categories.

use std::fmt;

use super::parser::ParseError;

/// Response category selected by the first status digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Input,
    Success,
    Redirect,
    TemporaryFailure,
    PermanentFailure,
    ClientCertRequired,
}

/// All status codes a Gemini server may send. Each family has an `Unknown*` member for
/// second digits without an assigned meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Input,
    SensitiveInput,
    UnknownInput,
    Success,
    UnknownSuccess,
    RedirectTemporary,
    RedirectPermanent,
    UnknownRedirect,
    TemporaryFailure,
    ServerUnavailable,
    CgiError,
    ProxyError,
    SlowDown,
    UnknownTemporaryFailure,
    PermanentFailure,
    NotFound,
    Gone,
    ProxyRequestRefused,
    BadRequest,
    UnknownPermanentFailure,
    ClientCertificateRequired,
    CertificateNotAuthorised,
    CertificateNotValid,
    UnknownClientCertificate,
}

impl StatusCode {
    /// Decode the two status bytes of a response header.
    ///
    /// The first byte must be an ASCII digit in `1..=6`; the second any ASCII digit.
    pub fn from_digits(first: u8, second: u8) -> Result<StatusCode, ParseError> {
        if !first.is_ascii_digit() {
            return Err(ParseError::FirstDigitNotDigit);
        }
        if !(b'1'..=b'6').contains(&first) {
            return Err(ParseError::InvalidFirstDigit(first - b'0'));
        }
        if !second.is_ascii_digit() {
            return Err(ParseError::SecondDigitNotDigit);
        }
        let status = match (first, second) {
            (b'1', b'0') => StatusCode::Input,
            (b'1', b'1') => StatusCode::SensitiveInput,
            (b'1', _) => StatusCode::UnknownInput,
            (b'2', b'0') => StatusCode::Success,
            (b'2', _) => StatusCode::UnknownSuccess,
            (b'3', b'0') => StatusCode::RedirectTemporary,
            (b'3', b'1') => StatusCode::RedirectPermanent,
            (b'3', _) => StatusCode::UnknownRedirect,
            (b'4', b'0') => StatusCode::TemporaryFailure,
            (b'4', b'1') => StatusCode::ServerUnavailable,
            (b'4', b'2') => StatusCode::CgiError,
            (b'4', b'3') => StatusCode::ProxyError,
            (b'4', b'4') => StatusCode::SlowDown,
            (b'4', _) => StatusCode::UnknownTemporaryFailure,
            (b'5', b'0') => StatusCode::PermanentFailure,
            (b'5', b'1') => StatusCode::NotFound,
            (b'5', b'2') => StatusCode::Gone,
            (b'5', b'3') => StatusCode::ProxyRequestRefused,
            (b'5', b'9') => StatusCode::BadRequest,
            (b'5', _) => StatusCode::UnknownPermanentFailure,
            (b'6', b'0') => StatusCode::ClientCertificateRequired,
            (b'6', b'1') => StatusCode::CertificateNotAuthorised,
            (b'6', b'2') => StatusCode::CertificateNotValid,
            (b'6', _) => StatusCode::UnknownClientCertificate,
            _ => return Err(ParseError::InvalidFirstDigit(first - b'0')),
        };
        Ok(status)
    }

    pub fn category(self) -> Category {
        use StatusCode::*;
        match self {
            Input | SensitiveInput | UnknownInput => Category::Input,
            Success | UnknownSuccess => Category::Success,
            RedirectTemporary | RedirectPermanent | UnknownRedirect => Category::Redirect,
            TemporaryFailure | ServerUnavailable | CgiError | ProxyError | SlowDown
            | UnknownTemporaryFailure => Category::TemporaryFailure,
            PermanentFailure | NotFound | Gone | ProxyRequestRefused | BadRequest
            | UnknownPermanentFailure => Category::PermanentFailure,
            ClientCertificateRequired | CertificateNotAuthorised | CertificateNotValid
            | UnknownClientCertificate => Category::ClientCertRequired,
        }
    }

    /// Two-digit code, or `None` for the unknown members (the exact second digit is not kept).
    pub fn code(self) -> Option<u8> {
        use StatusCode::*;
        let code = match self {
            Input => 10,
            SensitiveInput => 11,
            Success => 20,
            RedirectTemporary => 30,
            RedirectPermanent => 31,
            TemporaryFailure => 40,
            ServerUnavailable => 41,
            CgiError => 42,
            ProxyError => 43,
            SlowDown => 44,
            PermanentFailure => 50,
            NotFound => 51,
            Gone => 52,
            ProxyRequestRefused => 53,
            BadRequest => 59,
            ClientCertificateRequired => 60,
            CertificateNotAuthorised => 61,
            CertificateNotValid => 62,
            UnknownInput | UnknownSuccess | UnknownRedirect | UnknownTemporaryFailure
            | UnknownPermanentFailure | UnknownClientCertificate => return None,
        };
        Some(code)
    }

    /// First digit of the code (1..=6).
    pub fn family(self) -> u8 {
        match self.category() {
            Category::Input => 1,
            Category::Success => 2,
            Category::Redirect => 3,
            Category::TemporaryFailure => 4,
            Category::PermanentFailure => 5,
            Category::ClientCertRequired => 6,
        }
    }

    pub fn is_input(self) -> bool {
        self.category() == Category::Input
    }

    pub fn is_success(self) -> bool {
        self.category() == Category::Success
    }

    pub fn is_redirect(self) -> bool {
        self.category() == Category::Redirect
    }

    pub fn is_temporary_failure(self) -> bool {
        self.category() == Category::TemporaryFailure
    }

    pub fn is_permanent_failure(self) -> bool {
        self.category() == Category::PermanentFailure
    }

    pub fn is_client_cert_required(self) -> bool {
        self.category() == Category::ClientCertRequired
    }

    /// Input whose answer should not be echoed (status 11).
    pub fn is_sensitive_input(self) -> bool {
        self == StatusCode::SensitiveInput
    }

    pub fn is_second_digit_unknown(self) -> bool {
        self.code().is_none()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{} ({:?})", code, self),
            None => write!(f, "{}x ({:?})", self.family(), self),
        }
    }
}
