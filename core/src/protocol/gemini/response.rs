/*
 * response.rs
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

//! Gemini response variants and the Success body handle.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};

use crate::mime::MediaType;
use super::status::{Category, StatusCode};

/// Anything a response body can be read from and shut down.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

/// Body of a Success response: a live, move-only handle on the open connection.
///
/// Read it with `AsyncReadExt`, then call `close`. Dropping it also closes the
/// connection, without a TLS close_notify.
pub struct Body {
    inner: Box<dyn Connection>,
}

impl Body {
    pub fn new<C: Connection + 'static>(connection: C) -> Self {
        Self {
            inner: Box::new(connection),
        }
    }

    /// Shut down the underlying connection.
    pub async fn close(mut self) -> io::Result<()> {
        self.inner.shutdown().await
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body { .. }")
    }
}

impl AsyncRead for Body {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

/// A status code was used with a variant of another category.
#[derive(Debug, Error)]
#[error("status code {status} does not belong to the {expected:?} category")]
pub struct CategoryMismatch {
    pub status: StatusCode,
    pub expected: Category,
}

/// A parsed Gemini response.
#[derive(Debug)]
pub enum Response {
    Input { status: StatusCode, prompt: String },
    Success { status: StatusCode, media_type: String, body: Body },
    Redirect { status: StatusCode, target: String },
    TemporaryFailure { status: StatusCode, message: String },
    PermanentFailure { status: StatusCode, message: String },
    ClientCertRequired { status: StatusCode, message: String },
}

fn require(status: StatusCode, expected: Category) -> Result<StatusCode, CategoryMismatch> {
    if status.category() == expected {
        Ok(status)
    } else {
        Err(CategoryMismatch { status, expected })
    }
}

impl Response {
    pub fn input(status: StatusCode, prompt: impl Into<String>) -> Result<Self, CategoryMismatch> {
        let status = require(status, Category::Input)?;
        Ok(Response::Input { status, prompt: prompt.into() })
    }

    pub fn success(
        status: StatusCode,
        media_type: impl Into<String>,
        body: Body,
    ) -> Result<Self, CategoryMismatch> {
        let status = require(status, Category::Success)?;
        Ok(Response::Success { status, media_type: media_type.into(), body })
    }

    pub fn redirect(status: StatusCode, target: impl Into<String>) -> Result<Self, CategoryMismatch> {
        let status = require(status, Category::Redirect)?;
        Ok(Response::Redirect { status, target: target.into() })
    }

    pub fn temporary_failure(
        status: StatusCode,
        message: impl Into<String>,
    ) -> Result<Self, CategoryMismatch> {
        let status = require(status, Category::TemporaryFailure)?;
        Ok(Response::TemporaryFailure { status, message: message.into() })
    }

    pub fn permanent_failure(
        status: StatusCode,
        message: impl Into<String>,
    ) -> Result<Self, CategoryMismatch> {
        let status = require(status, Category::PermanentFailure)?;
        Ok(Response::PermanentFailure { status, message: message.into() })
    }

    pub fn client_cert_required(
        status: StatusCode,
        message: impl Into<String>,
    ) -> Result<Self, CategoryMismatch> {
        let status = require(status, Category::ClientCertRequired)?;
        Ok(Response::ClientCertRequired { status, message: message.into() })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Response::Input { status, .. }
            | Response::Success { status, .. }
            | Response::Redirect { status, .. }
            | Response::TemporaryFailure { status, .. }
            | Response::PermanentFailure { status, .. }
            | Response::ClientCertRequired { status, .. } => *status,
        }
    }

    /// The raw meta line, whatever its meaning for this category.
    pub fn meta(&self) -> &str {
        match self {
            Response::Input { prompt, .. } => prompt,
            Response::Success { media_type, .. } => media_type,
            Response::Redirect { target, .. } => target,
            Response::TemporaryFailure { message, .. }
            | Response::PermanentFailure { message, .. }
            | Response::ClientCertRequired { message, .. } => message,
        }
    }

    /// Parsed media type of a Success response. An empty or unparseable meta line
    /// means `text/gemini; charset=utf-8`.
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            Response::Success { media_type, .. } => {
                Some(MediaType::parse(media_type).unwrap_or_else(MediaType::gemini_text))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_check_category() {
        assert!(Response::input(StatusCode::SensitiveInput, "pin").is_ok());
        assert!(Response::input(StatusCode::Success, "pin").is_err());
        assert!(Response::redirect(StatusCode::NotFound, "x").is_err());
        let err = Response::permanent_failure(StatusCode::SlowDown, "x").unwrap_err();
        assert_eq!(err.expected, Category::PermanentFailure);
        assert!(Response::success(StatusCode::Input, "text/plain", Body::new(std::io::Cursor::new(Vec::new()))).is_err());
    }

    #[test]
    fn empty_media_type_defaults_to_gemtext() {
        let r = Response::success(StatusCode::Success, "", Body::new(std::io::Cursor::new(Vec::new()))).unwrap();
        let mt = r.media_type().unwrap();
        assert!(mt.is_gemini_text());
        assert_eq!(mt.charset(), Some("utf-8"));
        assert_eq!(r.meta(), "");
    }
}
