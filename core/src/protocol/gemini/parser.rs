/*
 * parser.rs
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

//! Response header parser: `<2-digit status> SP <meta> CRLF`.
//!
//! The header is read through a `BufReader` that is handed to the `Body` of a Success
//! response, so body bytes already buffered are not lost.

use std::io;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::response::{Body, Response};
use super::status::{Category, StatusCode};

/// Maximum number of bytes in the meta field.
pub const MAX_META_LEN: usize = 1024;

/// Malformed response header.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("first status code digit: not a digit")]
    FirstDigitNotDigit,
    #[error("first status code digit: invalid digit (not in 1-6 range: {0})")]
    InvalidFirstDigit(u8),
    #[error("second status code digit: not a digit")]
    SecondDigitNotDigit,
    #[error("expected whitespace after status, but got {0:#04x}")]
    MissingSpace(u8),
    #[error("Meta line is too long")]
    MetaTooLong,
    #[error("response ended before the {0}")]
    UnexpectedEnd(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Status and meta of a response, before any body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub status: StatusCode,
    pub meta: String,
}

async fn read_byte<R>(reader: &mut R) -> io::Result<Option<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut b = [0u8; 1];
    let n = reader.read(&mut b).await?;
    Ok(if n == 0 { None } else { Some(b[0]) })
}

/// Read the two status digits.
pub async fn read_status<R>(reader: &mut R) -> Result<StatusCode, ParseError>
where
    R: AsyncRead + Unpin,
{
    let first = read_byte(reader)
        .await?
        .ok_or(ParseError::UnexpectedEnd("status code"))?;
    let second = read_byte(reader)
        .await?
        .ok_or(ParseError::UnexpectedEnd("second status code digit"))?;
    StatusCode::from_digits(first, second)
}

/// Read the meta field up to CRLF, a bare LF or end of stream.
/// A CR that is not followed by LF is part of the meta.
pub async fn read_meta<R>(reader: &mut R) -> Result<String, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(MAX_META_LEN);
    let mut pending_cr = false;
    while let Some(b) = read_byte(reader).await? {
        if b == b'\n' {
            break;
        }
        if pending_cr {
            push_meta(&mut buf, b'\r')?;
        }
        pending_cr = b == b'\r';
        if !pending_cr {
            push_meta(&mut buf, b)?;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn push_meta(buf: &mut BytesMut, b: u8) -> Result<(), ParseError> {
    if buf.len() == MAX_META_LEN {
        return Err(ParseError::MetaTooLong);
    }
    buf.extend_from_slice(&[b]);
    Ok(())
}

/// Read status, separator and meta.
pub async fn read_header<R>(reader: &mut R) -> Result<Header, ParseError>
where
    R: AsyncRead + Unpin,
{
    let status = read_status(reader).await?;
    match read_byte(reader).await? {
        Some(b' ') => {}
        Some(b) => return Err(ParseError::MissingSpace(b)),
        None => return Err(ParseError::UnexpectedEnd("space after status")),
    }
    let meta = read_meta(reader).await?;
    Ok(Header { status, meta })
}

/// Parse a complete response from a freshly written-to connection.
///
/// Success keeps the connection open inside its `Body`. For every other category the
/// connection is shut down before returning.
pub async fn parse_response<S>(stream: S) -> Result<Response, ParseError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(stream);
    let Header { status, meta } = read_header(&mut reader).await?;
    let response = match status.category() {
        Category::Success => {
            return Ok(Response::Success {
                status,
                media_type: meta,
                body: Body::new(reader),
            })
        }
        Category::Input => Response::Input { status, prompt: meta },
        Category::Redirect => Response::Redirect { status, target: meta },
        Category::TemporaryFailure => Response::TemporaryFailure { status, message: meta },
        Category::PermanentFailure => Response::PermanentFailure { status, message: meta },
        Category::ClientCertRequired => Response::ClientCertRequired { status, message: meta },
    };
    if let Err(e) = reader.shutdown().await {
        tracing::debug!(error = %e, "closing connection after {} response", status);
    }
    Ok(response)
}
