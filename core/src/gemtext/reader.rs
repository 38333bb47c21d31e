/*
 * reader.rs
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

//! Read a text body line by line into GemText lines.

use std::io;

use encoding_rs::{Encoding, UTF_8};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::parser::{GemTextLine, GemTextParser};
use crate::mime::MediaType;

/// Encoding named by the media type's charset. No charset means UTF-8; an unknown
/// label is logged and decoded as UTF-8.
fn body_encoding(media_type: &MediaType) -> &'static Encoding {
    match media_type.charset() {
        None => UTF_8,
        Some(label) => Encoding::for_label(label.trim().as_bytes()).unwrap_or_else(|| {
            tracing::warn!(charset = label, "unsupported charset, decoding body as UTF-8");
            UTF_8
        }),
    }
}

/// Read all lines of a text body (LF or CRLF terminated), decoded with the declared
/// charset. `text/gemini` bodies are classified with the GemText parser; other text
/// is returned as `Text` lines.
pub async fn read_text_body<R>(mut reader: R, media_type: &MediaType) -> io::Result<Vec<GemTextLine>>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    let (text, encoding, malformed) = body_encoding(media_type).decode(&bytes);
    if malformed {
        tracing::debug!(encoding = encoding.name(), "body contains malformed sequences");
    }
    let mut parser = GemTextParser::new();
    let gemtext = media_type.is_gemini_text();
    Ok(text
        .lines()
        .map(|line| {
            if gemtext {
                parser.parse_line(line)
            } else {
                GemTextLine::Text(line.to_string())
            }
        })
        .collect())
}
