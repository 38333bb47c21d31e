/*
 * mod.rs
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

//! Gemini protocol: response header parser, response model and the request/redirect loop.
//!
//! - One request per TLS connection: `<uri>\r\n` out, `<status> <meta>\r\n` back.
//! - Input and Redirect responses are resolved by `Client`; terminal responses go to a
//!   `ResponseHandler`.
//! - Success bodies are streamed from the same buffered connection the header was read from.

mod handler;
mod parser;
mod response;
mod status;

pub mod client;

pub use client::Client;
pub use handler::ResponseHandler;
pub use parser::{parse_response, read_header, read_meta, read_status, Header, ParseError, MAX_META_LEN};
pub use response::{Body, CategoryMismatch, Connection, Response};
pub use status::{Category, StatusCode};
